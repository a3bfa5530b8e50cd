use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult};

/// Vehicle identification collected at the start of intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: Option<String>,
    pub condition: Option<String>,
}

impl VehicleDetails {
    /// Sane model-year bounds; anything outside is a data-entry error.
    const YEAR_MIN: u16 = 1900;
    const YEAR_MAX: u16 = 2100;

    pub fn validate(&self) -> DomainResult<()> {
        if self.make.trim().is_empty() {
            return Err(DomainError::validation("vehicle make must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(DomainError::validation("vehicle model must not be empty"));
        }
        if !(Self::YEAR_MIN..=Self::YEAR_MAX).contains(&self.year) {
            return Err(DomainError::validation(format!(
                "vehicle year {} out of range",
                self.year
            )));
        }
        if let Some(vin) = &self.vin {
            if vin.trim().is_empty() {
                return Err(DomainError::validation("vin must not be blank when present"));
            }
        }
        Ok(())
    }

    /// "2019 Audi A4"-style label used in prompts and summaries.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleDetails {
        VehicleDetails {
            make: "Audi".to_string(),
            model: "A4".to_string(),
            year: 2019,
            vin: None,
            condition: None,
        }
    }

    #[test]
    fn accepts_a_plain_vehicle() {
        assert!(vehicle().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_year() {
        let mut v = vehicle();
        v.year = 1850;
        assert!(v.validate().is_err());
        v.year = 3000;
        assert!(v.validate().is_err());
    }

    #[test]
    fn rejects_blank_make_or_model() {
        let mut v = vehicle();
        v.make = " ".to_string();
        assert!(v.validate().is_err());

        let mut v = vehicle();
        v.model = String::new();
        assert!(v.validate().is_err());
    }
}
