use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

/// Service identifier (tenant-scoped via the `tenant_id` field on the entity).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub EntityId);

impl ServiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// How the base price is interpreted by callers (per job, per hour, quoted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Fixed,
    Hourly,
    Variable,
}

/// Input widget type for a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Multiselect,
}

/// Service-specific extra input, optionally contributing to the price.
///
/// For `affects_price` fields the contribution is either
/// `numeric value * price_modifier` or `option index * price_modifier`
/// (see [`crate::pricing::estimate_total`]). Modifiers are in minor currency
/// units and may be negative (discounts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub field_type: FieldType,
    pub options: Option<Vec<String>>,
    pub affects_price: bool,
    pub price_modifier: Option<i64>,
}

impl CustomField {
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("custom field name must not be empty"));
        }

        if matches!(self.field_type, FieldType::Select | FieldType::Multiselect)
            && self.options.as_ref().is_none_or(|o| o.is_empty())
        {
            return Err(DomainError::validation(format!(
                "custom field '{}' is a select but has no options",
                self.name
            )));
        }

        if self.affects_price && self.price_modifier.is_none() {
            return Err(DomainError::validation(format!(
                "custom field '{}' affects price but has no price_modifier",
                self.name
            )));
        }

        Ok(())
    }
}

/// Entity: Service (one catalog entry of an organization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    id: ServiceId,
    tenant_id: TenantId,
    name: String,
    description: String,
    /// Base price in smallest currency unit (e.g., cents).
    base_price: u64,
    price_type: PriceType,
    custom_fields: Vec<CustomField>,
    created_at: DateTime<Utc>,
}

impl Service {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: ServiceId,
        tenant_id: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
        base_price: u64,
        price_type: PriceType,
        custom_fields: Vec<CustomField>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("service name must not be empty"));
        }

        for field in &custom_fields {
            field.validate()?;
        }

        Ok(Self {
            id,
            tenant_id,
            name,
            description: description.into(),
            base_price,
            price_type,
            custom_fields,
            created_at,
        })
    }

    pub fn id_typed(&self) -> ServiceId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn base_price(&self) -> u64 {
        self.base_price
    }

    pub fn price_type(&self) -> PriceType {
        self.price_type
    }

    pub fn custom_fields(&self) -> &[CustomField] {
        &self.custom_fields
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn update_pricing(&mut self, base_price: u64, price_type: PriceType) {
        self.base_price = base_price;
        self.price_type = price_type;
    }

    pub fn replace_custom_fields(&mut self, custom_fields: Vec<CustomField>) -> DomainResult<()> {
        for field in &custom_fields {
            field.validate()?;
        }
        self.custom_fields = custom_fields;
        Ok(())
    }
}

impl Entity for Service {
    type Id = ServiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_field(name: &str, modifier: i64) -> CustomField {
        CustomField {
            name: name.to_string(),
            field_type: FieldType::Number,
            options: None,
            affects_price: true,
            price_modifier: Some(modifier),
        }
    }

    #[test]
    fn create_rejects_select_without_options() {
        let field = CustomField {
            name: "finish".to_string(),
            field_type: FieldType::Select,
            options: None,
            affects_price: false,
            price_modifier: None,
        };

        let err = Service::create(
            ServiceId::new(detailops_core::EntityId::new()),
            TenantId::new(),
            "Exterior wash",
            "",
            45_00,
            PriceType::Fixed,
            vec![field],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_price_affecting_field_without_modifier() {
        let mut field = number_field("panels", 5_00);
        field.price_modifier = None;

        let err = Service::create(
            ServiceId::new(detailops_core::EntityId::new()),
            TenantId::new(),
            "Paint correction",
            "",
            200_00,
            PriceType::Variable,
            vec![field],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
