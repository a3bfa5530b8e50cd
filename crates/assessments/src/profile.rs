use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult, TenantId};

/// Public intake identity of a tenant.
///
/// Bound 1:1 to the tenant; holds the intake link and its rendered QR code
/// (a data URL). Creation is idempotent, keyed by tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeProfile {
    tenant_id: TenantId,
    name: String,
    intake_url: String,
    qr_code_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IntakeProfile {
    pub fn create(
        tenant_id: TenantId,
        name: impl Into<String>,
        intake_url: impl Into<String>,
        qr_code_url: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("profile name must not be empty"));
        }

        Ok(Self {
            tenant_id,
            name,
            intake_url: intake_url.into(),
            qr_code_url: qr_code_url.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Canonical public intake link for a tenant.
    pub fn intake_url_for(base_url: &str, tenant_id: TenantId) -> String {
        format!("{}/assess/{}", base_url.trim_end_matches('/'), tenant_id)
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intake_url(&self) -> &str {
        &self.intake_url
    }

    pub fn qr_code_url(&self) -> &str {
        &self.qr_code_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refresh the rendered QR/link pair (idempotent update path).
    pub fn refresh(
        &mut self,
        name: impl Into<String>,
        intake_url: impl Into<String>,
        qr_code_url: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("profile name must not be empty"));
        }
        self.name = name;
        self.intake_url = intake_url.into();
        self.qr_code_url = qr_code_url.into();
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_url_strips_trailing_slash() {
        let tenant_id = TenantId::new();
        let url = IntakeProfile::intake_url_for("https://app.example.com/", tenant_id);
        assert_eq!(url, format!("https://app.example.com/assess/{tenant_id}"));
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = IntakeProfile::create(
            TenantId::new(),
            " ",
            "https://x/assess/1",
            "data:image/svg+xml;base64,AA==",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
