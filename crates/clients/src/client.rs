use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

use crate::contact::validate_email;

/// Client identifier (tenant-scoped via the `tenant_id` field on the entity).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub EntityId);

impl ClientId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: Client.
///
/// `total_invoiced` is a denormalized running counter in minor currency
/// units; it is updated in the same grouped write as invoice creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    tenant_id: TenantId,
    name: String,
    email: String,
    active: bool,
    total_invoiced: u64,
    created_at: DateTime<Utc>,
}

impl Client {
    pub fn create(
        id: ClientId,
        tenant_id: TenantId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("client name must not be empty"));
        }
        validate_email(&email)?;

        Ok(Self {
            id,
            tenant_id,
            name,
            email,
            active: true,
            total_invoiced: 0,
            created_at,
        })
    }

    pub fn id_typed(&self) -> ClientId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn total_invoiced(&self) -> u64 {
        self.total_invoiced
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("client name must not be empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn change_email(&mut self, email: impl Into<String>) -> DomainResult<()> {
        let email = email.into();
        validate_email(&email)?;
        self.email = email;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn reactivate(&mut self) {
        self.active = true;
    }

    /// Add an invoiced amount to the running counter.
    pub fn record_invoiced(&mut self, amount: u64) -> DomainResult<()> {
        self.total_invoiced = self
            .total_invoiced
            .checked_add(amount)
            .ok_or_else(|| DomainError::invariant("total_invoiced overflow"))?;
        Ok(())
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detailops_core::EntityId;

    fn test_client() -> Client {
        Client::create(
            ClientId::new(EntityId::new()),
            TenantId::new(),
            "Dana Reyes",
            "dana@example.com",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_validates_name_and_email() {
        let err = Client::create(
            ClientId::new(EntityId::new()),
            TenantId::new(),
            "  ",
            "dana@example.com",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Client::create(
            ClientId::new(EntityId::new()),
            TenantId::new(),
            "Dana",
            "not-an-email",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn record_invoiced_accumulates() {
        let mut client = test_client();
        client.record_invoiced(12_50).unwrap();
        client.record_invoiced(7_50).unwrap();
        assert_eq!(client.total_invoiced(), 20_00);
    }

    #[test]
    fn new_clients_start_active_with_zero_invoiced() {
        let client = test_client();
        assert!(client.is_active());
        assert_eq!(client.total_invoiced(), 0);
    }
}
