use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_clients::ClientId;
use detailops_core::{DomainError, DomainResult, Entity, EntityId, TenantId};

/// Invoice identifier (tenant-scoped via the `tenant_id` field).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub EntityId);

impl InvoiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Void,
}

/// Entity: Invoice.
///
/// Creation increments the client's `total_invoiced` counter; the two writes
/// happen inside one grouped store operation (see the infra invoicing store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    tenant_id: TenantId,
    client_id: ClientId,
    /// Amount in smallest currency unit (e.g., cents).
    amount: u64,
    due_date: DateTime<Utc>,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn create(
        id: InvoiceId,
        tenant_id: TenantId,
        client_id: ClientId,
        amount: u64,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount == 0 {
            return Err(DomainError::validation("invoice amount must be positive"));
        }

        Ok(Self {
            id,
            tenant_id,
            client_id,
            amount,
            due_date,
            status: InvoiceStatus::Pending,
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_open(&self) -> bool {
        self.status == InvoiceStatus::Pending
    }

    pub fn mark_paid(&mut self) -> DomainResult<()> {
        if self.status != InvoiceStatus::Pending {
            return Err(DomainError::invariant(format!(
                "cannot pay a {:?} invoice",
                self.status
            )));
        }
        self.status = InvoiceStatus::Paid;
        Ok(())
    }

    pub fn void(&mut self) -> DomainResult<()> {
        if self.status == InvoiceStatus::Void {
            return Err(DomainError::conflict("invoice is already void"));
        }
        self.status = InvoiceStatus::Void;
        Ok(())
    }

    /// Patch amount/due date while the invoice is still open.
    pub fn update(
        &mut self,
        amount: Option<u64>,
        due_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        if !self.is_open() {
            return Err(DomainError::invariant(format!(
                "cannot update a {:?} invoice",
                self.status
            )));
        }
        if let Some(amount) = amount {
            if amount == 0 {
                return Err(DomainError::validation("invoice amount must be positive"));
            }
            self.amount = amount;
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        Ok(())
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> Invoice {
        Invoice::create(
            InvoiceId::new(EntityId::new()),
            TenantId::new(),
            ClientId::new(EntityId::new()),
            180_00,
            Utc::now(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_rejects_zero_amount() {
        let err = Invoice::create(
            InvoiceId::new(EntityId::new()),
            TenantId::new(),
            ClientId::new(EntityId::new()),
            0,
            Utc::now(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn cannot_pay_a_void_invoice() {
        let mut inv = invoice();
        inv.void().unwrap();
        assert!(inv.mark_paid().is_err());
    }

    #[test]
    fn cannot_void_twice() {
        let mut inv = invoice();
        inv.void().unwrap();
        assert!(matches!(inv.void(), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn paid_invoices_are_not_updatable() {
        let mut inv = invoice();
        inv.mark_paid().unwrap();
        assert!(inv.update(Some(10_00), None).is_err());
    }
}
