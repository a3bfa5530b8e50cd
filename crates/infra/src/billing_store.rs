//! Grouped-write store for clients and invoices.
//!
//! Invoice creation and the client's `total_invoiced` counter are one
//! logical change; keeping both maps under a single lock means the counter
//! can never drift from the invoices that produced it.

use std::collections::HashMap;
use std::sync::RwLock;

use detailops_clients::{Client, ClientId};
use detailops_core::TenantId;
use detailops_invoicing::{Invoice, InvoiceId};

use crate::scheduling_store::StoreError;

/// Client + invoice persistence with the grouped create-invoice write.
pub trait BillingStore: Send + Sync {
    fn insert_client(&self, client: Client) -> Result<(), StoreError>;
    fn get_client(&self, tenant_id: TenantId, id: ClientId) -> Option<Client>;
    fn update_client(&self, client: Client) -> Result<(), StoreError>;
    fn remove_client(&self, tenant_id: TenantId, id: ClientId) -> Result<(), StoreError>;
    fn list_clients(&self, tenant_id: TenantId) -> Vec<Client>;

    /// Insert the invoice and bump the client's `total_invoiced` counter in
    /// one grouped write. Fails with `NotFound` when the client is missing;
    /// nothing is written in that case.
    fn create_invoice(&self, invoice: Invoice) -> Result<(), StoreError>;

    fn get_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> Option<Invoice>;
    fn update_invoice(&self, invoice: Invoice) -> Result<(), StoreError>;
    fn list_invoices(&self, tenant_id: TenantId) -> Vec<Invoice>;
}

#[derive(Debug, Default)]
struct BillingState {
    clients: HashMap<(TenantId, ClientId), Client>,
    invoices: HashMap<(TenantId, InvoiceId), Invoice>,
}

/// In-memory billing store; one lock over both maps.
#[derive(Debug, Default)]
pub struct InMemoryBillingStore {
    inner: RwLock<BillingState>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BillingStore for InMemoryBillingStore {
    fn insert_client(&self, client: Client) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        state
            .clients
            .insert((client.tenant_id(), client.id_typed()), client);
        Ok(())
    }

    fn get_client(&self, tenant_id: TenantId, id: ClientId) -> Option<Client> {
        let state = self.inner.read().ok()?;
        state.clients.get(&(tenant_id, id)).cloned()
    }

    fn update_client(&self, client: Client) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let key = (client.tenant_id(), client.id_typed());
        if !state.clients.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        state.clients.insert(key, client);
        Ok(())
    }

    fn remove_client(&self, tenant_id: TenantId, id: ClientId) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        state
            .clients
            .remove(&(tenant_id, id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn list_clients(&self, tenant_id: TenantId) -> Vec<Client> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut items: Vec<Client> = state
            .clients
            .iter()
            .filter_map(|((t, _), c)| (*t == tenant_id).then(|| c.clone()))
            .collect();
        items.sort_by_key(|c| c.created_at());
        items
    }

    fn create_invoice(&self, invoice: Invoice) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let client_key = (invoice.tenant_id(), invoice.client_id());
        let Some(client) = state.clients.get_mut(&client_key) else {
            return Err(StoreError::NotFound);
        };

        client
            .record_invoiced(invoice.amount())
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        state
            .invoices
            .insert((invoice.tenant_id(), invoice.id_typed()), invoice);
        Ok(())
    }

    fn get_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> Option<Invoice> {
        let state = self.inner.read().ok()?;
        state.invoices.get(&(tenant_id, id)).cloned()
    }

    fn update_invoice(&self, invoice: Invoice) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let key = (invoice.tenant_id(), invoice.id_typed());
        if !state.invoices.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        state.invoices.insert(key, invoice);
        Ok(())
    }

    fn list_invoices(&self, tenant_id: TenantId) -> Vec<Invoice> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut items: Vec<Invoice> = state
            .invoices
            .iter()
            .filter_map(|((t, _), i)| (*t == tenant_id).then(|| i.clone()))
            .collect();
        items.sort_by_key(|i| i.created_at());
        items
    }
}
