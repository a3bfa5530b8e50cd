//! Postgres-backed tenant store.
//!
//! Persists each collection as JSONB rows in one `documents` table keyed by
//! `(tenant_id, collection, key)`. Tenant isolation is enforced by including
//! `tenant_id` in every WHERE clause.
//!
//! The [`TenantStore`] trait is synchronous (domain code and tests are
//! storage-agnostic), so the async sqlx calls are bridged with
//! `block_in_place` + `Handle::block_on`; construct this store only inside a
//! multi-threaded Tokio runtime.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use detailops_core::TenantId;

use super::tenant_store::TenantStore;

/// Create the backing table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            tenant_id  UUID        NOT NULL,
            collection TEXT        NOT NULL,
            key        TEXT        NOT NULL,
            doc        JSONB       NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (tenant_id, collection, key)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// One named collection of JSONB documents, typed at the edges.
#[derive(Debug, Clone)]
pub struct PostgresTenantStore<K, V> {
    pool: Arc<PgPool>,
    collection: String,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> PostgresTenantStore<K, V> {
    pub fn new(pool: Arc<PgPool>, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
            _marker: PhantomData,
        }
    }

    fn block_on<F, T>(fut: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(fut))
    }
}

impl<K, V> PostgresTenantStore<K, V>
where
    V: Serialize + DeserializeOwned,
{
    async fn get_doc(&self, tenant_id: Uuid, key: &str) -> Result<Option<V>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT doc FROM documents WHERE tenant_id = $1 AND collection = $2 AND key = $3",
        )
        .bind(tenant_id)
        .bind(&self.collection)
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        let Some(row) = row else { return Ok(None) };
        let doc: serde_json::Value = row.try_get("doc")?;
        match serde_json::from_value(doc) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "corrupt document");
                Ok(None)
            }
        }
    }

    async fn upsert_doc(&self, tenant_id: Uuid, key: &str, doc: serde_json::Value) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO documents (tenant_id, collection, key, doc, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (tenant_id, collection, key)
            DO UPDATE SET doc = EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(tenant_id)
        .bind(&self.collection)
        .bind(key)
        .bind(doc)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn remove_doc(&self, tenant_id: Uuid, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM documents WHERE tenant_id = $1 AND collection = $2 AND key = $3")
            .bind(tenant_id)
            .bind(&self.collection)
            .bind(key)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn list_docs(&self, tenant_id: Uuid) -> Result<Vec<V>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT doc FROM documents WHERE tenant_id = $1 AND collection = $2 ORDER BY key",
        )
        .bind(tenant_id)
        .bind(&self.collection)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: serde_json::Value = row.try_get("doc")?;
            match serde_json::from_value(doc) {
                Ok(v) => out.push(v),
                Err(e) => {
                    tracing::error!(collection = %self.collection, error = %e, "corrupt document");
                }
            }
        }
        Ok(out)
    }

    async fn clear_docs(&self, tenant_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM documents WHERE tenant_id = $1 AND collection = $2")
            .bind(tenant_id)
            .bind(&self.collection)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}

impl<K, V> TenantStore<K, V> for PostgresTenantStore<K, V>
where
    K: ToString + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let key = key.to_string();
        match Self::block_on(self.get_doc(*tenant_id.as_uuid(), &key)) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "get failed");
                None
            }
        }
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        let key = key.to_string();
        let doc = match serde_json::to_value(&value) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "serialize failed");
                return;
            }
        };
        if let Err(e) = Self::block_on(self.upsert_doc(*tenant_id.as_uuid(), &key, doc)) {
            tracing::error!(collection = %self.collection, error = %e, "upsert failed");
        }
    }

    fn remove(&self, tenant_id: TenantId, key: &K) {
        let key = key.to_string();
        if let Err(e) = Self::block_on(self.remove_doc(*tenant_id.as_uuid(), &key)) {
            tracing::error!(collection = %self.collection, error = %e, "remove failed");
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        match Self::block_on(self.list_docs(*tenant_id.as_uuid())) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "list failed");
                Vec::new()
            }
        }
    }

    fn clear_tenant(&self, tenant_id: TenantId) {
        if let Err(e) = Self::block_on(self.clear_docs(*tenant_id.as_uuid())) {
            tracing::error!(collection = %self.collection, error = %e, "clear failed");
        }
    }
}
