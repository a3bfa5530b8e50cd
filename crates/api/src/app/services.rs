//! Infrastructure wiring for the HTTP app.
//!
//! Stores default to the in-memory implementations; external providers are
//! wired from the environment and fall back to inert test doubles so a dev
//! process boots without credentials (AI/payment endpoints then degrade to
//! provider errors, which is the documented behavior).

use std::sync::Arc;

use detailops_analytics::{
    AnalyticsReport, ClientRecord, FeedbackRecord, InvoiceRecord, JobRecord, TimeRange,
};
use detailops_assessments::{Assessment, AssessmentId, IntakeProfile};
use detailops_core::{EntityId, TenantId};
use detailops_infra::providers::{
    FailingTextGenerator, FakePaymentGateway, OpenAiChatClient, PaymentGateway, StripeGateway,
    TextGenerator,
};
use detailops_infra::workflow::AssessmentIntake;
use detailops_infra::{
    BillingStore, InMemoryBillingStore, InMemorySchedulingStore, InMemoryTenantStore, RateLimiter,
    SchedulingStore, TenantStore, TtlCache,
};
use detailops_invoicing::InvoiceStatus;
use detailops_scheduling::Appointment;
use detailops_services::{Service, ServiceId};

/// Seconds a cached analytics report stays fresh.
pub const REPORT_CACHE_TTL_SECS: i64 = 300;
/// Seconds a cached slot listing stays fresh.
pub const SLOTS_CACHE_TTL_SECS: i64 = 60;

/// Shared service container handed to every handler.
pub struct AppServices {
    pub billing: Arc<dyn BillingStore>,
    pub scheduling: Arc<dyn SchedulingStore>,
    pub catalog: Arc<dyn TenantStore<ServiceId, Service>>,
    pub assessments: Arc<dyn TenantStore<AssessmentId, Assessment>>,
    pub profiles: Arc<dyn TenantStore<TenantId, IntakeProfile>>,
    pub jobs: Arc<dyn TenantStore<EntityId, JobRecord>>,
    pub feedback: Arc<dyn TenantStore<EntityId, FeedbackRecord>>,
    pub intake: AssessmentIntake,
    pub report_cache: TtlCache<(TenantId, TimeRange), AnalyticsReport>,
    pub slots_cache: TtlCache<(TenantId, String), Vec<Appointment>>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub public_base_url: String,
}

impl AppServices {
    /// Flatten stored entities into the analytics row snapshots.
    pub fn analytics_rows(
        &self,
        tenant_id: TenantId,
    ) -> (
        Vec<ClientRecord>,
        Vec<InvoiceRecord>,
        Vec<JobRecord>,
        Vec<FeedbackRecord>,
    ) {
        let clients = self
            .billing
            .list_clients(tenant_id)
            .into_iter()
            .map(|c| ClientRecord {
                created_at: c.created_at(),
                active: c.is_active(),
            })
            .collect();

        let invoices = self
            .billing
            .list_invoices(tenant_id)
            .into_iter()
            .map(|i| InvoiceRecord {
                date: i.created_at(),
                amount: i.amount(),
                pending: i.status() == InvoiceStatus::Pending,
            })
            .collect();

        (
            clients,
            invoices,
            self.jobs.list(tenant_id),
            self.feedback.list(tenant_id),
        )
    }
}

/// Build the default (in-memory) service wiring.
pub async fn build_services() -> AppServices {
    let billing = Arc::new(InMemoryBillingStore::new());
    let scheduling = Arc::new(InMemorySchedulingStore::new());
    let catalog: Arc<InMemoryTenantStore<ServiceId, Service>> = Arc::new(InMemoryTenantStore::new());
    let assessments: Arc<InMemoryTenantStore<AssessmentId, Assessment>> =
        Arc::new(InMemoryTenantStore::new());
    let profiles: Arc<InMemoryTenantStore<TenantId, IntakeProfile>> =
        Arc::new(InMemoryTenantStore::new());
    let jobs: Arc<InMemoryTenantStore<EntityId, JobRecord>> = Arc::new(InMemoryTenantStore::new());
    let feedback: Arc<InMemoryTenantStore<EntityId, FeedbackRecord>> =
        Arc::new(InMemoryTenantStore::new());

    let generator: Arc<dyn TextGenerator> = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Arc::new(OpenAiChatClient::new(
            key,
            std::env::var("OPENAI_BASE_URL").ok(),
            std::env::var("OPENAI_MODEL").ok(),
        )),
        _ => {
            tracing::warn!("OPENAI_API_KEY not set; AI endpoints will degrade");
            Arc::new(FailingTextGenerator)
        }
    };

    let payments: Arc<dyn PaymentGateway> = match std::env::var("STRIPE_SECRET_KEY") {
        Ok(key) if !key.is_empty() => Arc::new(StripeGateway::new(key, None)),
        _ => {
            tracing::warn!("STRIPE_SECRET_KEY not set; using the fake payment gateway");
            Arc::new(FakePaymentGateway::new())
        }
    };

    let intake = AssessmentIntake::new(catalog.clone(), assessments.clone(), generator, payments);

    AppServices {
        billing,
        scheduling,
        catalog,
        assessments,
        profiles,
        jobs,
        feedback,
        intake,
        report_cache: TtlCache::with_ttl_seconds(REPORT_CACHE_TTL_SECS),
        slots_cache: TtlCache::with_ttl_seconds(SLOTS_CACHE_TTL_SECS),
        rate_limiter: Arc::new(detailops_infra::FixedWindowRateLimiter::default()),
        public_base_url: std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string()),
    }
}
