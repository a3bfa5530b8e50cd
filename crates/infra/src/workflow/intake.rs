//! Assessment intake orchestration.
//!
//! Glues the step-wise intake draft to the pricing engine, the store and the
//! external providers. The AI insight step is best-effort: a provider
//! failure degrades to "no summary", never fails the enclosing request.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use detailops_ai::{
    AssessmentQuestion, AssessmentSnapshot, HotspotNote, estimate_prompt, parse_estimate,
    parse_questions, questions_prompt, summary_prompt,
};
use detailops_assessments::{Assessment, AssessmentId, IntakeSubmission, Severity, VehicleDetails};
use detailops_core::{DomainError, DomainResult, EntityId, TenantId};
use detailops_services::{Service, ServiceId};

use crate::providers::{PaymentGateway, TextGenerator};
use crate::store::TenantStore;

/// Share of the estimate requested as a deposit, in percent.
pub const DEPOSIT_PERCENT: u64 = 10;

/// A requested deposit, ready for client-side confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositIntent {
    /// Deposit amount in smallest currency unit.
    pub amount: u64,
    pub client_secret: String,
}

/// Intake workflow facade.
pub struct AssessmentIntake {
    services: Arc<dyn TenantStore<ServiceId, Service>>,
    assessments: Arc<dyn TenantStore<AssessmentId, Assessment>>,
    generator: Arc<dyn TextGenerator>,
    payments: Arc<dyn PaymentGateway>,
}

impl AssessmentIntake {
    pub fn new(
        services: Arc<dyn TenantStore<ServiceId, Service>>,
        assessments: Arc<dyn TenantStore<AssessmentId, Assessment>>,
        generator: Arc<dyn TextGenerator>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            services,
            assessments,
            generator,
            payments,
        }
    }

    /// Price the submission against the tenant catalog and persist it as a
    /// pending assessment.
    pub fn submit(
        &self,
        tenant_id: TenantId,
        submission: IntakeSubmission,
        now: DateTime<Utc>,
    ) -> DomainResult<Assessment> {
        let catalog = self.services.list(tenant_id);
        let estimated_price =
            detailops_services::estimate_total(tenant_id, &catalog, &submission.selections)?;

        let assessment = Assessment::submit(
            AssessmentId::new(EntityId::new()),
            tenant_id,
            submission.client_name,
            submission.client_email,
            submission.vehicle,
            submission.hotspots,
            submission.selections,
            submission.media,
            estimated_price,
            now,
        )?;

        self.assessments
            .upsert(tenant_id, assessment.id_typed(), assessment.clone());
        Ok(assessment)
    }

    /// Optional AI step: attach a condition summary to a stored assessment.
    ///
    /// Returns `Ok(None)` when the provider fails or produces nothing — the
    /// assessment stays valid without AI output.
    pub async fn generate_insight(
        &self,
        tenant_id: TenantId,
        assessment_id: AssessmentId,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<String>> {
        let mut assessment = self
            .assessments
            .get(tenant_id, &assessment_id)
            .ok_or(DomainError::NotFound)?;

        let snapshot = snapshot_of(&assessment);
        match self.generator.generate(&summary_prompt(&snapshot)).await {
            Ok(text) if !text.trim().is_empty() => {
                let summary = text.trim().to_string();
                assessment.attach_ai_summary(summary.clone(), now);
                self.assessments
                    .upsert(tenant_id, assessment_id, assessment);
                Ok(Some(summary))
            }
            Ok(_) => {
                tracing::warn!(%assessment_id, "ai summary came back empty");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(%assessment_id, error = %e, "ai summary unavailable");
                Ok(None)
            }
        }
    }

    /// Generate vehicle-specific intake questions (public intake page).
    pub async fn generate_questions(
        &self,
        vehicle: &VehicleDetails,
    ) -> DomainResult<Vec<AssessmentQuestion>> {
        vehicle.validate()?;

        let raw = self
            .generator
            .generate(&questions_prompt(&vehicle.label()))
            .await
            .map_err(|e| DomainError::provider(e.to_string()))?;

        parse_questions(&raw).map_err(|e| DomainError::provider(e.to_string()))
    }

    /// AI cost estimate for a stored assessment (minor currency units).
    pub async fn ai_estimate(
        &self,
        tenant_id: TenantId,
        assessment_id: AssessmentId,
    ) -> DomainResult<u64> {
        let assessment = self
            .assessments
            .get(tenant_id, &assessment_id)
            .ok_or(DomainError::NotFound)?;

        let raw = self
            .generator
            .generate(&estimate_prompt(&snapshot_of(&assessment)))
            .await
            .map_err(|e| DomainError::provider(e.to_string()))?;

        parse_estimate(&raw).map_err(|e| DomainError::provider(e.to_string()))
    }

    /// Deposit-payment path: derive the deposit from the estimate and request
    /// a payment intent; the returned client secret completes payment in the
    /// caller's UI.
    pub async fn request_deposit(
        &self,
        tenant_id: TenantId,
        assessment_id: AssessmentId,
    ) -> DomainResult<DepositIntent> {
        let assessment = self
            .assessments
            .get(tenant_id, &assessment_id)
            .ok_or(DomainError::NotFound)?;

        let amount = assessment.estimated_price() * DEPOSIT_PERCENT / 100;
        if amount == 0 {
            return Err(DomainError::validation(
                "estimate is too small to take a deposit",
            ));
        }

        let metadata = vec![("assessment_id".to_string(), assessment_id.to_string())];
        let intent = self
            .payments
            .create_payment_intent(amount, "usd", &metadata)
            .await
            .map_err(|e| DomainError::provider(e.to_string()))?;

        Ok(DepositIntent {
            amount,
            client_secret: intent.client_secret,
        })
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
    }
}

fn snapshot_of(assessment: &Assessment) -> AssessmentSnapshot {
    AssessmentSnapshot {
        tenant_id: assessment.tenant_id(),
        vehicle: assessment.vehicle().label(),
        hotspots: assessment
            .hotspots()
            .iter()
            .map(|h| HotspotNote {
                part: h.part.clone(),
                issue: h.issue.clone(),
                severity: severity_label(h.severity).to_string(),
            })
            .collect(),
        services: vec![format!("{} selected service(s)", assessment.selections().len())],
        answers: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CannedTextGenerator, FailingTextGenerator, FakePaymentGateway};
    use crate::store::InMemoryTenantStore;
    use detailops_assessments::IntakeDraft;
    use detailops_services::{PriceType, ServiceSelection};

    fn catalog_service(tenant_id: TenantId, base_price: u64) -> Service {
        Service::create(
            ServiceId::new(EntityId::new()),
            tenant_id,
            "Full detail",
            "",
            base_price,
            PriceType::Fixed,
            vec![],
            Utc::now(),
        )
        .unwrap()
    }

    fn vehicle() -> VehicleDetails {
        VehicleDetails {
            make: "Subaru".to_string(),
            model: "Outback".to_string(),
            year: 2020,
            vin: None,
            condition: None,
        }
    }

    fn intake_with(
        generator: Arc<dyn TextGenerator>,
        payments: Arc<dyn PaymentGateway>,
    ) -> (AssessmentIntake, Arc<InMemoryTenantStore<ServiceId, Service>>, TenantId) {
        let services: Arc<InMemoryTenantStore<ServiceId, Service>> =
            Arc::new(InMemoryTenantStore::new());
        let assessments: Arc<InMemoryTenantStore<AssessmentId, Assessment>> =
            Arc::new(InMemoryTenantStore::new());
        let tenant_id = TenantId::new();

        let intake = AssessmentIntake::new(
            services.clone(),
            assessments,
            generator,
            payments,
        );
        (intake, services, tenant_id)
    }

    fn submission(service: &Service) -> IntakeSubmission {
        let mut draft = IntakeDraft::new("Lee Varga", "lee@example.com");
        draft.set_vehicle(vehicle()).unwrap();
        draft.select_service(ServiceSelection {
            service_id: service.id_typed(),
            quantity: 2,
            custom_fields: vec![],
        });
        draft.finish().unwrap()
    }

    #[tokio::test]
    async fn submit_prices_against_the_catalog_and_persists_pending() {
        let (intake, services, tenant_id) = intake_with(
            Arc::new(CannedTextGenerator::new("")),
            Arc::new(FakePaymentGateway::new()),
        );
        let service = catalog_service(tenant_id, 75_00);
        services.upsert(tenant_id, service.id_typed(), service.clone());

        let assessment = intake
            .submit(tenant_id, submission(&service), Utc::now())
            .unwrap();

        assert_eq!(assessment.estimated_price(), 150_00);
        assert_eq!(
            assessment.status(),
            detailops_assessments::AssessmentStatus::Pending
        );
    }

    #[tokio::test]
    async fn insight_failure_degrades_to_none() {
        let (intake, services, tenant_id) = intake_with(
            Arc::new(FailingTextGenerator),
            Arc::new(FakePaymentGateway::new()),
        );
        let service = catalog_service(tenant_id, 75_00);
        services.upsert(tenant_id, service.id_typed(), service.clone());
        let assessment = intake
            .submit(tenant_id, submission(&service), Utc::now())
            .unwrap();

        let summary = intake
            .generate_insight(tenant_id, assessment.id_typed(), Utc::now())
            .await
            .unwrap();
        assert_eq!(summary, None);
    }

    #[tokio::test]
    async fn insight_success_is_persisted_on_the_assessment() {
        let (intake, services, tenant_id) = intake_with(
            Arc::new(CannedTextGenerator::new("Paint is in fair shape.")),
            Arc::new(FakePaymentGateway::new()),
        );
        let service = catalog_service(tenant_id, 75_00);
        services.upsert(tenant_id, service.id_typed(), service.clone());
        let assessment = intake
            .submit(tenant_id, submission(&service), Utc::now())
            .unwrap();

        let summary = intake
            .generate_insight(tenant_id, assessment.id_typed(), Utc::now())
            .await
            .unwrap();
        assert_eq!(summary.as_deref(), Some("Paint is in fair shape."));
    }

    #[tokio::test]
    async fn deposit_is_ten_percent_of_the_estimate() {
        let payments = Arc::new(FakePaymentGateway::new());
        let (intake, services, tenant_id) = intake_with(
            Arc::new(CannedTextGenerator::new("")),
            payments.clone(),
        );
        let service = catalog_service(tenant_id, 100_00);
        services.upsert(tenant_id, service.id_typed(), service.clone());
        let assessment = intake
            .submit(tenant_id, submission(&service), Utc::now())
            .unwrap();

        // 2 × $100 estimate -> $20 deposit.
        let deposit = intake
            .request_deposit(tenant_id, assessment.id_typed())
            .await
            .unwrap();
        assert_eq!(deposit.amount, 20_00);
        assert_eq!(payments.requests(), vec![(20_00, "usd".to_string())]);
    }

    #[tokio::test]
    async fn questions_come_back_typed() {
        let raw = r#"[{"id": "q1", "question": "Garage kept?", "type": "select",
                       "options": ["yes", "no"]}]"#;
        let (intake, _services, _tenant_id) = intake_with(
            Arc::new(CannedTextGenerator::new(raw)),
            Arc::new(FakePaymentGateway::new()),
        );

        let questions = intake.generate_questions(&vehicle()).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Garage kept?");
    }

    #[tokio::test]
    async fn question_provider_failure_is_a_typed_provider_error() {
        let (intake, _services, _tenant_id) = intake_with(
            Arc::new(FailingTextGenerator),
            Arc::new(FakePaymentGateway::new()),
        );

        let err = intake.generate_questions(&vehicle()).await.unwrap_err();
        assert!(matches!(err, DomainError::Provider(_)));
    }
}
