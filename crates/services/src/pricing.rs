//! Price estimation over a tenant's catalog.
//!
//! Selections reference catalog services by id; each service contributes
//! `base_price * quantity` plus the modifiers of its price-affecting custom
//! fields. Everything is integer minor-currency units; intermediate math is
//! signed so discounts can't underflow.

use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult, TenantId};

use crate::service::{Service, ServiceId};

/// Value answered for a custom field: either numeric or a chosen option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// One answered custom field on a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedField {
    pub name: String,
    pub value: FieldValue,
}

/// One selected service with quantity and custom-field answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub service_id: ServiceId,
    pub quantity: u32,
    pub custom_fields: Vec<SelectedField>,
}

/// Estimate the total price for a set of selections against a catalog.
///
/// Fails with `NotFound` when a selection references a service that does not
/// exist or belongs to a different tenant. A selected option that is not
/// among a field's `options` contributes 0 (documented edge case, not an
/// error). The final total is clamped at zero.
pub fn estimate_total(
    tenant_id: TenantId,
    catalog: &[Service],
    selections: &[ServiceSelection],
) -> DomainResult<u64> {
    let mut total: i128 = 0;

    for selection in selections {
        let service = catalog
            .iter()
            .find(|s| s.id_typed() == selection.service_id && s.tenant_id() == tenant_id)
            .ok_or(DomainError::NotFound)?;

        if selection.quantity == 0 {
            return Err(DomainError::validation(format!(
                "quantity for service '{}' must be at least 1",
                service.name()
            )));
        }

        total += service.base_price() as i128 * selection.quantity as i128;

        for field in service.custom_fields() {
            if !field.affects_price {
                continue;
            }

            let Some(answer) = selection.custom_fields.iter().find(|f| f.name == field.name)
            else {
                continue;
            };

            let modifier = field.price_modifier.unwrap_or(0);
            total += field_contribution(&answer.value, field.options.as_deref(), modifier);
        }
    }

    Ok(total.max(0).min(u64::MAX as i128) as u64)
}

fn field_contribution(value: &FieldValue, options: Option<&[String]>, modifier: i64) -> i128 {
    match value {
        FieldValue::Number(v) => (v * modifier as f64).round() as i128,
        FieldValue::Text(chosen) => match options {
            Some(options) => options
                .iter()
                .position(|o| o == chosen)
                .map(|idx| idx as i128 * modifier as i128)
                .unwrap_or(0),
            // A free-text answer on a price-affecting field has no scalar.
            None => 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{CustomField, FieldType, PriceType};
    use chrono::Utc;
    use detailops_core::EntityId;
    use proptest::prelude::*;

    fn service(
        tenant_id: TenantId,
        base_price: u64,
        custom_fields: Vec<CustomField>,
    ) -> Service {
        Service::create(
            ServiceId::new(EntityId::new()),
            tenant_id,
            "Detail package",
            "",
            base_price,
            PriceType::Fixed,
            custom_fields,
            Utc::now(),
        )
        .unwrap()
    }

    fn select(service: &Service, quantity: u32, fields: Vec<SelectedField>) -> ServiceSelection {
        ServiceSelection {
            service_id: service.id_typed(),
            quantity,
            custom_fields: fields,
        }
    }

    #[test]
    fn numeric_field_contributes_value_times_modifier() {
        let tenant_id = TenantId::new();
        let svc = service(
            tenant_id,
            100_00,
            vec![CustomField {
                name: "panels".to_string(),
                field_type: FieldType::Number,
                options: None,
                affects_price: true,
                price_modifier: Some(5_00),
            }],
        );

        let total = estimate_total(
            tenant_id,
            &[svc.clone()],
            &[select(
                &svc,
                1,
                vec![SelectedField {
                    name: "panels".to_string(),
                    value: FieldValue::Number(3.0),
                }],
            )],
        )
        .unwrap();

        assert_eq!(total, 100_00 + 3 * 5_00);
    }

    #[test]
    fn option_field_contributes_index_times_modifier() {
        let tenant_id = TenantId::new();
        let svc = service(
            tenant_id,
            50_00,
            vec![CustomField {
                name: "vehicle size".to_string(),
                field_type: FieldType::Select,
                options: Some(vec![
                    "compact".to_string(),
                    "sedan".to_string(),
                    "suv".to_string(),
                ]),
                affects_price: true,
                price_modifier: Some(10_00),
            }],
        );

        let total = estimate_total(
            tenant_id,
            &[svc.clone()],
            &[select(
                &svc,
                1,
                vec![SelectedField {
                    name: "vehicle size".to_string(),
                    value: FieldValue::Text("suv".to_string()),
                }],
            )],
        )
        .unwrap();

        assert_eq!(total, 50_00 + 2 * 10_00);
    }

    #[test]
    fn unknown_option_contributes_zero() {
        let tenant_id = TenantId::new();
        let svc = service(
            tenant_id,
            50_00,
            vec![CustomField {
                name: "vehicle size".to_string(),
                field_type: FieldType::Select,
                options: Some(vec!["compact".to_string(), "sedan".to_string()]),
                affects_price: true,
                price_modifier: Some(10_00),
            }],
        );

        let total = estimate_total(
            tenant_id,
            &[svc.clone()],
            &[select(
                &svc,
                1,
                vec![SelectedField {
                    name: "vehicle size".to_string(),
                    value: FieldValue::Text("monster truck".to_string()),
                }],
            )],
        )
        .unwrap();

        assert_eq!(total, 50_00);
    }

    #[test]
    fn missing_service_fails_with_not_found() {
        let tenant_id = TenantId::new();
        let svc = service(tenant_id, 50_00, vec![]);
        let mut selection = select(&svc, 1, vec![]);
        selection.service_id = ServiceId::new(EntityId::new());

        let err = estimate_total(tenant_id, &[svc], &[selection]).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn foreign_tenant_service_fails_with_not_found() {
        let tenant_id = TenantId::new();
        let other_tenant = TenantId::new();
        let svc = service(other_tenant, 50_00, vec![]);
        let selection = select(&svc, 1, vec![]);

        let err = estimate_total(tenant_id, &[svc], &[selection]).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn zero_quantity_is_a_validation_error() {
        let tenant_id = TenantId::new();
        let svc = service(tenant_id, 50_00, vec![]);
        let selection = select(&svc, 0, vec![]);

        let err = estimate_total(tenant_id, &[svc], &[selection]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_modifiers_clamp_at_zero() {
        let tenant_id = TenantId::new();
        let svc = service(
            tenant_id,
            10_00,
            vec![CustomField {
                name: "loyalty discount".to_string(),
                field_type: FieldType::Number,
                options: None,
                affects_price: true,
                price_modifier: Some(-20_00),
            }],
        );

        let total = estimate_total(
            tenant_id,
            &[svc.clone()],
            &[select(
                &svc,
                1,
                vec![SelectedField {
                    name: "loyalty discount".to_string(),
                    value: FieldValue::Number(1.0),
                }],
            )],
        )
        .unwrap();

        assert_eq!(total, 0);
    }

    proptest! {
        /// With no price-affecting fields the total is exactly Σ(base * qty).
        #[test]
        fn base_only_total_is_sum_of_base_times_quantity(
            items in proptest::collection::vec((0u64..1_000_00, 1u32..6), 0..8)
        ) {
            let tenant_id = TenantId::new();
            let services: Vec<Service> = items
                .iter()
                .map(|(base, _)| service(tenant_id, *base, vec![]))
                .collect();
            let selections: Vec<ServiceSelection> = services
                .iter()
                .zip(items.iter())
                .map(|(svc, (_, qty))| select(svc, *qty, vec![]))
                .collect();

            let expected: u64 = items.iter().map(|(base, qty)| base * *qty as u64).sum();
            prop_assert_eq!(estimate_total(tenant_id, &services, &selections).unwrap(), expected);
        }
    }
}
