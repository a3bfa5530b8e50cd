//! API-side authorization guard.
//!
//! This enforces capability checks at the request boundary, keeping domain
//! entities and infra auth-agnostic. Every mutation goes through
//! [`require`]; there are no ad-hoc role comparisons in handlers.

use detailops_auth::{
    AuthzError, Capability, Principal, TenantMembership, authorize, capabilities_for_roles,
};
use detailops_core::UserId;
use detailops_scheduling::Appointment;

use crate::context::{PrincipalContext, TenantContext};

/// Check a capability in the current request context.
pub fn require(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    capability: &str,
) -> Result<(), AuthzError> {
    let roles = principal.roles().to_vec();
    let membership = TenantMembership {
        tenant_id: tenant.tenant_id(),
        capabilities: capabilities_for_roles(&roles),
        roles,
    };

    let principal = Principal {
        principal_id: principal.principal_id(),
        active_tenant_id: tenant.tenant_id(),
        membership,
    };

    authorize(&principal, &Capability::new(capability.to_string()))
}

/// Appointment update/cancel gate: the manage capability, or being the
/// assigned technician.
pub fn can_manage_appointment(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    appointment: &Appointment,
) -> Result<(), AuthzError> {
    if require(tenant, principal, "appointments.manage").is_ok() {
        return Ok(());
    }

    let as_user = UserId::from_uuid(*principal.principal_id().as_uuid());
    if appointment.technician() == Some(as_user) {
        return Ok(());
    }

    Err(AuthzError::Forbidden("appointments.manage".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use detailops_auth::{PrincipalId, Role};
    use detailops_core::{EntityId, TenantId};
    use detailops_scheduling::{AppointmentId, SlotWindow};

    fn appointment(tenant_id: TenantId, technician: Option<UserId>) -> Appointment {
        let start = Utc::now() + Duration::days(1);
        Appointment::schedule(
            AppointmentId::new(EntityId::new()),
            tenant_id,
            "Interior detail",
            None,
            technician,
            SlotWindow::new(start, start + Duration::hours(2)).unwrap(),
            None,
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn customers_cannot_manage_foreign_appointments() {
        let tenant = TenantContext::new(TenantId::new());
        let principal = PrincipalContext::new(PrincipalId::new(), vec![Role::customer()]);
        let appt = appointment(tenant.tenant_id(), None);

        assert!(can_manage_appointment(&tenant, &principal, &appt).is_err());
    }

    #[test]
    fn the_assigned_technician_may_manage_their_appointment() {
        let tenant = TenantContext::new(TenantId::new());
        let principal_id = PrincipalId::new();
        let principal = PrincipalContext::new(principal_id, vec![Role::customer()]);
        let technician = UserId::from_uuid(*principal_id.as_uuid());
        let appt = appointment(tenant.tenant_id(), Some(technician));

        assert!(can_manage_appointment(&tenant, &principal, &appt).is_ok());
    }

    #[test]
    fn staff_manage_any_appointment() {
        let tenant = TenantContext::new(TenantId::new());
        let principal = PrincipalContext::new(PrincipalId::new(), vec![Role::staff()]);
        let appt = appointment(tenant.tenant_id(), None);

        assert!(can_manage_appointment(&tenant, &principal, &appt).is_ok());
    }
}
