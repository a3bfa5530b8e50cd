use std::collections::HashSet;

use thiserror::Error;

use detailops_core::TenantId;

use crate::{Capability, PrincipalId, Role, TenantMembership};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API layer derives memberships from verified claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_tenant_id: TenantId,
    pub membership: TenantMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing capability '{0}'")]
    Forbidden(String),
}

/// Authorize a principal within its active tenant context.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// This is the single enforcement point for capability checks; mutations must
/// not re-implement role comparisons on their own.
pub fn authorize(principal: &Principal, required: &Capability) -> Result<(), AuthzError> {
    if principal.active_tenant_id != principal.membership.tenant_id {
        return Err(AuthzError::TenantMismatch);
    }

    let caps: HashSet<&str> = principal
        .membership
        .capabilities
        .iter()
        .map(|c| c.as_str())
        .collect();

    if caps.contains("*") || caps.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Role → capability policy for the built-in roles.
///
/// The role ladder mirrors the product's tiers: `customer` can book and
/// submit intake assessments, `staff` additionally operates the business
/// (clients, catalog, scheduling, invoicing, analytics), `admin` gets the
/// wildcard. Unknown roles grant nothing.
pub fn capabilities_for_roles(roles: &[Role]) -> Vec<Capability> {
    if roles.iter().any(|r| r.as_str() == Role::ADMIN) {
        return vec![Capability::new("*")];
    }

    let mut caps: Vec<Capability> = Vec::new();

    if roles.iter().any(|r| r.as_str() == Role::STAFF) {
        for name in [
            "clients.read",
            "clients.manage",
            "services.read",
            "services.manage",
            "appointments.read",
            "appointments.manage",
            "slots.manage",
            "bookings.manage",
            "invoices.read",
            "invoices.manage",
            "assessments.review",
            "jobs.manage",
            "analytics.read",
            "tenants.manage",
        ] {
            caps.push(Capability::new(name));
        }
    }

    // Staff inherit everything a customer can do.
    if roles
        .iter()
        .any(|r| r.as_str() == Role::STAFF || r.as_str() == Role::CUSTOMER)
    {
        for name in [
            "slots.read",
            "bookings.create",
            "bookings.cancel",
            "assessments.submit",
            "feedback.submit",
        ] {
            caps.push(Capability::new(name));
        }
    }

    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_with_roles(roles: Vec<Role>) -> Principal {
        let tenant_id = TenantId::new();
        let capabilities = capabilities_for_roles(&roles);
        Principal {
            principal_id: PrincipalId::new(),
            active_tenant_id: tenant_id,
            membership: TenantMembership {
                tenant_id,
                roles,
                capabilities,
            },
        }
    }

    #[test]
    fn admin_wildcard_grants_everything() {
        let principal = principal_with_roles(vec![Role::admin()]);
        assert!(authorize(&principal, &Capability::new("appointments.manage")).is_ok());
        assert!(authorize(&principal, &Capability::new("anything.at.all")).is_ok());
    }

    #[test]
    fn staff_can_manage_appointments_but_customer_cannot() {
        let staff = principal_with_roles(vec![Role::staff()]);
        assert!(authorize(&staff, &Capability::new("appointments.manage")).is_ok());

        let customer = principal_with_roles(vec![Role::customer()]);
        let err = authorize(&customer, &Capability::new("appointments.manage")).unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(_)));
    }

    #[test]
    fn customer_can_book_and_cancel() {
        let customer = principal_with_roles(vec![Role::customer()]);
        assert!(authorize(&customer, &Capability::new("bookings.create")).is_ok());
        assert!(authorize(&customer, &Capability::new("bookings.cancel")).is_ok());
    }

    #[test]
    fn tenant_mismatch_fails_closed() {
        let mut principal = principal_with_roles(vec![Role::admin()]);
        principal.active_tenant_id = TenantId::new();
        let err = authorize(&principal, &Capability::new("clients.read")).unwrap_err();
        assert_eq!(err, AuthzError::TenantMismatch);
    }

    #[test]
    fn unknown_role_grants_nothing() {
        let principal = principal_with_roles(vec![Role::new("janitor")]);
        assert!(authorize(&principal, &Capability::new("clients.read")).is_err());
    }
}
