//! `detailops-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod capabilities;
pub mod claims;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, Principal, authorize, capabilities_for_roles};
pub use capabilities::Capability;
pub use claims::{
    Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims,
};
pub use principal::{PrincipalId, TenantMembership};
pub use roles::Role;
