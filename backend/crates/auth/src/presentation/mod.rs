//! Presentation Layer
//!
//! HTTP middleware guarding protected routes.

pub mod middleware;

pub use middleware::{
    AllowedRoles, AuthGateState, AuthenticatedAccount, require_auth, require_roles,
};
