//! Router Module Index
//!
//! Splits the routing table by access level. Access control is applied to whole
//! modules through Axum layers, so a new admin route cannot be exposed by accident.

/// Routes accessible to anyone: reading articles and the login/logout flow.
pub mod public;

/// Routes restricted to an authenticated admin session.
pub mod admin;
