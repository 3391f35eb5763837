//! Entity Module

pub mod account;
pub mod session_token;
