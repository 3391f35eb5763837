//! Value Object Module

pub mod account_id;
pub mod account_role;
pub mod email;
pub mod one_shot_token;
pub mod session_token_id;
