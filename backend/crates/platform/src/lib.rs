//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Password hashing (Argon2id) with zeroized clear text
//! - `Authorization: Bearer` header parsing

pub mod bearer;
pub mod password;
