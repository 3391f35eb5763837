//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod mailer;
pub mod memory;
pub mod postgres;

pub use mailer::LogMailer;
pub use memory::InMemoryAuthStore;
pub use postgres::PgAuthRepository;
