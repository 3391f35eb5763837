//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    account::{Account, AccountChanges, AccountProfile, AccountView, NewAccount},
    session_token::{NewSessionToken, SessionToken, SessionTokenChanges},
};
pub use repository::{
    AccountMaintenance, AccountRepository, MailSender, SessionMaintenance, SessionTokenRepository,
};
pub use value_object::{
    account_id::AccountId, account_role::AccountRole, email::Email, one_shot_token::OneShotToken,
    session_token_id::SessionTokenId,
};
