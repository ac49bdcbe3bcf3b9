//! # Custode (Credential, Token & Privilege Core)
//!
//! `custode` is a small identity service. It owns the user credential records,
//! hashes and verifies passwords, issues and validates signed bearer tokens,
//! and gates operations on activity/privilege predicates.
//!
//! ## Credentials
//!
//! Passwords are hashed with Argon2id using a fresh random salt per hash; the
//! database only ever stores the PHC-encoded hash. Emails are normalized to
//! trimmed lowercase before lookup or storage, and the store enforces
//! uniqueness on the normalized form.
//!
//! ## Tokens
//!
//! Login issues an HS256-signed bearer token carrying the user id as `sub` and
//! an absolute expiry. Tokens are never persisted; expiry is purely time-based
//! and the signing secret is process-wide configuration loaded at startup.
//!
//! ## Authorization
//!
//! Handlers resolve the bearer token to a user record and then compose the
//! predicate gates explicitly: `require_active` first, then `require_superuser`
//! where the operation demands it. Login and token failures are deliberately
//! low-information to prevent account enumeration.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
