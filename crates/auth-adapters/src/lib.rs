//! # auth-adapters
//!
//! Implementations of `CredentialVerifier` and `IdentityProvider`.
//!
//! - `firebase` (feature `auth-jwt`): verifies Firebase ID tokens against Google's
//!   published keys and provisions accounts through Identity Toolkit.
//! - `dev_bypass` (feature `dev-bypass`): trusts the raw bearer token as the subject
//!   id. Refuses to compile in release builds.

#[cfg(feature = "auth-jwt")]
pub mod firebase;

#[cfg(feature = "dev-bypass")]
pub mod dev_bypass;

#[cfg(feature = "auth-jwt")]
pub use firebase::{FirebaseAccounts, FirebaseVerifier};

#[cfg(feature = "dev-bypass")]
pub use dev_bypass::{LocalAccounts, TrustingVerifier};
