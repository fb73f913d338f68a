//! Firebase Authentication over plain HTTPS.

mod accounts;
mod verifier;

pub use accounts::FirebaseAccounts;
pub use verifier::FirebaseVerifier;
