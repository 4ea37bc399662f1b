//! Secret handling utilities.
//!
//! Re-exports secrecy types used for OAuth client secrets and tokens.

pub use secrecy::{ExposeSecret, SecretString};
