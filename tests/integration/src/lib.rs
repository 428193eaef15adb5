//! Integration test crate for the SAML service provider workspace.
//!
//! All scenarios live under `tests/`.
