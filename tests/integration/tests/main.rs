//! End-to-end integration tests.
//!
//! These tests drive the SAML service provider through full Response
//! validation with in-process fakes for the trust engine, decrypter and
//! XML codec.

mod client_flow;
mod common;
mod config;
mod replay;
mod signature_policy;
