//! Talent Hub Core - Shared types library.
//!
//! This crate provides the types shared by the Talent Hub components:
//! - `web` - Server-rendered front-end that proxies the remote API
//! - `integration-tests` - End-to-end tests against a mock remote API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The record
//! types mirror the JSON shapes returned by the remote API, so they are
//! deliberately lenient: optional fields default instead of failing.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, amounts, statuses, and API records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
