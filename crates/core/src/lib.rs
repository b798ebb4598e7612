//! Libris Core - Shared types library.
//!
//! This crate provides common types used across all Libris components:
//! - `client` - Session store, route guards, API gateway and view controllers
//! - `web` - Server-rendered browser frontend
//! - `cli` - Command-line client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Credential decoding lives here because it is purely
//! local: an [`Identity`] is derived from a [`Credential`] without asking the
//! backend anything.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, credentials, catalog and review models
//! - [`validation`] - Required-field checks shared by every submission form

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::ValidationError;
