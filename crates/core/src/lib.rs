//! Home service core - Shared types library.
//!
//! This crate provides common types used across all home service components:
//! - `app` - Account directory, session, booking ledger and the app state facade
//! - `cli` - Command-line front end for the booking app
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! persistence, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, credentials, IDs, provinces,
//!   booking statuses and the service catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
