//! Core types for the home service app.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod credential;
pub mod email;
pub mod id;
pub mod province;
pub mod status;

pub use catalog::{Catalog, CatalogError, Category, ServiceMatch, Subcategory};
pub use credential::{Credential, hash_password, verify_password};
pub use email::{EmailError, NormalizedEmail};
pub use id::*;
pub use province::{Province, ProvinceError};
pub use status::BookingStatus;
