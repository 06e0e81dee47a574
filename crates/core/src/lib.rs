//! Atelier Core - Shared domain types.
//!
//! This crate provides the types used across all Atelier components:
//! - `store` - Document store backends and the identity provider
//! - `storefront` - Public-facing catalog, cart, checkout and suggestions API
//! - `admin` - Role-gated administration API
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Every persistent entity here is serialized as a JSON
//! document owned by the document store.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, money, catalog, cart, orders, settings and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
