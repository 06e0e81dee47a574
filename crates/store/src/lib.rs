//! Atelier document store.
//!
//! A small document database abstraction: JSON documents addressed by
//! slash-separated paths, whole-collection live subscriptions and an atomic
//! increment. Two backends are provided, [`MemoryStore`] and
//! [`PgDocumentStore`]. The identity provider and admin roles are built on top.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod backend;
pub mod document;
pub mod error;
pub mod memory;
pub mod path;
pub mod postgres;
pub mod roles;

pub use auth::{AuthError, IdentityProvider, UserAccount};
pub use backend::{Backend, Connected, connect};
pub use document::{CollectionWatch, Document, DocumentStore, Fields, Store, decode_all, to_fields};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use path::{CollectionPath, DocumentPath, SiteSetting, paths};
pub use postgres::{PgDocumentStore, create_pool, migrate};
pub use roles::{RoleAssignment, get_role, grant_role, revoke_role};
