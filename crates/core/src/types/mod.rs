//! Core types for Atelier.
//!
//! This module provides type-safe wrappers and document shapes for the
//! storefront domain.

pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod identity;
pub mod order;
pub mod price;
pub mod role;
pub mod settings;
pub mod validation;

pub use cart::{CartItem, CartKey, CartSnapshot, PLACEHOLDER_IMAGE};
pub use catalog::{Category, Product, ProductVariant};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::Identity;
pub use order::{Order, OrderLine, OrderStatus, ShippingDetails};
pub use price::{format_money, line_total};
pub use role::AdminRole;
pub use settings::{FooterSettings, HeroSection, SocialLink};
pub use validation::FieldErrors;
