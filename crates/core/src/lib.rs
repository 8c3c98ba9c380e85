//! Luxe Core - Shared types and storefront rules.
//!
//! This crate provides the pieces shared by every Luxe component:
//! - `luxe-client` - REST backend client
//! - `storefront` - Public-facing shop
//! - `admin` - Back-office for products, collections, users and comments
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no network I/O,
//! no HTTP framework. Persistence goes through the [`store::KeyValueStorage`]
//! trait so the cart store can run against a session, a file, or memory.
//!
//! # Modules
//!
//! - [`types`] - Domain types (ids, prices, phones, products, users, comments)
//! - [`store`] - Cart/session store persisted into key/value storage
//! - [`catalog`] - Filtering and sorting of fetched product lists
//! - [`validation`] - Form validation and sanitization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod store;
pub mod types;
pub mod validation;

pub use types::*;
