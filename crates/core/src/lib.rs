//! KebunCuan Core - Shared types library.
//!
//! This crate provides common types used across all KebunCuan components:
//! - `server` - Cart, checkout, and shipment orchestration API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, slugs, and emails,
//!   plus the status state machines for orders, payments, and shipments

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
