//! Woolly Core - Shared types library.
//!
//! This crate provides common types used across the Woolly storefront
//! components:
//! - `storefront` - cart, checkout, and gateway client library
//! - `integration-tests` - cross-module scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, phone
//!   numbers, PIN codes, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
