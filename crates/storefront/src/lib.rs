//! Woolly storefront library.
//!
//! The storefront core behind the shop UI: catalog access through a
//! WooCommerce-style REST gateway, a durable cart with per-size stock
//! clamping and free-shipping computation, a checkout state machine that
//! places a pending order and reconciles the hosted-payment result onto
//! it, and a persisted account session with a freshness window.
//!
//! Everything here is UI-agnostic; the embedding layer renders state and
//! bridges the hosted payment widget through [`razorpay::PaymentCollector`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod razorpay;
pub mod session;
pub mod state;
pub mod storage;
pub mod woo;
