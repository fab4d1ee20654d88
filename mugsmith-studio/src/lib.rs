//! # Mugsmith Studio
//!
//! Storefront plumbing around the editor: an HTTP client for image
//! generation uploads, the catalog, the cart and orders, plus environment
//! configuration and a tracing setup helper for host applications.
//!
//! ```text
//! Editor ──export──▶ artifact
//!   ▲                   │
//!   │ fetch_image       │ add_cart_item / create_order
//!   │                   ▼
//! StoreClient ◀──────▶ /api/*
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;

pub use client::{mime_for_file_name, StoreClient};
pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use models::{
    Cart, CartItem, CartItemUpdate, GeneratedImages, GenerationRequest, Mug, NewCartItem,
    OrderConfirmation, OrderRequest, Prompt, ShippingAddress,
};
pub use telemetry::init_tracing;
