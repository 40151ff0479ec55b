//! MongoDB Atlas Admin API integration
//!
//! - [`api`] - The [`AtlasApi`] trait resources depend on
//! - [`client`] - [`AtlasClient`], the reqwest implementation
//! - [`models`] - Wire models

pub mod api;
pub mod client;
pub mod models;

pub use api::AtlasApi;
pub use client::AtlasClient;
