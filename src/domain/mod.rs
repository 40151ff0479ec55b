//! Domain types for the provider.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Composite state IDs** ([`StateId`]) packing several natural keys into
//!   the single string ID a resource has
//! - **Import ID parsing** ([`import_id`]) for the human formats accepted by
//!   `terraform import`
//! - **Error types** ([`ProviderError`], [`AtlasApiError`], [`PollError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ProviderError>`]:
//!
//! ```rust
//! use mongodbatlas::domain::{Result, StateId};
//!
//! fn cluster_name(id: &str) -> Result<String> {
//!     let ids = StateId::decode(id);
//!     Ok(ids.require("cluster_name")?.to_string())
//! }
//! ```

pub mod errors;
pub mod import_id;
pub mod result;
pub mod state_id;

// Re-export commonly used types for convenience
pub use errors::{AtlasApiError, Diagnostic, PollError, ProviderError};
pub use result::Result;
pub use state_id::{decode_state_id, encode_state_id, StateId};
