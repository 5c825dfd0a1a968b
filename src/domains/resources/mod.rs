//! Resources domain module.
//!
//! Resources are the markdown documents found under the content root. Each
//! category subdirectory contributes its `*.md` files, addressed by URI.
//!
//! ## Architecture
//!
//! - `index.rs` - Startup scan building the immutable URI index
//! - `service.rs` - Listing and reading against the index
//! - `error.rs` - Resource-specific error types

mod error;
mod index;
mod service;

pub use error::ResourceError;
pub use index::{MARKDOWN_MIME_TYPE, ResourceEntry, ResourceIndex};
pub use service::{ListResourcesResult, ReadResourceResult, ResourceContents, ResourceService};
