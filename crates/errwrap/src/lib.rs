//! # errwrap
//!
//! Enriched errors: wrap any error with a classification code, localized
//! user-facing messages and a trail of call sites.
//!
//! ## Usage
//!
//! ```rust
//! use errwrap::{EnrichedError, ErrorConfig, Lang, ResultExt, wrap};
//!
//! fn find_user() -> Result<(), errwrap::BoxError> {
//!     let config = ErrorConfig::new()
//!         .with_code(404)
//!         .with_message(Lang::En, "User not found")
//!         .with_capture_stack(true);
//!     Err(EnrichedError::new(std::io::Error::other("no rows"), config).into())
//! }
//!
//! fn handler() -> Result<(), errwrap::BoxError> {
//!     find_user().enrich()
//! }
//!
//! let err = handler().unwrap_err();
//! let enriched = errwrap::find_enriched(&*err).unwrap();
//! assert_eq!(enriched.code(), 404);
//! assert_eq!(enriched.en_message(), "User not found");
//! assert_eq!(enriched.to_string(), "no rows");
//! assert_eq!(enriched.stack_frames().len(), 2);
//! ```
//!
//! ## Principles
//!
//! - An error is enriched once; wrapping it again only records another frame
//! - `Display` is always the cause's message, user-facing text lives in the
//!   localized messages
//! - Enrichment never fails

mod chain;
mod config;
mod error;
mod ext;
pub mod frame;
mod lang;

pub use chain::{chain, find, find_enriched};
pub use config::{ConfigError, ErrorConfig};
pub use error::{EnrichedError, ErrorReport, wrap, wrap_at};
pub use ext::ResultExt;
pub use frame::Frame;
pub use lang::{Lang, Messages, default_messages};

/// Type-erased error accepted and returned by the wrap functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
