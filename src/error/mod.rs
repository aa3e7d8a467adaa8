//! Error handling module for tabgen.
//!
//! Generation-time failures are fatal and surface here; completion-time
//! anomalies never do (they degrade to empty candidate sets instead).
//!
//! # Example
//!
//! ```rust
//! use tabgen::error::{Result, SpecificationError, TabgenError};
//!
//! fn reject() -> Result<()> {
//!     Err(SpecificationError::DuplicatePrefix {
//!         prefix: "prog_a_b".to_string(),
//!     }
//!     .into())
//! }
//!
//! assert!(matches!(reject(), Err(TabgenError::Specification(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, DocumentError, Result, SpecificationError, TabgenError};
