//! tabgen library
//!
//! Compiles a hierarchical command specification into static, offline shell
//! completion scripts. The pipeline is:
//!
//! 1. [`spec`]: the command tree, built in code, loaded from a TOML/JSON
//!    document, or introspected from a clap command
//! 2. [`index`]: flattened, prefix-keyed lookup tables
//! 3. [`completion`]: the completion algorithm, as a shared description and
//!    an in-process reference engine
//! 4. [`render`]: bash, zsh and fish emitters driven by the same description
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: Completion engine and candidate providers
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `index`: Completion index and its builder
//! - `render`: Shell script renderers
//! - `spec`: Specification model and loaders
//!
//! # Example
//!
//! ```
//! use tabgen::completion::EngineDescription;
//! use tabgen::render::{RenderOptions, Shell, render};
//! use tabgen::spec::{OptionDecl, Spec};
//!
//! let mut spec = Spec::new("prog");
//! let root = spec.root();
//! spec.add_option(root, OptionDecl::flag(["-v", "--verbose"]));
//! spec.add_subcommand(root, "build");
//!
//! let index = tabgen::index::build(&spec)?;
//! let script = render(
//!     &index,
//!     &EngineDescription::standard(),
//!     Shell::Bash,
//!     &RenderOptions::default(),
//! );
//! assert!(script.ends_with("complete -F _tabgen_prog 'prog'\n"));
//! # Ok::<(), tabgen::TabgenError>(())
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod index;
pub mod render;
pub mod spec;

// Re-export commonly used types
pub use completion::{CompletionEngine, EngineDescription};
pub use config::Config;
pub use error::{Result, TabgenError};
pub use index::CompletionIndex;
pub use render::{RenderOptions, Shell};
pub use spec::Spec;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
