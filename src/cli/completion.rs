//! Shell completion for tabgen itself
//!
//! The tool's own command line is introspected through clap, then pushed
//! through the same index builder and renderers as any user specification.

use clap::CommandFactory;
use tracing::debug;

use crate::cli::CliArgs;
use crate::completion::EngineDescription;
use crate::config::Config;
use crate::error::Result;
use crate::index::{self, CompletionIndex};
use crate::render::{self, RenderOptions, Shell};
use crate::spec;

/// Completion index of the `tabgen` command line
pub fn self_index() -> Result<CompletionIndex> {
    let spec = spec::from_clap(&CliArgs::command());
    let index = index::build(&spec)?;
    debug!(prefixes = index.prefixes().count(), "built self-completion index");
    Ok(index)
}

/// Generate the completion script for `tabgen` in `shell`
///
/// # Arguments
/// * `shell` - Target shell
/// * `config` - Supplies the case policy and extra provider bindings
///
/// # Returns
/// * `Result<String>` - The rendered script
pub fn generate_completion(shell: Shell, config: &Config) -> Result<String> {
    let index = self_index()?;
    let description = EngineDescription::standard().with_match_case(config.match_case());
    let options = RenderOptions {
        prog: None,
        preamble: None,
        providers: config.provider_table(),
    };
    Ok(render::render(&index, &description, shell, &options))
}
