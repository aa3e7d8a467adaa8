//! Shell script renderers
//!
//! Compiles a [`CompletionIndex`] plus the shared [`EngineDescription`] into a
//! self-contained completion script for one shell. Every backend emits the
//! same pieces in the same order:
//!
//! 1. header
//! 2. builtin provider functions
//! 3. lookup tables
//! 4. helper functions
//! 5. the completion function: one walk block per [`WalkRule`] and one
//!    candidate block per [`CandidateSource`], both in description order
//! 6. the caller's preamble, verbatim
//! 7. registration with the shell
//!
//! Output depends only on the inputs: tables are emitted in sorted prefix
//! order, and nothing time- or environment-dependent is written.
//!
//! [`WalkRule`]: crate::completion::WalkRule
//! [`CandidateSource`]: crate::completion::CandidateSource

mod bash;
mod fish;
mod zsh;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::{
    CandidateSource, DIRECTORY_COMPLETER, EngineDescription, FILE_COMPLETER, WalkRule,
};
use crate::error::TabgenError;
use crate::index::CompletionIndex;

/// Supported target shells
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

    pub fn name(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shell {
    type Err = TabgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(TabgenError::Generic(format!(
                "Unsupported shell: {}. Supported shells: bash, zsh, fish",
                s
            ))),
        }
    }
}

/// Provider id → shell → native function name.
///
/// Resolved once per render. Ids without a binding for the target shell are
/// left unbound in the script, so their slots only offer static candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderTable {
    bindings: BTreeMap<String, BTreeMap<Shell, String>>,
}

impl ProviderTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The file and directory providers every script ships with
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for shell in Shell::ALL {
            let (files, dirs) = match shell {
                Shell::Bash => (bash::FILES_FN, bash::DIRS_FN),
                Shell::Zsh => (zsh::FILES_FN, zsh::DIRS_FN),
                Shell::Fish => (fish::FILES_FN, fish::DIRS_FN),
            };
            table.bind(FILE_COMPLETER, shell, files);
            table.bind(DIRECTORY_COMPLETER, shell, dirs);
        }
        table
    }

    pub fn bind(
        &mut self,
        id: impl Into<String>,
        shell: Shell,
        native: impl Into<String>,
    ) -> &mut Self {
        self.bindings
            .entry(id.into())
            .or_default()
            .insert(shell, native.into());
        self
    }

    pub fn resolve(&self, id: &str, shell: Shell) -> Option<&str> {
        self.bindings
            .get(id)
            .and_then(|shells| shells.get(&shell))
            .map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

/// Render settings beyond the index itself
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Command name to register completion for (defaults to the index root)
    pub prog: Option<String>,
    /// Shell code inserted verbatim right before registration
    pub preamble: Option<String>,
    pub providers: ProviderTable,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            prog: None,
            preamble: None,
            providers: ProviderTable::builtin(),
        }
    }
}

/// Render a completion script for `shell`.
pub fn render(
    index: &CompletionIndex,
    description: &EngineDescription,
    shell: Shell,
    options: &RenderOptions,
) -> String {
    let emitter: &dyn Emitter = match shell {
        Shell::Bash => &bash::Bash,
        Shell::Zsh => &zsh::Zsh,
        Shell::Fish => &fish::Fish,
    };
    let plan = Plan::new(index, description, shell, options);

    let root = emitter.quote(index.root());
    let prog = emitter.quote(plan.prog);
    let separator = emitter.quote(&description.separator);
    let marker = emitter.quote(&description.option_marker);
    let vars = [
        ("FN", plan.function.as_str()),
        ("ROOT", root.as_str()),
        ("PROG", prog.as_str()),
        ("SEP", separator.as_str()),
        ("MARK", marker.as_str()),
    ];

    let walk: String = description
        .walk
        .iter()
        .map(|rule| fill(emitter.walk_rule(*rule), &vars))
        .collect();
    let sources: String = description
        .sources
        .iter()
        .map(|source| fill(emitter.source(*source), &vars))
        .collect();

    let mut script = String::new();
    script.push_str(&emitter.header(&plan));
    script.push('\n');
    script.push_str(emitter.builtin_providers());
    script.push('\n');
    script.push_str(&emitter.tables(&plan));
    script.push('\n');
    script.push_str(&fill(&emitter.helpers(&plan), &vars));
    script.push('\n');
    let mut main_vars = vars.to_vec();
    main_vars.push(("WALK", walk.as_str()));
    main_vars.push(("SOURCES", sources.as_str()));
    script.push_str(&fill(emitter.main_function(), &main_vars));
    script.push('\n');
    if let Some(preamble) = plan.preamble {
        script.push_str(preamble);
        if !preamble.ends_with('\n') {
            script.push('\n');
        }
        script.push('\n');
    }
    script.push_str(&fill(emitter.registration(), &vars));

    debug!(
        shell = %shell,
        prog = plan.prog,
        bytes = script.len(),
        "rendered completion script"
    );
    script
}

/// One backend. Templates use `@NAME@` placeholders filled by [`render`].
trait Emitter {
    fn header(&self, plan: &Plan<'_>) -> String;

    fn builtin_providers(&self) -> &'static str;

    fn tables(&self, plan: &Plan<'_>) -> String;

    fn helpers(&self, plan: &Plan<'_>) -> String;

    fn walk_rule(&self, rule: WalkRule) -> &'static str;

    fn source(&self, source: CandidateSource) -> &'static str;

    /// Completion function; `@WALK@` and `@SOURCES@` receive the already
    /// filled rule and source blocks.
    fn main_function(&self) -> &'static str;

    fn registration(&self) -> &'static str;

    /// Quote `text` as a single literal word.
    fn quote(&self, text: &str) -> String;
}

/// A flattened lookup table ready for emission
pub(crate) struct Table {
    pub name: &'static str,
    pub entries: Vec<(String, Vec<String>)>,
}

/// Everything a backend needs, resolved once
pub(crate) struct Plan<'a> {
    pub index: &'a CompletionIndex,
    pub description: &'a EngineDescription,
    pub prog: &'a str,
    /// Base name of every emitted function and table
    pub function: String,
    pub preamble: Option<&'a str>,
    /// `prefix slot` → native provider function
    providers: BTreeMap<String, String>,
}

impl<'a> Plan<'a> {
    fn new(
        index: &'a CompletionIndex,
        description: &'a EngineDescription,
        shell: Shell,
        options: &'a RenderOptions,
    ) -> Self {
        let prog = options.prog.as_deref().unwrap_or(index.root());
        let function = match shell {
            Shell::Fish => format!("__tabgen_{}", sanitize(prog)),
            Shell::Bash | Shell::Zsh => format!("_tabgen_{}", sanitize(prog)),
        };

        let mut providers = BTreeMap::new();
        for (prefix, slots) in index.provider_table() {
            for (slot, id) in slots {
                match options.providers.resolve(id, shell) {
                    Some(native) => {
                        providers.insert(slot_key(prefix, slot), native.to_string());
                    }
                    None => warn!(
                        provider = %id,
                        shell = %shell,
                        prefix = %prefix,
                        slot = %slot,
                        "provider has no binding for this shell; slot keeps static candidates only"
                    ),
                }
            }
        }

        Self {
            index,
            description,
            prog,
            function,
            preamble: options.preamble.as_deref(),
            providers,
        }
    }

    /// All lookup tables in emission order
    pub fn tables(&self) -> Vec<Table> {
        let per_prefix = |table: &BTreeMap<String, Vec<String>>| {
            table
                .iter()
                .map(|(prefix, values)| (prefix.clone(), values.clone()))
                .collect()
        };

        let mut choices = Vec::new();
        for (prefix, slots) in self.index.choice_table() {
            for (slot, values) in slots {
                choices.push((slot_key(prefix, slot), values.clone()));
            }
        }
        let mut arity = Vec::new();
        for (prefix, slots) in self.index.arity_table() {
            for (slot, value) in slots {
                arity.push((slot_key(prefix, slot), vec![value.to_string()]));
            }
        }
        let providers = self
            .providers
            .iter()
            .map(|(key, native)| (key.clone(), vec![native.clone()]))
            .collect();

        vec![
            Table {
                name: "subcommands",
                entries: per_prefix(self.index.subcommand_table()),
            },
            Table {
                name: "options",
                entries: per_prefix(self.index.option_table()),
            },
            Table {
                name: "choices",
                entries: choices,
            },
            Table {
                name: "providers",
                entries: providers,
            },
            Table {
                name: "arity",
                entries: arity,
            },
        ]
    }
}

/// Composite key of a slot table entry.
fn slot_key(prefix: &str, slot: &str) -> String {
    format!("{prefix} {slot}")
}

/// Reduce `name` to characters valid in a function identifier.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Substitute `@NAME@` placeholders in one pass; substituted text is never
/// rescanned, so user-supplied names cannot inject placeholders.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('@') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let found = after.find('@').and_then(|end| {
            let name = &after[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match found {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('@');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// POSIX single quoting.
fn sh_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Newline-joined list as one ANSI-C quoted word (bash and zsh).
fn ansi_c_lines(values: &[String]) -> String {
    if values.is_empty() {
        return "''".to_string();
    }
    let body = values
        .iter()
        .map(|v| v.replace('\\', r"\\").replace('\'', r"\'"))
        .collect::<Vec<_>>()
        .join(r"\n");
    format!("$'{body}'")
}
