//! Specification documents
//!
//! Loads a command specification from a TOML or JSON document. The document
//! mirrors the tree directly: a command has options, positionals and nested
//! subcommands.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{Arity, NodeId, OptionDecl, PositionalDecl, Spec};
use crate::error::{DocumentError, Result};

/// A command (program or subcommand) as written in a document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDocument {
    pub name: String,

    #[serde(default)]
    pub options: Vec<OptionDocument>,

    #[serde(default)]
    pub positionals: Vec<PositionalDocument>,

    #[serde(default)]
    pub subcommands: Vec<CommandDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDocument {
    pub flags: Vec<String>,

    #[serde(default = "default_option_nargs")]
    pub nargs: Arity,

    #[serde(default)]
    pub choices: Option<Vec<String>>,

    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionalDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_positional_nargs")]
    pub nargs: Arity,

    #[serde(default)]
    pub choices: Option<Vec<String>>,

    #[serde(default)]
    pub provider: Option<String>,
}

fn default_option_nargs() -> Arity {
    Arity::Exactly(0)
}

fn default_positional_nargs() -> Arity {
    Arity::Exactly(1)
}

impl CommandDocument {
    /// Lower the document tree into a specification arena.
    pub fn into_spec(self) -> Spec {
        let mut spec = Spec::new(self.name.clone());
        let root = spec.root();
        self.lower_into(&mut spec, root);
        spec
    }

    fn lower_into(self, spec: &mut Spec, node: NodeId) {
        for option in self.options {
            spec.add_option(
                node,
                OptionDecl {
                    flags: option.flags,
                    arity: option.nargs,
                    choices: option.choices,
                    provider: option.provider,
                },
            );
        }

        for (slot, positional) in self.positionals.into_iter().enumerate() {
            spec.add_positional(
                node,
                PositionalDecl {
                    name: positional.name.unwrap_or_else(|| format!("arg{slot}")),
                    arity: positional.nargs,
                    choices: positional.choices,
                    provider: positional.provider,
                },
            );
        }

        for child in self.subcommands {
            let id = spec.add_subcommand(node, child.name.clone());
            child.lower_into(spec, id);
        }
    }
}

/// Parse a TOML document.
pub fn from_toml_str(text: &str) -> Result<Spec> {
    let document: CommandDocument =
        toml::from_str(text).map_err(|e| DocumentError::Toml(e.to_string()))?;
    Ok(document.into_spec())
}

/// Parse a JSON document.
pub fn from_json_str(text: &str) -> Result<Spec> {
    let document: CommandDocument =
        serde_json::from_str(text).map_err(|e| DocumentError::Json(e.to_string()))?;
    Ok(document.into_spec())
}

/// Load a specification file; `.json` files are JSON, everything else TOML.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Spec> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    debug!(path = %path.display(), json = is_json, "loading specification document");

    if is_json {
        from_json_str(&text)
    } else {
        from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabgenError;

    const SAMPLE: &str = r#"
name = "prog"

[[options]]
flags = ["-v", "--verbose"]

[[options]]
flags = ["--color"]
nargs = "?"
choices = ["auto", "always", "never"]

[[positionals]]
name = "input"
nargs = "+"
provider = "file-completer"

[[subcommands]]
name = "build"

[[subcommands.positionals]]
nargs = 2
"#;

    #[test]
    fn test_toml_document_lowering() {
        let spec = from_toml_str(SAMPLE).unwrap();
        let root = spec.node(spec.root());

        assert_eq!(root.name(), "prog");
        assert_eq!(root.options().len(), 2);
        assert_eq!(root.options()[0].arity, Arity::Exactly(0));
        assert_eq!(root.options()[1].arity, Arity::Optional);
        assert_eq!(root.positionals()[0].arity, Arity::OneOrMore);
        assert_eq!(root.positionals()[0].provider.as_deref(), Some("file-completer"));

        let build = spec.node(root.children()[0]);
        assert_eq!(build.name(), "build");
        assert_eq!(build.positionals()[0].arity, Arity::Exactly(2));
        assert_eq!(build.positionals()[0].name, "arg0");
    }

    #[test]
    fn test_json_document() {
        let spec = from_json_str(
            r#"{"name": "tool", "subcommands": [{"name": "run", "options": [{"flags": ["--jobs"], "nargs": 1}]}]}"#,
        )
        .unwrap();
        let run = spec.node(spec.node(spec.root()).children()[0]);
        assert_eq!(run.options()[0].arity, Arity::Exactly(1));
    }

    #[test]
    fn test_invalid_nargs_is_rejected() {
        let err = from_toml_str("name = \"p\"\n[[positionals]]\nnargs = \"lots\"\n").unwrap_err();
        match err {
            TabgenError::Document(DocumentError::Toml(msg)) => assert!(msg.contains("lots")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        fs::write(&path, r#"{"name": "j"}"#).unwrap();
        let spec = load(&path).unwrap();
        assert_eq!(spec.node(spec.root()).name(), "j");
    }
}
