//! Command specification model
//!
//! The specification is a strict tree of command nodes (the program and its
//! subcommands), each owning option and positional declarations. Nodes live
//! in an arena and refer to their children by [`NodeId`], so the tree has no
//! back-edges and no shared ownership.
//!
//! A specification is produced once by an introspection layer (the
//! [`document`] loader or the [`clap_adapter`]) and is read-only afterwards.

pub mod clap_adapter;
pub mod document;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecificationError;

pub use clap_adapter::from_clap;

/// How many tokens a slot consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ArityRepr", into = "String")]
pub enum Arity {
    /// Exactly `n` tokens (`0` for plain flags).
    Exactly(usize),
    /// Zero or one token (`?`).
    Optional,
    /// Any number of tokens (`*`).
    ZeroOrMore,
    /// At least one token (`+`).
    OneOrMore,
    /// Every following token (`...`).
    Remainder,
}

impl Arity {
    /// True for arities without an upper bound.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore | Self::Remainder)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::Optional => write!(f, "?"),
            Self::ZeroOrMore => write!(f, "*"),
            Self::OneOrMore => write!(f, "+"),
            Self::Remainder => write!(f, "..."),
        }
    }
}

impl FromStr for Arity {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "?" => Ok(Self::Optional),
            "*" => Ok(Self::ZeroOrMore),
            "+" => Ok(Self::OneOrMore),
            "..." => Ok(Self::Remainder),
            other => other
                .parse::<usize>()
                .map(Self::Exactly)
                .map_err(|_| SpecificationError::InvalidArity {
                    text: s.to_string(),
                }),
        }
    }
}

impl From<Arity> for String {
    fn from(arity: Arity) -> Self {
        arity.to_string()
    }
}

/// Serialized arity: documents may write `nargs = 2` or `nargs = "+"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ArityRepr {
    Count(usize),
    Text(String),
}

impl TryFrom<ArityRepr> for Arity {
    type Error = SpecificationError;

    fn try_from(repr: ArityRepr) -> Result<Self, Self::Error> {
        match repr {
            ArityRepr::Count(n) => Ok(Self::Exactly(n)),
            ArityRepr::Text(text) => text.parse(),
        }
    }
}

/// An option declaration: one or more invocation strings sharing slot data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    /// Invocation strings; the first is the primary one.
    pub flags: Vec<String>,
    pub arity: Arity,
    pub choices: Option<Vec<String>>,
    pub provider: Option<String>,
}

impl OptionDecl {
    /// A flag that takes no value.
    pub fn flag<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: flags.into_iter().map(Into::into).collect(),
            arity: Arity::Exactly(0),
            choices: None,
            provider: None,
        }
    }

    /// An option that takes exactly one value.
    pub fn with_value<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::flag(flags).arity(Arity::Exactly(1))
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// The canonical slot-key of this option.
    pub fn primary(&self) -> Option<&str> {
        self.flags.first().map(String::as_str)
    }

    /// Whether two declarations bind the same slot data.
    pub(crate) fn same_slot(&self, other: &Self) -> bool {
        self.arity == other.arity && self.choices == other.choices && self.provider == other.provider
    }
}

/// A positional declaration. Its slot index is its place in the node's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalDecl {
    /// Display name; not used for completion.
    pub name: String,
    pub arity: Arity,
    pub choices: Option<Vec<String>>,
    pub provider: Option<String>,
}

impl PositionalDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: Arity::Exactly(1),
            choices: None,
            provider: None,
        }
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Index of a node inside its [`Spec`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A program or subcommand.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    children: Vec<NodeId>,
    options: Vec<OptionDecl>,
    positionals: Vec<PositionalDecl>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            options: Vec::new(),
            positionals: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child subcommands in declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn options(&self) -> &[OptionDecl] {
        &self.options
    }

    pub fn positionals(&self) -> &[PositionalDecl] {
        &self.positionals
    }
}

/// Arena holding a whole command tree. Node 0 is the root.
#[derive(Debug, Clone)]
pub struct Spec {
    nodes: Vec<Node>,
}

impl Spec {
    /// Create a specification containing only the root program.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_name.into())],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    ///
    /// Ids are only minted by this arena, so a foreign id is a caller bug.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rename the root program (the root prefix follows the name).
    pub fn set_root_name(&mut self, name: impl Into<String>) {
        self.nodes[0].name = name.into();
    }

    /// Add a subcommand under `parent` and return its id.
    ///
    /// Duplicate names are accepted here and rejected by the index builder.
    pub fn add_subcommand(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.into()));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_option(&mut self, node: NodeId, option: OptionDecl) -> &mut Self {
        self.nodes[node.0].options.push(option);
        self
    }

    pub fn add_positional(&mut self, node: NodeId, positional: PositionalDecl) -> &mut Self {
        self.nodes[node.0].positionals.push(positional);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_text_forms() {
        assert_eq!("3".parse::<Arity>().unwrap(), Arity::Exactly(3));
        assert_eq!("?".parse::<Arity>().unwrap(), Arity::Optional);
        assert_eq!("*".parse::<Arity>().unwrap(), Arity::ZeroOrMore);
        assert_eq!("+".parse::<Arity>().unwrap(), Arity::OneOrMore);
        assert_eq!("...".parse::<Arity>().unwrap(), Arity::Remainder);
        assert_eq!(Arity::Remainder.to_string(), "...");
        assert!("many".parse::<Arity>().is_err());
    }

    #[test]
    fn test_unbounded_arities() {
        assert!(Arity::ZeroOrMore.is_unbounded());
        assert!(Arity::OneOrMore.is_unbounded());
        assert!(Arity::Remainder.is_unbounded());
        assert!(!Arity::Optional.is_unbounded());
        assert!(!Arity::Exactly(4).is_unbounded());
    }

    #[test]
    fn test_arena_children() {
        let mut spec = Spec::new("prog");
        let root = spec.root();
        let build = spec.add_subcommand(root, "build");
        let release = spec.add_subcommand(build, "release");
        spec.add_option(build, OptionDecl::flag(["-q", "--quiet"]));

        assert_eq!(spec.len(), 3);
        assert_eq!(spec.node(root).children(), &[build]);
        assert_eq!(spec.node(build).children(), &[release]);
        assert_eq!(spec.node(release).name(), "release");
        assert_eq!(spec.node(build).options()[0].primary(), Some("-q"));
    }

    #[test]
    fn test_option_builders() {
        let opt = OptionDecl::with_value(["--color"])
            .arity(Arity::Optional)
            .choices(["auto", "never"]);
        assert_eq!(opt.arity, Arity::Optional);
        assert_eq!(opt.choices.as_deref(), Some(&["auto".to_string(), "never".to_string()][..]));
        assert!(opt.provider.is_none());
    }
}
