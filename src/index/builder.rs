//! Index builder
//!
//! Flattens a [`Spec`] depth-first into a [`CompletionIndex`]. The input tree
//! is only read.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::{CompletionIndex, positional_slot};
use crate::error::SpecificationError;
use crate::spec::{NodeId, OptionDecl, Spec};

/// Build the completion index for `spec`.
///
/// # Errors
/// Returns a [`SpecificationError`] for duplicate subcommands, conflicting
/// option declarations, colliding prefixes, or unrepresentable names.
pub fn build(spec: &Spec) -> Result<CompletionIndex, SpecificationError> {
    let root = spec.node(spec.root()).name().to_string();
    check_word(&root, &root)?;

    let mut builder = IndexBuilder {
        spec,
        index: CompletionIndex::new(root.clone()),
    };
    builder.visit(spec.root(), root)?;

    debug!(
        prefixes = builder.index.subcommands.len(),
        "completion index built"
    );
    Ok(builder.index)
}

struct IndexBuilder<'a> {
    spec: &'a Spec,
    index: CompletionIndex,
}

impl IndexBuilder<'_> {
    fn visit(&mut self, id: NodeId, prefix: String) -> Result<(), SpecificationError> {
        if self.index.subcommands.contains_key(&prefix) {
            return Err(SpecificationError::DuplicatePrefix { prefix });
        }

        let spec = self.spec;
        let node = spec.node(id);
        debug!(
            prefix = %prefix,
            options = node.options().len(),
            positionals = node.positionals().len(),
            children = node.children().len(),
            "indexing node"
        );

        let mut names = Vec::with_capacity(node.children().len());
        let mut seen = HashSet::new();
        for child in node.children() {
            let name = spec.node(*child).name();
            check_word(&prefix, name)?;
            if name == "--" {
                return Err(invalid(&prefix, name));
            }
            if !seen.insert(name) {
                return Err(SpecificationError::DuplicateSubcommand {
                    prefix: prefix.clone(),
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
        }

        let mut option_strings = Vec::new();
        let mut choices = BTreeMap::new();
        let mut providers = BTreeMap::new();
        let mut arity = BTreeMap::new();

        let mut declared: HashMap<&str, &OptionDecl> = HashMap::new();
        for option in node.options() {
            for flag in &option.flags {
                check_word(&prefix, flag)?;
                if is_positional_key(flag) {
                    return Err(invalid(&prefix, flag));
                }
                if let Some(previous) = declared.get(flag.as_str()) {
                    if previous.same_slot(option) {
                        debug!(prefix = %prefix, flag = %flag, "merging identical redeclaration");
                        continue;
                    }
                    return Err(SpecificationError::ConflictingOption {
                        prefix: prefix.clone(),
                        flag: flag.clone(),
                    });
                }
                declared.insert(flag.as_str(), option);

                option_strings.push(flag.clone());
                arity.insert(flag.clone(), option.arity);
                if let Some(values) = &option.choices {
                    choices.insert(flag.clone(), checked_choices(&prefix, values)?);
                }
                if let Some(provider) = &option.provider {
                    check_word(&prefix, provider)?;
                    providers.insert(flag.clone(), provider.clone());
                }
            }
        }

        for (i, positional) in node.positionals().iter().enumerate() {
            let slot = positional_slot(i);
            arity.insert(slot.clone(), positional.arity);
            if let Some(values) = &positional.choices {
                choices.insert(slot.clone(), checked_choices(&prefix, values)?);
            }
            if let Some(provider) = &positional.provider {
                check_word(&prefix, provider)?;
                providers.insert(slot, provider.clone());
            }
        }

        self.index.subcommands.insert(prefix.clone(), names.clone());
        self.index.option_strings.insert(prefix.clone(), option_strings);
        self.index.choices.insert(prefix.clone(), choices);
        self.index.providers.insert(prefix.clone(), providers);
        self.index.arity.insert(prefix.clone(), arity);

        for (child, name) in node.children().iter().zip(names) {
            self.visit(*child, format!("{prefix}_{name}"))?;
        }
        Ok(())
    }
}

fn invalid(prefix: &str, name: &str) -> SpecificationError {
    SpecificationError::InvalidName {
        prefix: prefix.to_string(),
        name: name.to_string(),
    }
}

/// Names and flags must be non-empty and free of whitespace and control
/// characters; emitted artifacts rely on both.
fn check_word(prefix: &str, word: &str) -> Result<(), SpecificationError> {
    if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(prefix, word));
    }
    Ok(())
}

fn checked_choices(prefix: &str, values: &[String]) -> Result<Vec<String>, SpecificationError> {
    if let Some(bad) = values.iter().find(|v| v.chars().any(char::is_control)) {
        return Err(invalid(prefix, bad));
    }
    Ok(values.to_vec())
}

fn is_positional_key(flag: &str) -> bool {
    flag.strip_prefix("pos_")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
