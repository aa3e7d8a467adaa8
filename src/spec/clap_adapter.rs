//! Introspection of clap command trees
//!
//! Turns a `clap::Command` into a [`Spec`]. Hidden arguments and subcommands
//! are skipped; value hints for paths bind the built-in filesystem providers.

use clap::{Arg, Command, ValueHint};

use super::{Arity, NodeId, OptionDecl, PositionalDecl, Spec};
use crate::completion::{DIRECTORY_COMPLETER, FILE_COMPLETER};

/// Build a specification from a clap command.
///
/// The command is built first so that generated `--help`/`--version` flags
/// and the implicit `help` subcommand are part of the result.
pub fn from_clap(command: &Command) -> Spec {
    let mut command = command.clone();
    command.build();

    let mut spec = Spec::new(command.get_name());
    let root = spec.root();
    lower_command(&command, &mut spec, root);
    spec
}

fn lower_command(command: &Command, spec: &mut Spec, node: NodeId) {
    for arg in command.get_arguments().filter(|arg| !arg.is_hide_set()) {
        if arg.is_positional() {
            spec.add_positional(node, positional_decl(arg));
        } else if let Some(option) = option_decl(arg) {
            spec.add_option(node, option);
        }
    }

    for sub in command.get_subcommands().filter(|sub| !sub.is_hide_set()) {
        let child = spec.add_subcommand(node, sub.get_name());
        lower_command(sub, spec, child);
    }
}

fn option_decl(arg: &Arg) -> Option<OptionDecl> {
    let mut flags: Vec<String> = Vec::new();
    if let Some(longs) = arg.get_long_and_visible_aliases() {
        flags.extend(longs.into_iter().map(|long| format!("--{long}")));
    }
    if let Some(shorts) = arg.get_short_and_visible_aliases() {
        flags.extend(shorts.into_iter().map(|short| format!("-{short}")));
    }
    if flags.is_empty() {
        return None;
    }

    let arity = arg_arity(arg);
    let mut option = OptionDecl::flag(flags).arity(arity);
    if arity != Arity::Exactly(0) {
        option.choices = arg_choices(arg);
        option.provider = arg_provider(arg);
    }
    Some(option)
}

fn positional_decl(arg: &Arg) -> PositionalDecl {
    let arity = if arg.is_last_set() || arg.is_trailing_var_arg_set() {
        Arity::Remainder
    } else {
        arg_arity(arg)
    };

    PositionalDecl {
        name: arg.get_id().as_str().to_string(),
        arity,
        choices: arg_choices(arg),
        provider: arg_provider(arg),
    }
}

fn arg_arity(arg: &Arg) -> Arity {
    if !arg.get_action().takes_values() {
        return Arity::Exactly(0);
    }
    match arg.get_num_args() {
        Some(range) => range_arity(range.min_values(), range.max_values()),
        None => Arity::Exactly(1),
    }
}

/// Map a clap `num_args` range onto the closest arity.
fn range_arity(min: usize, max: usize) -> Arity {
    match (min, max) {
        (0, usize::MAX) => Arity::ZeroOrMore,
        (_, usize::MAX) => Arity::OneOrMore,
        (0, 1) => Arity::Optional,
        (min, max) if min == max => Arity::Exactly(min),
        (0, _) => Arity::ZeroOrMore,
        _ => Arity::OneOrMore,
    }
}

fn arg_choices(arg: &Arg) -> Option<Vec<String>> {
    let values: Vec<String> = arg
        .get_possible_values()
        .iter()
        .filter(|value| !value.is_hide_set())
        .map(|value| value.get_name().to_string())
        .collect();
    (!values.is_empty()).then_some(values)
}

fn arg_provider(arg: &Arg) -> Option<String> {
    match arg.get_value_hint() {
        ValueHint::FilePath | ValueHint::AnyPath | ValueHint::ExecutablePath => {
            Some(FILE_COMPLETER.to_string())
        }
        ValueHint::DirPath => Some(DIRECTORY_COMPLETER.to_string()),
        _ => None,
    }
}
