//! Bash backend
//!
//! Requires bash 4 or newer for associative arrays. Slot tables are keyed by
//! `"prefix slot"`; list values are newline-joined. Helper functions read the
//! completion function's locals through bash's dynamic scoping.

use super::{Emitter, Plan, ansi_c_lines, sh_quote};
use crate::completion::{CandidateSource, MatchCase, WalkRule};

/// Builtin providers start with `__`, which no completion function name does.
pub(super) const FILES_FN: &str = "__tabgen_files";
pub(super) const DIRS_FN: &str = "__tabgen_dirs";

pub(super) struct Bash;

impl Emitter for Bash {
    fn header(&self, plan: &Plan<'_>) -> String {
        format!(
            "# bash completion for {}\n# Generated by tabgen {}. Do not edit.\n",
            plan.prog.escape_default(),
            crate::VERSION
        )
    }

    fn builtin_providers(&self) -> &'static str {
        BUILTIN_PROVIDERS
    }

    fn tables(&self, plan: &Plan<'_>) -> String {
        let mut out = String::new();
        for table in plan.tables() {
            out.push_str(&format!("declare -gA {}_{}=(\n", plan.function, table.name));
            for (key, values) in &table.entries {
                out.push_str(&format!("    [{}]={}\n", sh_quote(key), ansi_c_lines(values)));
            }
            out.push_str(")\n");
        }
        out
    }

    fn helpers(&self, plan: &Plan<'_>) -> String {
        let matcher = match plan.description.match_case {
            MatchCase::Sensitive => r#"[[ $1 == "$cur"* ]]"#,
            MatchCase::Insensitive => r#"[[ ${1,,} == "${cur,,}"* ]]"#,
        };
        HELPERS.replace("@MATCHER@", matcher)
    }

    fn walk_rule(&self, rule: WalkRule) -> &'static str {
        walk_rule(rule)
    }

    fn source(&self, source: CandidateSource) -> &'static str {
        match source {
            CandidateSource::Subcommands => SOURCE_SUBCOMMANDS,
            CandidateSource::Choices => SOURCE_CHOICES,
            CandidateSource::Provider => SOURCE_PROVIDER,
        }
    }

    fn main_function(&self) -> &'static str {
        MAIN
    }

    fn registration(&self) -> &'static str {
        "complete -F @FN@ @PROG@\n"
    }

    fn quote(&self, text: &str) -> String {
        sh_quote(text)
    }
}

/// Walk blocks, shared with zsh: the syntax used is common to both shells.
pub(super) fn walk_rule(rule: WalkRule) -> &'static str {
    match rule {
        WalkRule::Absorb => WALK_ABSORB,
        WalkRule::Separator => WALK_SEPARATOR,
        WalkRule::Subcommand => WALK_SUBCOMMAND,
        WalkRule::OptionString => WALK_OPTION,
        WalkRule::Positional => WALK_POSITIONAL,
    }
}

/// Both list the directory part of the word and leave matching to `_collect`.
const BUILTIN_PROVIDERS: &str = r#"__tabgen_files() {
    local dir= path pattern='*'
    [[ $1 == */* ]] && dir=${1%/*}/
    [[ ${1##*/} == .* ]] && pattern='.*'
    for path in "$dir"$pattern; do
        case ${path##*/} in . | ..) continue ;; esac
        [[ $pattern == '*' && ${path##*/} == .* ]] && continue
        if [[ -e $path || -L $path ]]; then
            printf '%s\n' "$path"
        fi
    done
    return 0
}

__tabgen_dirs() {
    local dir= path pattern='*/'
    [[ $1 == */* ]] && dir=${1%/*}/
    [[ ${1##*/} == .* ]] && pattern='.*/'
    for path in "$dir"$pattern; do
        path=${path%/}
        case ${path##*/} in . | ..) continue ;; esac
        [[ $pattern == '*/' && ${path##*/} == .* ]] && continue
        if [[ -d $path ]]; then
            printf '%s\n' "$path"
        fi
    done
    return 0
}
"#;

/// `@MATCHER@` is substituted before the shared placeholders.
const HELPERS: &str = r#"@FN@_has() {
    [[ -n $2 && $'\n'"$1"$'\n' == *$'\n'"$2"$'\n'* ]]
}

@FN@_optlike() {
    [[ -n @MARK@ && $1 == @MARK@* ]]
}

@FN@_match() {
    @MATCHER@
}

@FN@_release() {
    if [[ $kind == pos ]]; then
        count=$((count + 1))
    fi
    slot= kind= arity= consumed=0
}

@FN@_exhausted() {
    case $arity in
        '?') (( consumed >= 1 )) ;;
        '*' | '+' | '...') return 1 ;;
        *) (( consumed >= arity )) ;;
    esac
}

@FN@_pending() {
    [[ $kind == opt ]] || return 1
    case $arity in
        '+') (( consumed == 0 )) ;;
        '?' | '*' | '...') return 1 ;;
        *) (( consumed < arity )) ;;
    esac
}

@FN@_absorbs() {
    case $arity in
        '*' | '+' | '...') return 0 ;;
        '?') (( consumed == 0 )) && ! @FN@_optlike "$1" ;;
        *) (( consumed < arity )) ;;
    esac
}

@FN@_collect() {
    local item
    while IFS= read -r item; do
        [[ -n $item ]] || continue
        @FN@_match "$item" || continue
        @FN@_has "$seen" "$item" && continue
        seen+=$item$'\n'
        COMPREPLY+=("$item")
    done <<< "$1"
}
"#;

const MAIN: &str = r#"@FN@() {
    local cur=${COMP_WORDS[COMP_CWORD]}
    local prefix=@ROOT@ slot= kind= arity= token key current provider seen=
    local -i count=0 consumed=0 only=0 i
    COMPREPLY=()

    for (( i = 1; i < COMP_CWORD; i++ )); do
        token=${COMP_WORDS[i]}
        [[ -n ${@FN@_subcommands[$prefix]+x} ]] || prefix=@ROOT@
@WALK@    done

    current=${slot:-pos_$count}
    if (( ! only )) && ! @FN@_pending && @FN@_optlike "$cur"; then
        @FN@_collect "${@FN@_options[$prefix]-}"
        return 0
    fi
@SOURCES@    return 0
}
"#;

pub(super) const WALK_ABSORB: &str = r#"        if [[ -n $slot ]]; then
            if @FN@_absorbs "$token"; then
                consumed=$((consumed + 1))
                if @FN@_exhausted; then
                    @FN@_release
                fi
                continue
            fi
            @FN@_release
        fi
"#;

pub(super) const WALK_SEPARATOR: &str = r#"        if (( ! only )) && [[ $token == @SEP@ ]]; then
            only=1
            continue
        fi
"#;

pub(super) const WALK_SUBCOMMAND: &str = r#"        if (( ! only )) && @FN@_has "${@FN@_subcommands[$prefix]-}" "$token"; then
            prefix=${prefix}_$token
            count=0 slot= kind= arity= consumed=0
            continue
        fi
"#;

pub(super) const WALK_OPTION: &str = r#"        if (( ! only )) && @FN@_has "${@FN@_options[$prefix]-}" "$token"; then
            slot=$token kind=opt consumed=0
            key="$prefix $token"
            arity=${@FN@_arity[$key]-0}
            if [[ $arity == 0 ]]; then
                slot= kind= arity=
            fi
            continue
        fi
"#;

pub(super) const WALK_POSITIONAL: &str = r#"        slot=pos_$count kind=pos consumed=1
        key="$prefix $slot"
        arity=${@FN@_arity[$key]-1}
        if @FN@_exhausted; then
            @FN@_release
        fi
        continue
"#;

const SOURCE_SUBCOMMANDS: &str = r#"    if (( count == 0 && ! only )) && [[ -z $slot ]]; then
        @FN@_collect "${@FN@_subcommands[$prefix]-}"
    fi
"#;

const SOURCE_CHOICES: &str = r#"    key="$prefix $current"
    @FN@_collect "${@FN@_choices[$key]-}"
"#;

const SOURCE_PROVIDER: &str = r#"    key="$prefix $current"
    provider=${@FN@_providers[$key]-}
    if [[ -n $provider ]] && declare -F -- "$provider" > /dev/null; then
        @FN@_collect "$("$provider" "$cur" 2> /dev/null)"
    fi
"#;
