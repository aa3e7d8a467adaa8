//! Zsh backend
//!
//! Works both as an autoloaded `_prog` function file on `$fpath` and when
//! sourced after `compinit`. Candidates are handed to `compadd`, so the
//! user's matcher-list still applies on top of the literal prefix filter.

use super::{Emitter, Plan, ansi_c_lines, bash, sh_quote};
use crate::completion::{CandidateSource, MatchCase, WalkRule};

pub(super) const FILES_FN: &str = "__tabgen_files";
pub(super) const DIRS_FN: &str = "__tabgen_dirs";

pub(super) struct Zsh;

impl Emitter for Zsh {
    fn header(&self, plan: &Plan<'_>) -> String {
        format!(
            "#compdef {}\n# zsh completion for {}\n# Generated by tabgen {}. Do not edit.\n",
            plan.prog.escape_default(),
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
            let name = format!("{}_{}", plan.function, table.name);
            out.push_str(&format!("typeset -gA {name}\n{name}=(\n"));
            for (key, values) in &table.entries {
                out.push_str(&format!("    {} {}\n", sh_quote(key), ansi_c_lines(values)));
            }
            out.push_str(")\n");
        }
        out
    }

    fn helpers(&self, plan: &Plan<'_>) -> String {
        let matcher = match plan.description.match_case {
            MatchCase::Sensitive => r#"[[ $1 == "$cur"* ]]"#,
            MatchCase::Insensitive => r#"[[ ${(L)1} == "${(L)cur}"* ]]"#,
        };
        HELPERS.replace("@MATCHER@", matcher)
    }

    fn walk_rule(&self, rule: WalkRule) -> &'static str {
        bash::walk_rule(rule)
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
        r#"if [[ ${zsh_eval_context[-1]} == loadautofunc ]]; then
    @FN@ "$@"
else
    compdef @FN@ @PROG@
fi
"#
    }

    fn quote(&self, text: &str) -> String {
        sh_quote(text)
    }
}

const BUILTIN_PROVIDERS: &str = r#"__tabgen_files() {
    local dir=
    local -a paths
    [[ $1 == */* ]] && dir=${1%/*}/
    if [[ ${1##*/} == .* ]]; then
        paths=( ${dir}.*(N) )
    else
        paths=( ${dir}*(N) )
    fi
    (( ${#paths} )) && print -rl -- "${paths[@]}"
    return 0
}

__tabgen_dirs() {
    local dir=
    local -a paths
    [[ $1 == */* ]] && dir=${1%/*}/
    if [[ ${1##*/} == .* ]]; then
        paths=( ${dir}.*(N/) )
    else
        paths=( ${dir}*(N/) )
    fi
    (( ${#paths} )) && print -rl -- "${paths[@]}"
    return 0
}
"#;

const HELPERS: &str = r#"@FN@_has() {
    local -a items
    items=( ${(f)1} )
    [[ -n $2 ]] && (( ${items[(Ie)$2]} ))
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
        ('?') (( consumed >= 1 )) ;;
        ('*' | '+' | '...') return 1 ;;
        (*) (( consumed >= arity )) ;;
    esac
}

@FN@_pending() {
    [[ $kind == opt ]] || return 1
    case $arity in
        ('+') (( consumed == 0 )) ;;
        ('?' | '*' | '...') return 1 ;;
        (*) (( consumed < arity )) ;;
    esac
}

@FN@_absorbs() {
    case $arity in
        ('*' | '+' | '...') return 0 ;;
        ('?') (( consumed == 0 )) && ! @FN@_optlike "$1" ;;
        (*) (( consumed < arity )) ;;
    esac
}

@FN@_collect() {
    local item
    for item in ${(f)1}; do
        @FN@_match "$item" || continue
        @FN@_has "$seen" "$item" && continue
        seen+=$item$'\n'
        reply+=( "$item" )
    done
}
"#;

const MAIN: &str = r#"@FN@() {
    emulate -L zsh
    local cur=${words[CURRENT]}
    local prefix=@ROOT@ slot= kind= arity= token key current provider seen=
    local -i count=0 consumed=0 only=0 i
    local -a reply

    for (( i = 2; i < CURRENT; i++ )); do
        token=${words[i]}
        (( ${+@FN@_subcommands[$prefix]} )) || prefix=@ROOT@
@WALK@    done

    current=${slot:-pos_$count}
    if (( ! only )) && ! @FN@_pending && @FN@_optlike "$cur"; then
        @FN@_collect "${@FN@_options[$prefix]-}"
    else
@SOURCES@    fi

    (( ${#reply} )) || return 1
    compadd -- "${reply[@]}"
}
"#;

const SOURCE_SUBCOMMANDS: &str = r#"        if (( count == 0 && ! only )) && [[ -z $slot ]]; then
            @FN@_collect "${@FN@_subcommands[$prefix]-}"
        fi
"#;

const SOURCE_CHOICES: &str = r#"        key="$prefix $current"
        @FN@_collect "${@FN@_choices[$key]-}"
"#;

const SOURCE_PROVIDER: &str = r#"        key="$prefix $current"
        provider=${@FN@_providers[$key]-}
        if [[ -n $provider ]] && (( ${+functions[$provider]} )); then
            @FN@_collect "$("$provider" "$cur" 2> /dev/null)"
        fi
"#;
