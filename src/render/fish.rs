//! Fish backend
//!
//! Fish has no associative arrays, so each table becomes a lookup function
//! holding parallel `keys`/`values` lists. List values are stored as one
//! element joined with newlines. Fish functions do not see their caller's
//! locals, so helpers take the walk state as arguments and slot release is
//! written inline.

use super::{Emitter, Plan};
use crate::completion::{CandidateSource, MatchCase, WalkRule};

/// Generated functions are `__tabgen_<prog>_<suffix>`, so these are never shadowed.
pub(super) const FILES_FN: &str = "__tabgen_files";
pub(super) const DIRS_FN: &str = "__tabgen_dirs";

pub(super) struct Fish;

impl Emitter for Fish {
    fn header(&self, plan: &Plan<'_>) -> String {
        format!(
            "# fish completion for {}\n# Generated by tabgen {}. Do not edit.\n",
            plan.prog.escape_default(),
            crate::VERSION
        )
    }

    fn builtin_providers(&self) -> &'static str {
        BUILTIN_PROVIDERS
    }

    fn tables(&self, plan: &Plan<'_>) -> String {
        let mut out = format!("function {}_prefixes\n    printf '%s\\n'", plan.function);
        for prefix in plan.index.prefixes() {
            out.push_str(&format!(" \\\n        {}", fish_quote(prefix)));
        }
        out.push_str("\nend\n");

        for table in plan.tables() {
            out.push_str(&format!("\nfunction {}_{}\n", plan.function, table.name));
            out.push_str("    set -l keys");
            for (key, _) in &table.entries {
                out.push_str(&format!(" \\\n        {}", fish_quote(key)));
            }
            out.push_str("\n    set -l values");
            for (_, values) in &table.entries {
                out.push_str(&format!(" \\\n        {}", fish_lines(values)));
            }
            out.push_str(
                "\n    if set -l i (contains -i -- \"$argv[1]\" $keys)\n        \
                 string split --no-empty \\n -- $values[$i]\n    end\nend\n",
            );
        }
        out
    }

    fn helpers(&self, plan: &Plan<'_>) -> String {
        let optlike = if plan.description.option_marker.is_empty() {
            "    return 1".to_string()
        } else {
            let pattern = format!("^{}", regex_escape(&plan.description.option_marker));
            format!("    string match -qr -- {} \"$word\"", fish_quote(&pattern))
        };
        let compare = match plan.description.match_case {
            MatchCase::Sensitive => "",
            MatchCase::Insensitive => {
                "    set -l head (string lower -- \"$head\")\n    \
                 set -l word (string lower -- \"$word\")\n"
            }
        };
        HELPERS
            .replace("@OPTLIKE@", &optlike)
            .replace("@LOWER@\n", compare)
    }

    fn walk_rule(&self, rule: WalkRule) -> &'static str {
        match rule {
            WalkRule::Absorb => WALK_ABSORB,
            WalkRule::Separator => WALK_SEPARATOR,
            WalkRule::Subcommand => WALK_SUBCOMMAND,
            WalkRule::OptionString => WALK_OPTION,
            WalkRule::Positional => WALK_POSITIONAL,
        }
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
        "complete -c @PROG@ -e\ncomplete -c @PROG@ -f -a '(@FN@_complete)'\n"
    }

    fn quote(&self, text: &str) -> String {
        fish_quote(text)
    }
}

/// Fish single quoting: only `\` and `'` are special.
pub(super) fn fish_quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', r"\\").replace('\'', r"\'"))
}

/// A list as one word: quoted items joined by an unquoted `\n` escape.
pub(super) fn fish_lines(values: &[String]) -> String {
    if values.is_empty() {
        return "''".to_string();
    }
    values
        .iter()
        .map(|v| fish_quote(v))
        .collect::<Vec<_>>()
        .join(r"\n")
}

/// Escape regex metacharacters for `string match -r`.
fn regex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_punctuation() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Both list the directory part of the word and leave matching to `_match`.
const BUILTIN_PROVIDERS: &str = r#"function __tabgen_files --argument-names word
    set -l dir ''
    string match -q -- '*/*' "$word"; and set dir (string replace -r '[^/]*$' '' -- "$word")
    set -l paths
    if string match -q -- '.*' (string replace -r '^.*/' '' -- "$word")
        set paths $dir.*
    else
        set paths $dir*
    end
    for path in $paths
        contains -- (string replace -r '^.*/' '' -- $path) . ..; and continue
        printf '%s\n' $path
    end
end

function __tabgen_dirs --argument-names word
    set -l dir ''
    string match -q -- '*/*' "$word"; and set dir (string replace -r '[^/]*$' '' -- "$word")
    set -l paths
    if string match -q -- '.*' (string replace -r '^.*/' '' -- "$word")
        set paths $dir.*/
    else
        set paths $dir*/
    end
    for path in $paths
        set path (string trim -r -c / -- $path)
        contains -- (string replace -r '^.*/' '' -- $path) . ..; and continue
        printf '%s\n' $path
    end
end
"#;

/// `@OPTLIKE@` and `@LOWER@` are substituted before the shared placeholders.
const HELPERS: &str = r#"function @FN@_optlike --argument-names word
@OPTLIKE@
end

function @FN@_match --argument-names item word
    test -n "$item"; or return 1
    test -z "$word"; and return 0
    set -l head (string sub -l (string length -- "$word") -- "$item")
@LOWER@
    test "$head" = "$word"
end

function @FN@_exhausted --argument-names arity consumed
    if test "$arity" = '?'
        test $consumed -ge 1
    else if contains -- "$arity" '*' '+' '...'
        return 1
    else
        test $consumed -ge $arity
    end
end

function @FN@_pending --argument-names kind arity consumed
    test "$kind" = opt; or return 1
    if test "$arity" = '+'
        test $consumed -eq 0
    else if contains -- "$arity" '?' '*' '...'
        return 1
    else
        test $consumed -lt $arity
    end
end

function @FN@_absorbs --argument-names arity consumed token
    if contains -- "$arity" '*' '+' '...'
        return 0
    else if test "$arity" = '?'
        test $consumed -eq 0; and not @FN@_optlike "$token"
    else
        test $consumed -lt $arity
    end
end
"#;

const MAIN: &str = r#"function @FN@_complete
    set -l words (commandline -opc)
    set -l cur (commandline -ct)
    set -q words[1]; and set -e words[1]
    set -l prefix @ROOT@
    set -l count 0
    set -l slot ''
    set -l kind ''
    set -l arity ''
    set -l consumed 0
    set -l only 0
    set -l reply

    for token in $words
        contains -- "$prefix" (@FN@_prefixes); or set prefix @ROOT@
@WALK@    end

    set -l current "$slot"
    test -n "$current"; or set current pos_$count
    if test $only -eq 0; and not @FN@_pending "$kind" "$arity" $consumed; and @FN@_optlike "$cur"
        for item in (@FN@_options "$prefix")
            @FN@_match "$item" "$cur"; or continue
            contains -- "$item" $reply; and continue
            set -a reply $item
        end
    else
@SOURCES@    end

    set -q reply[1]; and printf '%s\n' $reply
end
"#;

const WALK_ABSORB: &str = r#"        if test -n "$slot"
            if @FN@_absorbs "$arity" $consumed "$token"
                set consumed (math $consumed + 1)
                if @FN@_exhausted "$arity" $consumed
                    test "$kind" = pos; and set count (math $count + 1)
                    set slot ''
                    set kind ''
                    set arity ''
                    set consumed 0
                end
                continue
            end
            test "$kind" = pos; and set count (math $count + 1)
            set slot ''
            set kind ''
            set arity ''
            set consumed 0
        end
"#;

const WALK_SEPARATOR: &str = r#"        if test $only -eq 0; and test "$token" = @SEP@
            set only 1
            continue
        end
"#;

const WALK_SUBCOMMAND: &str = r#"        if test $only -eq 0; and contains -- "$token" (@FN@_subcommands "$prefix")
            set prefix "$prefix"_"$token"
            set count 0
            set slot ''
            set kind ''
            set arity ''
            set consumed 0
            continue
        end
"#;

const WALK_OPTION: &str = r#"        if test $only -eq 0; and contains -- "$token" (@FN@_options "$prefix")
            set slot "$token"
            set kind opt
            set consumed 0
            set arity (@FN@_arity "$prefix $token")
            test -n "$arity"; or set arity 0
            if test "$arity" = 0
                set slot ''
                set kind ''
                set arity ''
            end
            continue
        end
"#;

const WALK_POSITIONAL: &str = r#"        set slot pos_$count
        set kind pos
        set consumed 1
        set arity (@FN@_arity "$prefix $slot")
        test -n "$arity"; or set arity 1
        if @FN@_exhausted "$arity" $consumed
            set count (math $count + 1)
            set slot ''
            set kind ''
            set arity ''
            set consumed 0
        end
        continue
"#;

const SOURCE_SUBCOMMANDS: &str = r#"        if test $count -eq 0; and test $only -eq 0; and test -z "$slot"
            for item in (@FN@_subcommands "$prefix")
                @FN@_match "$item" "$cur"; or continue
                contains -- "$item" $reply; and continue
                set -a reply $item
            end
        end
"#;

const SOURCE_CHOICES: &str = r#"        for item in (@FN@_choices "$prefix $current")
            @FN@_match "$item" "$cur"; or continue
            contains -- "$item" $reply; and continue
            set -a reply $item
        end
"#;

const SOURCE_PROVIDER: &str = r#"        set -l provider (@FN@_providers "$prefix $current")
        if test -n "$provider"; and functions -q -- $provider
            for item in ($provider "$cur" 2> /dev/null)
                @FN@_match "$item" "$cur"; or continue
                contains -- "$item" $reply; and continue
                set -a reply $item
            end
        end
"#;
