//! Command-line interface for tabgen
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Dispatch of the generate / complete / inspect subcommands

pub mod completion;

use clap::{Parser, Subcommand, ValueHint};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::completion::{CompletionEngine, EngineDescription, MatchCase};
use crate::config::{Config, LogLevel};
use crate::error::{Result, TabgenError};
use crate::index::{self, CompletionIndex};
use crate::render::{self, RenderOptions, Shell};
use crate::spec::document;

/// Expand a leading `~/` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// tabgen - static shell completion generator
#[derive(Parser, Debug)]
#[command(
    name = "tabgen",
    version,
    about = "Compile command specifications into shell completion scripts",
    long_about = "Compiles a hierarchical command specification into self-contained, offline
completion scripts for bash, zsh and fish. The generated scripts never call back
into the program they complete."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for tabgen
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a completion script from a specification document
    Generate {
        /// Specification document (TOML, or JSON with a .json extension)
        #[arg(value_name = "SPEC", value_hint = ValueHint::FilePath)]
        spec: PathBuf,

        /// Target shell (defaults to the configured shell)
        #[arg(short = 's', long, value_name = "SHELL")]
        shell: Option<Shell>,

        /// Command name to register the completion for
        #[arg(long, value_name = "NAME")]
        prog: Option<String>,

        /// Shell code spliced in before registration
        #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
        preamble: Option<PathBuf>,

        /// Match candidates without regard to case
        #[arg(short = 'i', long)]
        ignore_case: bool,

        /// Write the script to FILE instead of stdout
        #[arg(short = 'o', long, value_name = "FILE", value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Run the completion engine and print candidates, one per line
    Complete {
        /// Specification document
        #[arg(value_name = "SPEC", value_hint = ValueHint::FilePath)]
        spec: PathBuf,

        /// Whole command line, completed at its end
        #[arg(long, value_name = "LINE", conflicts_with = "words")]
        line: Option<String>,

        /// Match candidates without regard to case
        #[arg(short = 'i', long)]
        ignore_case: bool,

        /// Words after the program name; the last one is being completed
        #[arg(last = true, value_name = "WORDS")]
        words: Vec<String>,
    },

    /// Print the completion index as JSON
    Inspect {
        /// Specification document
        #[arg(value_name = "SPEC", value_hint = ValueHint::FilePath)]
        spec: PathBuf,
    },

    /// Generate the completion script for tabgen itself
    Completion {
        /// Shell type
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Show version information
    Version,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// Logging is not initialized yet at this point, so problems go straight
    /// to stderr.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_logging_args(&mut config, args);

        Ok(config)
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Run the selected subcommand
    pub fn handle_command(&self) -> Result<()> {
        match &self.args.command {
            Commands::Generate {
                spec,
                shell,
                prog,
                preamble,
                ignore_case,
                output,
            } => {
                let shell = shell.unwrap_or(self.config.generate.default_shell);
                let script = self.render_spec(
                    spec,
                    shell,
                    prog.as_deref(),
                    preamble.as_deref(),
                    *ignore_case,
                )?;
                self.write_output(output.as_deref(), &script, shell)
            }
            Commands::Complete {
                spec,
                line,
                ignore_case,
                words,
            } => {
                let candidates =
                    self.complete_spec(spec, line.as_deref(), words, *ignore_case)?;
                for candidate in candidates {
                    println!("{}", candidate);
                }
                Ok(())
            }
            Commands::Inspect { spec } => {
                println!("{}", self.inspect_spec(spec)?);
                Ok(())
            }
            Commands::Completion { shell } => {
                let script = completion::generate_completion(*shell, &self.config)?;
                print!("{}", script);
                Ok(())
            }
            Commands::Config { show, validate } => self.handle_config_command(*show, *validate),
            Commands::Version => {
                self.show_version();
                Ok(())
            }
        }
    }

    fn load_index(&self, spec: &Path) -> Result<CompletionIndex> {
        let spec = document::load(spec)?;
        Ok(index::build(&spec)?)
    }

    fn description(&self, ignore_case: bool) -> EngineDescription {
        let match_case = if ignore_case {
            MatchCase::Insensitive
        } else {
            self.config.match_case()
        };
        EngineDescription::standard().with_match_case(match_case)
    }

    /// Render the completion script for a specification document
    ///
    /// A `--preamble` file takes precedence over the configured one.
    pub fn render_spec(
        &self,
        spec: &Path,
        shell: Shell,
        prog: Option<&str>,
        preamble: Option<&Path>,
        ignore_case: bool,
    ) -> Result<String> {
        let index = self.load_index(spec)?;

        let preamble = match preamble {
            Some(path) => Some(fs::read_to_string(path)?),
            None => match &self.config.generate.preamble {
                Some(path) => Some(fs::read_to_string(expand_home(path))?),
                None => None,
            },
        };

        let options = RenderOptions {
            prog: prog.map(str::to_string),
            preamble,
            providers: self.config.provider_table(),
        };
        Ok(render::render(
            &index,
            &self.description(ignore_case),
            shell,
            &options,
        ))
    }

    /// Candidates the engine offers for a command line or word list
    pub fn complete_spec(
        &self,
        spec: &Path,
        line: Option<&str>,
        words: &[String],
        ignore_case: bool,
    ) -> Result<Vec<String>> {
        let index = self.load_index(spec)?;
        let engine = CompletionEngine::new(&index).with_description(self.description(ignore_case));

        let candidates = match line {
            Some(line) => engine.complete_line(line, line.len()),
            None => match words.split_last() {
                Some((word, tokens)) => engine.complete(tokens, word),
                None => engine.complete(&[], ""),
            },
        };
        Ok(candidates)
    }

    /// The completion index as pretty JSON
    pub fn inspect_spec(&self, spec: &Path) -> Result<String> {
        let index = self.load_index(spec)?;
        serde_json::to_string_pretty(&index)
            .map_err(|e| TabgenError::Generic(format!("Failed to serialize index: {}", e)))
    }

    fn write_output(&self, output: Option<&Path>, script: &str, shell: Shell) -> Result<()> {
        match output {
            Some(path) => {
                fs::write(path, script)?;
                info!(
                    path = %path.display(),
                    shell = %shell,
                    bytes = script.len(),
                    "wrote completion script"
                );
            }
            None => print!("{}", script),
        }
        Ok(())
    }

    /// Show version information
    fn show_version(&self) {
        println!("tabgen version {}", crate::VERSION);
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// `tabgen config`: with `--validate`, an invalid file is an error;
    /// with `--show` (or no flag), the effective settings are printed.
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        let path = self.config_path();

        if validate {
            if !path.exists() {
                println!("{}: not found, defaults apply", path.display());
            } else {
                Config::load_from_file(Some(path.as_path()))?.validate()?;
                println!("{}: ok", path.display());
            }
        }

        if show || !validate {
            println!("# {}", path.display());
            print!("{}", self.config.to_toml()?);
        }

        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderBinding;

    const SPEC: &str = r#"
name = "prog"

[[options]]
flags = ["-v", "--verbose"]

[[options]]
flags = ["--color"]
nargs = "?"
choices = ["auto", "always", "never"]

[[subcommands]]
name = "build"

[[subcommands.positionals]]
name = "target"
choices = ["debug", "release"]
"#;

    fn cli(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv.iter().copied()).unwrap();
        CliInterface {
            args,
            config: Config::default(),
        }
    }

    fn spec_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.toml");
        fs::write(&path, SPEC).unwrap();
        (dir, path)
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cli_args_generate() {
        let args = CliArgs::try_parse_from([
            "tabgen", "generate", "prog.toml", "--shell", "zsh", "-o", "_prog",
        ])
        .unwrap();
        match args.command {
            Commands::Generate {
                spec,
                shell,
                output,
                ..
            } => {
                assert_eq!(spec, PathBuf::from("prog.toml"));
                assert_eq!(shell, Some(Shell::Zsh));
                assert_eq!(output, Some(PathBuf::from("_prog")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_args_complete_words() {
        let args =
            CliArgs::try_parse_from(["tabgen", "complete", "prog.toml", "--", "build", "-"])
                .unwrap();
        match args.command {
            Commands::Complete { words: w, line, .. } => {
                assert_eq!(w, words(&["build", "-"]));
                assert!(line.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_args_require_subcommand() {
        assert!(CliArgs::try_parse_from(["tabgen"]).is_err());
        assert!(CliArgs::try_parse_from(["tabgen", "completion", "tcsh"]).is_err());
    }

    #[test]
    fn test_logging_args_override_config() {
        let mut config = Config::default();
        let args = CliArgs::try_parse_from(["tabgen", "-v", "version"]).unwrap();
        CliInterface::apply_logging_args(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Debug);

        let args = CliArgs::try_parse_from(["tabgen", "version", "--vv"]).unwrap();
        CliInterface::apply_logging_args(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Trace);

        let mut config = Config::default();
        let args = CliArgs::try_parse_from(["tabgen", "version"]).unwrap();
        CliInterface::apply_logging_args(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_complete_spec_words() {
        let (_dir, path) = spec_file();
        let cli = cli(&["tabgen", "version"]);

        assert_eq!(
            cli.complete_spec(&path, None, &words(&["b"]), false).unwrap(),
            words(&["build"])
        );
        assert_eq!(
            cli.complete_spec(&path, None, &words(&["build", ""]), false)
                .unwrap(),
            words(&["debug", "release"])
        );
        assert_eq!(
            cli.complete_spec(&path, None, &[], false).unwrap(),
            words(&["build"])
        );
    }

    #[test]
    fn test_complete_spec_line_and_case() {
        let (_dir, path) = spec_file();
        let cli = cli(&["tabgen", "version"]);

        assert_eq!(
            cli.complete_spec(&path, Some("prog --color "), &[], false)
                .unwrap(),
            words(&["auto", "always", "never"])
        );
        assert!(
            cli.complete_spec(&path, None, &words(&["B"]), false)
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            cli.complete_spec(&path, None, &words(&["B"]), true).unwrap(),
            words(&["build"])
        );
    }

    #[test]
    fn test_render_spec_with_preamble() {
        let (dir, path) = spec_file();
        let preamble = dir.path().join("pre.sh");
        fs::write(&preamble, "_prog_hosts() { echo local; }\n").unwrap();

        let cli = cli(&["tabgen", "version"]);
        let script = cli
            .render_spec(&path, Shell::Bash, Some("p"), Some(preamble.as_path()), false)
            .unwrap();
        assert!(script.contains("_prog_hosts() { echo local; }"));
        assert!(script.ends_with("complete -F _tabgen_p 'p'\n"));
    }

    #[test]
    fn test_render_spec_uses_config_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.json");
        fs::write(
            &path,
            r#"{"name": "prog", "positionals": [{"provider": "hosts"}]}"#,
        )
        .unwrap();

        let mut cli = cli(&["tabgen", "version"]);
        let unbound = cli
            .render_spec(&path, Shell::Bash, None, None, false)
            .unwrap();
        assert!(!unbound.contains("_my_hosts"));

        cli.config.providers.insert(
            "hosts".to_string(),
            ProviderBinding {
                bash: Some("_my_hosts".to_string()),
                ..Default::default()
            },
        );
        let bound = cli
            .render_spec(&path, Shell::Bash, None, None, false)
            .unwrap();
        assert!(bound.contains("['prog pos_0']=$'_my_hosts'"));
    }

    #[test]
    fn test_inspect_spec() {
        let (_dir, path) = spec_file();
        let cli = cli(&["tabgen", "version"]);
        let json: serde_json::Value =
            serde_json::from_str(&cli.inspect_spec(&path).unwrap()).unwrap();
        assert_eq!(json["root"], "prog");
        assert_eq!(json["subcommands"]["prog"][0], "build");
    }

    #[test]
    fn test_missing_spec_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(&["tabgen", "version"]);
        let err = cli.inspect_spec(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, TabgenError::Io(_)));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/etc/x")), PathBuf::from("/etc/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/pre.sh")), home.join("pre.sh"));
        }
    }
}
