//! CLI command definitions

use capdispatch_domain::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Colored, human-oriented text
    Human,
    /// Pretty-printed JSON
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Human => OutputFormat::Human,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for capdispatch
#[derive(Parser, Debug)]
#[command(name = "capdispatch")]
#[command(author, version, about = "Validate and dispatch calls to named capabilities")]
#[command(long_about = r#"
capdispatch exposes named capabilities with declared input schemas.
Every call is validated against the schema before it runs, and every
outcome is reported as the same envelope: succeeded, output or error,
elapsed time, timestamp and metadata.

Configuration files are loaded from (in priority order):
1. --config <path>                       Explicit config file
2. CAPDISPATCH_* environment variables   e.g. CAPDISPATCH_DISPATCH__TIMEOUT_SECS=5
3. ./capdispatch.toml                    Project-level config
4. ~/.config/capdispatch/config.toml     Global config

Example:
  capdispatch list
  capdispatch describe echo
  capdispatch call echo --args '{"message": "hello", "uppercase": true}'
  capdispatch validate wait --args '{"ms": -1}'
  capdispatch --output json schema
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Output format (default: from config, else human)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputArg>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered capabilities
    List,

    /// Show a capability's schema, usage and examples
    Describe {
        /// Capability name
        name: String,
    },

    /// Export JSON Schema tool definitions
    Schema {
        /// Only this capability (default: all)
        name: Option<String>,
    },

    /// Validate arguments without executing
    Validate {
        /// Capability name
        name: String,

        #[command(flatten)]
        input: ArgsInput,
    },

    /// Validate and execute a capability
    Call {
        /// Capability name
        name: String,

        #[command(flatten)]
        input: ArgsInput,

        /// Deadline in seconds (default: from config; 0 = none)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Suppress the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Show configuration sources, resolved values and issues
    Config,
}

/// Where call arguments come from. Neither flag means `{}`.
#[derive(Args, Debug, Clone, Default)]
pub struct ArgsInput {
    /// Arguments as a JSON object
    #[arg(short, long, value_name = "JSON", conflicts_with = "args_file")]
    pub args: Option<String>,

    /// Read the JSON arguments from a file (`-` for stdin)
    #[arg(long, value_name = "PATH")]
    pub args_file: Option<PathBuf>,
}

impl ArgsInput {
    /// Raw JSON text, or `None` when no arguments were given.
    pub fn read(&self) -> std::io::Result<Option<String>> {
        match (&self.args, &self.args_file) {
            (Some(json), _) => Ok(Some(json.clone())),
            (None, Some(path)) if path.as_os_str() == "-" => {
                std::io::read_to_string(std::io::stdin()).map(Some)
            }
            (None, Some(path)) => std::fs::read_to_string(path).map(Some),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call() {
        let cli = Cli::parse_from([
            "capdispatch",
            "-vv",
            "--output",
            "json",
            "call",
            "echo",
            "--args",
            r#"{"message":"hi"}"#,
            "--timeout",
            "5",
        ]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputArg::Json));
        match cli.command {
            Command::Call {
                name,
                input,
                timeout,
                no_progress,
            } => {
                assert_eq!(name, "echo");
                assert_eq!(input.read().unwrap().as_deref(), Some(r#"{"message":"hi"}"#));
                assert_eq!(timeout, Some(5));
                assert!(!no_progress);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["capdispatch", "list", "--no-config", "-o", "human"]);
        assert!(cli.no_config);
        assert_eq!(cli.output.map(OutputFormat::from), Some(OutputFormat::Human));
    }

    #[test]
    fn test_args_and_args_file_conflict() {
        let result = Cli::try_parse_from([
            "capdispatch",
            "validate",
            "echo",
            "--args",
            "{}",
            "--args-file",
            "args.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_file() {
        let dir = std::env::temp_dir().join(format!("capdispatch-args-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("args.json");
        std::fs::write(&path, r#"{"ms": 10}"#).unwrap();

        let input = ArgsInput {
            args: None,
            args_file: Some(path),
        };
        assert_eq!(input.read().unwrap().as_deref(), Some(r#"{"ms": 10}"#));
        assert_eq!(ArgsInput::default().read().unwrap(), None);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
