//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use toolgate_config::ConfigOverrides;
use toolgate_primitives::{DiscoveryStrategy, Mode};

/// Expose an OpenAPI-described service as agent tools.
#[derive(Debug, Parser)]
#[command(name = "toolgate", author, version, about)]
#[command(long_about = r#"
Loads an OpenAPI description, groups its operations into categories and
serves them as tools. In safe mode only GET operations are listed or
callable.

Configuration is merged from (lowest to highest priority):
  built-in defaults, ./toolgate.toml or --config, TOOLGATE_* variables,
  AIRFLOW_BASE_URL / AUTH_TOKEN, command-line flags.

Example:
  toolgate --base-url http://localhost:8080/api/v1 categories
  toolgate --unsafe tools --category DAG
  toolgate call get_dags --args '{"limit": 5}'
"#)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Upstream API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Bearer token sent to the upstream API
    #[arg(long, global = true, value_name = "TOKEN")]
    pub auth_token: Option<String>,

    /// Only expose read-only operations
    #[arg(long, global = true, conflicts_with = "unsafe_mode")]
    pub safe: bool,

    /// Expose every operation, including mutating ones
    #[arg(long = "unsafe", global = true)]
    pub unsafe_mode: bool,

    /// List every visible operation up front instead of by category
    #[arg(long, global = true)]
    pub static_tools: bool,

    /// API description path or URL (defaults to <base-url>/openapi.json)
    #[arg(long, global = true, value_name = "PATH_OR_URL")]
    pub spec: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the category browser
    Categories,

    /// Print tool descriptors as JSON
    Tools {
        /// Category to enter before listing
        #[arg(long)]
        category: Option<String>,
    },

    /// Invoke a tool and print the outcome as JSON
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        args: String,
    },
}

impl GlobalArgs {
    /// Values that take precedence over every configuration layer.
    pub fn overrides(&self) -> ConfigOverrides {
        let mode = if self.unsafe_mode {
            Some(Mode::Full)
        } else if self.safe {
            Some(Mode::Restricted)
        } else {
            None
        };
        ConfigOverrides {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            mode,
            discovery: self.static_tools.then_some(DiscoveryStrategy::Flat),
            spec_source: self.spec.clone(),
            log_filter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::parse_from([
            "toolgate",
            "--unsafe",
            "--static-tools",
            "--base-url",
            "http://localhost:8080",
            "tools",
        ]);
        let overrides = cli.global.overrides();
        assert_eq!(overrides.mode, Some(Mode::Full));
        assert_eq!(overrides.discovery, Some(DiscoveryStrategy::Flat));
        assert_eq!(overrides.base_url.as_deref(), Some("http://localhost:8080"));
        assert!(matches!(cli.command, Command::Tools { category: None }));
    }

    #[test]
    fn unset_flags_leave_config_alone() {
        let cli = Cli::parse_from(["toolgate", "call", "get_dags"]);
        assert_eq!(cli.global.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn safe_and_unsafe_conflict() {
        assert!(Cli::try_parse_from(["toolgate", "--safe", "--unsafe", "categories"]).is_err());
    }
}
