//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ticketload_http::HttpMethod;

#[derive(Parser, Debug)]
#[command(name = "ticketload", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Environment preset to target (local, azure, dev, staging, ...)
    #[arg(long = "env", value_name = "NAME", global = true)]
    pub environment: Option<String>,

    /// Base URL of the backend; overrides the environment preset
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with the configured credentials and verify the issued token
    Check {
        /// Endpoint to verify the token against (defaults to target.verify_path)
        #[arg(long, value_name = "PATH")]
        endpoint: Option<String>,
    },

    /// Send a single request and check its status
    Request {
        /// HTTP method (GET, POST, PUT, DELETE, ...)
        #[arg(value_name = "METHOD", value_parser = parse_method)]
        method: HttpMethod,

        /// Endpoint path, e.g. /api/tickets
        #[arg(value_name = "ENDPOINT")]
        endpoint: String,

        /// JSON body (example: --json '{"titulo":"Ticket"}')
        #[arg(long, value_name = "JSON")]
        json: Option<String>,

        /// Query parameter, repeatable (example: --param page=0)
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Status counted as success, repeatable; any 2xx when omitted
        #[arg(long = "expect", value_name = "STATUS")]
        expect: Vec<u16>,

        /// Skip login and send the request without a bearer token
        #[arg(long)]
        no_auth: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print or write a sample configuration file
    Sample {
        /// Output file path; stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },
}

fn parse_method(value: &str) -> Result<HttpMethod, String> {
    value.parse::<HttpMethod>().map_err(|e| e.to_string())
}

/// Split `key=value`; the value may itself contain `=`
fn parse_key_value(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", value))?;
    if key.is_empty() {
        return Err(format!("empty key in `{}`", value));
    }
    Ok((key.to_string(), val.to_string()))
}
