use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use ticketload_config::{ConfigLoader, Credentials, LogLevel, TicketloadConfig};
use ticketload_http::{ApiClient, ApiResponse, ClientConfig, HttpMethod};
use ticketload_logging::{init_logging_from_config, init_simple_tracing};
use tracing::{debug, error, info, warn};

mod cli;
mod expect;
use cli::{Cli, Commands, ConfigCommands};
use expect::StatusExpectation;

/// Load configuration from file or environment, apply command-line overrides, then validate
///
/// Validation runs once at the end so `--env` and `--base-url` can repair a
/// target the file or environment got wrong.
fn load_config(cli: &Cli) -> Result<TicketloadConfig> {
    let loader = ConfigLoader::new();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            loader
                .load_unvalidated(Some(path))
                .with_context(|| format!("Failed to load configuration from {:?}", path))?
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .load_unvalidated(None::<&Path>)
                .context("Failed to load configuration from environment")?
        }
    };

    apply_cli_overrides(&mut config, cli)?;
    config.validate_all().context("Configuration is invalid")?;

    Ok(config)
}

fn apply_cli_overrides(config: &mut TicketloadConfig, cli: &Cli) -> Result<()> {
    if let Some(environment) = &cli.environment {
        config.target.environment = environment.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.target.base_url = Some(base_url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = LogLevel::from_str(level).map_err(|e| anyhow!(e))?;
    }
    Ok(())
}

fn build_client(config: &TicketloadConfig) -> Result<ApiClient> {
    let client_config =
        ClientConfig::try_from(config).context("Failed to derive client configuration")?;
    ApiClient::with_config(client_config).context("Failed to create API client")
}

fn require_credentials(config: &TicketloadConfig) -> Result<&Credentials> {
    config.target.credentials.as_ref().ok_or_else(|| {
        anyhow!(
            "No credentials configured. Set target.credentials or TICKETLOAD_AUTH_EMAIL and TICKETLOAD_AUTH_PASSWORD"
        )
    })
}

async fn login(client: &mut ApiClient, credentials: &Credentials) -> Result<()> {
    let authenticated = client
        .login(&credentials.email, &credentials.password)
        .await
        .with_context(|| format!("Could not reach {}", client.base_url()))?;

    if !authenticated {
        bail!("Login as {} was rejected", credentials.email);
    }
    Ok(())
}

/// Log in and confirm the backend accepts the issued token
async fn handle_check(config: &TicketloadConfig, endpoint: Option<&str>) -> Result<()> {
    let credentials = require_credentials(config)?;
    let mut client = build_client(config)?;
    let verify_path = endpoint.unwrap_or(&config.target.verify_path);

    info!("Checking {} as {}", client.base_url(), credentials.email);
    login(&mut client, credentials).await?;
    println!("✅ Logged in to {} as {}", client.base_url(), credentials.email);

    let response = client.get(verify_path, None).await?;
    if !response.is_success() {
        error!("Token verification returned {}", response.status());
        bail!(
            "Token verification at {} failed with status {}",
            verify_path,
            response.status()
        );
    }

    println!("✅ Token accepted by {} ({})", verify_path, response.status());
    Ok(())
}

/// Send one request and judge its status against the expectation
async fn handle_request(
    config: &TicketloadConfig,
    method: HttpMethod,
    endpoint: &str,
    json: Option<&str>,
    params: &[(String, String)],
    expectation: StatusExpectation,
    no_auth: bool,
) -> Result<()> {
    let body = json
        .map(|raw| serde_json::from_str::<JsonValue>(raw))
        .transpose()
        .context("--json is not valid JSON")?;

    let mut client = build_client(config)?;
    if no_auth {
        debug!("Skipping login");
    } else {
        login(&mut client, require_credentials(config)?).await?;
    }

    let query: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let response = client.send(method, endpoint, &query, body.as_ref()).await?;

    println!("{} {} -> {}", method, client.url_for(endpoint), response.status());
    print_body(&response);

    if !expectation.is_met_by(response.status()) {
        bail!(
            "Unexpected status {} (expected {})",
            response.status(),
            expectation
        );
    }
    Ok(())
}

fn print_body(response: &ApiResponse) {
    if response.body().is_empty() {
        return;
    }
    match response.json::<JsonValue>() {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", response.text()),
        },
        Err(_) => println!("{}", response.text()),
    }
}

/// Validate a configuration file as written, ignoring `TICKETLOAD_*` variables
fn handle_config_validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        bail!("Configuration file not found: {:?}", config_file);
    }

    let checked = ConfigLoader::read_file(config_file).and_then(|config| {
        config.validate_all()?;
        Ok(config)
    });

    match checked {
        Ok(config) => {
            println!("✅ Configuration file is valid");
            if let Ok(base_url) = config.target.resolve_base_url() {
                println!("🎯 Target: {} ({})", base_url, config.target.environment);
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handle sample configuration generation
fn handle_config_sample(output: Option<&PathBuf>, force: bool) -> Result<()> {
    let sample = TicketloadConfig::generate_sample();

    let Some(output) = output else {
        print!("{}", sample);
        return Ok(());
    };

    if output.exists() && !force {
        bail!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        );
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(output, sample).context("Failed to write configuration file")?;

    println!("✅ Sample configuration generated at: {:?}", output);
    println!(
        "🔧 Validate with: ticketload config validate --config-file {:?}",
        output
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands work on files that may not load, so they skip the config-driven logging
    if let Commands::Config { config_cmd } = &cli.command {
        init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
        return match config_cmd {
            ConfigCommands::Sample { output, force } => handle_config_sample(output.as_ref(), *force),
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
        };
    }

    let config = load_config(&cli)?;
    init_logging_from_config(&config.logging)?;
    info!("ticketload starting against environment {}", config.target.environment);

    let result = match &cli.command {
        Commands::Check { endpoint } => handle_check(&config, endpoint.as_deref()).await,
        Commands::Request {
            method,
            endpoint,
            json,
            params,
            expect,
            no_auth,
        } => {
            handle_request(
                &config,
                *method,
                endpoint,
                json.as_deref(),
                params,
                StatusExpectation::new(expect.iter().copied()),
                *no_auth,
            )
            .await
        }
        Commands::Config { .. } => Ok(()),
    };

    if let Err(e) = &result {
        warn!("Command failed: {:#}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_overrides_replace_target_and_level() {
        let cli = parse(&[
            "ticketload",
            "--env",
            "staging",
            "--base-url",
            "http://127.0.0.1:9000",
            "--log-level",
            "trace",
            "check",
        ]);
        let mut config = TicketloadConfig::default();

        apply_cli_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.target.environment, "staging");
        assert_eq!(config.target.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let cli = parse(&["ticketload", "--log-level", "loud", "check"]);
        let mut config = TicketloadConfig::default();
        assert!(apply_cli_overrides(&mut config, &cli).is_err());
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let config = TicketloadConfig::default();
        let err = require_credentials(&config).unwrap_err();
        assert!(err.to_string().contains("TICKETLOAD_AUTH_EMAIL"));
    }

    #[test]
    fn test_sample_written_once_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs").join("ticketload.yaml");

        handle_config_sample(Some(&path), false).unwrap();
        handle_config_validate(&path).unwrap();

        assert!(handle_config_sample(Some(&path), false).is_err());
        assert!(handle_config_sample(Some(&path), true).is_ok());
    }

    #[test]
    fn test_base_url_flag_repairs_unknown_environment() {
        let cli = parse(&["ticketload", "--base-url", "http://127.0.0.1:9000", "check"]);

        temp_env::with_var("TICKETLOAD_ENVIRONMENT", Some("prod"), || {
            let config = load_config(&cli).unwrap();
            assert_eq!(config.target.environment, "prod");
            assert_eq!(
                config.target.resolve_base_url().unwrap(),
                "http://127.0.0.1:9000"
            );
        });
    }

    #[test]
    fn test_env_flag_replaces_unknown_environment() {
        let cli = parse(&["ticketload", "--env", "staging", "check"]);

        temp_env::with_vars(
            [
                ("TICKETLOAD_ENVIRONMENT", Some("prod")),
                ("TICKETLOAD_BASE_URL", None),
            ],
            || {
                let config = load_config(&cli).unwrap();
                assert_eq!(config.target.environment, "staging");
            },
        );
    }

    #[test]
    fn test_unknown_environment_without_override_still_fails() {
        let cli = parse(&["ticketload", "check"]);

        temp_env::with_vars(
            [
                ("TICKETLOAD_ENVIRONMENT", Some("prod")),
                ("TICKETLOAD_BASE_URL", None),
            ],
            || {
                let err = load_config(&cli).unwrap_err();
                assert!(format!("{:#}", err).contains("prod"));
            },
        );
    }

    #[test]
    fn test_validate_ignores_shell_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketload.yaml");
        handle_config_sample(Some(&path), false).unwrap();

        temp_env::with_vars(
            [
                ("TICKETLOAD_AUTH_EMAIL", Some("qa@example.com")),
                ("TICKETLOAD_AUTH_PASSWORD", None),
                ("TICKETLOAD_ENVIRONMENT", Some("prod")),
            ],
            || {
                handle_config_validate(&path).unwrap();
            },
        );
    }

    #[test]
    fn test_validate_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "target:\n  environment: nowhere\n").unwrap();

        assert!(handle_config_validate(&path).is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(handle_config_validate(&dir.path().join("absent.yaml")).is_err());
    }
}
