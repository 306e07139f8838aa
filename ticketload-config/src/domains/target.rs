//! Target backend configuration

use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_path, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which backend is under test and how to authenticate against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Name of the environment preset to use when no `base_url` is given
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Explicit base URL; takes precedence over the environment preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Known environments and their base URLs
    #[serde(default = "default_environments")]
    pub environments: BTreeMap<String, String>,

    /// Login endpoint accepting `{email, password}`
    #[serde(default = "default_auth_path")]
    pub auth_path: String,

    /// Endpoint answering 200 for a valid bearer token
    #[serde(default = "default_verify_path")]
    pub verify_path: String,

    /// Account used by the simulated users
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

/// Login credentials
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            base_url: None,
            environments: default_environments(),
            auth_path: default_auth_path(),
            verify_path: default_verify_path(),
            credentials: None,
        }
    }
}

impl TargetConfig {
    /// The base URL requests are resolved against
    pub fn resolve_base_url(&self) -> ConfigResult<String> {
        if let Some(ref url) = self.base_url {
            return Ok(url.clone());
        }

        self.environments
            .get(&self.environment)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownEnvironment {
                name: self.environment.clone(),
                known: self
                    .environments
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (name, url) in &self.environments {
            validate_url(url, &format!("environments.{}", name), self.domain_name())?;
        }

        let base_url = self.resolve_base_url()?;
        validate_url(&base_url, "base_url", self.domain_name())?;

        validate_path(&self.auth_path, "auth_path", self.domain_name())?;
        validate_path(&self.verify_path, "verify_path", self.domain_name())?;

        if let Some(ref credentials) = self.credentials {
            credentials.validate()?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

impl Validatable for Credentials {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.email, "email", self.domain_name())?;
        validate_required_string(&self.password, "password", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "target.credentials"
    }
}

fn default_environment() -> String {
    "local".to_string()
}

fn default_environments() -> BTreeMap<String, String> {
    [
        ("local", "http://localhost:8080"),
        (
            "azure",
            "https://backend-tickets.lemonfield-074f6e94.westus2.azurecontainerapps.io",
        ),
        ("dev", "https://dev-api.systicket.com"),
        ("staging", "https://staging-api.systicket.com"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), url.to_string()))
    .collect()
}

fn default_auth_path() -> String {
    "/api/auth/login".to_string()
}

fn default_verify_path() -> String {
    "/api/auth/verify-token".to_string()
}
