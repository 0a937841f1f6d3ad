// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for remit.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Deserialize into [`RemitConfig`]
//! 4. Apply `REMIT_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! REMIT_PAYMENTS_PORT=6001
//! REMIT_EMPLOYEE_ENABLED=false
//! REMIT_PAYMENTS_ORIGIN=https://pay.example.com
//! REMIT_JWT_SECRET=...
//! REMIT_BCRYPT_COST=13
//! REMIT_CSRF_SECURE_COOKIE=true
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{PortalConfig, RemitConfig, SecretValue};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Looks up an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn process_env() -> EnvLookup {
    Arc::new(|name| std::env::var(name).ok())
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for remit.
///
/// # Examples
///
/// ```no_run
/// use remit_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("remit.yaml").unwrap();
/// ```
#[derive(Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,

    /// Source of environment values.
    env: EnvLookup,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("env_prefix", &self.env_prefix)
            .field("resolve_env_vars", &self.resolve_env_vars)
            .finish_non_exhaustive()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: "REMIT".to_string(),
            resolve_env_vars: true,
            env: process_env(),
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Replaces the process environment with a custom lookup.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<RemitConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let mut config = self.parse_content(&content, format).map_err(|e| match e {
            ConfigError::Serialization {
                message,
                line: Some(line),
            } => ConfigError::parse_at_line(path, message, line),
            ConfigError::Serialization { message, line: None } => ConfigError::parse(path, message),
            other => other,
        })?;

        self.finish(&mut config)?;

        info!("Configuration loaded successfully");
        debug!(
            payments = config.payments.enabled,
            employee = config.employee.enabled,
            seeded_employees = config.seed.employees.len(),
            "Portal configuration"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<RemitConfig> {
        let mut config = self.parse_content(content, format)?;
        self.finish(&mut config)?;
        Ok(config)
    }

    fn finish(&self, config: &mut RemitConfig) -> ConfigResult<()> {
        if self.resolve_env_vars {
            self.apply_env_overrides(config)?;
        }
        config.validate()
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(&self, content: &str, format: ConfigFormat) -> ConfigResult<RemitConfig> {
        if self.resolve_env_vars {
            parse_str(&self.resolve_env_placeholders(content)?, format)
        } else {
            parse_str(content, format)
        }
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports the format: `${VAR_NAME}` or `${VAR_NAME:default}`.
    /// An unset variable without a default is an error.
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                return Ok(result);
            };

            let inner = &after[..end];
            let (name, default) = match inner.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (inner, None),
            };

            match ((self.env)(name), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!("Environment variable '{}' not found", name);
                    return Err(ConfigError::env_var_not_found(name));
                }
            }
            rest = &after[end + 1..];
        }

        result.push_str(rest);
        Ok(result)
    }

    fn var(&self, suffix: &str) -> Option<(String, String)> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        (self.env)(&name).map(|value| (name, value))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut RemitConfig) -> ConfigResult<()> {
        self.apply_portal_overrides("PAYMENTS", &mut config.payments)?;
        self.apply_portal_overrides("EMPLOYEE", &mut config.employee)?;

        if let Some((_, value)) = self.var("JWT_SECRET") {
            config.security.jwt.secret = Some(SecretValue::new(value));
        }
        if let Some((name, value)) = self.var("BCRYPT_COST") {
            config.security.password.bcrypt_cost = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected an integer"))?;
        }
        if let Some((_, value)) = self.var("CSRF_SECURE_COOKIE") {
            config.security.csrf.secure_cookie = parse_bool(&value);
        }

        Ok(())
    }

    fn apply_portal_overrides(&self, section: &str, portal: &mut PortalConfig) -> ConfigResult<()> {
        if let Some((name, value)) = self.var(&format!("{}_PORT", section)) {
            let port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
            portal.port = Some(port);
        }
        if let Some((_, value)) = self.var(&format!("{}_ENABLED", section)) {
            portal.enabled = parse_bool(&value);
        }
        if let Some((_, value)) = self.var(&format!("{}_ORIGIN", section)) {
            let origin = value.trim().to_string();
            if !origin.is_empty() && !portal.allowed_origins.contains(&origin) {
                portal.allowed_origins.push(origin);
            }
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    env: Option<EnvLookup>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Reads variables from the given map instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: std::collections::HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.env = Some(Arc::new(move |name| vars.get(name).cloned()));
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(env) = self.env {
            loader.env = env;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| {
            match e.span() {
                Some(span) => ConfigError::serialization_at_line(
                    e.message(),
                    line_of(content, span.start),
                ),
                None => ConfigError::serialization(e.to_string()),
            }
        }),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| {
            if e.line() > 0 {
                ConfigError::serialization_at_line(e.to_string(), e.line())
            } else {
                ConfigError::serialization(e.to_string())
            }
        }),
    }
}

/// One-based line number of a byte offset.
fn line_of(content: &str, offset: usize) -> usize {
    content
        .as_bytes()
        .iter()
        .take(offset)
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Parses a string to bool.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

/// YAML parsing through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
///
/// # Examples
///
/// ```no_run
/// use remit_config::loader::load_config;
///
/// let config = load_config("remit.yaml").unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<RemitConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<RemitConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
