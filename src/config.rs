//! Application configuration.
//!
//! Configuration is layered with [figment]: built-in defaults, then an
//! optional YAML file (`--config`), then environment variables prefixed with
//! `RIPPLE_` (nested fields separated by `__`, e.g. `RIPPLE_AUTH__PASSWORD__MIN_LENGTH`).

use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ripple", about = "Social platform backend")]
pub struct Args {
    /// Path to a YAML configuration file
    #[arg(long, env = "RIPPLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long, default_value_t = false)]
    pub validate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host address to bind the HTTP server to
    pub host: String,

    /// Port to bind the HTTP server to
    pub port: u16,

    /// PostgreSQL connection URL
    pub database_url: String,

    /// Database connection pool settings
    pub pool: PoolSettings,

    /// Authentication settings
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "postgres://localhost/ripple".to_string(),
            pool: PoolSettings::default(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self { max_connections: 10 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Minimum accepted password length
    pub min_length: usize,

    /// Maximum accepted password length
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl Config {
    /// Load configuration from defaults, optional YAML file, and environment.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = &args.config {
            figment = figment.merge(Yaml::file(path));
        }

        figment.merge(Env::prefixed("RIPPLE_").split("__"))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("database_url must not be empty");
        }
        if self.auth.password.min_length > self.auth.password.max_length {
            anyhow::bail!(
                "auth.password.min_length ({}) exceeds max_length ({})",
                self.auth.password.min_length,
                self.auth.password.max_length
            );
        }
        if self.pool.max_connections == 0 {
            anyhow::bail!("pool.max_connections must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn default_args() -> Args {
        Args { config: None, validate: false }
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&default_args()).unwrap();
            assert_eq!(config.port, 3000);
            assert_eq!(config.pool.max_connections, 10);
            assert_eq!(config.auth.password.min_length, 8);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("RIPPLE_PORT", "8080");
            jail.set_env("RIPPLE_DATABASE_URL", "postgres://db/ripple_test");
            jail.set_env("RIPPLE_AUTH__PASSWORD__MIN_LENGTH", "12");

            let config = Config::load(&default_args()).unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.database_url, "postgres://db/ripple_test");
            assert_eq!(config.auth.password.min_length, 12);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 4000
                auth:
                  password:
                    min_length: 10
                    max_length: 64
                "#,
            )?;

            let args = Args {
                config: Some(PathBuf::from("config.yaml")),
                validate: false,
            };
            let config = Config::load(&args).unwrap();
            assert_eq!(config.port, 4000);
            assert_eq!(config.auth.password.min_length, 10);
            assert_eq!(config.auth.password.max_length, 64);
            // Unspecified fields keep their defaults
            assert_eq!(config.host, "0.0.0.0");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_password_policy_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("RIPPLE_AUTH__PASSWORD__MIN_LENGTH", "200");

            let result = Config::load(&default_args());
            assert!(result.is_err());
            Ok(())
        });
    }
}
