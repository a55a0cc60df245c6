use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::password::BCRYPT_COST_RANGE;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
}

/// Environment variables and the keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("DATABASE_PATH", "database.path"),
    ("SESSION_TTL_HOURS", "auth.session_ttl_hours"),
    ("BCRYPT_COST", "auth.bcrypt_cost"),
];

impl Settings {
    /// Defaults, then `settings.toml`, then environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.request_timeout_secs", 60)?
            .set_default("database.path", "agora.db")?
            .set_default("auth.session_ttl_hours", 24)?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?;

        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Running from the workspace root during development
        let dev_path = PathBuf::from("agora-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would only fail once requests arrive
    fn validate(&self) -> Result<(), ConfigError> {
        self.session_ttl()?;
        if !BCRYPT_COST_RANGE.contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                self.auth.bcrypt_cost
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Session lifetime. Must be positive and leave session expiries
    /// representable as timestamps.
    pub fn session_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        let hours = self.auth.session_ttl_hours;
        chrono::Duration::try_hours(hours)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "auth.session_ttl_hours is out of range, got {hours}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let settings = Settings::new().expect("Failed to load settings");

        assert!(!settings.server.host.is_empty());
        assert!(settings.auth.bcrypt_cost >= 4);
        assert_eq!(
            settings.request_timeout(),
            Duration::from_secs(settings.server.request_timeout_secs)
        );
        assert_eq!(
            settings.session_ttl().unwrap(),
            chrono::Duration::hours(settings.auth.session_ttl_hours)
        );
    }

    fn settings_with(session_ttl_hours: i64, bcrypt_cost: u32) -> Settings {
        Settings {
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: 60,
            },
            database: Database {
                path: ":memory:".to_string(),
            },
            auth: Auth {
                session_ttl_hours,
                bcrypt_cost,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        let settings = settings_with(24, 4);
        assert_eq!(settings.bind_address(), "127.0.0.1:8080");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_session_ttl_out_of_range_is_rejected() {
        for hours in [0, -1, i64::MAX, 10_000_000_000] {
            let settings = settings_with(hours, 4);
            assert!(settings.session_ttl().is_err(), "{hours} hours accepted");
            assert!(settings.validate().is_err());
        }
    }

    #[test]
    fn test_bcrypt_cost_out_of_range_is_rejected() {
        assert!(settings_with(24, 3).validate().is_err());
        assert!(settings_with(24, 32).validate().is_err());
        assert!(settings_with(24, 31).validate().is_ok());
    }
}
