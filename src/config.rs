use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::DEFAULT_ITERATIONS;

/// Application-level constants
pub const APP_NAME: &str = "StrokeCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Development fallback for `SECRET_KEY`. Startup warns when it is in use.
pub const DEFAULT_SECRET_KEY: &str = "change_me_dev_key";

const DEFAULT_DB_PATH: &str = "stroke_project.db";
const DEFAULT_DOCUMENT_DB_PATH: &str = "stroke_project_documents.db";
const DEFAULT_ALLERGY_COLLECTION: &str = "allergies";
const DEFAULT_ASSESSMENT_COLLECTION: &str = "assessments";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_SEED_CSV: &str = "seeded_dataset.csv";
const DEFAULT_SESSION_IDLE_MINUTES: u64 = 480;

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "strokecare=info,tower_http=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: Zeroizing<String>,
    pub db_path: PathBuf,
    pub document_db_path: PathBuf,
    pub allergy_collection: String,
    pub assessment_collection: String,
    pub bind_addr: SocketAddr,
    pub password_iterations: u32,
    pub seed_csv: PathBuf,
    pub session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let text = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let bind_addr = text("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr.trim().parse().map_err(|e| ConfigError::Invalid {
            name: "BIND_ADDR",
            reason: format!("{e}"),
        })?;

        let password_iterations = match get("PASSWORD_ITERATIONS") {
            Some(raw) => parse_positive("PASSWORD_ITERATIONS", &raw)?,
            None => DEFAULT_ITERATIONS,
        };

        let idle_minutes = match get("SESSION_IDLE_MINUTES") {
            Some(raw) => parse_positive::<u64>("SESSION_IDLE_MINUTES", &raw)?,
            None => DEFAULT_SESSION_IDLE_MINUTES,
        };
        let session_idle = idle_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or(ConfigError::Invalid {
                name: "SESSION_IDLE_MINUTES",
                reason: "too large".into(),
            })?;

        Ok(Self {
            secret_key: Zeroizing::new(text("SECRET_KEY", DEFAULT_SECRET_KEY)),
            db_path: text("DB_PATH", DEFAULT_DB_PATH).into(),
            document_db_path: text("DOCUMENT_DB_PATH", DEFAULT_DOCUMENT_DB_PATH).into(),
            allergy_collection: text("ALLERGY_COLLECTION", DEFAULT_ALLERGY_COLLECTION),
            assessment_collection: text("ASSESSMENT_COLLECTION", DEFAULT_ASSESSMENT_COLLECTION),
            bind_addr,
            password_iterations,
            seed_csv: text("SEED_CSV", DEFAULT_SEED_CSV).into(),
            session_idle,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key.as_str() == DEFAULT_SECRET_KEY
    }

    /// Marker recording that seeding already ran, kept beside the relational database.
    pub fn seed_marker_path(&self) -> PathBuf {
        let dir = self
            .db_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        dir.join(".seed_has_run")
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a positive integer, got {raw:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert!(config.uses_default_secret());
        assert_eq!(config.db_path, PathBuf::from("stroke_project.db"));
        assert_eq!(config.document_db_path, PathBuf::from("stroke_project_documents.db"));
        assert_eq!(config.allergy_collection, "allergies");
        assert_eq!(config.assessment_collection, "assessments");
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.password_iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.session_idle, Duration::from_secs(480 * 60));
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("SECRET_KEY", "s3cret"),
            ("DB_PATH", "/data/records.db"),
            ("ALLERGY_COLLECTION", "allergy_docs"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("PASSWORD_ITERATIONS", "1000"),
            ("SESSION_IDLE_MINUTES", "5"),
        ])
        .unwrap();
        assert!(!config.uses_default_secret());
        assert_eq!(config.allergy_collection, "allergy_docs");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.password_iterations, 1000);
        assert_eq!(config.session_idle, Duration::from_secs(300));
        assert_eq!(config.seed_marker_path(), PathBuf::from("/data/.seed_has_run"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("SECRET_KEY", "  "), ("DB_PATH", "")]).unwrap();
        assert!(config.uses_default_secret());
        assert_eq!(config.db_path, PathBuf::from("stroke_project.db"));
        assert_eq!(config.seed_marker_path(), PathBuf::from(".seed_has_run"));
    }

    #[test]
    fn malformed_numbers_rejected() {
        assert!(matches!(
            config(&[("PASSWORD_ITERATIONS", "0")]),
            Err(ConfigError::Invalid { name: "PASSWORD_ITERATIONS", .. })
        ));
        assert!(matches!(
            config(&[("SESSION_IDLE_MINUTES", "soon")]),
            Err(ConfigError::Invalid { name: "SESSION_IDLE_MINUTES", .. })
        ));
        assert!(matches!(
            config(&[("SESSION_IDLE_MINUTES", u64::MAX.to_string().as_str())]),
            Err(ConfigError::Invalid { name: "SESSION_IDLE_MINUTES", .. })
        ));
        assert!(matches!(
            config(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn app_name_is_strokecare() {
        assert_eq!(APP_NAME, "StrokeCare");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
