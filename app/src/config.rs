use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::{
    Result,
    eyre::{bail, eyre},
};
use domain::core::{DuplicateLoginPolicy, FormConfig};
use domain::user::CorruptStorePolicy;

lazy_static::lazy_static! {
    pub static ref PROJECT_NAME: String = String::from("Signbook").to_uppercase();
}

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_TABLE: &str = "signbook_slots";
const SLOT_FILE_NAME: &str = "slots.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    File(PathBuf),
    Postgres { url: String, table: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub form: FormConfig,
}

impl AppConfig {
    /// Read the configuration from the environment, after loading `.env` if present
    /// # Errors
    /// Returns an error if a variable holds a value that cannot be used
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source
    /// # Errors
    /// Returns an error if a variable holds a value that cannot be used
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(format!("{}_{name}", PROJECT_NAME.as_str()).as_str());

        let bind = var("BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .map_err(|_| eyre!("BIND must be an address like 127.0.0.1:3000"))?;

        let data_dir = var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| get_data_dir(&lookup));

        let storage = match var("STORAGE").as_deref().unwrap_or("file") {
            "file" => StorageBackend::File(data_dir.join(SLOT_FILE_NAME)),
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres {
                url: lookup("DATABASE_URL")
                    .ok_or_else(|| eyre!("DATABASE_URL must be set for postgres storage"))?,
                table: var("TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            },
            other => bail!("STORAGE must be file, postgres or memory, got {other:?}"),
        };

        let defaults = FormConfig::default();
        let form = FormConfig {
            message_ttl: millis(var("MESSAGE_TTL_MS"), "MESSAGE_TTL_MS")?
                .unwrap_or(defaults.message_ttl),
            redirect_delay: millis(var("REDIRECT_DELAY_MS"), "REDIRECT_DELAY_MS")?
                .unwrap_or(defaults.redirect_delay),
            post_login_destination: match var("POST_LOGIN") {
                Some(target) if target.is_empty() => None,
                Some(target) => Some(target),
                None => defaults.post_login_destination,
            },
            duplicate_login_policy: match var("DUPLICATE_POLICY").as_deref() {
                None | Some("reject") => DuplicateLoginPolicy::RejectTaken,
                Some("redirect") => DuplicateLoginPolicy::RedirectToLogin,
                Some(other) => bail!("DUPLICATE_POLICY must be reject or redirect, got {other:?}"),
            },
            corrupt_store_policy: match var("CORRUPT_POLICY").as_deref() {
                None | Some("fail-open") => CorruptStorePolicy::FailOpen,
                Some("reject") => CorruptStorePolicy::Reject,
                Some(other) => bail!("CORRUPT_POLICY must be fail-open or reject, got {other:?}"),
            },
            validation: defaults.validation,
        };

        Ok(Self {
            bind,
            data_dir,
            storage,
            form,
        })
    }
}

fn millis(value: Option<String>, name: &str) -> Result<Option<Duration>> {
    value
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| eyre!("{name} must be a number of milliseconds"))
        })
        .transpose()
}

/// Get the data directory for the application
fn get_data_dir(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    let project_name = PROJECT_NAME.clone().to_lowercase();

    if let Some(data_dir) = lookup("XDG_DATA_HOME") {
        PathBuf::from(data_dir).join(&project_name)
    } else if let Some(home_dir) = lookup("HOME") {
        PathBuf::from(home_dir)
            .join(".local")
            .join("share")
            .join(&project_name)
    } else {
        // Fallback to current directory if no home directory is found
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&project_name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("HOME", "/home/alice")]).unwrap();

        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(
            config.data_dir,
            PathBuf::from("/home/alice/.local/share/signbook")
        );
        assert_eq!(
            config.storage,
            StorageBackend::File(PathBuf::from(
                "/home/alice/.local/share/signbook/slots.json"
            ))
        );
        assert_eq!(config.form.message_ttl, Duration::from_millis(3000));
        assert_eq!(config.form.redirect_delay, Duration::from_millis(1000));
        assert_eq!(
            config.form.post_login_destination.as_deref(),
            Some("/messages")
        );
        assert_eq!(
            config.form.duplicate_login_policy,
            DuplicateLoginPolicy::RejectTaken
        );
    }

    #[test]
    fn test_xdg_wins_over_home() {
        let config = config_from(&[("HOME", "/home/alice"), ("XDG_DATA_HOME", "/data")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/signbook"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SIGNBOOK_BIND", "0.0.0.0:8080"),
            ("SIGNBOOK_DATA_DIR", "/srv/signbook"),
            ("SIGNBOOK_MESSAGE_TTL_MS", "500"),
            ("SIGNBOOK_POST_LOGIN", ""),
            ("SIGNBOOK_DUPLICATE_POLICY", "redirect"),
            ("SIGNBOOK_CORRUPT_POLICY", "reject"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(
            config.storage,
            StorageBackend::File(PathBuf::from("/srv/signbook/slots.json"))
        );
        assert_eq!(config.form.message_ttl, Duration::from_millis(500));
        assert_eq!(config.form.post_login_destination, None);
        assert_eq!(
            config.form.duplicate_login_policy,
            DuplicateLoginPolicy::RedirectToLogin
        );
        assert_eq!(config.form.corrupt_store_policy, CorruptStorePolicy::Reject);
    }

    #[test]
    fn test_postgres_needs_url() {
        assert!(config_from(&[("HOME", "/h"), ("SIGNBOOK_STORAGE", "postgres")]).is_err());

        let config = config_from(&[
            ("HOME", "/h"),
            ("SIGNBOOK_STORAGE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/signbook"),
        ])
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Postgres {
                url: "postgres://localhost/signbook".into(),
                table: "signbook_slots".into(),
            }
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("SIGNBOOK_STORAGE", "redis")]).is_err());
        assert!(config_from(&[("SIGNBOOK_REDIRECT_DELAY_MS", "soon")]).is_err());
        assert!(config_from(&[("SIGNBOOK_BIND", "nowhere")]).is_err());
        assert!(config_from(&[("SIGNBOOK_DUPLICATE_POLICY", "allow")]).is_err());
    }

    #[test]
    fn test_error_names_the_variable() {
        let error = config_from(&[("HOME", "/h"), ("SIGNBOOK_CORRUPT_POLICY", "ignore")])
            .unwrap_err()
            .to_string();
        assert!(error.contains("CORRUPT_POLICY must be fail-open or reject"));
        assert!(error.contains("\"ignore\""));
    }
}
