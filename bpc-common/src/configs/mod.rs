use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// A structure to hold environment settings. Backed by settings.json file in the
/// current directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    pub output_directory: String,
    pub database_url: Option<String>,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: true,
            working_directory: String::new(),
            output_directory: String::new(),
            database_url: None,
        }
    }
}

impl Configs {
    pub fn new() -> Configs {
        Configs::default()
    }

    /// The configured database url, or one built from the `POSTGRES_HOST`,
    /// `POSTGRES_PORT`, `POSTGRES_DATABASE`, `POSTGRES_USER` and
    /// `POSTGRES_PASSWORD` environment variables.
    pub fn resolve_database_url(&self) -> Option<String> {
        if let Some(url) = &self.database_url {
            if !url.trim().is_empty() {
                return Some(url.clone());
            }
        }
        database_url_from_env(|key| env::var(key).ok())
    }
}

pub(crate) fn database_url_from_env<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("POSTGRES_HOST")?;
    let database = lookup("POSTGRES_DATABASE")?;
    let user = lookup("POSTGRES_USER")?;
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());
    let password = lookup("POSTGRES_PASSWORD").unwrap_or_default();
    Some(format!(
        "host={} port={} dbname={} user={} password={}",
        host, port, database, user, password
    ))
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

/// Reads settings.json from the given directory. A missing file yields defaults.
pub fn read_configs(dir: &Path) -> Result<Configs> {
    match fs::read_to_string(settings_path(dir)) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(_) => Ok(Configs::new()),
    }
}

pub fn write_configs(configs: &Configs, dir: &Path) -> Result<()> {
    let configs_json = serde_json::to_string_pretty(configs)?;
    fs::write(settings_path(dir), configs_json)?;
    Ok(())
}

pub fn get_configs() -> Result<Configs> {
    read_configs(&env::current_dir()?)
}

pub fn save_configs(configs: &Configs) -> Result<()> {
    write_configs(configs, &env::current_dir()?)
}

#[cfg(test)]
mod test {
    use super::{database_url_from_env, read_configs, write_configs, Configs};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let configs = read_configs(dir.path()).unwrap();
        assert_eq!(configs, Configs::new());
    }

    #[test]
    fn test_round_trip_through_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut configs = Configs::new();
        configs.verbose_mode = false;
        configs.working_directory = "/data/lidar".to_string();
        configs.database_url = Some("host=localhost dbname=uk".to_string());
        write_configs(&configs, dir.path()).unwrap();
        assert_eq!(read_configs(dir.path()).unwrap(), configs);
        assert_eq!(
            configs.resolve_database_url(),
            Some("host=localhost dbname=uk".to_string())
        );
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"verbose_mode": false}"#).unwrap();
        let configs = read_configs(dir.path()).unwrap();
        assert!(!configs.verbose_mode);
        assert!(configs.database_url.is_none());
    }

    #[test]
    fn test_database_url_from_env() {
        let url = database_url_from_env(|key| match key {
            "POSTGRES_HOST" => Some("db".to_string()),
            "POSTGRES_DATABASE" => Some("buildings".to_string()),
            "POSTGRES_USER" => Some("bpc".to_string()),
            _ => None,
        });
        assert_eq!(
            url,
            Some("host=db port=5432 dbname=buildings user=bpc password=".to_string())
        );
        assert!(database_url_from_env(|_| None).is_none());
    }
}
