//! Trainer configuration.
//!
//! Loaded from `~/.git-trainer/config.toml`. Every key is optional; a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::graph::Author;

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Name recorded on every commit.
    pub author_name: String,

    pub author_email: String,

    /// Activity started when `--activity` is not given.
    pub default_activity: Option<String>,

    /// Where the session database and custom activities live.
    /// Defaults to `~/.git-trainer/`.
    pub state_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author_name: "Git Trainer User".to_string(),
            author_email: "user@example.com".to_string(),
            default_activity: None,
            state_dir: None,
        }
    }
}

impl Config {
    /// Load config from `~/.git-trainer/config.toml`.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.author_name.trim().is_empty() {
            return Err(format!(
                "author-name is empty in {}\n\
                 Set it to the name your commits should carry.",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.git-trainer/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".git-trainer").join("config.toml"))
    }

    pub fn author(&self) -> Author {
        Author {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.author().name, "Git Trainer User");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "author-name = \"Ada\"\ndefault-activity = \"act-2\"\nstate-dir = \"/tmp/trainer\"\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.author_name, "Ada");
        assert_eq!(config.author_email, "user@example.com");
        assert_eq!(config.default_activity.as_deref(), Some("act-2"));
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/trainer")));
    }

    #[test]
    fn malformed_file_names_its_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "author-name = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("config.toml"));
    }

    #[test]
    fn empty_author_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "author-name = \"  \"\n").unwrap();
        assert!(Config::load_from(&path).unwrap_err().contains("author-name"));
    }
}
