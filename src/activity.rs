//! Activity runtime: which scenario is being played and what it permits.
//!
//! The [`Registry`] holds the built-in activities plus any custom ones read
//! from `<state-root>/activities/*.toml`. A session selects one activity when
//! it starts and never changes it afterwards.

mod builtin;
mod seed;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::model::ActivityConfig;

pub use builtin::builtin_activities;
pub use seed::{apply_seed_files, seed_files_from_dir, seed_target};

/// Directory below the state root holding custom activity files.
pub const ACTIVITIES_DIR: &str = "activities";

/// The message shown instead of running a command the activity does not allow.
pub fn blocked_message(command_key: &str) -> String {
    format!(
        "Command '{command_key}' is not available in this activity.\n\
         Type 'help' to see what you can use here."
    )
}

/// True when `activity` (if any) lets `command_key` run.
pub fn is_allowed(activity: Option<&ActivityConfig>, command_key: &str) -> bool {
    activity.is_none_or(|a| a.allows(command_key))
}

/// Every activity a session can be started with.
#[derive(Debug, Clone)]
pub struct Registry {
    activities: Vec<ActivityConfig>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            activities: builtin_activities(),
        }
    }

    /// The built-ins plus custom activities from `<state_root>/activities/`.
    ///
    /// A custom activity reusing a built-in id is ignored. A missing
    /// directory is not an error; an unreadable or invalid file is.
    pub fn load(state_root: &Path) -> Result<Self, String> {
        let mut registry = Self::builtin();
        let dir = state_root.join(ACTIVITIES_DIR);
        if !dir.is_dir() {
            return Ok(registry);
        }

        let mut paths: Vec<_> = fs::read_dir(&dir)
            .map_err(|e| format!("failed to read {}: {e}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        for path in paths {
            let contents = fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            let activity: ActivityConfig = toml::from_str(&contents)
                .map_err(|e| format!("invalid activity at {}: {e}", path.display()))?;
            if registry.get(&activity.id).is_some() {
                info!(id = %activity.id, path = %path.display(), "custom activity shadowed by existing id");
                continue;
            }
            debug!(id = %activity.id, "custom activity loaded");
            registry.activities.push(activity);
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&ActivityConfig> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn all(&self) -> &[ActivityConfig] {
        &self.activities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_activity_allows_everything() {
        assert!(is_allowed(None, "git push"));
        let registry = Registry::builtin();
        let act1 = registry.get("act-1");
        assert!(is_allowed(act1, "git commit"));
        assert!(!is_allowed(act1, "git push"));
    }

    #[test]
    fn blocked_message_names_the_key() {
        assert!(blocked_message("git push").starts_with("Command 'git push' is not available"));
    }

    #[test]
    fn load_without_directory_is_builtin_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let registry = Registry::load(dir.path()).unwrap();
        assert_eq!(registry.all().len(), builtin_activities().len());
    }

    #[test]
    fn load_adds_custom_activities() {
        let dir = tempfile::TempDir::new().unwrap();
        let activities = dir.path().join(ACTIVITIES_DIR);
        fs::create_dir_all(&activities).unwrap();
        fs::write(
            activities.join("tags.toml"),
            r#"
id = "custom-tags"
title = "Tags"
description = "Free play"
allowed-commands = ["help", "git init", "git status"]
solution = ["git init"]

[[seed-files]]
path = "notes.md"
content = "hello"

[[missions]]
id = "first"
title = "First commit"
description = "Commit anything"
validator-key = "m14"
"#,
        )
        .unwrap();
        fs::write(activities.join("ignored.txt"), "not toml").unwrap();

        let registry = Registry::load(dir.path()).unwrap();
        let custom = registry.get("custom-tags").unwrap();
        assert!(custom.allows("git status"));
        assert!(!custom.allows("git commit"));
        assert!(!custom.show_editor);
        assert_eq!(custom.seed_files[0].path, "notes.md");
        assert_eq!(custom.missions[0].validator_key, "m14");
    }

    #[test]
    fn builtin_ids_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let activities = dir.path().join(ACTIVITIES_DIR);
        fs::create_dir_all(&activities).unwrap();
        fs::write(
            activities.join("act-1.toml"),
            "id = \"act-1\"\ntitle = \"Impostor\"\ndescription = \"\"\n",
        )
        .unwrap();
        let registry = Registry::load(dir.path()).unwrap();
        assert_ne!(registry.get("act-1").unwrap().title, "Impostor");
        assert_eq!(registry.all().len(), builtin_activities().len());
    }

    #[test]
    fn invalid_custom_file_names_its_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let activities = dir.path().join(ACTIVITIES_DIR);
        fs::create_dir_all(&activities).unwrap();
        fs::write(activities.join("broken.toml"), "id = ").unwrap();
        let err = Registry::load(dir.path()).unwrap_err();
        assert!(err.contains("broken.toml"));
    }
}
