//! Activity definitions: the scenario a session is played in.
//!
//! Built-in activities are defined in code; custom ones are read from TOML
//! files, so the field names are kebab-case like the config file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActivityConfig {
    pub id: String,
    pub title: String,
    pub description: String,

    /// Whether the activity expects the learner to edit files (`echo`).
    #[serde(default)]
    pub show_editor: bool,

    /// Command keys the learner may run. `None` allows everything.
    #[serde(default)]
    pub allowed_commands: Option<BTreeSet<String>>,

    #[serde(default)]
    pub seed_files: Vec<SeedFile>,

    #[serde(default)]
    pub missions: Vec<Mission>,

    /// A reference walkthrough. Lines starting with `#` are commentary.
    #[serde(default)]
    pub solution: Vec<String>,
}

impl ActivityConfig {
    pub fn allows(&self, command_key: &str) -> bool {
        self.allowed_commands
            .as_ref()
            .is_none_or(|allowed| allowed.contains(command_key))
    }
}

/// A file written into the repository when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

/// A learning objective, bound to a validator by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    pub validator_key: String,
    #[serde(default)]
    pub hint: Option<String>,
}
