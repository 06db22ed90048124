use serde::{Deserialize, Serialize};

/// What a mission validator reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<String>,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn pass_with(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self::from_errors(vec![error.into()])
    }

    /// Passes exactly when `errors` is empty.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            message: None,
        }
    }
}
