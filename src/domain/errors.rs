//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Every variant exposes a stable
//! string code; the HTTP adapter maps client errors to 4xx and the rest to 500.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Skill precondition or request body rejected.
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Skill output failed its postcondition.
    #[error("{skill} postcondition failed: {message}")]
    Postcondition {
        skill: &'static str,
        message: String,
    },

    #[error("AI request failed: {0}")]
    Ai(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn postcondition(skill: &'static str, message: impl Into<String>) -> Self {
        DomainError::Postcondition {
            skill,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { code, .. } => code,
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Postcondition { .. } => "POSTCONDITION_FAILED",
            DomainError::Ai(_) => "AI_ERROR",
            DomainError::Repo(_) => "REPO_ERROR",
            DomainError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True when the caller is at fault (bad input or unknown resource).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. } | DomainError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let e = DomainError::validation("CONTENT_TOO_SHORT", "need more words");
        assert_eq!(e.code(), "CONTENT_TOO_SHORT");
        assert_eq!(e.to_string(), "need more words");
        assert!(e.is_client_error());

        let e = DomainError::Ai("timeout".into());
        assert_eq!(e.code(), "AI_ERROR");
        assert!(!e.is_client_error());
    }
}
