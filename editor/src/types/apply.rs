//! Apply result types

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP statuses the registry returns for a successful update
pub const SUCCESS_STATUSES: [u16; 2] = [200, 204];

/// Why a single update did not go through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureReason {
    /// Registry answered with a non-success status
    Status(u16),
    /// Request never produced a response
    Transport(String),
}

/// Failed update, rendered as `"<id>: <status-code>"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyFailure {
    pub id: i64,
    pub reason: FailureReason,
}

impl fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::Status(code) => write!(f, "{}: {}", self.id, code),
            FailureReason::Transport(message) => write!(f, "{}: {}", self.id, message),
        }
    }
}

/// Outcome of one apply run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    pub succeeded: usize,
    /// Failures in the order the updates were attempted
    pub failures: Vec<ApplyFailure>,
}

impl ApplySummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure lines as `"<id>: <status-code>"`
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_uses_status_code() {
        let failure = ApplyFailure { id: 42, reason: FailureReason::Status(500) };
        assert_eq!(failure.to_string(), "42: 500");
    }

    #[test]
    fn test_failure_display_uses_transport_message() {
        let failure = ApplyFailure {
            id: 7,
            reason: FailureReason::Transport("connection refused".to_string()),
        };
        assert_eq!(failure.to_string(), "7: connection refused");
    }

    #[test]
    fn test_summary_counts() {
        let summary = ApplySummary {
            succeeded: 2,
            failures: vec![ApplyFailure { id: 9, reason: FailureReason::Status(404) }],
        };

        assert_eq!(summary.attempted(), 3);
        assert!(!summary.is_clean());
        assert_eq!(summary.failure_lines(), vec!["9: 404".to_string()]);
    }
}
