//! Editing session: Idle -> FileLoaded -> PreviewGenerated -> ConfirmPending -> Applied
//!
//! Every transition is an explicit user action. The payload lives inside the
//! session value and is handed from the preview stage to the apply stage.

use tracing::{debug, info};

use crate::error::{ParseError, SessionError};
use crate::services::applier::apply_updates;
use crate::services::csv_import::parse_devices_with_delimiter;
use crate::services::reconciler::reconcile;
use crate::services::registry::DeviceRegistry;
use crate::services::report::confirm_question;
use crate::types::{ApplySummary, DeviceRow, ReconcileReport};

/// CSV file held by the session
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub filename: String,
    pub rows: Vec<DeviceRow>,
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    FileLoaded {
        file: LoadedFile,
    },
    PreviewGenerated {
        file: LoadedFile,
        report: ReconcileReport,
    },
    ConfirmPending {
        file: LoadedFile,
        report: ReconcileReport,
    },
    Applied {
        file: LoadedFile,
        report: ReconcileReport,
        summary: ApplySummary,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileLoaded { .. } => "file loaded",
            SessionState::PreviewGenerated { .. } => "preview generated",
            SessionState::ConfirmPending { .. } => "awaiting confirmation",
            SessionState::Applied { .. } => "applied",
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Latest reconciliation report, if a preview exists
    pub fn report(&self) -> Option<&ReconcileReport> {
        match &self.state {
            SessionState::PreviewGenerated { report, .. }
            | SessionState::ConfirmPending { report, .. }
            | SessionState::Applied { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Load a CSV file. Allowed in any state; drops any previous preview.
    ///
    /// A file that fails to parse leaves the session untouched.
    pub fn load_file(&mut self, filename: &str, content: &[u8], delimiter: u8) -> Result<usize, ParseError> {
        let rows = parse_devices_with_delimiter(content, delimiter)?;
        let count = rows.len();

        info!("Loaded {} ({} rows)", filename, count);

        if let SessionState::Applied { summary, .. } = &self.state {
            debug!(
                "Replacing applied session ({} of {} updates succeeded)",
                summary.succeeded,
                summary.attempted()
            );
        }

        self.state = SessionState::FileLoaded {
            file: LoadedFile {
                filename: filename.to_string(),
                rows,
            },
        };
        Ok(count)
    }

    /// Reconcile the loaded rows against the registry
    pub async fn generate_preview(
        &mut self,
        registry: &dyn DeviceRegistry,
    ) -> Result<ReconcileReport, SessionError> {
        let file = match std::mem::take(&mut self.state) {
            SessionState::FileLoaded { file } | SessionState::PreviewGenerated { file, .. } => file,
            other => return Err(self.reject(other, "generate a preview")),
        };

        let report = reconcile(registry, &file.rows).await;
        self.state = SessionState::PreviewGenerated {
            file,
            report: report.clone(),
        };
        Ok(report)
    }

    /// Ask for confirmation; returns the question to show the user
    pub fn request_apply(&mut self) -> Result<String, SessionError> {
        match std::mem::take(&mut self.state) {
            SessionState::PreviewGenerated { file, report } => {
                if !report.has_changes() {
                    self.state = SessionState::PreviewGenerated { file, report };
                    return Err(SessionError::NothingToApply);
                }
                let question = confirm_question(report.payload.len());
                self.state = SessionState::ConfirmPending { file, report };
                Ok(question)
            }
            other => Err(self.reject(other, "request apply")),
        }
    }

    /// Back out of the confirmation step
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        match std::mem::take(&mut self.state) {
            SessionState::ConfirmPending { file, report } => {
                info!("Apply cancelled");
                self.state = SessionState::PreviewGenerated { file, report };
                Ok(())
            }
            other => Err(self.reject(other, "cancel")),
        }
    }

    /// Send the confirmed payload to the registry
    pub async fn confirm_apply(
        &mut self,
        registry: &dyn DeviceRegistry,
    ) -> Result<ApplySummary, SessionError> {
        let (file, report) = match std::mem::take(&mut self.state) {
            SessionState::ConfirmPending { file, report } => (file, report),
            other => return Err(self.reject(other, "apply")),
        };

        info!("Applying {} changes from {}", report.payload.len(), file.filename);
        let summary = apply_updates(registry, &report.payload).await;
        self.state = SessionState::Applied {
            file,
            report,
            summary: summary.clone(),
        };
        Ok(summary)
    }

    /// Put `state` back and build the transition error
    fn reject(&mut self, state: SessionState, action: &'static str) -> SessionError {
        let err = SessionError::InvalidTransition {
            action,
            state: state.name(),
        };
        self.state = state;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::registry::mock::{remote_device, MockRegistry};

    const CSV: &[u8] = b"name,id,latitude,longitude,metadata\n\
                         Sensor A,5,55.01,12.0,\n\
                         Sensor B,6,56.0,10.0,\n";

    fn registry() -> MockRegistry {
        MockRegistry::new()
            .with_device(remote_device(5, "Sensor A", 55.0, 12.0, None))
            .with_device(remote_device(6, "Sensor B", 56.0, 10.0, None))
    }

    #[tokio::test]
    async fn test_full_happy_path() {
        let registry = registry();
        let mut session = Session::new();
        assert_eq!(session.state().name(), "idle");

        assert_eq!(session.load_file("devices.csv", CSV, b',').unwrap(), 2);
        assert_eq!(session.state().name(), "file loaded");

        let report = session.generate_preview(&registry).await.unwrap();
        assert_eq!(report.changed_count, 1);
        assert_eq!(report.total_count, 2);
        assert_eq!(session.report().map(|r| r.payload.len()), Some(1));

        let question = session.request_apply().unwrap();
        assert_eq!(question, "Are you sure you want to change 1 devices?");
        assert_eq!(session.state().name(), "awaiting confirmation");

        let summary = session.confirm_apply(&registry).await.unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(session.state().name(), "applied");
        assert_eq!(registry.updates().len(), 1);
        assert_eq!(registry.updates()[0].id, 5);
    }

    #[tokio::test]
    async fn test_cancel_returns_to_preview_without_network_calls() {
        let registry = registry();
        let mut session = Session::new();
        session.load_file("devices.csv", CSV, b',').unwrap();
        session.generate_preview(&registry).await.unwrap();
        session.request_apply().unwrap();

        session.cancel().unwrap();

        assert_eq!(session.state().name(), "preview generated");
        assert!(registry.updates().is_empty());
        assert!(session.report().is_some());
    }

    #[tokio::test]
    async fn test_apply_without_preview_is_rejected() {
        let registry = registry();
        let mut session = Session::new();

        let err = session.confirm_apply(&registry).await.unwrap_err();
        assert_eq!(err, SessionError::InvalidTransition { action: "apply", state: "idle" });

        session.load_file("devices.csv", CSV, b',').unwrap();
        assert!(session.request_apply().is_err());
        assert_eq!(session.state().name(), "file loaded");
    }

    #[tokio::test]
    async fn test_preview_requires_a_file() {
        let registry = registry();
        let mut session = Session::new();

        let err = session.generate_preview(&registry).await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidTransition { state: "idle", .. }));
        assert!(registry.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_apply_keeps_preview() {
        let registry = registry();
        let mut session = Session::new();
        let unchanged = b"name,id,latitude,longitude\nSensor B,6,56.0,10.0\n";
        session.load_file("same.csv", unchanged, b',').unwrap();
        session.generate_preview(&registry).await.unwrap();

        assert_eq!(session.request_apply().unwrap_err(), SessionError::NothingToApply);
        assert_eq!(session.state().name(), "preview generated");
    }

    #[tokio::test]
    async fn test_applied_restarts_only_through_a_new_file() {
        let registry = registry();
        let mut session = Session::new();
        session.load_file("devices.csv", CSV, b',').unwrap();
        session.generate_preview(&registry).await.unwrap();
        session.request_apply().unwrap();
        session.confirm_apply(&registry).await.unwrap();

        assert!(session.generate_preview(&registry).await.is_err());
        assert_eq!(session.state().name(), "applied");

        session.load_file("devices.csv", CSV, b',').unwrap();
        assert_eq!(session.state().name(), "file loaded");
        assert!(session.report().is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_aborts_before_network_activity() {
        let registry = registry();
        let mut session = Session::new();

        let result = session.load_file("broken.csv", b"name,id\nA,1\n", b',');

        assert!(matches!(result, Err(ParseError::MissingColumn("latitude"))));
        assert_eq!(session.state().name(), "idle");
        assert!(session.generate_preview(&registry).await.is_err());
        assert!(registry.fetched().is_empty());
    }
}
