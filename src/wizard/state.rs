//! Wizard steps, session data and the shared busy flag

use crate::api::{ExtractionResult, Schema, UploadedFile};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Upload = 0,
    Schema = 1,
    Process = 2,
    Results = 3,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Upload, Step::Schema, Step::Process, Step::Results];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Upload => "Upload PDF",
            Step::Schema => "Select Schema",
            Step::Process => "Process Document",
            Step::Results => "View Results",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Step::Upload => "Upload your PDF document",
            Step::Schema => "Select or create extraction schema",
            Step::Process => "Process your document",
            Step::Results => "Review and export results",
        }
    }

    pub fn previous(self) -> Option<Step> {
        self.index()
            .checked_sub(1)
            .and_then(|i| Step::ALL.get(i).copied())
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Step {} of {}: {}",
            self.index() + 1,
            Step::ALL.len(),
            self.label()
        )
    }
}

/// Everything collected during one pass through the wizard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub session_id: Option<String>,
    pub uploaded_file: Option<UploadedFile>,
    pub selected_schema: Option<Schema>,
    /// Immutable server response of the last successful processing call
    pub results: Option<Vec<ExtractionResult>>,
    pub result_id: Option<String>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        *self == Session::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-visible notification raised by a wizard action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Observable "a long call is in flight" flag
#[derive(Debug, Clone, Default)]
pub struct ProcessingFlag(Arc<AtomicBool>);

impl ProcessingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag, or `None` if it is already raised.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }
}

/// Lowers the processing flag when dropped
#[must_use = "the processing flag is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_navigation() {
        assert_eq!(Step::Upload.previous(), None);
        assert_eq!(Step::Results.previous(), Some(Step::Process));
        assert_eq!(Step::Schema.index(), 1);
        assert_eq!(Step::Process.to_string(), "Step 3 of 4: Process Document");
    }

    #[test]
    fn test_processing_flag_guard() {
        let flag = ProcessingFlag::default();
        let observer = flag.clone();

        let guard = flag.try_begin().unwrap();
        assert!(observer.is_set());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!observer.is_set());
        assert!(flag.try_begin().is_some());
    }

    #[test]
    fn test_empty_session() {
        let mut session = Session::default();
        assert!(session.is_empty());
        session.session_id = Some("s".to_string());
        assert!(!session.is_empty());
    }
}
