use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use uuid::Uuid;

use crate::{
    error::SessionError,
    types::{ContentIdea, TrendReport},
};

/// Handle identifying one analysis run; only the newest may publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisTicket(u64);

#[derive(Default)]
struct ReportState {
    report: Option<Arc<TrendReport>>,
    selected: Option<usize>,
}

/// In-memory state for one interactive session.
///
/// Carries the model credential from an analysis to later script requests,
/// the current report and the selected content idea.
pub struct Session {
    session_id: Uuid,
    credential: Mutex<Option<String>>,
    state: Mutex<ReportState>,
    next_ticket: AtomicU64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            credential: Mutex::new(None),
            state: Mutex::new(ReportState::default()),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn capture_credential(&self, key: &str) {
        *self.credential.lock().expect("session credential poisoned") = Some(key.to_string());
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    pub fn credential(&self) -> Option<String> {
        self.credential
            .lock()
            .expect("session credential poisoned")
            .clone()
    }

    /// Start a new analysis, superseding any still in flight.
    pub fn begin_analysis(&self) -> AnalysisTicket {
        AnalysisTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: AnalysisTicket) -> bool {
        self.next_ticket.load(Ordering::SeqCst) == ticket.0
    }

    /// Install `report` if `ticket` is still the newest analysis.
    /// Replacing the report clears the idea selection.
    pub fn publish_report(&self, ticket: AnalysisTicket, report: TrendReport) -> Option<Arc<TrendReport>> {
        let mut state = self.state.lock().expect("session state poisoned");
        if !self.is_current(ticket) {
            return None;
        }
        let report = Arc::new(report);
        state.report = Some(Arc::clone(&report));
        state.selected = None;
        Some(report)
    }

    pub fn report(&self) -> Option<Arc<TrendReport>> {
        self.state.lock().expect("session state poisoned").report.clone()
    }

    pub fn select_idea(&self, index: usize) -> Result<(), SessionError> {
        let mut state = self.state.lock().expect("session state poisoned");
        let len = state
            .report
            .as_ref()
            .map(|report| report.content_ideas.len())
            .ok_or(SessionError::NoReport)?;
        if index >= len {
            return Err(SessionError::IdeaOutOfRange { index, len });
        }
        state.selected = Some(index);
        Ok(())
    }

    pub fn clear_selection(&self) {
        self.state.lock().expect("session state poisoned").selected = None;
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.lock().expect("session state poisoned").selected
    }

    pub fn selected_idea(&self) -> Result<ContentIdea, SessionError> {
        let state = self.state.lock().expect("session state poisoned");
        let report = state.report.as_ref().ok_or(SessionError::NoReport)?;
        let index = state.selected.ok_or(SessionError::NothingSelected)?;
        report
            .content_ideas
            .get(index)
            .cloned()
            .ok_or(SessionError::IdeaOutOfRange {
                index,
                len: report.content_ideas.len(),
            })
    }
}
