//! User feedback collection
//!
//! During a session the host may ask "how do you feel now?" and report
//! the answer here. The system keeps the history and offers an advisory
//! suggestion; it never drives the engine itself, the host decides
//! whether to act on it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackResponse {
    /// User reports having reached the target state
    Arrived,
    /// Not there yet, keep going
    NotYet,
    /// The change feels too abrupt
    TooFast,
}

/// What the host could do with the current session in response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSuggestion {
    /// Hold the current parameters; no further transition needed
    Stabilize,
    /// Re-issue the transition with a longer remaining window
    SlowDown,
    /// Let the running transition continue unchanged
    Continue,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedbackEntry {
    pub response: FeedbackResponse,
    pub elapsed_secs: f64,
}

#[derive(Debug, Default)]
pub struct FeedbackSystem {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, response: FeedbackResponse, elapsed_secs: f64) -> FeedbackSuggestion {
        self.entries.push(FeedbackEntry {
            response,
            elapsed_secs,
        });
        match response {
            FeedbackResponse::Arrived => FeedbackSuggestion::Stabilize,
            FeedbackResponse::TooFast => FeedbackSuggestion::SlowDown,
            FeedbackResponse::NotYet => FeedbackSuggestion::Continue,
        }
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }
}
