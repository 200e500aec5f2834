//! The portfolio form: entered rows, validation, submission and the resulting
//! display state.
//!
//! Network I/O is split out of the state machine: [`Composer::begin_analysis`]
//! clears the display, validates and hands back a ticketed [`Submission`];
//! whoever performs the request reports back through [`Composer::complete`].
//! Only the completion for the most recent submission is applied.

use crate::client::AnalysisService;
use crate::error::{AnalysisError, ValidationError};
use crate::model::{AnalysisRequest, AnalysisResult, AssetPayload};
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Symbol,
    Quantity,
}

/// One user-entered row of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetEntry {
    pub symbol: String,
    pub quantity: String,
}

impl AssetEntry {
    pub fn new(symbol: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: quantity.into(),
        }
    }

    /// The parsed quantity when it is a finite number greater than zero.
    pub fn positive_quantity(&self) -> Option<f64> {
        self.quantity
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite() && *q > 0.0)
    }

    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty() && self.positive_quantity().is_some()
    }
}

/// What the result area currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    #[default]
    Idle,
    Error(String),
    Ready(AnalysisResult),
}

/// A validated request waiting to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub ticket: u64,
    pub request: AnalysisRequest,
}

#[derive(Debug, Clone)]
pub struct Composer {
    entries: Vec<AssetEntry>,
    view: ViewState,
    issued: u64,
    pending: Option<u64>,
    analyzed_at: Option<DateTime<Local>>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Composer {
        Composer {
            entries: vec![AssetEntry::default()],
            view: ViewState::Idle,
            issued: 0,
            pending: None,
            analyzed_at: None,
        }
    }

    /// Starts from the given rows; an empty list yields the single blank row.
    pub fn with_entries(entries: Vec<AssetEntry>) -> Composer {
        let mut composer = Composer::new();
        if !entries.is_empty() {
            composer.entries = entries;
        }
        composer
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// True while the latest submission has not completed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn analyzed_at(&self) -> Option<DateTime<Local>> {
        self.analyzed_at
    }

    pub fn edit_entry(&mut self, index: usize, field: Field, value: impl Into<String>) {
        let Some(entry) = self.entries.get_mut(index) else {
            tracing::warn!(index, rows = self.entries.len(), "edit of a row that does not exist");
            return;
        };
        match field {
            Field::Symbol => entry.symbol = value.into(),
            Field::Quantity => entry.quantity = value.into(),
        }
    }

    pub fn add_row(&mut self) {
        self.entries.push(AssetEntry::default());
    }

    pub fn valid_entries(&self) -> Vec<&AssetEntry> {
        self.entries.iter().filter(|e| e.is_valid()).collect()
    }

    /// Clears the display, validates the rows and issues a submission.
    ///
    /// Every call supersedes earlier submissions, including a call that fails
    /// validation: without any valid row the display switches to the validation
    /// error and nothing is sent.
    pub fn begin_analysis(&mut self) -> Result<Submission, ValidationError> {
        self.view = ViewState::Idle;
        self.issued += 1;

        let assets: Vec<AssetPayload> = self
            .valid_entries()
            .into_iter()
            .map(|e| AssetPayload {
                symbol: e.symbol.clone(),
                quantity: e.quantity.clone(),
            })
            .collect();

        if assets.is_empty() {
            let err = ValidationError::NoValidAssets;
            tracing::info!(rows = self.entries.len(), "no valid asset to analyze");
            self.view = ViewState::Error(err.to_string());
            self.pending = None;
            return Err(err);
        }

        self.pending = Some(self.issued);
        tracing::debug!(ticket = self.issued, assets = assets.len(), "analysis issued");
        Ok(Submission {
            ticket: self.issued,
            request: AnalysisRequest { assets },
        })
    }

    /// Applies the outcome of a submission. Returns false when a newer
    /// submission has been issued since, in which case nothing changes.
    pub fn complete(
        &mut self,
        ticket: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if ticket != self.issued {
            tracing::debug!(ticket, latest = self.issued, "discarding stale analysis outcome");
            return false;
        }

        self.pending = None;
        self.view = match outcome {
            Ok(result) => {
                self.analyzed_at = Some(Local::now());
                ViewState::Ready(result)
            }
            Err(err) => {
                tracing::warn!(error = %err, "analysis failed");
                ViewState::Error(err.user_message())
            }
        };
        true
    }

    /// Runs a whole analysis against `service`, awaiting the response in place.
    pub async fn analyze<S>(&mut self, service: &S)
    where
        S: AnalysisService + ?Sized,
    {
        let Ok(submission) = self.begin_analysis() else {
            return;
        };
        let outcome = service.analyze(&submission.request).await;
        self.complete(submission.ticket, outcome);
    }
}
