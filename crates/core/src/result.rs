use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::DocumentKind;

/// Rows of string cells. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// What a single extraction engine produced. Engines never raise past their
/// adapter; a fault is carried as `Failed` with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum EngineOutcome {
    Extracted(String),
    Failed(String),
}

impl EngineOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, EngineOutcome::Failed(_))
    }

    /// Display text: the extracted text, or the failure reason.
    pub fn as_text(&self) -> &str {
        match self {
            EngineOutcome::Extracted(text) | EngineOutcome::Failed(text) => text,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            EngineOutcome::Failed(reason) => Some(reason),
            EngineOutcome::Extracted(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    pub engine: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Every engine produced text (possibly empty).
    Success,
    /// At least one engine failed and at least one succeeded.
    Partial,
    /// No engine produced text.
    Failed,
}

impl ExtractionStatus {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a EngineOutcome>) -> Self {
        let (mut ok, mut failed) = (0usize, 0usize);
        for outcome in outcomes {
            if outcome.is_failed() {
                failed += 1;
            } else {
                ok += 1;
            }
        }
        match (ok, failed) {
            (_, 0) => ExtractionStatus::Success,
            (0, _) => ExtractionStatus::Failed,
            _ => ExtractionStatus::Partial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success => "success",
            ExtractionStatus::Partial => "partial",
            ExtractionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The product of running extraction on one uploaded document.
///
/// `text` is the flattened display string and is always present; `status`
/// and `failures` keep engine faults machine-detectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub kind: DocumentKind,
    pub text: String,
    pub tables: Vec<Table>,
    pub status: ExtractionStatus,
    pub failures: Vec<EngineFailure>,
}

impl ExtractionResult {
    /// Combine already-rendered text and tables with the per-engine outcomes
    /// they were built from.
    pub fn assemble(
        kind: DocumentKind,
        text: String,
        tables: Vec<Table>,
        runs: &[(&str, &EngineOutcome)],
    ) -> Self {
        let status = ExtractionStatus::from_outcomes(runs.iter().map(|(_, o)| *o));
        let failures = runs
            .iter()
            .filter_map(|(engine, outcome)| {
                outcome.failure_reason().map(|reason| EngineFailure {
                    engine: engine.to_string(),
                    reason: reason.to_string(),
                })
            })
            .collect();
        Self { kind, text, tables, status, failures }
    }

    /// Single-engine image result: the OCR text verbatim, or the failure reason.
    pub fn from_image(engine: &str, outcome: &EngineOutcome) -> Self {
        Self::assemble(
            DocumentKind::Image,
            outcome.as_text().to_string(),
            Vec::new(),
            &[(engine, outcome)],
        )
    }

    /// A result for a run that never reached the engines (e.g. it timed out).
    pub fn failed(kind: DocumentKind, engine: &str, reason: impl Into<String>) -> Self {
        let outcome = EngineOutcome::Failed(reason.into());
        Self::assemble(kind, outcome.as_text().to_string(), Vec::new(), &[(engine, &outcome)])
    }
}
