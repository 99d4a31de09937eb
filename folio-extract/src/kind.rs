//! Supported document layouts and the pipeline each one runs

use folio_core::{
    extract_document, AggregateError, BankStatement, PageAggregator, PageSource, PremiumClosing,
    ReinsuranceClosing, RunConfig, RunReport,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::llm::ChatBackend;
use crate::requester::ModelRequester;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Generic bank statement with a transaction list
    Bank,
    /// Insurance premium closing statement
    Closing,
    /// Reinsurance closing / bordereau
    Bordereau,
    /// Multi-page account statement, extracted page by page
    Account,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Bank,
        DocumentKind::Closing,
        DocumentKind::Bordereau,
        DocumentKind::Account,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Bank => "bank",
            DocumentKind::Closing => "closing",
            DocumentKind::Bordereau => "bordereau",
            DocumentKind::Account => "account",
        }
    }

    pub fn default_output(&self) -> &'static str {
        match self {
            DocumentKind::Bank => "output.json",
            DocumentKind::Closing => "closing_data.json",
            DocumentKind::Bordereau => "validated_output.json",
            DocumentKind::Account => "account_statement_output.json",
        }
    }

    /// Whether the document is requested page by page rather than in one go
    pub fn is_paged(&self) -> bool {
        matches!(self, DocumentKind::Account)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        DocumentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                format!("unknown document kind '{s}' (expected bank, closing, bordereau or account)")
            })
    }
}

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub kind: DocumentKind,
    pub output: PathBuf,
    /// Rows written (entries or transactions); 1 for single-record documents
    pub records: usize,
    /// Per-page report, for paged kinds
    pub report: Option<RunReport>,
}

/// Run the pipeline for `kind` over `doc`, writing to `config.output_path`.
pub fn run<B: ChatBackend>(
    kind: DocumentKind,
    doc: &dyn PageSource,
    requester: ModelRequester<B>,
    config: &RunConfig,
) -> Result<RunSummary, AggregateError> {
    let output = config.output_path.clone();
    let (records, report) = match kind {
        DocumentKind::Account => {
            let aggregated = PageAggregator::new(config, requester).aggregate(doc)?;
            (aggregated.statement.entries.len(), Some(aggregated.report))
        }
        DocumentKind::Bank => {
            let s: BankStatement = extract_document(doc, &requester, &output)?;
            (s.transactions.len(), None)
        }
        DocumentKind::Closing => {
            extract_document::<PremiumClosing, _>(doc, &requester, &output)?;
            (1, None)
        }
        DocumentKind::Bordereau => {
            extract_document::<ReinsuranceClosing, _>(doc, &requester, &output)?;
            (1, None)
        }
    };

    Ok(RunSummary {
        kind,
        output,
        records,
        report,
    })
}
