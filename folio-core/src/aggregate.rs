//! Page aggregation for multi-page statements, plus the single-request path
//! used by one-record documents.
//!
//! Pages are visited strictly in order, one request at a time. A page that
//! fails is logged, recorded and skipped. The header comes from the first page
//! that succeeds and is never replaced. Output is written only when at least
//! one page succeeded.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{HeaderPolicy, RunConfig};
use crate::requester::{ExtractionFailure, ExtractionRequester, PageExtractionError};
use crate::schema::DocumentSchema;
use crate::source::PageSource;
use crate::statement::{AccountStatement, StatementHeader};

#[derive(Debug, Error)]
pub enum AggregateError {
    /// Every page failed, or the document had none.
    #[error("could not extract data from any of {pages} page(s)")]
    NoPageSucceeded {
        pages: usize,
        failures: Vec<PageExtractionError>,
    },

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What happened to each page during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub pages: usize,
    /// Zero-based indices of pages that produced a record
    pub succeeded: Vec<usize>,
    pub failures: Vec<PageExtractionError>,
    /// Pages whose header disagreed with the captured one (warn-on-conflict only)
    pub header_conflicts: Vec<usize>,
}

/// Merged statement and its run report.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    pub statement: AccountStatement,
    pub report: RunReport,
}

pub struct PageAggregator<R> {
    requester: R,
    output_path: PathBuf,
    header_policy: HeaderPolicy,
}

impl<R> PageAggregator<R>
where
    R: ExtractionRequester<AccountStatement>,
{
    pub fn new(config: &RunConfig, requester: R) -> Self {
        Self {
            requester,
            output_path: config.output_path.clone(),
            header_policy: config.header_policy,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run every page through the requester and merge the results, without
    /// touching the filesystem.
    pub fn collect(&self, doc: &dyn PageSource) -> Result<Aggregated, AggregateError> {
        let pages = doc.page_count();
        let mut report = RunReport {
            pages,
            ..RunReport::default()
        };
        let mut header: Option<StatementHeader> = None;
        let mut entries = Vec::new();

        for page in 0..pages {
            info!(page = page + 1, of = pages, "processing page");
            let text = doc.page_text(page);
            debug!(page = page + 1, chars = text.len(), "page text extracted");

            let result = match self.requester.request(&text) {
                Ok(r) => r,
                Err(reason) => {
                    warn!(page = page + 1, error = %reason, "extraction failed, skipping page");
                    report.failures.push(PageExtractionError { page, reason });
                    continue;
                }
            };

            if let Some(first) = &header {
                if *first != result.header && self.header_policy == HeaderPolicy::WarnOnConflict {
                    warn!(
                        page = page + 1,
                        kept = ?first,
                        seen = ?result.header,
                        "header differs from first successful page; keeping first"
                    );
                    report.header_conflicts.push(page);
                }
            } else {
                header = Some(result.header);
            }

            debug!(page = page + 1, entries = result.entries.len(), "page extracted");
            entries.extend(result.entries);
            report.succeeded.push(page);
        }

        match header {
            Some(header) => Ok(Aggregated {
                statement: AccountStatement { header, entries },
                report,
            }),
            None => Err(AggregateError::NoPageSucceeded {
                pages,
                failures: report.failures,
            }),
        }
    }

    /// Collect, then write the merged statement to the configured output path.
    /// Nothing is written when no page succeeded.
    pub fn aggregate(&self, doc: &dyn PageSource) -> Result<Aggregated, AggregateError> {
        let aggregated = self.collect(doc)?;
        write_json(&self.output_path, &aggregated.statement)?;
        info!(
            path = %self.output_path.display(),
            pages = aggregated.report.pages,
            succeeded = aggregated.report.succeeded.len(),
            entries = aggregated.statement.entries.len(),
            "statement written"
        );
        Ok(aggregated)
    }
}

/// One request over the whole document text; the record is written to
/// `output` on success.
pub fn extract_document<T, R>(
    doc: &dyn PageSource,
    requester: &R,
    output: &Path,
) -> Result<T, AggregateError>
where
    T: DocumentSchema,
    R: ExtractionRequester<T>,
{
    let text = doc.full_text();
    info!(
        schema = T::NAME,
        pages = doc.page_count(),
        chars = text.len(),
        "requesting extraction"
    );

    let record = requester.request(&text).inspect_err(|e| {
        warn!(schema = T::NAME, error = %e, "extraction failed");
    })?;

    write_json(output, &record)?;
    info!(path = %output.display(), "record written");
    Ok(record)
}

/// Pretty-printed (2-space) JSON, UTF-8.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AggregateError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| AggregateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use crate::source::MemoryPages;
    use crate::statement::StatementEntry;
    use std::cell::RefCell;

    fn header(account: &str) -> StatementHeader {
        StatementHeader {
            account_number: account.to_string(),
            currency: "USD".to_string(),
            statement_date: "2024-03-31".to_string(),
            contact: "ops@example.com".to_string(),
            account_name: format!("Account {account}"),
        }
    }

    fn entry(id: &str) -> StatementEntry {
        StatementEntry {
            invoice_number: id.to_string(),
            assured: "Acme".to_string(),
            reference: format!("ref-{id}"),
            insurance_type: "Marine".to_string(),
            due_date: "2024-04-30".to_string(),
            gross: 100.0,
            net: 90.0,
        }
    }

    /// Page text is a key into canned outcomes: "ok:<account>:<ids>" or "fail".
    fn scripted(text: &str) -> Result<AccountStatement, ExtractionFailure> {
        let mut parts = text.split(':');
        match parts.next() {
            Some("ok") => {
                let account = parts.next().unwrap_or("");
                let entries = parts
                    .next()
                    .unwrap_or("")
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(entry)
                    .collect();
                Ok(AccountStatement {
                    header: header(account),
                    entries,
                })
            }
            _ => Err(ExtractionFailure::MalformedReply("not json".to_string())),
        }
    }

    fn config(output_path: PathBuf, header_policy: HeaderPolicy) -> RunConfig {
        RunConfig {
            document_path: PathBuf::from("statement.pdf"),
            output_path,
            page_timeout: None,
            credential: Credential::new("test"),
            header_policy,
        }
    }

    fn ids(s: &AccountStatement) -> Vec<&str> {
        s.entries.iter().map(|e| e.invoice_number.as_str()).collect()
    }

    #[test]
    fn test_three_page_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        let doc = MemoryPages::new(["ok:H:p1e1,p1e2", "fail", "ok:OTHER:p3e1"]);

        let agg = PageAggregator::new(&config(out.clone(), HeaderPolicy::FirstSuccess), scripted);
        let res = agg.aggregate(&doc).unwrap();

        assert_eq!(res.statement.header, header("H"));
        assert_eq!(ids(&res.statement), vec!["p1e1", "p1e2", "p3e1"]);
        assert_eq!(res.report.pages, 3);
        assert_eq!(res.report.succeeded, vec![0, 2]);
        assert_eq!(res.report.failures.len(), 1);
        assert_eq!(res.report.failures[0].page, 1);
        assert!(res.report.header_conflicts.is_empty());

        let written: AccountStatement =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written, res.statement);
    }

    #[test]
    fn test_header_from_first_success_not_first_page() {
        let doc = MemoryPages::new(["fail", "ok:SECOND:a", "ok:THIRD:b"]);
        let agg = PageAggregator::new(
            &config(PathBuf::from("unused.json"), HeaderPolicy::FirstSuccess),
            scripted,
        );
        let res = agg.collect(&doc).unwrap();
        assert_eq!(res.statement.header.account_number, "SECOND");
        assert_eq!(ids(&res.statement), vec!["a", "b"]);
    }

    #[test]
    fn test_warn_on_conflict_records_but_keeps_first() {
        let doc = MemoryPages::new(["ok:H:a", "ok:H:b", "ok:X:c"]);
        let agg = PageAggregator::new(
            &config(PathBuf::from("unused.json"), HeaderPolicy::WarnOnConflict),
            scripted,
        );
        let res = agg.collect(&doc).unwrap();
        assert_eq!(res.statement.header.account_number, "H");
        assert_eq!(res.report.header_conflicts, vec![2]);
        assert_eq!(ids(&res.statement), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pages_with_no_entries_still_set_header() {
        let doc = MemoryPages::new(["ok:H:", "ok:Y:z"]);
        let agg = PageAggregator::new(
            &config(PathBuf::from("unused.json"), HeaderPolicy::FirstSuccess),
            scripted,
        );
        let res = agg.collect(&doc).unwrap();
        assert_eq!(res.statement.header.account_number, "H");
        assert_eq!(ids(&res.statement), vec!["z"]);
    }

    #[test]
    fn test_single_failing_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        let doc = MemoryPages::new(["fail"]);

        let agg = PageAggregator::new(&config(out.clone(), HeaderPolicy::FirstSuccess), scripted);
        match agg.aggregate(&doc) {
            Err(AggregateError::NoPageSucceeded { pages, failures }) => {
                assert_eq!(pages, 1);
                assert_eq!(failures.len(), 1);
            }
            other => panic!("expected total failure, got {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_empty_document_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        let doc = MemoryPages::default();

        let agg = PageAggregator::new(&config(out.clone(), HeaderPolicy::FirstSuccess), scripted);
        assert!(matches!(
            agg.aggregate(&doc),
            Err(AggregateError::NoPageSucceeded { pages: 0, .. })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_pages_are_requested_in_order() {
        let seen = RefCell::new(Vec::new());
        let recording = |text: &str| -> Result<AccountStatement, ExtractionFailure> {
            seen.borrow_mut().push(text.to_string());
            scripted(text)
        };
        let doc = MemoryPages::new(["ok:A:1", "fail", "ok:B:2", "fail"]);
        let agg = PageAggregator::new(
            &config(PathBuf::from("unused.json"), HeaderPolicy::FirstSuccess),
            recording,
        );
        agg.collect(&doc).unwrap();
        assert_eq!(*seen.borrow(), vec!["ok:A:1", "fail", "ok:B:2", "fail"]);
    }

    #[test]
    fn test_output_is_byte_identical_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        let doc = MemoryPages::new(["ok:H:a,b", "fail", "ok:H:c"]);

        PageAggregator::new(&config(first.clone(), HeaderPolicy::FirstSuccess), scripted)
            .aggregate(&doc)
            .unwrap();
        PageAggregator::new(&config(second.clone(), HeaderPolicy::FirstSuccess), scripted)
            .aggregate(&doc)
            .unwrap();

        let a = fs::read(&first).unwrap();
        let b = fs::read(&second).unwrap();
        assert_eq!(a, b);
        let text = String::from_utf8(a).unwrap();
        assert!(text.starts_with("{\n  \"account_number\": \"H\","));
    }

    #[test]
    fn test_extract_document_writes_on_success_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("single.json");
        let doc = MemoryPages::new(["ok:W:x", "ignored"]);

        let joined = |text: &str| -> Result<AccountStatement, ExtractionFailure> {
            assert_eq!(text, "ok:W:x\nignored");
            scripted("ok:W:x")
        };
        let rec: AccountStatement = extract_document(&doc, &joined, &out).unwrap();
        assert_eq!(rec.header.account_number, "W");
        assert!(out.exists());

        let missing = dir.path().join("missing.json");
        let failing = |_: &str| -> Result<AccountStatement, ExtractionFailure> {
            Err(ExtractionFailure::Request("connection refused".to_string()))
        };
        let err = extract_document::<AccountStatement, _>(&doc, &failing, &missing).unwrap_err();
        assert!(matches!(err, AggregateError::Extraction(ExtractionFailure::Request(_))));
        assert!(!missing.exists());
    }
}
