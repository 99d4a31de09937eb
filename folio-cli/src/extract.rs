use anyhow::{Context, Result};
use folio_core::{AggregateError, PageSource, RunReport};
use folio_extract::{run, DocumentKind, LlmClient, ModelRequester, RunSummary};
use folio_ingest::PdfDocument;
use std::path::Path;
use tracing::info;

use crate::auth;
use crate::config::{load_config, RunOverrides};

pub fn extract(kind: DocumentKind, overrides: RunOverrides) -> Result<()> {
    let cfg = load_config()?;
    let credential = auth::credential()?;
    let run_config = cfg.run_config(kind, overrides, credential.clone())?;
    let client = LlmClient::new(cfg.llm_config(credential, run_config.page_timeout))?;
    info!(
        kind = %kind,
        provider = %client.config().provider,
        model = %client.config().model,
        "starting extraction"
    );

    let doc = PdfDocument::open(&run_config.document_path)
        .with_context(|| format!("open {}", run_config.document_path.display()))?;

    match run(kind, &doc, ModelRequester::new(client), &run_config) {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(AggregateError::NoPageSucceeded { pages, failures }) => {
            for f in &failures {
                eprintln!("  {}", f);
            }
            anyhow::bail!(
                "no page of {} could be extracted ({} pages); nothing written",
                run_config.document_path.display(),
                pages
            )
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "extract {} from {}",
            kind,
            run_config.document_path.display()
        ))),
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Wrote {} ({} record{}) to {}",
        summary.kind,
        summary.records,
        if summary.records == 1 { "" } else { "s" },
        summary.output.display()
    );
    if let Some(report) = &summary.report {
        print_report(report);
    }
}

fn print_report(report: &RunReport) {
    println!(
        "Pages: {} extracted, {} failed (of {})",
        report.succeeded.len(),
        report.failures.len(),
        report.pages
    );
    for f in &report.failures {
        eprintln!("  {}", f);
    }
    for page in &report.header_conflicts {
        eprintln!("  page {}: header differs from the first extracted page", page + 1);
    }
}

pub fn print_text(pdf: &Path, page: Option<usize>) -> Result<()> {
    let doc = PdfDocument::open(pdf).with_context(|| format!("open {}", pdf.display()))?;
    let count = doc.page_count();
    let pages: Vec<usize> = match page {
        Some(0) => anyhow::bail!("pages are numbered from 1"),
        Some(n) if n > count => anyhow::bail!("page {} out of range ({} pages)", n, count),
        Some(n) => vec![n - 1],
        None => (0..count).collect(),
    };
    for i in pages {
        println!("--- page {}/{} ---", i + 1, count);
        println!("{}", doc.page_text(i));
    }
    Ok(())
}
