//! folio-core: statement record types, reply validation and the page aggregator

pub mod aggregate;
pub mod config;
pub mod documents;
pub mod requester;
pub mod schema;
pub mod source;
pub mod statement;

pub use aggregate::{
    extract_document, write_json, AggregateError, Aggregated, PageAggregator, RunReport,
};
pub use config::{Credential, HeaderPolicy, RunConfig};
pub use documents::{BankStatement, PremiumClosing, ReinsuranceClosing, Transaction};
pub use requester::{ExtractionFailure, ExtractionRequester, PageExtractionError};
pub use schema::{format_instructions, validate_reply, DocumentSchema, FieldKind, FieldSpec};
pub use source::{MemoryPages, PageSource};
pub use statement::{AccountStatement, StatementEntry, StatementHeader};
