//! Multi-page account statement: one shared header, invoice rows per page

use serde::{Deserialize, Serialize};

use crate::schema::{coerce, DocumentSchema, FieldSpec};

/// Account-level fields repeated on every page of a statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementHeader {
    #[serde(deserialize_with = "coerce::text")]
    pub account_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub currency: String,
    #[serde(deserialize_with = "coerce::text")]
    pub statement_date: String,
    #[serde(deserialize_with = "coerce::text")]
    pub contact: String,
    #[serde(deserialize_with = "coerce::text")]
    pub account_name: String,
}

/// One invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEntry {
    #[serde(deserialize_with = "coerce::text")]
    pub invoice_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub assured: String,
    #[serde(deserialize_with = "coerce::text")]
    pub reference: String,
    #[serde(deserialize_with = "coerce::text")]
    pub insurance_type: String,
    #[serde(deserialize_with = "coerce::text")]
    pub due_date: String,
    #[serde(deserialize_with = "coerce::amount")]
    pub gross: f64,
    #[serde(deserialize_with = "coerce::amount")]
    pub net: f64,
}

/// Header plus rows. Used both for a single page's reply and for the merged
/// statement; header fields sit at the top level of the JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStatement {
    #[serde(flatten)]
    pub header: StatementHeader,
    pub entries: Vec<StatementEntry>,
}

const ENTRY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("invoice_number"),
    FieldSpec::text("assured"),
    FieldSpec::text("reference"),
    FieldSpec::text("insurance_type"),
    FieldSpec::text("due_date"),
    FieldSpec::amount("gross"),
    FieldSpec::amount("net"),
];

const STATEMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("account_number"),
    FieldSpec::text("currency"),
    FieldSpec::text("statement_date"),
    FieldSpec::text("contact"),
    FieldSpec::text("account_name"),
    FieldSpec::rows("entries", ENTRY_FIELDS).describe("invoice rows on this page"),
];

impl DocumentSchema for AccountStatement {
    const NAME: &'static str = "AccountStatement";

    fn fields() -> &'static [FieldSpec] {
        STATEMENT_FIELDS
    }
}
