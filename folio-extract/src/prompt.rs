//! Extraction prompts, one per document layout

use folio_core::{
    format_instructions, AccountStatement, BankStatement, DocumentSchema, PremiumClosing,
    ReinsuranceClosing,
};

pub const SYSTEM_PROMPT: &str =
    "You extract structured data from financial and insurance documents. \
     Reply with a single JSON object and nothing else. Do not invent values.";

/// Fixed wording for a schema's extraction request.
pub trait PromptTemplate: DocumentSchema {
    /// What to extract, placed before the format instructions
    const INSTRUCTIONS: &'static str;
    /// Label above the document text
    const TEXT_HEADING: &'static str;
}

/// Instructions, format block, then the document text.
pub fn render_prompt<T: PromptTemplate>(text: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}:\n{}\n",
        T::INSTRUCTIONS.trim(),
        format_instructions::<T>(),
        T::TEXT_HEADING,
        text
    )
}

impl PromptTemplate for AccountStatement {
    const INSTRUCTIONS: &'static str = r#"
You are extracting structured data from one page of a multi-page insurance account statement.

Return the following fields:
- account_number
- currency
- statement_date
- contact
- account_name
- entries: list of invoice rows on this page (invoice_number, assured, reference, insurance_type, due_date, gross, net)

If the page has no invoice rows, return an empty entries list. Use this JSON format:"#;
    const TEXT_HEADING: &'static str = "PDF Page Text";
}

impl PromptTemplate for BankStatement {
    const INSTRUCTIONS: &'static str = r#"
Extract the following structured information from the given bank statement text:
- account number
- currency
- statement date
- transactions with fields: transaction_number, installment_number, transaction_type, status, effective_date, assured, description, and amount.

Return the result in JSON using this schema:"#;
    const TEXT_HEADING: &'static str = "Statement text";
}

impl PromptTemplate for PremiumClosing {
    const INSTRUCTIONS: &'static str = r#"
Extract the following fields from the insurance closing statement, using exactly these keys:

- Premium_Closing
- Texel_Reference
- Your_Reference
- Obligor
- Guarantor
- Borrower
- Client_Legal_Entity
- Coverage_Requested
- Facility
- Policy_Coverage_Period
- Document_Date
- Due_Date
- Base_Premium
- Tax
- Commitment_and_Other_Fees
- Brokerage
- Deposit_Premium
- Adjustment_Premium
- TOTAL

Use this schema for formatting:"#;
    const TEXT_HEADING: &'static str = "PDF Text";
}

impl PromptTemplate for ReinsuranceClosing {
    const INSTRUCTIONS: &'static str = r#"
You are an expert in extracting structured information from reinsurance closing documents.

Extract and return the following fields as a JSON object:
- Date
- Account_Number
- Our_Reference
- Your_Reference
- Reinsured
- Original_Insured
- Type
- Period
- Description
- Gross_Premium_100_percent
- Your_Share_Percent
- Your_Share_Amount
- Gross_Standard_Commission_Percent
- Gross_Standard_Commission_Amount
- Colombia_Tax_Percent
- Colombia_Tax_Amount
- Amount_Payable

Percentages are plain numbers (12.5 for 12.5%). The output must strictly match this schema:"#;
    const TEXT_HEADING: &'static str = "PDF Text";
}
