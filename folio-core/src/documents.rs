//! Single-shot document layouts: the whole document yields one record.
//!
//! Closing statements keep the labels printed on the document as JSON keys.

use serde::{Deserialize, Serialize};

use crate::schema::{coerce, DocumentSchema, FieldSpec};

/// One bank statement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(deserialize_with = "coerce::text")]
    pub transaction_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub installment_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub transaction_type: String,
    #[serde(deserialize_with = "coerce::text")]
    pub status: String,
    #[serde(deserialize_with = "coerce::text")]
    pub effective_date: String,
    #[serde(deserialize_with = "coerce::text")]
    pub assured: String,
    #[serde(deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(deserialize_with = "coerce::amount")]
    pub amount: f64,
}

/// Generic bank statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    #[serde(deserialize_with = "coerce::text")]
    pub account_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub currency: String,
    #[serde(deserialize_with = "coerce::text")]
    pub statement_date: String,
    pub transactions: Vec<Transaction>,
}

const TRANSACTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("transaction_number"),
    FieldSpec::text("installment_number"),
    FieldSpec::text("transaction_type"),
    FieldSpec::text("status"),
    FieldSpec::text("effective_date"),
    FieldSpec::text("assured"),
    FieldSpec::text("description"),
    FieldSpec::amount("amount"),
];

const BANK_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("account_number"),
    FieldSpec::text("currency"),
    FieldSpec::text("statement_date"),
    FieldSpec::rows("transactions", TRANSACTION_FIELDS),
];

impl DocumentSchema for BankStatement {
    const NAME: &'static str = "StatementData";

    fn fields() -> &'static [FieldSpec] {
        BANK_FIELDS
    }
}

/// Insurance premium closing statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PremiumClosing {
    #[serde(rename = "Premium_Closing", deserialize_with = "coerce::text")]
    pub premium_closing: String,
    #[serde(rename = "Texel_Reference", deserialize_with = "coerce::text")]
    pub texel_reference: String,
    #[serde(rename = "Your_Reference", deserialize_with = "coerce::text")]
    pub your_reference: String,
    #[serde(deserialize_with = "coerce::text")]
    pub obligor: String,
    #[serde(deserialize_with = "coerce::text")]
    pub guarantor: String,
    #[serde(deserialize_with = "coerce::text")]
    pub borrower: String,
    #[serde(rename = "Client_Legal_Entity", deserialize_with = "coerce::text")]
    pub client_legal_entity: String,
    #[serde(rename = "Coverage_Requested", deserialize_with = "coerce::text")]
    pub coverage_requested: String,
    #[serde(deserialize_with = "coerce::text")]
    pub facility: String,
    #[serde(rename = "Policy_Coverage_Period", deserialize_with = "coerce::text")]
    pub policy_coverage_period: String,
    #[serde(rename = "Document_Date", deserialize_with = "coerce::text")]
    pub document_date: String,
    #[serde(rename = "Due_Date", deserialize_with = "coerce::text")]
    pub due_date: String,
    #[serde(rename = "Base_Premium", deserialize_with = "coerce::amount")]
    pub base_premium: f64,
    #[serde(deserialize_with = "coerce::amount")]
    pub tax: f64,
    #[serde(rename = "Commitment_and_Other_Fees", deserialize_with = "coerce::amount")]
    pub commitment_and_other_fees: f64,
    #[serde(deserialize_with = "coerce::amount")]
    pub brokerage: f64,
    #[serde(rename = "Deposit_Premium", deserialize_with = "coerce::amount")]
    pub deposit_premium: f64,
    #[serde(rename = "Adjustment_Premium", deserialize_with = "coerce::amount")]
    pub adjustment_premium: f64,
    #[serde(rename = "TOTAL", deserialize_with = "coerce::amount")]
    pub total: f64,
}

const CLOSING_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("Premium_Closing").describe("e.g., CRN0000860487"),
    FieldSpec::text("Texel_Reference"),
    FieldSpec::text("Your_Reference"),
    FieldSpec::text("Obligor"),
    FieldSpec::text("Guarantor"),
    FieldSpec::text("Borrower"),
    FieldSpec::text("Client_Legal_Entity"),
    FieldSpec::text("Coverage_Requested"),
    FieldSpec::text("Facility"),
    FieldSpec::text("Policy_Coverage_Period"),
    FieldSpec::text("Document_Date"),
    FieldSpec::text("Due_Date"),
    FieldSpec::amount("Base_Premium"),
    FieldSpec::amount("Tax"),
    FieldSpec::amount("Commitment_and_Other_Fees"),
    FieldSpec::amount("Brokerage"),
    FieldSpec::amount("Deposit_Premium"),
    FieldSpec::amount("Adjustment_Premium"),
    FieldSpec::amount("TOTAL"),
];

impl DocumentSchema for PremiumClosing {
    const NAME: &'static str = "PremiumClosingData";

    fn fields() -> &'static [FieldSpec] {
        CLOSING_FIELDS
    }
}

/// Reinsurance closing (bordereau) with share, commission and tax lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReinsuranceClosing {
    #[serde(deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(rename = "Account_Number", deserialize_with = "coerce::text")]
    pub account_number: String,
    #[serde(rename = "Our_Reference", deserialize_with = "coerce::text")]
    pub our_reference: String,
    #[serde(rename = "Your_Reference", deserialize_with = "coerce::text")]
    pub your_reference: String,
    #[serde(deserialize_with = "coerce::text")]
    pub reinsured: String,
    #[serde(rename = "Original_Insured", deserialize_with = "coerce::text")]
    pub original_insured: String,
    #[serde(rename = "Type", deserialize_with = "coerce::text")]
    pub kind: String,
    #[serde(deserialize_with = "coerce::text")]
    pub period: String,
    #[serde(deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(rename = "Gross_Premium_100_percent", deserialize_with = "coerce::amount")]
    pub gross_premium_100_percent: f64,
    #[serde(rename = "Your_Share_Percent", deserialize_with = "coerce::amount")]
    pub your_share_percent: f64,
    #[serde(rename = "Your_Share_Amount", deserialize_with = "coerce::amount")]
    pub your_share_amount: f64,
    #[serde(rename = "Gross_Standard_Commission_Percent", deserialize_with = "coerce::amount")]
    pub gross_standard_commission_percent: f64,
    #[serde(rename = "Gross_Standard_Commission_Amount", deserialize_with = "coerce::amount")]
    pub gross_standard_commission_amount: f64,
    #[serde(rename = "Colombia_Tax_Percent", deserialize_with = "coerce::amount")]
    pub colombia_tax_percent: f64,
    #[serde(rename = "Colombia_Tax_Amount", deserialize_with = "coerce::amount")]
    pub colombia_tax_amount: f64,
    #[serde(rename = "Amount_Payable", deserialize_with = "coerce::amount")]
    pub amount_payable: f64,
}

const REINSURANCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("Date"),
    FieldSpec::text("Account_Number"),
    FieldSpec::text("Our_Reference"),
    FieldSpec::text("Your_Reference"),
    FieldSpec::text("Reinsured"),
    FieldSpec::text("Original_Insured"),
    FieldSpec::text("Type"),
    FieldSpec::text("Period"),
    FieldSpec::text("Description"),
    FieldSpec::amount("Gross_Premium_100_percent"),
    FieldSpec::amount("Your_Share_Percent"),
    FieldSpec::amount("Your_Share_Amount"),
    FieldSpec::amount("Gross_Standard_Commission_Percent"),
    FieldSpec::amount("Gross_Standard_Commission_Amount"),
    FieldSpec::amount("Colombia_Tax_Percent"),
    FieldSpec::amount("Colombia_Tax_Amount"),
    FieldSpec::amount("Amount_Payable"),
];

impl DocumentSchema for ReinsuranceClosing {
    const NAME: &'static str = "PDFData";

    fn fields() -> &'static [FieldSpec] {
        REINSURANCE_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_reply;

    #[test]
    fn test_premium_closing_keeps_document_labels() {
        let reply = r#"```json
        {
          "Premium_Closing": "CRN0000860487", "Texel_Reference": "TX-9",
          "Your_Reference": "YR-1", "Obligor": "Obl", "Guarantor": "Gua",
          "Borrower": "Bor", "Client_Legal_Entity": "Client Ltd",
          "Coverage_Requested": "90%", "Facility": "Term loan",
          "Policy_Coverage_Period": "2023-2025", "Document_Date": "01/02/2024",
          "Due_Date": "01/03/2024", "Base_Premium": "10,000.00", "Tax": 0,
          "Commitment_and_Other_Fees": 0, "Brokerage": "(1,000.00)",
          "Deposit_Premium": 0, "Adjustment_Premium": 0, "TOTAL": 9000
        }
        ```"#;
        let c: PremiumClosing = validate_reply(reply).unwrap();
        assert_eq!(c.premium_closing, "CRN0000860487");
        assert_eq!(c.base_premium, 10000.0);
        assert_eq!(c.brokerage, -1000.0);

        let out = serde_json::to_value(&c).unwrap();
        assert_eq!(out["Client_Legal_Entity"], "Client Ltd");
        assert_eq!(out["TOTAL"], 9000.0);
        assert!(out.get("Obligor").is_some());
    }

    #[test]
    fn test_reinsurance_type_field() {
        let reply = r#"{"Date": "09/02/2024", "Account_Number": "ACC1",
            "Our_Reference": "O", "Your_Reference": "Y", "Reinsured": "R",
            "Original_Insured": "OI", "Type": "Facultative", "Period": "12m",
            "Description": "Inst 9", "Gross_Premium_100_percent": 1000,
            "Your_Share_Percent": "10", "Your_Share_Amount": 100,
            "Gross_Standard_Commission_Percent": 5, "Gross_Standard_Commission_Amount": 5,
            "Colombia_Tax_Percent": 2, "Colombia_Tax_Amount": 1.9, "Amount_Payable": 93.1}"#;
        let r: ReinsuranceClosing = validate_reply(reply).unwrap();
        assert_eq!(r.kind, "Facultative");
        assert_eq!(r.your_share_percent, 10.0);
        assert_eq!(serde_json::to_value(&r).unwrap()["Type"], "Facultative");
    }

    #[test]
    fn test_bank_statement_transactions() {
        let reply = r#"{"account_number": "BA-1", "currency": "EUR", "statement_date": "2024-01-31",
            "transactions": [{"transaction_number": 17, "installment_number": "1/4",
                "transaction_type": "Premium", "status": "Open", "effective_date": "2024-01-01",
                "assured": "Acme", "description": "Q1", "amount": "-250.00"}]}"#;
        let b: BankStatement = validate_reply(reply).unwrap();
        assert_eq!(b.transactions[0].transaction_number, "17");
        assert_eq!(b.transactions[0].amount, -250.0);
    }
}
