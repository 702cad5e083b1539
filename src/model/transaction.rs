use serde::{Deserialize, Serialize};

use super::codes;

/// Score above which a record is classified as fraud.
pub const FRAUD_SCORE_THRESHOLD: f64 = 0.7;

/// Display score assumed for records the upstream process never scored.
pub const DEFAULT_SUSPICIOUS_SCORE: f64 = 0.5;

/// Categorical field as it appears in the upstream document: either the
/// numeric code or the resolved display name, depending on which stage
/// produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categorical {
    Code(u32),
    Name(String),
}

/// One transaction document as inserted by the upstream scoring process.
/// Immutable once created; everything beyond the identity field is optional
/// because upstream scoring may omit it, and absent fields are treated as
/// unknown rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "User_ID", default)]
    pub user_id: String,
    /// ISO date (YYYY-MM-DD); lexicographic order is chronological order.
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "Amount", default)]
    pub amount: f64,
    #[serde(rename = "Merchant_Category", default, skip_serializing_if = "Option::is_none")]
    pub merchant_category: Option<Categorical>,
    #[serde(rename = "Merchant_Type_Code", default, skip_serializing_if = "Option::is_none")]
    pub merchant_type_code: Option<u32>,
    #[serde(rename = "Device_Type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<Categorical>,
    #[serde(rename = "Device_Type_Code", default, skip_serializing_if = "Option::is_none")]
    pub device_type_code: Option<u32>,
    #[serde(rename = "Session_Time", default, skip_serializing_if = "Option::is_none")]
    pub session_time: Option<f64>,
    #[serde(rename = "Active_Loans", default, skip_serializing_if = "Option::is_none")]
    pub active_loans: Option<f64>,
    /// Fraud likelihood in [0,1]; absent for unscored records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_score: Option<f64>,
    /// Present only on records from the flagged partition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_token: Option<u32>,
    /// Present only on records from the unflagged partition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legit_token: Option<String>,
    #[serde(rename = "Avg_Amount", default, skip_serializing_if = "Option::is_none")]
    pub avg_amount: Option<f64>,
    #[serde(rename = "Transactions_Per_Day", default, skip_serializing_if = "Option::is_none")]
    pub transactions_per_day: Option<f64>,
    #[serde(rename = "Velocity", default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(rename = "Large_Transaction_Flag", default, skip_serializing_if = "Option::is_none")]
    pub large_transaction_flag: Option<u32>,
    #[serde(rename = "Large_Transaction_Frequency", default, skip_serializing_if = "Option::is_none")]
    pub large_transaction_frequency: Option<f64>,
}

/// Derived read-time label. Never stored; exactly one applies per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Fraud,
    Legitimate,
    Suspicious,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Fraud => "fraud",
            Classification::Legitimate => "legitimate",
            Classification::Suspicious => "suspicious",
        }
    }
}

impl Transaction {
    /// Fraud iff score exceeds the threshold, else Legitimate iff the record
    /// carries a legitimacy token, else Suspicious.
    pub fn classification(&self) -> Classification {
        if self.is_fraud() {
            Classification::Fraud
        } else if self.legit_token.is_some() {
            Classification::Legitimate
        } else {
            Classification::Suspicious
        }
    }

    pub fn is_fraud(&self) -> bool {
        self.fraud_score.map_or(false, |s| s > FRAUD_SCORE_THRESHOLD)
    }

    pub fn is_legit(&self) -> bool {
        self.legit_token.is_some()
    }

    /// Score for display purposes; unscored records show the suspicious default.
    pub fn display_score(&self) -> f64 {
        self.fraud_score.unwrap_or(DEFAULT_SUSPICIOUS_SCORE)
    }

    /// Merchant category resolved to a display name. Numeric codes go through
    /// the fixed table; unresolvable codes and absent fields become "Unknown".
    pub fn merchant_name(&self) -> &str {
        match &self.merchant_category {
            Some(Categorical::Code(c)) => codes::merchant_name(*c),
            Some(Categorical::Name(n)) => n,
            None => codes::UNKNOWN,
        }
    }

    pub fn device_name(&self) -> &str {
        match &self.device_type {
            Some(Categorical::Code(c)) => codes::device_name(*c),
            Some(Categorical::Name(n)) => n,
            None => codes::UNKNOWN,
        }
    }

    /// Merchant category resolved to a numeric code, traversing the table in
    /// reverse when the record stores a name. None when unresolvable.
    pub fn merchant_code(&self) -> Option<u32> {
        match &self.merchant_category {
            Some(Categorical::Code(c)) => Some(*c),
            Some(Categorical::Name(n)) => codes::merchant_code(n),
            None => None,
        }
    }

    pub fn device_code(&self) -> Option<u32> {
        match &self.device_type {
            Some(Categorical::Code(c)) => Some(*c),
            Some(Categorical::Name(n)) => codes::device_code(n),
            None => None,
        }
    }
}
