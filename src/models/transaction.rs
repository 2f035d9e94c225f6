use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MalformedRowError;

// ---------------------------------------------------------------------------
// TransactionStatus: closed set of settlement states
// ---------------------------------------------------------------------------

/// Settlement state of a transaction.
///
/// Wire tokens are matched exactly and case-sensitively. The warehouse uses
/// lowercase tokens; the capitalized forms (`Completed`, `Failed`, ...) come
/// from the fact-table loader and are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[serde(alias = "Completed")]
    Successful,
    #[serde(alias = "Failed")]
    Failed,
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Reversed")]
    Reversed,
}

impl TransactionStatus {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "successful" | "Completed" => Some(Self::Successful),
            "failed" | "Failed" => Some(Self::Failed),
            "pending" | "Pending" => Some(Self::Pending),
            "reversed" | "Reversed" => Some(Self::Reversed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Reversed => "reversed",
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransactionRow: one fact row joined with its time and payment dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub commission: Option<Decimal>,
    /// `None` when the backend had no status; counted as not successful.
    pub status: Option<TransactionStatus>,
    pub platform_source: Option<String>,
    pub transaction_type: Option<String>,
    pub payment_channel: Option<String>,
    pub payment_type: Option<String>,
    pub customer_ref: Option<String>,
    pub merchant_ref: Option<String>,
    /// Calendar day of the source timestamp, in the timestamp's own offset.
    pub occurred_on: NaiveDate,
}

impl TransactionRow {
    pub fn new(id: impl Into<String>, amount: Decimal, occurred_on: NaiveDate) -> Self {
        Self {
            id: id.into(),
            amount,
            fee: None,
            commission: None,
            status: None,
            platform_source: None,
            transaction_type: None,
            payment_channel: None,
            payment_type: None,
            customer_ref: None,
            merchant_ref: None,
            occurred_on,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.payment_channel = Some(channel.into());
        self
    }

    pub fn with_payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer_ref = Some(customer.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant_ref = Some(merchant.into());
        self
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_some_and(|s| s.is_successful())
    }

    /// Decode a fetched record.
    ///
    /// Accepts both flat records (DuckDB joins) and records with nested
    /// dimension objects (`core_time`, `core_payment`, ...) as returned by
    /// the REST API. Null amount becomes 0 and null status stays `None`;
    /// anything else that does not parse is rejected.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, MalformedRowError> {
        let id = lookup(record, &[], &["transaction_id", "id"])
            .and_then(id_string)
            .ok_or_else(|| MalformedRowError::new("<unknown>", "transaction_id", "is missing"))?;

        let amount = decimal_field(&id, "amount", lookup(record, &[], &["amount"]))?
            .unwrap_or(Decimal::ZERO);
        let fee = decimal_field(&id, "fee", lookup(record, &[], &["fee"]))?;
        let commission = decimal_field(&id, "commission", lookup(record, &[], &["commission"]))?;

        let status = match lookup(record, &[], &["status"]) {
            None | Some(Value::Null) => None,
            Some(Value::String(token)) => Some(TransactionStatus::from_token(token).ok_or_else(
                || MalformedRowError::new(&id, "status", format!("has unknown value {:?}", token)),
            )?),
            Some(other) => {
                return Err(MalformedRowError::new(
                    &id,
                    "status",
                    format!("is not a string: {}", other),
                ))
            }
        };

        let occurred_on = match lookup(record, TIME_DIMENSION, &["full_date"]) {
            Some(Value::String(raw)) => parse_day(raw).ok_or_else(|| {
                MalformedRowError::new(&id, "full_date", format!("is not a date: {:?}", raw))
            })?,
            None | Some(Value::Null) => {
                return Err(MalformedRowError::new(&id, "full_date", "is missing"))
            }
            Some(other) => {
                return Err(MalformedRowError::new(
                    &id,
                    "full_date",
                    format!("is not a date: {}", other),
                ))
            }
        };

        Ok(Self {
            amount,
            fee,
            commission,
            status,
            platform_source: text(record, &[], "platform_source"),
            transaction_type: text(record, &[], "transaction_type"),
            payment_channel: text(record, PAYMENT_DIMENSION, "channel"),
            payment_type: text(record, PAYMENT_DIMENSION, "payment_type"),
            customer_ref: lookup(record, &[], &["customer_id"]).and_then(id_string),
            merchant_ref: lookup(record, &[], &["merchant_id"]).and_then(id_string),
            occurred_on,
            id,
        })
    }
}

// ---------------------------------------------------------------------------
// RecentTransaction: row for the recent-activity table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransaction {
    #[serde(flatten)]
    pub row: TransactionRow,
    pub customer_name: Option<String>,
    pub merchant_name: Option<String>,
}

impl RecentTransaction {
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, MalformedRowError> {
        Ok(Self {
            row: TransactionRow::from_record(record)?,
            customer_name: text(record, CUSTOMER_DIMENSION, "customer_name"),
            merchant_name: text(record, MERCHANT_DIMENSION, "merchant_name"),
        })
    }
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

const TIME_DIMENSION: &[&str] = &["core_time", "CORE_TIME"];
const PAYMENT_DIMENSION: &[&str] = &["core_payment", "CORE_PAYMENT"];
const CUSTOMER_DIMENSION: &[&str] = &["core_customer", "CORE_CUSTOMER"];
const MERCHANT_DIMENSION: &[&str] = &["core_merchant", "CORE_MERCHANT"];

/// Find a field at the top level, falling back to the nested dimension
/// objects named in `nested`.
fn lookup<'r>(record: &'r Map<String, Value>, nested: &[&str], keys: &[&str]) -> Option<&'r Value> {
    for key in keys {
        if let Some(v) = record.get(*key) {
            return Some(v);
        }
    }
    nested
        .iter()
        .filter_map(|dim| record.get(*dim).and_then(|v| v.as_object()))
        .find_map(|obj| keys.iter().find_map(|key| obj.get(*key)))
}

fn text(record: &Map<String, Value>, nested: &[&str], key: &str) -> Option<String> {
    lookup(record, nested, &[key])
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decimal_field(
    row_id: &str,
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<Decimal>, MalformedRowError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            return Err(MalformedRowError::new(
                row_id,
                field,
                format!("is not numeric: {}", other),
            ))
        }
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map(Some)
        .map_err(|_| MalformedRowError::new(row_id, field, format!("is not numeric: {:?}", raw)))
}

/// Truncate a date or timestamp string to its calendar day.
///
/// The leading `YYYY-MM-DD` is taken as-is; offsets are not applied.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
