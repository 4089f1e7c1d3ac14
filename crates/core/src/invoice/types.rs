//! Invoice domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Nothing received yet.
    #[default]
    Unpaid,
    /// Fully paid.
    Paid,
    /// 50% deposit received, 50% still outstanding.
    Advance,
}

impl InvoiceStatus {
    /// Returns the stored/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
            Self::Advance => "Advance",
        }
    }

    /// Returns the watermark text printed across the document, if any.
    #[must_use]
    pub const fn watermark(self) -> Option<&'static str> {
        match self {
            Self::Paid => Some("PAID"),
            Self::Unpaid => Some("UNPAID"),
            Self::Advance => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown invoice status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for InvoiceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            "Advance" => Ok(Self::Advance),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A billable line on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Short title.
    pub title: String,
    /// Optional multi-line description; each line renders as its own bullet.
    #[serde(default)]
    pub description: Option<String>,
    /// Number of units, always positive.
    pub quantity: i64,
    /// Price per unit, never negative.
    pub unit_price: f64,
}

impl LineItem {
    /// Returns `quantity * unit_price`.
    #[must_use]
    pub fn total(&self) -> f64 {
        crate::billing::line_total(self.quantity, self.unit_price)
    }
}

/// Invoice header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: i32,
    /// Human readable number, e.g. `Invoice-250114B`.
    pub invoice_number: String,
    /// Billed client. May point at a deleted client.
    pub client_id: Option<i32>,
    /// Project name.
    pub project: String,
    /// Payment status.
    pub status: InvoiceStatus,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Cached sum of item totals.
    pub subtotal: f64,
    /// Free-form notes.
    pub notes: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// When the invoice was marked paid.
    pub paid_at: Option<DateTime<Utc>>,
    /// When the deposit was received.
    pub advance_paid_at: Option<DateTime<Utc>>,
}

/// A billed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client ID.
    pub id: i32,
    /// Contact person, shown on the "Bill To" block.
    pub contact_person: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address, possibly multi-line.
    pub address: Option<String>,
}

/// The issuing company. There is only ever one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    /// Company name.
    pub name: String,
    /// Postal address, possibly multi-line.
    pub address: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// First bank details block. First line is the heading.
    pub bank_info_1: String,
    /// Second bank details block. First line is the heading.
    pub bank_info_2: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Unpaid", InvoiceStatus::Unpaid)]
    #[case("Paid", InvoiceStatus::Paid)]
    #[case("Advance", InvoiceStatus::Advance)]
    fn test_status_parses_stored_value(#[case] raw: &str, #[case] expected: InvoiceStatus) {
        assert_eq!(raw.parse::<InvoiceStatus>().unwrap(), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn test_status_rejects_unknown() {
        let err = "paid".parse::<InvoiceStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("paid".to_string()));
    }

    #[test]
    fn test_status_defaults_to_unpaid() {
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_watermark_text() {
        assert_eq!(InvoiceStatus::Paid.watermark(), Some("PAID"));
        assert_eq!(InvoiceStatus::Unpaid.watermark(), Some("UNPAID"));
        assert_eq!(InvoiceStatus::Advance.watermark(), None);
    }

    #[test]
    fn test_status_serializes_as_stored_value() {
        let json = serde_json::to_string(&InvoiceStatus::Advance).unwrap();
        assert_eq!(json, "\"Advance\"");
    }

    #[test]
    fn test_company_profile_tolerates_missing_fields() {
        let profile: CompanyProfile = serde_json::from_str(r#"{"name":"Acme"}"#).unwrap();
        assert_eq!(profile.name, "Acme");
        assert!(profile.bank_info_1.is_empty());
    }
}
