//! Data models for salon operations
//!
//! This module contains all data structures used throughout the application:
//! the entities read from the tabular store (with their denormalized join
//! fields), the `New*` payloads used on the write path, and the small enums
//! that map typed values onto the store's Spanish wire strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A service category (reference data, seeded on first access).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Row id, unique within the table
    pub id: i64,
    /// Category name
    pub name: String,
    /// Short description
    pub description: String,
}

/// A service offered by the salon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Row id, unique within the table
    pub id: i64,
    /// Service name
    pub name: String,
    /// Foreign key to [`Category`]
    pub category_id: i64,
    /// List price in euros
    pub price: f64,
    /// Expected duration in minutes
    pub duration_minutes: i64,
    /// Cost of supplies consumed per session
    pub supply_cost: f64,
    /// False once soft-deleted; inactive services are never listed
    pub active: bool,
    /// Free-form description
    pub description: String,
    /// Joined category name; absent when the reference dangles
    pub category_name: Option<String>,
}

/// Payload for creating or updating a service.
#[derive(Debug, Clone)]
pub struct NewService {
    /// Service name
    pub name: String,
    /// Foreign key to [`Category`]
    pub category_id: i64,
    /// List price in euros
    pub price: f64,
    /// Expected duration in minutes
    pub duration_minutes: i64,
    /// Cost of supplies consumed per session
    pub supply_cost: f64,
    /// Free-form description
    pub description: String,
}

/// A salon client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Row id, unique within the table
    pub id: i64,
    /// Client's display name
    pub name: String,
    /// Phone number as entered (optional)
    pub phone: Option<String>,
    /// Email address (optional)
    pub email: Option<String>,
    /// Date of the first recorded visit (YYYY-MM-DD)
    pub first_visit: String,
    /// Acquisition channel (Booksy, Instagram, Web, ...)
    pub channel: String,
    /// Free-form notes
    pub notes: String,
}

/// Payload for creating or updating a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    /// Client's display name
    pub name: String,
    /// Phone number (optional)
    pub phone: Option<String>,
    /// Email address (optional)
    pub email: Option<String>,
    /// Acquisition channel
    pub channel: String,
    /// Free-form notes
    pub notes: String,
}

/// A confirmed appointment, with its joined display fields.
///
/// The `*_name` fields come from left joins against the client and active
/// service lists; a dangling reference leaves them `None` rather than
/// failing the read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Row id, unique within the table
    pub id: i64,
    /// Appointment date
    pub date: NaiveDate,
    /// Appointment time (HH:MM, kept as text)
    pub time: String,
    /// Foreign key to [`Client`]
    pub client_id: i64,
    /// Foreign key to [`Service`]
    pub service_id: i64,
    /// Price actually charged
    pub price_charged: f64,
    /// Tip received
    pub tip: f64,
    /// Origin channel (Booksy, WhatsApp, Web, ...)
    pub channel: String,
    /// Payment method; `"Pendiente"` marks payment not yet collected
    pub payment_method: String,
    /// Free-form notes
    pub notes: String,
    /// Joined client name
    pub client_name: Option<String>,
    /// Joined service name
    pub service_name: Option<String>,
    /// Joined category name (via the service)
    pub category_name: Option<String>,
    /// Joined supply cost (via the service)
    pub supply_cost: Option<f64>,
}

/// Payload for creating an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    /// Appointment date
    pub date: NaiveDate,
    /// Appointment time (HH:MM)
    pub time: String,
    /// Foreign key to [`Client`]
    pub client_id: i64,
    /// Foreign key to [`Service`]
    pub service_id: i64,
    /// Price actually charged
    pub price_charged: f64,
    /// Tip received
    pub tip: f64,
    /// Origin channel
    pub channel: String,
    /// Payment method
    pub payment_method: String,
    /// Free-form notes
    pub notes: String,
}

/// Billing frequency of a fixed expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Billed every month
    Monthly,
    /// Billed every quarter
    Quarterly,
    /// Billed once a year
    Yearly,
}

impl Frequency {
    /// Wire string stored in the `frecuencia` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "mensual",
            Self::Quarterly => "trimestral",
            Self::Yearly => "anual",
        }
    }

    /// Parse a wire string; unknown values are read tolerantly as monthly.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "trimestral" => Self::Quarterly,
            "anual" => Self::Yearly,
            _ => Self::Monthly,
        }
    }
}

/// A recurring expense (rent, software, insurance, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedExpense {
    /// Row id, unique within the table
    pub id: i64,
    /// What the expense is for
    pub concept: String,
    /// Amount per billing period
    pub amount: f64,
    /// Billing frequency
    pub frequency: Frequency,
    /// False once soft-deleted
    pub active: bool,
    /// Free-form notes
    pub notes: String,
}

/// Payload for creating or updating a fixed expense.
#[derive(Debug, Clone)]
pub struct NewFixedExpense {
    /// What the expense is for
    pub concept: String,
    /// Amount per billing period
    pub amount: f64,
    /// Billing frequency
    pub frequency: Frequency,
    /// Free-form notes
    pub notes: String,
}

/// A one-off expense tied to a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableExpense {
    /// Row id, unique within the table
    pub id: i64,
    /// Expense date
    pub date: NaiveDate,
    /// What the expense was for
    pub concept: String,
    /// Amount spent
    pub amount: f64,
    /// Expense category (Insumos, Marketing, ...)
    pub category: String,
    /// Free-form notes
    pub notes: String,
}

/// Payload for creating or updating a variable expense.
#[derive(Debug, Clone)]
pub struct NewVariableExpense {
    /// Expense date
    pub date: NaiveDate,
    /// What the expense was for
    pub concept: String,
    /// Amount spent
    pub amount: f64,
    /// Expense category
    pub category: String,
    /// Free-form notes
    pub notes: String,
}

/// Lifecycle state of a booking request.
///
/// Requests only move `Pending -> Confirmed` or `Pending -> Rejected`;
/// both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Submitted, awaiting a decision
    Pending,
    /// Turned into a client and an appointment
    Confirmed,
    /// Declined; no side effects
    Rejected,
}

impl RequestStatus {
    /// Wire string stored in the `estado` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Confirmed => "confirmada",
            Self::Rejected => "rechazada",
        }
    }

    /// Parse a wire string; unknown values are read tolerantly as pending.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "confirmada" => Self::Confirmed,
            "rechazada" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

/// An incoming booking inquiry, distinct from a confirmed appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Row id, unique within the table
    pub id: i64,
    /// Requester name
    pub name: String,
    /// Requester phone (optional)
    pub phone: Option<String>,
    /// Requester email (optional)
    pub email: Option<String>,
    /// Requested service, free text
    pub requested_service: String,
    /// Schedule preference, free text
    pub time_preference: String,
    /// Additional message from the requester
    pub message: String,
    /// Lifecycle state
    pub status: RequestStatus,
    /// Submission timestamp (ISO-8601 text)
    pub requested_at: String,
    /// Response timestamp, set on confirm/reject
    pub responded_at: Option<String>,
    /// Notes left by the admin when responding
    pub admin_notes: String,
}

/// Payload for submitting a booking request (public form).
#[derive(Debug, Clone)]
pub struct NewRequest {
    /// Requester name
    pub name: String,
    /// Requester phone (optional)
    pub phone: Option<String>,
    /// Requester email (optional)
    pub email: Option<String>,
    /// Requested service, free text
    pub requested_service: String,
    /// Schedule preference, free text
    pub time_preference: String,
    /// Additional message
    pub message: String,
}

/// Inclusive date range for filtering appointments and variable expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// True when `date` falls within the range, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Output format for exported appointment lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_round_trip() {
        assert_eq!(RequestStatus::from_wire("confirmada"), RequestStatus::Confirmed);
        assert_eq!(RequestStatus::from_wire("rechazada"), RequestStatus::Rejected);
        assert_eq!(RequestStatus::from_wire("pendiente"), RequestStatus::Pending);
        // unknown states read as pending rather than failing
        assert_eq!(RequestStatus::from_wire("???"), RequestStatus::Pending);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
            end: NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date"),
        };
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date")));
    }
}
