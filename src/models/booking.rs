use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A reserved date range in the shared calendar. Only approved and blocked
/// bookings occupy their range; pending and rejected ones are invisible to
/// conflict detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub title: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub status: BookingStatus,
    pub is_blocked: bool,
    pub created_by: String,
    pub last_modified_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// Whether this booking holds its date range exclusively.
    pub fn occupies_range(&self) -> bool {
        matches!(self.status, BookingStatus::Approved | BookingStatus::Blocked)
    }

    /// Inclusive interval overlap: touching ranges collide.
    pub fn overlaps(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> bool {
        self.start_date <= *end && self.end_date >= *start
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Blocked => "blocked",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "approved" => BookingStatus::Approved,
            "rejected" => BookingStatus::Rejected,
            "blocked" => BookingStatus::Blocked,
            _ => BookingStatus::Pending,
        }
    }
}
