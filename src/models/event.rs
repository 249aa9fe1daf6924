use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const MAX_VENUE_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub finish_time: String,
    pub time_period: String,
    pub president: String,
    pub proposal_path: String,
    pub form_path: String,
    pub mode: EventMode,
    pub event_type: EventType,
    pub venue: String,
    pub status: EventStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventMode {
    Physical,
    Online,
}

impl EventMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventMode::Physical => "Physical",
            EventMode::Online => "Online",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Online" => EventMode::Online,
            _ => EventMode::Physical,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    Hackathon,
    Academic,
    #[serde(rename = "Non-Academic")]
    NonAcademic,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Hackathon => "Hackathon",
            EventType::Academic => "Academic",
            EventType::NonAcademic => "Non-Academic",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Hackathon" => EventType::Hackathon,
            "Non-Academic" => EventType::NonAcademic,
            _ => EventType::Academic,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "Pending",
            EventStatus::Approved => "Approved",
            EventStatus::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Approved" => EventStatus::Approved,
            "Rejected" => EventStatus::Rejected,
            _ => EventStatus::Pending,
        }
    }
}

/// Validate an HH:MM wall-clock string.
pub fn parse_time(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid time format: {s}. Use HH:MM format"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid hour in: {s}"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid minute in: {s}"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("Time out of range: {s}"));
    }
    Ok((hour, minute))
}

/// Start time must be strictly before finish time on the same day.
pub fn validate_time_order(start: &str, finish: &str) -> Result<(), String> {
    let (sh, sm) = parse_time(start)?;
    let (fh, fm) = parse_time(finish)?;
    if sh > fh || (sh == fh && sm >= fm) {
        return Err("Event start time must be before finish time".to_string());
    }
    Ok(())
}
