use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Subset of user fields attached to bookings, organizations and events
/// when the related user is joined in at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "organizer")]
    Organizer,
    #[serde(rename = "staff advisor")]
    StaffAdvisor,
    #[serde(rename = "staff admin")]
    StaffAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Organizer => "organizer",
            Role::StaffAdvisor => "staff advisor",
            Role::StaffAdmin => "staff admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "staff advisor" => Role::StaffAdvisor,
            "staff admin" => Role::StaffAdmin,
            _ => Role::Organizer,
        }
    }

    pub fn parse_strict(s: &str) -> Option<Self> {
        match s {
            "organizer" => Some(Role::Organizer),
            "staff advisor" => Some(Role::StaffAdvisor),
            "staff admin" => Some(Role::StaffAdmin),
            _ => None,
        }
    }

    /// Approve/reject calendar bookings.
    pub fn can_moderate_bookings(&self) -> bool {
        matches!(self, Role::StaffAdmin | Role::StaffAdvisor)
    }

    /// Place administrative holds on the shared calendar.
    pub fn can_block_dates(&self) -> bool {
        matches!(self, Role::StaffAdmin)
    }

    /// Bookings created by this role skip the pending stage.
    pub fn bookings_auto_approved(&self) -> bool {
        matches!(self, Role::StaffAdmin)
    }

    /// Delete any calendar booking regardless of ownership.
    pub fn can_delete_any_booking(&self) -> bool {
        matches!(self, Role::StaffAdmin)
    }

    pub fn can_manage_organizations(&self) -> bool {
        matches!(self, Role::StaffAdvisor)
    }

    pub fn can_change_roles(&self) -> bool {
        matches!(self, Role::StaffAdmin)
    }
}
