//! Enumerations stored as text columns

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Organizer,
    #[default]
    Participant,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Organizer => "ORGANIZER",
            Self::Participant => "PARTICIPANT",
        }
    }

    /// Parse a stored or requested role; unknown values fall back to participant
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "ADMIN" => Self::Admin,
            "ORGANIZER" => Self::Organizer,
            _ => Self::Participant,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sortable race-event columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RaceEventSort {
    EventName,
    #[default]
    CreatedAt,
    UpdatedAt,
    Slug,
}

impl RaceEventSort {
    pub fn column(&self) -> &'static str {
        match self {
            Self::EventName => "event_name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Slug => "slug",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
