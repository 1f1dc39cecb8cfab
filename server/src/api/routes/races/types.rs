//! Race API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::types::{NewRace, RaceRow};
use crate::utils::time::{parse_datetime, secs_to_iso};

/// Race DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaceDto {
    pub id: String,
    pub race_event_id: String,
    pub name: Option<String>,
    pub elevation: Option<f64>,
    pub length: f64,
    pub start_location: Option<String>,
    /// ISO 8601 (UTC)
    pub start_date_time: String,
    pub end_date_time: Option<String>,
    pub gps_file: Option<String>,
    pub competition_id: Option<String>,
}

impl From<RaceRow> for RaceDto {
    fn from(row: RaceRow) -> Self {
        Self {
            id: row.id,
            race_event_id: row.race_event_id,
            name: row.name,
            elevation: row.elevation,
            length: row.length,
            start_location: row.start_location,
            start_date_time: secs_to_iso(row.start_date_time),
            end_date_time: row.end_date_time.map(secs_to_iso),
            gps_file: row.gps_file,
            competition_id: row.competition_id,
        }
    }
}

/// Writable race fields as sent by clients
///
/// Used standalone for `/api/races` and nested inside race-event bodies.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaceInput {
    pub name: Option<String>,
    pub elevation: Option<f64>,
    /// Must be a JSON number
    #[schema(value_type = Option<f64>)]
    pub length: Option<serde_json::Value>,
    pub start_location: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub gps_file: Option<String>,
    pub competition_id: Option<String>,
}

/// Why a race input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceInputError {
    MissingStart,
    InvalidLength,
    InvalidStart,
    InvalidEnd,
    EndNotAfterStart,
}

impl RaceInputError {
    /// Client-facing message; `position` is the 1-based index inside a
    /// race-event body
    pub fn message(&self, position: Option<usize>) -> String {
        match (self, position) {
            (Self::MissingStart, Some(n)) => format!("Missing startDateTime in race #{}", n),
            (Self::MissingStart, None) => "startDateTime is required".to_string(),
            (Self::InvalidLength, Some(n)) => format!("Invalid length in race #{}", n),
            (Self::InvalidLength, None) => "length must be a number".to_string(),
            (Self::InvalidStart, Some(n)) => format!("Invalid startDateTime in race #{}", n),
            (Self::InvalidStart, None) => "startDateTime must be a valid date".to_string(),
            (Self::InvalidEnd, Some(n)) => format!("Invalid endDateTime in race #{}", n),
            (Self::InvalidEnd, None) => "endDateTime must be a valid date".to_string(),
            (Self::EndNotAfterStart, _) => "endDateTime must be after startDateTime".to_string(),
        }
    }
}

impl RaceInput {
    /// Validate and convert to storage input
    pub fn to_new_race(&self) -> Result<NewRace, RaceInputError> {
        let start_raw = self
            .start_date_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(RaceInputError::MissingStart)?;

        let length = self
            .length
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .filter(|v| v.is_finite())
            .ok_or(RaceInputError::InvalidLength)?;

        let start = parse_datetime(start_raw).ok_or(RaceInputError::InvalidStart)?;
        let end = match self.end_date_time.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(parse_datetime(raw).ok_or(RaceInputError::InvalidEnd)?),
            None => None,
        };
        if let Some(end) = end
            && end <= start
        {
            return Err(RaceInputError::EndNotAfterStart);
        }

        Ok(NewRace {
            name: self.name.clone(),
            elevation: self.elevation,
            length,
            start_location: self.start_location.clone(),
            start_date_time: start.timestamp(),
            end_date_time: end.map(|e| e.timestamp()),
            gps_file: self.gps_file.clone(),
            competition_id: self.competition_id.clone().filter(|s| !s.is_empty()),
        })
    }
}

/// Request body for `POST /api/races` and `PUT /api/races/{id}`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaceRequest {
    /// Required on create, ignored on update
    pub race_event_id: Option<String>,
    #[serde(flatten)]
    pub race: RaceInput,
}

/// Query params for listing races
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRacesQuery {
    pub race_event_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> RaceInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_race() {
        let race = input(json!({
            "name": "Half",
            "length": 21.1,
            "startDateTime": "2025-06-01T08:00:00Z",
            "endDateTime": "2025-06-01T12:00:00Z"
        }))
        .to_new_race()
        .unwrap();
        assert_eq!(race.length, 21.1);
        assert_eq!(race.start_date_time, 1_748_764_800);
        assert_eq!(race.end_date_time, Some(1_748_779_200));
    }

    #[test]
    fn test_missing_start() {
        let err = input(json!({ "length": 5 })).to_new_race().unwrap_err();
        assert_eq!(err, RaceInputError::MissingStart);
        assert_eq!(err.message(Some(2)), "Missing startDateTime in race #2");

        let err = input(json!({ "length": 5, "startDateTime": "" }))
            .to_new_race()
            .unwrap_err();
        assert_eq!(err, RaceInputError::MissingStart);
    }

    #[test]
    fn test_length_must_be_number() {
        let err = input(json!({ "length": "5", "startDateTime": "2025-06-01" }))
            .to_new_race()
            .unwrap_err();
        assert_eq!(err, RaceInputError::InvalidLength);
        assert_eq!(err.message(Some(1)), "Invalid length in race #1");
        assert_eq!(err.message(None), "length must be a number");
    }

    #[test]
    fn test_end_must_follow_start() {
        let err = input(json!({
            "length": 5,
            "startDateTime": "2025-06-01T10:00:00",
            "endDateTime": "2025-06-01T10:00:00"
        }))
        .to_new_race()
        .unwrap_err();
        assert_eq!(err, RaceInputError::EndNotAfterStart);
        assert_eq!(err.message(Some(1)), "endDateTime must be after startDateTime");
    }

    #[test]
    fn test_unparseable_start() {
        let err = input(json!({ "length": 5, "startDateTime": "soon" }))
            .to_new_race()
            .unwrap_err();
        assert_eq!(err, RaceInputError::InvalidStart);
    }

    #[test]
    fn test_dto_formats_dates() {
        let dto = RaceDto::from(RaceRow {
            id: "r1".into(),
            race_event_id: "e1".into(),
            name: None,
            elevation: None,
            length: 10.0,
            start_location: None,
            start_date_time: 1_748_736_000,
            end_date_time: None,
            gps_file: None,
            competition_id: None,
        });
        assert_eq!(dto.start_date_time, "2025-06-01T00:00:00.000Z");
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["raceEventId"], "e1");
        assert!(json["endDateTime"].is_null());
    }
}
