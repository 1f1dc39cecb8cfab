//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{
    auth, checkpoints, competitions, health, organizers, participants, race_events, races,
    timings,
};
use crate::api::types::{MessageResponse, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RaceTime API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Race timing system backend"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration and cookie sessions"),
        (name = "race-events", description = "Race events and their search filters"),
        (name = "races", description = "Individual races"),
        (name = "competitions", description = "Competitions races belong to"),
        (name = "organizers", description = "Event organizers"),
        (name = "timing", description = "Participants, checkpoints and timings")
    ),
    paths(
        health::health,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Race events
        race_events::list_race_events,
        race_events::create_race_event,
        race_events::get_race_event,
        race_events::get_race_event_by_slug,
        race_events::update_race_event,
        race_events::delete_race_event,
        // Races
        races::list_races,
        races::create_race,
        races::get_race,
        races::update_race,
        races::delete_race,
        // Competitions & organizers
        competitions::list_competitions,
        competitions::create_competition,
        competitions::get_competition,
        organizers::list_organizers,
        organizers::create_organizer,
        organizers::get_organizer,
        // Timing
        participants::list_participants,
        participants::create_participant,
        checkpoints::list_checkpoints,
        checkpoints::create_checkpoint,
        timings::list_timings,
        timings::create_timing,
    ),
    components(schemas(
        PaginationMeta,
        MessageResponse,
        health::HealthResponse,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::UserDto,
        auth::RegisterResponse,
        auth::MeResponse,
        race_events::types::RaceEventDto,
        race_events::types::RaceEventRequest,
        races::types::RaceDto,
        races::types::RaceInput,
        races::types::RaceRequest,
        competitions::CompetitionDto,
        competitions::CreateCompetitionRequest,
        organizers::OrganizerDto,
        organizers::CreateOrganizerRequest,
        participants::ParticipantDto,
        participants::CreateParticipantRequest,
        checkpoints::CheckpointDto,
        checkpoints::CreateCheckpointRequest,
        timings::TimingDto,
        timings::TimingDetailDto,
        timings::CreateTimingRequest,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>RaceTime API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({ url: "/api/openapi.json", dom_id: '#swagger-ui' });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_race_event_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/race-events"));
        assert!(paths.contains_key("/api/race-events/slug/{slug}"));
        assert!(paths.contains_key("/api/timings"));
        assert!(doc["components"]["schemas"]["RaceEventDto"].is_object());
    }
}
