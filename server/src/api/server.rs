//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::AuthManager;
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{
    auth, checkpoints, competitions, health, organizers, participants, race_events, races,
    timings,
};
use crate::core::CoreApp;
use crate::core::constants::{AUTH_BODY_LIMIT, DEFAULT_BODY_LIMIT};
use crate::data::TransactionalService;

/// Assemble the full HTTP router
pub fn build_router(
    database: Arc<TransactionalService>,
    auth_manager: Arc<AuthManager>,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let auth_routes = auth::routes(auth_manager, database.clone())
        .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

    Router::new()
        .route("/", get(health::root_banner))
        .route("/api/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest("/api/auth", auth_routes)
        .nest("/api/race-events", race_events::routes(database.clone()))
        .nest("/api/races", races::routes(database.clone()))
        .nest("/api/competitions", competitions::routes(database.clone()))
        .nest("/api/organizers", organizers::routes(database.clone()))
        .nest("/api/participants", participants::routes(database.clone()))
        .nest("/api/checkpoints", checkpoints::routes(database.clone()))
        .nest("/api/timings", timings::routes(database))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown is triggered; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(app.database.clone(), app.auth.clone(), &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::core::config::{AuthConfig, ServerConfig};
    use crate::core::constants::ROOT_BANNER_TEXT;

    async fn router_with_origins(cors_origins: &[&str]) -> Router {
        let database = Arc::new(TransactionalService::in_memory().await.unwrap());
        let auth = Arc::new(AuthManager::new(&AuthConfig::default()));
        let allowed = AllowedOrigins::new(&ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5001,
            cors_origins: cors_origins.iter().map(|o| o.to_string()).collect(),
        });
        build_router(database, auth, &allowed)
    }

    async fn router() -> Router {
        router_with_origins(&[]).await
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_event(app: &Router, body: Value) -> Value {
        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/race-events", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_root_banner_and_health() {
        let app = router().await;
        let response = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], ROOT_BANNER_TEXT.as_bytes());

        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_cors_origin_handling() {
        let from = |origin: &str| {
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap()
        };

        let app = router().await;
        let response = app.clone().oneshot(from("http://localhost:5001")).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5001"
        );
        let response = app.oneshot(from("https://elsewhere.example")).await.unwrap();
        assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let open = router_with_origins(&["*"]).await;
        let response = open.oneshot(from("https://elsewhere.example")).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://elsewhere.example"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = router().await.oneshot(get("/api/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_race_event_lifecycle() {
        let app = router().await;
        let created = create_event(
            &app,
            json!({
                "eventName": "Mountain Trail",
                "tags": ["trail"],
                "races": [
                    { "name": "Long", "length": 42.0, "startDateTime": "2025-09-14T07:00:00Z" },
                    { "name": "Short", "length": 12.5, "startDateTime": "2025-09-14T09:00:00Z" }
                ]
            }),
        )
        .await;
        assert_eq!(created["slug"], "mountain-trail-2025");
        assert_eq!(created["races"].as_array().unwrap().len(), 2);
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get("/api/race-events/slug/mountain-trail-2025"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["id"], id.as_str());

        let response = app
            .clone()
            .oneshot(send_json(
                "PUT",
                &format!("/api/race-events/{}", id),
                json!({
                    "eventName": "Mountain Trail",
                    "races": [{ "length": 21.0, "startDateTime": "2025-09-14" }]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["races"].as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/race-events/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            json_body(response).await["message"],
            "Race event deleted successfully"
        );

        let response = app
            .oneshot(get(&format!("/api/race-events/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_names_get_numbered_slugs() {
        let app = router().await;
        let body = json!({
            "eventName": "City Run",
            "races": [{ "length": 10, "startDateTime": "2024-04-01" }]
        });
        assert_eq!(create_event(&app, body.clone()).await["slug"], "city-run-2024");
        assert_eq!(create_event(&app, body).await["slug"], "city-run-2024-2");
    }

    #[tokio::test]
    async fn test_race_event_validation_messages() {
        let app = router().await;
        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/race-events", json!({ "eventName": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "eventName is required");

        let response = app
            .oneshot(send_json(
                "POST",
                "/api/race-events",
                json!({ "eventName": "X", "races": [{ "length": 5 }] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Missing startDateTime in race #1"
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let app = router().await;
        create_event(
            &app,
            json!({
                "eventName": "Ultra Trail",
                "tags": ["trail", "ultra"],
                "races": [{ "length": 80, "startDateTime": "2025-07-01" }]
            }),
        )
        .await;
        create_event(
            &app,
            json!({
                "eventName": "Park Run",
                "tags": ["road"],
                "races": [{ "length": 5, "startDateTime": "2025-03-01" }]
            }),
        )
        .await;

        let response = app
            .clone()
            .oneshot(get("/api/race-events?length_gte=50"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["meta"]["totalItems"], 1);
        assert_eq!(body["data"][0]["eventName"], "Ultra Trail");

        let response = app
            .clone()
            .oneshot(get("/api/race-events?tags_in=road,ultra&sortBy=eventName&order=asc"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"][0]["eventName"], "Park Run");
        assert_eq!(body["data"][1]["eventName"], "Ultra Trail");

        let response = app
            .clone()
            .oneshot(get("/api/race-events?limit=1&page=2&sortBy=eventName&order=asc"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["meta"]["totalPages"], 2);
        assert_eq!(body["data"][0]["eventName"], "Ultra Trail");

        let response = app
            .oneshot(get("/api/race-events?bogusField=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_races_require_event() {
        let app = router().await;
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/races",
                json!({ "length": 5, "startDateTime": "2025-01-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "raceEventId is required");

        let event = create_event(&app, json!({ "eventName": "Solo" })).await;
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/races",
                json!({
                    "raceEventId": event["id"],
                    "length": 5,
                    "startDateTime": "2025-01-01"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(get(&format!(
                "/api/races?raceEventId={}",
                event["id"].as_str().unwrap()
            )))
            .await
            .unwrap();
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_timing_flow() {
        let app = router().await;
        let event = create_event(
            &app,
            json!({
                "eventName": "Relay",
                "races": [{ "length": 10, "startDateTime": "2025-05-05T08:00:00Z" }]
            }),
        )
        .await;
        let race_id = event["races"][0]["id"].clone();

        let participant = json_body(
            app.clone()
                .oneshot(send_json(
                    "POST",
                    "/api/participants",
                    json!({ "name": "Ana", "rfidTag": "TAG-1" }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let checkpoint = json_body(
            app.clone()
                .oneshot(send_json(
                    "POST",
                    "/api/checkpoints",
                    json!({ "name": "Finish", "location": "Square" }),
                ))
                .await
                .unwrap(),
        )
        .await;

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/timings",
                json!({
                    "participantId": participant["id"],
                    "checkpointId": checkpoint["id"],
                    "raceId": race_id,
                    "timestamp": "2025-05-05T08:45:12Z"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/timings",
                json!({ "participantId": participant["id"], "checkpointId": checkpoint["id"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "raceId is required");

        let list = json_body(app.oneshot(get("/api/timings")).await.unwrap()).await;
        assert_eq!(list[0]["participant"]["rfidTag"], "TAG-1");
        assert_eq!(list[0]["checkpoint"]["name"], "Finish");
        assert_eq!(list[0]["timestamp"], "2025-05-05T08:45:12.000Z");
    }

    #[tokio::test]
    async fn test_duplicate_rfid_is_conflict() {
        let app = router().await;
        let body = json!({ "name": "Ana", "rfidTag": "TAG-9" });
        let first = app
            .clone()
            .oneshot(send_json("POST", "/api/participants", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = app
            .oneshot(send_json("POST", "/api/participants", body))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }
}
