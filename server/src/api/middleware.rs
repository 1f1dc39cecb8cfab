//! HTTP middleware (CORS, 404 handler)

use axum::Json;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::core::config::{ServerConfig, is_all_interfaces};

/// Origins allowed to make credentialed requests
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
    /// `*` in `cors_origins`: every origin is echoed back
    any: bool,
}

impl AllowedOrigins {
    /// Localhost variants of the server address, LAN addresses when binding
    /// to all interfaces, and any configured extra origins. A `*` entry
    /// opens the API to every origin.
    pub fn new(server: &ServerConfig) -> Self {
        let host = server.host.as_str();
        let port = server.port;
        let is_all = is_all_interfaces(host);

        let base_hosts: Vec<&str> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost", "127.0.0.1"]
        } else {
            vec![host]
        };

        let mut origins = Vec::new();
        for h in &base_hosts {
            origins.push(format!("http://{}:{}", h, port));
            origins.push(format!("http://{}", h));
        }

        if is_all && let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                origins.push(format!("http://{}:{}", ip, port));
            }
        }

        let mut any = false;
        for origin in &server.cors_origins {
            match origin.trim() {
                "*" => any = true,
                o => origins.push(o.trim_end_matches('/').to_string()),
            }
        }
        if any {
            tracing::warn!("CORS allows any origin");
        }

        Self { origins, any }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.any || self.origins.iter().any(|o| o == origin)
    }

    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    // Credentialed CORS cannot answer with a literal `*`
    let allow_origin = if allowed.any {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(allowed.as_header_values())
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .allow_credentials(true)
}

/// JSON 404 for unknown routes
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404] No route");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not_found",
            "code": "ROUTE_NOT_FOUND",
            "message": format!("No route for {} {}", req.method(), req.uri().path()),
        })),
    )
}
