use crate::cli::Args;
use crate::models::webhook::{ RelayMessage, RelayRequest };
use crate::webhook::RelayClient;
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    body::Bytes,
    routing::post,
    Router,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error, warn };

#[derive(Serialize)]
struct StatusMessage {
    success: bool,
    message: String,
}

#[derive(Clone)]
struct AppState {
    relay: RelayClient,
}

pub fn router(relay: RelayClient) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/webhook", post(relay_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

pub async fn start_http_server(
    addr: &str,
    relay: RelayClient,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = router(relay);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("Missing TLS certificate or key path".into());
            }
        };
        info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Relay listening on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await
            .map_err(|e| format!("Failed to bind relay server to {}: {}", addr, e))?;
        info!("Relay listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

fn status_response(code: StatusCode, message: &str) -> Response {
    (code, axum::Json(StatusMessage {
        success: false,
        message: message.to_string(),
    })).into_response()
}

async fn relay_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let req: RelayRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            error!("Relay request is not valid JSON: {}", e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor");
        }
    };

    let first = req.body
        .and_then(|b| b.messages)
        .and_then(|messages| messages.into_iter().next());
    let Some(inbound) = first else {
        warn!("Relay request without messages");
        return status_response(StatusCode::BAD_REQUEST, "Mensaje inválido");
    };

    let message = RelayMessage::from(inbound);
    match state.relay.forward(&message).await {
        Ok(resp) => axum::Json(resp).into_response(),
        Err(e) => {
            error!("Relay forward failed: {}", e);
            status_response(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{ json, Value };
    use tower::ServiceExt;
    use wiremock::matchers::{ body_json, method };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    async fn call(app: Router, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap()
            ).await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_relay_renames_and_forwards() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "messages": [{ "type": "text", "text": "Hola", "from": "Ana" }],
                "contacts": [{ "wa_id": "Ana" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let app = router(RelayClient::new(server.uri()).unwrap());
        let body = json!({
            "body": {
                "messages": [{ "type": "text", "text": "Hola", "from": "Ana" }],
                "contacts": [{ "wa_id": "Ana" }]
            }
        });
        let (status, value) = call(app, &body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "success": true, "data": { "reply": "ok" } }));
    }

    #[tokio::test]
    async fn test_missing_messages_is_bad_request() {
        let app = router(RelayClient::new("http://127.0.0.1:9").unwrap());
        for body in [r#"{"body": {}}"#, r#"{"body": {"messages": []}}"#, r#"{}"#] {
            let (status, value) = call(app.clone(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value, json!({ "success": false, "message": "Mensaje inválido" }));
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_server_error() {
        let app = router(RelayClient::new("http://127.0.0.1:9").unwrap());
        let (status, value) = call(app, "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["message"], "Error interno del servidor");
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_passed_through_as_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let app = router(RelayClient::new(server.uri()).unwrap());
        let body = r#"{"body": {"messages": [{"type": "text", "text": "Hola", "from": "Ana"}]}}"#;
        let (status, value) = call(app, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "success": false, "error": "HTTP error! status: 503" }));
    }
}
