//! HTTP routes. Everything except the health check lives under `/api`.

pub mod exams;
pub mod health;
pub mod import;
pub mod scores;
pub mod students;

use axum::handler::Handler;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Extension, Router};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::err;

pub fn router(pg: PgPool, allowed_origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::check))
        .route("/api/students", get(students::list).post(students::create))
        .route(
            "/api/students/:id",
            get(students::read)
                .put(students::update)
                .delete(students::delete),
        )
        .route("/api/exams", get(exams::list).post(exams::create))
        .route("/api/scores", get(scores::list).post(scores::create))
        .route("/api/search/students", get(students::search))
        .route("/api/import/scores", post(import::scores))
        .fallback(err::handler404.into_service())
        .layer(Extension(pg))
        .layer(cors)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// A router whose pool never connects; only usable for requests that are
    /// answered before any query runs.
    pub fn offline_router() -> Router {
        let pg = PgPoolOptions::new()
            .connect_lazy("postgres://offline@localhost/unused")
            .unwrap();
        super::router(pg, vec![])
    }

    pub async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = offline_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::send;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn unknown_path_is_json_not_found() {
        let request = Request::get("/api/teachers").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NotFound");
        assert_eq!(body["message"], "Invalid path: /api/teachers");
    }
}
