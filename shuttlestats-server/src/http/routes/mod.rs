//! Route handlers organized by resource

pub mod health;
pub mod matches;
pub mod pairs;
pub mod players;

use serde::Serialize;

/// Body returned by every DELETE endpoint
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub(crate) fn deleted(resource: &str, id: i32) -> Self {
        Self {
            success: true,
            message: format!("{} {} deleted", resource, id),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router harness for handler tests.
    //!
    //! The pool connects lazily, so requests rejected during extraction or
    //! validation never need a database.

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::http::server::{build_router, ServerConfig};

    pub fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/shuttlestats_unreachable")
            .unwrap();
        build_router(pool, &ServerConfig::default())
    }

    pub async fn send(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
