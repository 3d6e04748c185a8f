use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
    pub database: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, body = HealthResp),
        (status = 503, body = HealthResp)
    )
)]
pub async fn health(State(pool): State<PgPool>) -> (StatusCode, Json<HealthResp>) {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResp {
                status: "ok",
                database: "up",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = ?e, "health_db_check_failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResp {
                    status: "degraded",
                    database: "down",
                }),
            )
        }
    }
}

pub fn routes(pool: PgPool) -> Router {
    Router::new().route("/health", get(health)).with_state(pool)
}
