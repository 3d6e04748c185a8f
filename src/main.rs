use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use posts_api::bootstrap::app_context::{AppContext, AppServices};
use posts_api::bootstrap::config::Config;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            posts_api::presentation::http::posts::create_post,
            posts_api::presentation::http::posts::list_posts,
            posts_api::presentation::http::posts::get_post,
            posts_api::presentation::http::posts::update_post,
            posts_api::presentation::http::posts::delete_post,
            posts_api::presentation::http::health::health,
        ),
        components(schemas(
            posts_api::presentation::http::posts::Post,
            posts_api::presentation::http::posts::PostRequest,
            posts_api::presentation::http::posts::CreatePostResponse,
            posts_api::presentation::http::posts::MessageResponse,
            posts_api::presentation::http::error::ErrorBody,
            posts_api::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Posts", description = "Blog posts and their tags"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::OPTIONS,
    ];
    let origin = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(v)) => AllowOrigin::exact(v),
        Some(Err(_)) | None if cfg.is_production => {
            // No usable origin configured: deny cross-origin requests
            AllowOrigin::exact(HeaderValue::from_static("http://invalid"))
        }
        _ => AllowOrigin::mirror_request(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers([http::header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "ctrl_c_listener_failed");
        std::future::pending::<()>().await;
    }
    info!("shutdown_requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "posts_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(api_port = cfg.api_port, is_production = cfg.is_production, "Starting posts API");

    // Database
    let pool =
        posts_api::infrastructure::db::connect_pool(&cfg.database_url, cfg.db_max_connections)
            .await?;
    posts_api::infrastructure::db::migrate(&pool).await?;

    let post_repo = Arc::new(
        posts_api::infrastructure::db::repositories::post_repository_sqlx::SqlxPostRepository::new(
            pool.clone(),
        ),
    );
    let ctx = AppContext::new(cfg.clone(), AppServices::new(post_repo));

    let app = Router::new()
        .merge(posts_api::presentation::http::health::routes(pool.clone()))
        .merge(posts_api::presentation::http::posts::routes(ctx))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}
