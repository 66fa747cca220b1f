mod assets;
mod error;
mod graphql;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use geogame_shared::round::RoundContext;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use error::AppError;
use graphql::Schema;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";

/// Build the full application router.
///
/// `/static` serves the asset directory (config, city list).
fn build_app(schema: Schema, assets_dir: &Path) -> Router {
    let static_files =
        Router::new().nest("/static", cached_static_router(assets_dir, CACHE_1DAY));

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(serve_index))
        .with_state(schema)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

async fn run() -> Result<(), AppError> {
    let assets_dir =
        PathBuf::from(std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()));
    let loaded_assets = assets::Assets::load(&assets_dir)?;

    // An unusable calibration or score curve makes every round meaningless.
    let round = Arc::new(RoundContext::from_config(&loaded_assets.config)?);

    let schema = graphql::build_schema(Arc::new(loaded_assets), round);
    let app = build_app(schema, &assets_dir);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!(%addr, "Server running at http://localhost:{}", port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", port);

    axum::serve(listener, app).await.map_err(AppError::Serve)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Geo Guess</title></head>
<body>
<h1>Geo Guess</h1>
<p>Click the map where you think the city is. The closer the guess, the higher the score.</p>
<p>Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#;

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const CITIES: &str = r#"[{"name": "Paris", "longitude": 2.3522, "latitude": 48.8566}]"#;

    /// Create a temp asset dir holding a city list.
    fn temp_assets_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cities.json"), CITIES).unwrap();
        dir
    }

    fn test_app(assets_dir: &Path) -> Router {
        let loaded = assets::Assets::load(assets_dir).unwrap();
        let round = Arc::new(RoundContext::from_config(&loaded.config).unwrap());
        build_app(graphql::build_schema(Arc::new(loaded), round), assets_dir)
    }

    async fn send_get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_static_assets_have_1day_cache() {
        let dir = temp_assets_dir();
        let resp = send_get(test_app(dir.path()), "/static/cities.json").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let dir = temp_assets_dir();
        let resp = send_get(test_app(dir.path()), "/static/nonexistent.txt").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_only_static_and_api_routes_are_served() {
        let dir = temp_assets_dir();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img").join("map.png"), "png").unwrap();
        let app = test_app(dir.path());

        let resp = send_get(app.clone(), "/img/map.png").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send_get(app, "/static/img/map.png").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_index_page() {
        let dir = temp_assets_dir();
        let resp = send_get(test_app(dir.path()), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/graphql"));
    }

    #[tokio::test]
    async fn test_graphql_post_evaluates_guess() {
        let dir = temp_assets_dir();
        let app = test_app(dir.path());

        let query = serde_json::json!({
            "query": r#"{ evaluateGuess(input: { cityName: "Paris", x: 400, y: 300 }) { score distanceKm } }"#
        });
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(query.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["errors"].is_null(), "errors: {}", json["errors"]);
        let score = json["data"]["evaluateGuess"]["score"].as_u64().unwrap();
        assert!(score > 0 && score <= 1000);
    }
}
