use std::{net::SocketAddr, sync::Arc};

use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{self, TokenVerifier};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::identity::IdentityClient;
use crate::openapi::ApiDoc;
use crate::routes;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub app_config: Arc<AppConfig>,
    pub identity: Arc<IdentityClient>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(db_pool: DbPool, app_config: AppConfig) -> anyhow::Result<Self> {
        let identity = IdentityClient::new(&app_config.identity)?;
        let verifier = TokenVerifier::from_config(&app_config.jwt, identity.client_id())?;

        Ok(Self {
            db_pool,
            app_config: Arc::new(app_config),
            identity: Arc::new(identity),
            verifier: Arc::new(verifier),
        })
    }
}

pub async fn run_server(app_state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        app_state.app_config.web.addr, app_state.app_config.web.port
    )
    .parse()?;

    let app = create_router(app_state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Serving API at http://{}", listener.local_addr()?);
    tracing::info!("Swagger UI at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                layer
            }
        },
    }
}

pub fn create_router(app_state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout));

    // Bearer token required
    let profile_routes = Router::new()
        .route("/v1/profile", get(auth::customer_profile))
        .route("/v1/owner/profile", get(auth::owner_profile))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::auth_middleware,
        ));

    let cors = cors_layer(&app_state.app_config.web.cors_origin);

    Router::new()
        .nest(
            "/api",
            auth_routes.merge(profile_routes).merge(routes::router()),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
}
