//! Application wiring: services + router.

use std::sync::Arc;

use axum::{Extension, Router};

use truetag_auth::Hs256JwtValidator;
use truetag_core::{DomainError, DomainResult};
use truetag_engine::{EngineConfig, ProductLifecycle, ReturnArbitrator, Verifier};
use truetag_infra::InMemoryProductRepository;
use truetag_oracle::HttpOracleClient;
use truetag_token::TokenService;

use crate::middleware::AuthState;

pub mod dto;
pub mod errors;
pub mod routes;

/// Process-level configuration, read once at startup.
///
/// Missing secrets fail here — a configuration error, never a request-time
/// one.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub mac_secret: String,
    pub oracle_base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> DomainResult<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| DomainError::configuration("JWT_SECRET is not set"))?;
        let mac_secret = std::env::var("HMAC_SECRET")
            .map_err(|_| DomainError::configuration("HMAC_SECRET is not set"))?;
        let oracle_base_url = std::env::var("AI_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

        Ok(Self {
            jwt_secret,
            mac_secret,
            oracle_base_url,
        })
    }
}

/// Engine services shared across request handlers.
///
/// Constructed once at process start and passed by handle to every route;
/// the engine itself is stateless between calls.
pub struct AppServices {
    pub lifecycle: ProductLifecycle,
    pub arbitrator: ReturnArbitrator,
    pub verifier: Verifier,
}

pub fn build_services(config: &ApiConfig, engine: EngineConfig) -> DomainResult<Arc<AppServices>> {
    let repository = Arc::new(InMemoryProductRepository::new());
    let tokens = TokenService::new(config.mac_secret.clone().into_bytes())?;

    let oracle = Arc::new(
        HttpOracleClient::new(&config.oracle_base_url, engine.oracle_timeout)
            .map_err(|e| DomainError::configuration(e.to_string()))?,
    );

    Ok(Arc::new(AppServices {
        lifecycle: ProductLifecycle::new(repository.clone(), tokens),
        arbitrator: ReturnArbitrator::new(repository.clone(), oracle.clone(), engine),
        verifier: Verifier::new(repository, oracle),
    }))
}

/// Build the router. Status reads and verification scans are public; every
/// mutating route and the history read require a bearer token.
pub fn build_app(services: Arc<AppServices>, jwt_secret: String) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth = AuthState { jwt };

    let protected = Router::new()
        .nest("/products", routes::products::router())
        .nest("/returns", routes::returns::router())
        .merge(routes::activation::protected_router())
        .route_layer(axum::middleware::from_fn_with_state(
            auth,
            crate::middleware::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .merge(routes::activation::public_router())
        .merge(routes::verify::router())
        .merge(routes::system::router())
        .layer(Extension(services))
}
