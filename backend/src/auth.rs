use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, Json};
use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::{
    LoginRequest, LogoutResponse, ProfileResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, TokenResponse, UserType,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::JwtConfig;
use crate::error::AppError;
use crate::extractors::{ApiJson, AuthUser};
use crate::web_server::AppState;

// --- Token verification ---

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClientAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The part of an identity-provider access token this service reads.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub resource_access: HashMap<String, ClientAccess>,
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    client_id: String,
}

impl TokenVerifier {
    /// RS256 against the realm public key when configured, otherwise HS256 with the shared secret.
    pub fn from_config(
        jwt: &JwtConfig,
        client_id: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let (key, algorithm) = match (&jwt.public_key_pem, &jwt.secret) {
            (Some(pem), _) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => return Err(ErrorKind::InvalidKeyFormat.into()),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            key,
            validation,
            client_id: client_id.to_string(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, jsonwebtoken::errors::Error> {
        let mut claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;
        let roles = claims
            .resource_access
            .remove(&self.client_id)
            .unwrap_or_default()
            .roles;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.preferred_username,
            roles,
        })
    }
}

// --- Middleware for JWT Authentication ---

pub async fn auth_middleware(
    State(state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = auth_header.ok_or(AppError::Unauthorized)?;
    let user = state.verifier.verify(bearer.token())?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn require_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.has_role(role) {
        Ok(())
    } else {
        tracing::warn!("User {} lacks role {}", user.id, role);
        Err(AppError::Forbidden)
    }
}

// --- API Handlers ---

/// ## Register a new user
/// Creates the account at the identity provider and grants the role for its user type.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Invalid data provided"),
        (status = 409, description = "User already exists"),
        (status = 502, description = "Identity provider failure"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload.validate()?;

    tracing::info!(
        "Registering user '{}' as {:?}",
        payload.username,
        payload.user_type
    );
    let registered = state.identity.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// ## Login an existing user
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Identity provider failure"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let tokens = state
        .identity
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let tokens = state.identity.refresh(&payload.refresh_token).await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
        (status = 401, description = "Invalid refresh token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<LogoutResponse>, AppError> {
    payload.validate()?;

    state.identity.logout(&payload.refresh_token).await?;
    Ok(Json(LogoutResponse {
        status: "success".to_string(),
        message: "Logout successful".to_string(),
    }))
}

// --- Protected profile endpoints ---

fn profile(user: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: user.id,
        username: user.username,
        roles: user.roles,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Customer profile", body = ProfileResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not a customer"),
    )
)]
pub async fn customer_profile(user: AuthUser) -> Result<Json<ProfileResponse>, AppError> {
    require_role(&user, UserType::Customer.client_role())?;
    Ok(profile(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/owner/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Hotel owner profile", body = ProfileResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not a hotel owner"),
    )
)]
pub async fn owner_profile(user: AuthUser) -> Result<Json<ProfileResponse>, AppError> {
    require_role(&user, UserType::HotelOwner.client_role())?;
    Ok(profile(user))
}
