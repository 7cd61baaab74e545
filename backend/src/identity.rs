//! Client for the external identity provider (Keycloak).
//!
//! Logins and refreshes go through the realm's OpenID Connect token endpoint.
//! Registration uses the admin REST API with a short-lived admin token from the
//! master realm.

use std::time::Duration;

use common::{RegisterRequest, RegisterResponse, TokenResponse};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::IdentityConfig;
use crate::error::AppError;

const ADMIN_CLIENT_ID: &str = "admin-cli";

#[derive(Debug, Deserialize)]
struct IdRepresentation {
    id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RoleRepresentation {
    id: String,
    name: String,
}

pub struct IdentityClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    fn token_url(&self, realm: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.server_url.trim_end_matches('/'),
            realm
        )
    }

    fn logout_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/logout",
            self.config.server_url.trim_end_matches('/'),
            self.config.realm
        )
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}{}",
            self.config.server_url.trim_end_matches('/'),
            self.config.realm,
            path
        )
    }

    // --- Token endpoint ---

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        tracing::info!("Requesting token for user: {}", username);
        let response = self
            .http
            .post(self.token_url(&self.config.realm))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        token_from(response, "login").await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(self.token_url(&self.config.realm))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        token_from(response, "refresh").await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.logout_url())
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            tracing::warn!("Logout rejected by identity provider: {}", status);
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            return Err(provider_error("logout", response).await);
        }
        Ok(())
    }

    // --- Admin API ---

    async fn admin_token(&self) -> Result<String, AppError> {
        let response = self
            .http
            .post(self.token_url("master"))
            .form(&[
                ("client_id", ADMIN_CLIENT_ID),
                ("grant_type", "password"),
                ("username", self.config.admin_username.as_str()),
                ("password", self.config.admin_password.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("admin token", response).await);
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Creates the account, then grants the client role matching `user_type`.
    ///
    /// Only account creation is fatal. A failed role mapping is logged and
    /// reported through `role_assigned`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, AppError> {
        let admin_token = self.admin_token().await?;
        self.create_user(&admin_token, request).await?;
        tracing::info!("Created user '{}' in realm {}", request.username, self.config.realm);

        let role = request.user_type.client_role();
        let role_assigned = match self.assign_client_role(&admin_token, &request.username, role).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "User '{}' was created but role '{}' could not be assigned: {}",
                    request.username,
                    role,
                    e
                );
                false
            }
        };

        let message = if role_assigned {
            "User registered successfully".to_string()
        } else {
            "User registered, but the role could not be assigned".to_string()
        };

        Ok(RegisterResponse {
            username: request.username.clone(),
            role: role.to_string(),
            role_assigned,
            message,
        })
    }

    async fn create_user(&self, admin_token: &str, request: &RegisterRequest) -> Result<(), AppError> {
        let user = json!({
            "username": request.username,
            "email": request.email,
            "firstName": request.first_name,
            "lastName": request.last_name,
            "enabled": true,
            "credentials": [{
                "type": "password",
                "value": request.password,
                "temporary": false,
            }],
        });

        let response = self
            .http
            .post(self.admin_url("/users"))
            .bearer_auth(admin_token)
            .json(&user)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(AppError::Conflict(format!(
                "User '{}' already exists",
                request.username
            ))),
            _ => Err(provider_error("create user", response).await),
        }
    }

    async fn assign_client_role(
        &self,
        admin_token: &str,
        username: &str,
        role_name: &str,
    ) -> Result<(), AppError> {
        let user_id = self.find_user_id(admin_token, username).await?;
        let client_uuid = self.client_uuid(admin_token).await?;
        let role = self.client_role(admin_token, &client_uuid, role_name).await?;

        let response = self
            .http
            .post(self.admin_url(&format!(
                "/users/{user_id}/role-mappings/clients/{client_uuid}"
            )))
            .bearer_auth(admin_token)
            .json(&[role])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("assign role", response).await);
        }
        Ok(())
    }

    async fn find_user_id(&self, admin_token: &str, username: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(self.admin_url("/users"))
            .bearer_auth(admin_token)
            .query(&[("username", username), ("exact", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("find user", response).await);
        }
        let users: Vec<IdRepresentation> = response.json().await?;
        users
            .into_iter()
            .next()
            .map(|user| user.id)
            .ok_or_else(|| AppError::IdentityProvider(format!("user '{username}' not found")))
    }

    /// Internal id of the configured client, which the admin API needs instead of its `clientId`.
    async fn client_uuid(&self, admin_token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(self.admin_url("/clients"))
            .bearer_auth(admin_token)
            .query(&[("clientId", self.config.client_id.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("find client", response).await);
        }
        let clients: Vec<IdRepresentation> = response.json().await?;
        clients
            .into_iter()
            .next()
            .map(|client| client.id)
            .ok_or_else(|| {
                AppError::IdentityProvider(format!("client '{}' not found", self.config.client_id))
            })
    }

    async fn client_role(
        &self,
        admin_token: &str,
        client_uuid: &str,
        role_name: &str,
    ) -> Result<RoleRepresentation, AppError> {
        let response = self
            .http
            .get(self.admin_url(&format!("/clients/{client_uuid}/roles/{role_name}")))
            .bearer_auth(admin_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("find role", response).await);
        }
        Ok(response.json().await?)
    }
}

/// Token responses: any 4xx means the caller's credentials or token were refused.
async fn token_from(response: Response, context: &str) -> Result<TokenResponse, AppError> {
    let status = response.status();
    if status.is_client_error() {
        tracing::warn!("Identity provider refused {}: {}", context, status);
        return Err(AppError::Unauthorized);
    }
    if !status.is_success() {
        return Err(provider_error(context, response).await);
    }
    Ok(response.json().await?)
}

async fn provider_error(context: &str, response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AppError::IdentityProvider(format!("{context} failed with {status}: {body}"))
}
