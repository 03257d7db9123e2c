use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use models::user::Role;
use service::policy::Caller;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: AuthConfig,
}

/// Claims of the externally issued HS256 session token. Issuance lives
/// outside this system; only verification/decoding happens here.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
}

/// Identity extractor: resolves the caller from `Authorization: Bearer` or
/// the `auth_token` cookie. Missing or invalid tokens reject with 401.
pub struct CurrentUser(pub Caller);

#[async_trait::async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.to_string());
        let token = match bearer {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get("auth_token")
                .map(|c| c.value().to_string())
                .ok_or_else(ApiError::unauthorized)?,
        };

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::unauthorized())?;

        Ok(CurrentUser(Caller { id: data.claims.sub, role: data.claims.role }))
    }
}
