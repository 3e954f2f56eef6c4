use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use service::auth::repo::seaorm::SeaOrmReaderRepository;
use service::auth::{
    domain::{LoginInput, RegisterInput},
    errors::AuthError,
    service::{AuthConfig, AuthService, Claims},
};
use service::catalog::repo::seaorm::SeaOrmBookStore;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub store: Arc<SeaOrmBookStore>,
    pub auth: ServerAuthConfig,
}

/// Reader identity resolved by the bearer-token middleware, injected into
/// request extensions for the protected handlers.
#[derive(Clone, Debug)]
pub struct CurrentReader {
    pub id: Uuid,
    pub username: String,
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub reader_id: Uuid,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub reader_id: Uuid,
    pub username: String,
    pub token: String,
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmReaderRepository> {
    let repo = Arc::new(SeaOrmReaderRepository {
        db: state.db.clone(),
    });
    AuthService::new(
        repo,
        AuthConfig {
            jwt_secret: Some(state.auth.jwt_secret.clone()),
            token_ttl_hours: 12,
        },
    )
}

#[utoipa::path(post, path = "/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Registered"),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Conflict")
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    match auth_service(&state).register(input).await {
        Ok(reader) => Ok((
            StatusCode::CREATED,
            Json(RegisterOutput { reader_id: reader.id }),
        )),
        Err(e @ AuthError::Validation(_)) => Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some(e.to_string()),
        )),
        Err(e @ AuthError::Conflict) => Err(JsonApiError::new(
            StatusCode::CONFLICT,
            "Conflict",
            Some(e.to_string()),
        )),
        Err(e) => {
            tracing::error!(err = %e, code = e.code(), "register failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Register Failed",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged In"),
        (status = 403, description = "Not Authenticated")
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = auth_service(&state).login(input).await.map_err(|e| {
        JsonApiError::new(
            StatusCode::FORBIDDEN,
            "Not Authenticated",
            Some(e.to_string()),
        )
    })?;
    let reader = session.reader;
    if let Some(token) = session.token {
        let mut cookie = Cookie::new("auth_token", token.clone());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(false);
        cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
        let jar = jar.add(cookie);
        let out = LoginOutput {
            reader_id: reader.id,
            username: reader.username,
            token,
        };
        return Ok((jar, Json(out)));
    }
    Err(JsonApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Token Generation Failed",
        None,
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

/// Bearer-token middleware for the review mutations. A missing credential is
/// 403, an invalid or expired one is 401 (distinct on purpose: the first is
/// "you never identified yourself", the second "your credential is bad").
/// On success the resolved reader lands in request extensions.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_owned();

    // Authorization header first, auth_token cookie as fallback
    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            let Some(rest) = h.strip_prefix(prefix) else {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "Invalid Token",
                    Some("expected Bearer authorization".into()),
                ));
            };
            rest.to_string()
        } else {
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(JsonApiError::new(
                        StatusCode::FORBIDDEN,
                        "Token Required",
                        Some("a token is required for authentication".into()),
                    ));
                }
            }
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => {
            let Ok(reader_id) = Uuid::parse_str(&data.claims.uid) else {
                tracing::error!(path = %path, "token uid is not a uuid");
                return Err(JsonApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "Invalid Token",
                    None,
                ));
            };
            req.extensions_mut().insert(CurrentReader {
                id: reader_id,
                username: data.claims.sub,
            });
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(JsonApiError::new(
                StatusCode::UNAUTHORIZED,
                "Invalid Token",
                Some(e.to_string()),
            ))
        }
    }
}
