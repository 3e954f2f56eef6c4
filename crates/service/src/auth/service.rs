use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use tracing::{info, instrument};

use super::domain::{AuthSession, LoginInput, Reader, RegisterInput};
use super::errors::AuthError;
use super::repository::ReaderRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 12,
        }
    }
}

/// JWT claims carried by a session token. `uid` resolves the review owner.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub exp: usize,
}

/// Auth business service independent of web framework
pub struct AuthService<R: ReaderRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: ReaderRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new reader with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockReaderRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockReaderRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { username: "frank".into(), password: "Secret123".into() };
    /// let reader = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(reader.username, "frank");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<Reader, AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::Validation("username required".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if self
            .repo
            .find_by_username(input.username.trim())
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let reader = self.repo.create(input.username.trim(), &hash).await?;
        info!(reader_id = %reader.id, username = %reader.username, "reader_registered");
        Ok(reader)
    }

    /// Authenticate a reader and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockReaderRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockReaderRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: Some("secret".into()), token_ttl_hours: 12 });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "ursula".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "ursula".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.reader.username, "ursula");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let record = self
            .repo
            .find_by_username(input.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&record.password_hash)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default()
            .verify_password(input.password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AuthError::Unauthorized);
        }

        let reader = record.reader;
        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours))
                .timestamp() as usize;
            let claims = Claims {
                sub: reader.username.clone(),
                uid: reader.id.to_string(),
                exp,
            };
            token = Some(
                encode(
                    &JwtHeader::default(),
                    &claims,
                    &EncodingKey::from_secret(secret.as_bytes()),
                )
                .map_err(|e| AuthError::TokenError(e.to_string()))?,
            );
        }

        Ok(AuthSession { reader, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockReaderRepository;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn svc_with_secret() -> AuthService<MockReaderRepository> {
        AuthService::new(
            Arc::new(MockReaderRepository::default()),
            AuthConfig {
                jwt_secret: Some("test-secret".into()),
                token_ttl_hours: 12,
            },
        )
    }

    #[tokio::test]
    async fn register_rejects_empty_username_and_short_password() {
        let svc = svc_with_secret();
        let err = svc
            .register(RegisterInput {
                username: "  ".into(),
                password: "Passw0rd".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = svc
            .register(RegisterInput {
                username: "ok".into(),
                password: "short".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = svc_with_secret();
        let input = RegisterInput {
            username: "frank".into(),
            password: "Passw0rd".into(),
        };
        svc.register(input.clone()).await.unwrap();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn login_issues_decodable_token_with_reader_uid() {
        let svc = svc_with_secret();
        let reader = svc
            .register(RegisterInput {
                username: "ursula".into(),
                password: "Passw0rd".into(),
            })
            .await
            .unwrap();

        let session = svc
            .login(LoginInput {
                username: "ursula".into(),
                password: "Passw0rd".into(),
            })
            .await
            .unwrap();
        let token = session.token.expect("token issued");

        let key = DecodingKey::from_secret(b"test-secret");
        let data =
            decode::<Claims>(&token, &key, &Validation::new(Algorithm::HS256)).expect("decodes");
        assert_eq!(data.claims.sub, "ursula");
        assert_eq!(data.claims.uid, reader.id.to_string());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let svc = svc_with_secret();
        svc.register(RegisterInput {
            username: "frank".into(),
            password: "Passw0rd".into(),
        })
        .await
        .unwrap();

        let err = svc
            .login(LoginInput {
                username: "frank".into(),
                password: "wrong-pass".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        let err = svc
            .login(LoginInput {
                username: "nobody".into(),
                password: "Passw0rd".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }
}
