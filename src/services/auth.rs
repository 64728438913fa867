//! Account registration, login and bearer-token handling.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Role, User};
use crate::ports::{RepositoryError, UserRepository};
use crate::validation::{
    normalize_optional, sanitize_string, validate_email, validate_name, validate_password,
    ValidationError,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token, authorization denied")]
    MissingToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("User already exists")]
    EmailTaken,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Payload carried by issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub school: Option<String>,
    pub subjects: Vec<String>,
}

/// A signed-in account and its bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Self-service registration always creates a teacher account.
    pub async fn register(&self, input: Registration) -> Result<Session, AuthError> {
        validate_name("firstName", &input.first_name)?;
        validate_name("lastName", &input.last_name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = User::new(
            sanitize_string(&input.first_name),
            sanitize_string(&input.last_name),
            &input.email,
            hash_password(&input.password)?,
            Role::Teacher,
            normalize_optional(input.school),
            input
                .subjects
                .iter()
                .map(|s| sanitize_string(s))
                .filter(|s| !s.is_empty())
                .collect(),
        );

        let user = self.users.insert(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })?;

        info!(user_id = %user.id, "User registered");
        let token = self.tokens.issue(&user)?;
        Ok(Session { token, user })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        self.users.record_login(user.id, now).await?;
        user.last_login = Some(now);
        user.updated_at = now;

        info!(user_id = %user.id, "User logged in");
        let token = self.tokens.issue(&user)?;
        Ok(Session { token, user })
    }

    pub async fn current_user(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryUserRepository;

    fn service() -> (AuthService, InMemoryUserRepository) {
        let users = InMemoryUserRepository::new();
        let auth = AuthService::new(Arc::new(users.clone()), TokenService::new("secret", 1));
        (auth, users)
    }

    fn registration(email: &str) -> Registration {
        Registration {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            password: "password123".into(),
            school: Some("  Lincoln High ".into()),
            subjects: vec!["Math".into(), " ".into()],
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("password123", "not-a-hash"));
    }

    #[test]
    fn token_carries_identity() {
        let tokens = TokenService::new("secret", 1);
        let user = User::new(
            "A".into(),
            "B".into(),
            "a@b.co",
            "h".into(),
            Role::Admin,
            None,
            vec![],
        );

        let claims = tokens.verify(&tokens.issue(&user).unwrap()).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);

        let other = TokenService::new("other-secret", 1);
        assert!(matches!(
            other.verify(&tokens.issue(&user).unwrap()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("secret", -2);
        let user = User::new("A".into(), "B".into(), "a@b.co", "h".into(), Role::Teacher, None, vec![]);

        assert!(matches!(
            tokens.verify(&tokens.issue(&user).unwrap()),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[tokio::test]
    async fn register_creates_teacher() {
        let (auth, _) = service();

        let session = auth.register(registration("Jane@Example.com")).await.unwrap();

        assert_eq!(session.user.role, Role::Teacher);
        assert_eq!(session.user.email, "jane@example.com");
        assert_eq!(session.user.school.as_deref(), Some("Lincoln High"));
        assert_eq!(session.user.subjects, vec!["Math".to_string()]);
        assert_ne!(session.user.password_hash, "password123");
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let (auth, _) = service();
        auth.register(registration("jane@example.com")).await.unwrap();

        let err = auth.register(registration("JANE@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let (auth, _) = service();

        let mut bad = registration("not-an-email");
        assert!(matches!(auth.register(bad.clone()).await, Err(AuthError::Validation(_))));

        bad.email = "ok@example.com".into();
        bad.password = "123".into();
        assert!(matches!(auth.register(bad).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_checks_password_and_records_time() {
        let (auth, users) = service();
        let registered = auth.register(registration("jane@example.com")).await.unwrap();

        assert!(matches!(
            auth.login("jane@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@example.com", "password123").await,
            Err(AuthError::InvalidCredentials)
        ));

        let session = auth.login(" JANE@example.com ", "password123").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);

        let stored = users.find_by_id(registered.user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }
}
