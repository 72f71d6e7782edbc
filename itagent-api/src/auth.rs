//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` is the caller's user id. A token is
//! optional on most routes, but one that is presented must verify. Team
//! routes refuse anonymous callers outright.
//!
//! Expiry and not-before are checked here against a [`JwtClock`] rather than
//! inside `jsonwebtoken`, so tests can pin the current time.

use std::{collections::HashSet, fmt, sync::Arc};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Signing secret used when `ITAGENT_JWT_SECRET` is unset. Refused in production.
const DEV_SECRET: &str = "itagent-dev-secret-do-not-deploy";
const MIN_PRODUCTION_SECRET_LEN: usize = 32;
const ALGORITHM: Algorithm = Algorithm::HS256;

pub trait JwtClock: Send + Sync {
    fn now_epoch_secs(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Always reports the wrapped epoch second.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// HMAC key material. `Debug` prints only the length.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    pub fn new(secret: String) -> ApiResult<Self> {
        if secret.trim().is_empty() {
            return Err(ApiError::missing_field("jwt_secret"));
        }
        Ok(Self(SecretString::from(secret)))
    }

    fn dev_default() -> Self {
        Self(SecretString::from(DEV_SECRET.to_string()))
    }

    fn bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }

    fn char_len(&self) -> usize {
        self.0.expose_secret().chars().count()
    }

    fn is_dev_default(&self) -> bool {
        self.0.expose_secret() == DEV_SECRET
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JwtSecret(<redacted {} chars>)", self.char_len())
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: JwtSecret,
    /// Lifetime of issued tokens.
    pub jwt_expiration_secs: i64,
    /// Leeway applied to `exp` and `nbf`.
    pub jwt_clock_skew_secs: i64,
    /// Lowercased deployment name; `production` or `prod` enables the secret checks.
    pub environment: String,
    pub clock: Arc<dyn JwtClock>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: JwtSecret::dev_default(),
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            environment: "development".to_string(),
            clock: Arc::new(SystemClock),
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AuthConfig {
    /// Reads `ITAGENT_JWT_SECRET`, `ITAGENT_JWT_EXPIRATION_SECS`,
    /// `ITAGENT_JWT_CLOCK_SKEW_SECS` and `ITAGENT_ENVIRONMENT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let jwt_secret = std::env::var("ITAGENT_JWT_SECRET")
            .ok()
            .and_then(|s| JwtSecret::new(s).ok())
            .unwrap_or(defaults.jwt_secret);

        Self {
            jwt_secret,
            jwt_expiration_secs: env_i64("ITAGENT_JWT_EXPIRATION_SECS", defaults.jwt_expiration_secs),
            jwt_clock_skew_secs: env_i64("ITAGENT_JWT_CLOCK_SKEW_SECS", defaults.jwt_clock_skew_secs),
            environment: std::env::var("ITAGENT_ENVIRONMENT")
                .map(|e| e.trim().to_lowercase())
                .unwrap_or(defaults.environment),
            clock: defaults.clock,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    /// Startup check on the signing secret.
    ///
    /// Production refuses the built-in dev secret and anything shorter than
    /// 32 characters. Other environments only log a warning.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        let problem = if self.jwt_secret.is_dev_default() {
            Some("ITAGENT_JWT_SECRET is not set; the built-in development secret is in use".to_string())
        } else if self.jwt_secret.char_len() < MIN_PRODUCTION_SECRET_LEN {
            Some(format!(
                "ITAGENT_JWT_SECRET has {} characters; at least {} are required",
                self.jwt_secret.char_len(),
                MIN_PRODUCTION_SECRET_LEN
            ))
        } else {
            None
        };

        match problem {
            Some(message) if self.is_production() => Err(ApiError::invalid_input(message)),
            Some(message) => {
                tracing::warn!(environment = %self.environment, "{}", message);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    fn issue(user_id: String, roles: Vec<String>, ttl_secs: i64, now: i64) -> Self {
        Self {
            sub: user_id,
            iat: now,
            exp: now.saturating_add(ttl_secs),
            nbf: None,
            roles,
        }
    }

    /// Reject tokens outside `[nbf, exp]`, widened by `leeway` on both ends.
    fn check_window(&self, now: i64, leeway: i64) -> ApiResult<()> {
        if self.nbf.is_some_and(|nbf| now.saturating_add(leeway) < nbf) {
            return Err(ApiError::invalid_token("Token is not valid yet"));
        }
        if self.exp < now.saturating_sub(leeway) {
            return Err(ApiError::token_expired());
        }
        Ok(())
    }
}

/// The verified caller, stored in request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            roles: claims.roles,
        }
    }
}

/// Verify the signature with `config`'s secret, then the time window with its clock.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

    let key = DecodingKey::from_secret(config.jwt_secret.bytes());
    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => ApiError::invalid_token("Token signature does not match"),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                ApiError::invalid_token("Token is malformed")
            }
            _ => ApiError::invalid_token(format!("Token rejected: {}", e)),
        })?
        .claims;

    claims.check_window(config.clock.now_epoch_secs(), config.jwt_clock_skew_secs)?;
    if claims.sub.trim().is_empty() {
        return Err(ApiError::invalid_token("Token has no subject"));
    }
    Ok(claims)
}

/// Sign a token for `user_id` that expires after `config.jwt_expiration_secs`.
pub fn generate_jwt_token(
    config: &AuthConfig,
    user_id: String,
    roles: Vec<String>,
) -> ApiResult<String> {
    let claims = Claims::issue(
        user_id,
        roles,
        config.jwt_expiration_secs,
        config.clock.now_epoch_secs(),
    );
    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.bytes()),
    )
    .map_err(|e| ApiError::internal_error(format!("Could not sign token: {}", e)))
}

/// Extract the token from an `Authorization` header value. The scheme is case-insensitive.
pub fn parse_bearer(header_value: &str) -> ApiResult<&str> {
    let (scheme, token) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| ApiError::invalid_token("Authorization header must be 'Bearer <token>'"))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::invalid_token("Authorization header must be 'Bearer <token>'"));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::invalid_token("Bearer token is empty"));
    }
    Ok(token)
}

pub fn authenticate_bearer(config: &AuthConfig, header_value: &str) -> ApiResult<AuthContext> {
    let token = parse_bearer(header_value)?;
    validate_jwt_token(config, token).map(AuthContext::from)
}
