//! HTTP API, versioned under `/api/v1`.

pub mod link;
pub mod status;
pub mod user;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::ServerError;

/// JSON body extractor running `validator` rules before the handler.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;

        Ok(Valid(value))
    }
}

/// Usernames are email local parts: letters, digits and a few separators.
pub(crate) fn validate_username(
    username: &str,
) -> Result<(), ValidationError> {
    static USERNAME: std::sync::OnceLock<regex_lite::Regex> =
        std::sync::OnceLock::new();
    let re = USERNAME.get_or_init(|| {
        regex_lite::Regex::new(r"^[a-z0-9][a-z0-9._-]*$").unwrap()
    });

    if re.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Build an [`crate::AppState`] over a test pool.
#[cfg(test)]
pub fn state(pool: sqlx::Pool<sqlx::Postgres>) -> crate::AppState {
    use std::sync::Arc;

    let config = crate::config::Configuration::default();
    let argon2 = Some(crate::config::Argon2 {
        // Cheap parameters, unit tests only.
        memory_cost: 8,
        iterations: 1,
        parallelism: 1,
        hash_length: 32,
    });
    let crypto = Arc::new(
        crate::crypto::Crypto::new(argon2, "test-pepper")
            .expect("cannot create crypto"),
    );

    crate::AppState {
        config: Arc::new(config),
        db: crate::database::Database { postgres: pool },
        crypto,
        token: crate::token::TokenManager::new("lynq.test", "test-secret"),
        mail: crate::mail::MailManager::default(),
        images: crate::upload::ImageHost::default(),
    }
}
