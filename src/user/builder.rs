//! Typed builder for User.
//!
//! Normalization and hashing happen here, at the call site, instead of in a
//! persistence-layer hook: the username is derived from the email and the
//! password leaves the builder already hashed.

use uuid::Uuid;

use crate::crypto::{Crypto, CryptoError};
use crate::user::{User, derive_username};

/// [`User`] builder.
#[derive(Debug, Clone)]
pub struct UserBuilder<Email, Password> {
    name: String,
    email: Email,
    password: Password,
}

/// Value is missing on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

impl UserBuilder<Missing, Missing> {
    /// Create a new [`UserBuilder`].
    pub fn new() -> Self {
        Self {
            name: String::default(),
            email: Missing,
            password: Missing,
        }
    }
}

impl Default for UserBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Password> UserBuilder<Missing, Password> {
    /// Update `email` field on [`UserBuilder`].
    pub fn email(
        self,
        email: impl Into<String>,
    ) -> UserBuilder<Present<String>, Password> {
        UserBuilder {
            name: self.name,
            email: Present(email.into()),
            password: self.password,
        }
    }
}

impl<Email> UserBuilder<Email, Missing> {
    /// Update `password` field on [`UserBuilder`].
    pub fn password(
        self,
        password: impl Into<String>,
    ) -> UserBuilder<Email, Present<String>> {
        UserBuilder {
            name: self.name,
            email: self.email,
            password: Present(password.into()),
        }
    }
}

impl<Email, Password> UserBuilder<Email, Password> {
    /// Update `name` field on [`UserBuilder`].
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.name = name.as_ref().trim().to_string();
        self
    }
}

impl UserBuilder<Present<String>, Present<String>> {
    /// Build a [`User`]: derive the username and hash the password.
    pub fn build(self, crypto: &Crypto) -> Result<User, CryptoError> {
        let email = self.email.0;
        let username = derive_username(&email);
        let password = crypto.pwd.hash_password(&self.password.0)?;

        Ok(User {
            id: Uuid::new_v4(),
            name: self.name,
            username,
            email,
            password,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2 as ArgonConfig;

    fn crypto() -> Crypto {
        let config = ArgonConfig {
            memory_cost: 8,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        };
        Crypto::new(Some(config), [0x42; 16]).unwrap()
    }

    #[test]
    fn test_build_derives_and_hashes() {
        let crypto = crypto();
        let user = UserBuilder::new()
            .name("  Alice ")
            .email("Alice@x.com")
            .password("secret1")
            .build(&crypto)
            .unwrap();

        assert_eq!(user.name, "Alice");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "Alice@x.com");
        assert_ne!(user.password, "secret1");
        assert!(crypto.pwd.verify_password("secret1", &user.password).is_ok());
        assert!(!user.verified);
        assert_eq!(user.number_of_link, 0);
    }
}
