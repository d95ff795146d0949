use std::collections::HashMap;

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use common::UserConfig;
use tracing::warn;

/// Stored secret for one user
#[derive(Debug, Clone)]
enum Secret {
    Plain(String),
    /// Argon2 PHC string
    Hashed(String),
}

/// Static username -> secret table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    users: HashMap<String, Secret>,
}

impl Credentials {
    pub fn from_users(users: &[UserConfig]) -> Self {
        let mut table = HashMap::new();
        for u in users {
            let secret = match (&u.password_hash, &u.password) {
                (Some(hash), _) => Secret::Hashed(hash.clone()),
                (None, Some(plain)) => Secret::Plain(plain.clone()),
                (None, None) => {
                    warn!(username = %u.username, "user has no password configured, skipping");
                    continue;
                }
            };
            table.insert(u.username.clone(), secret);
        }
        Self { users: table }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// True iff `username` is known and `password` matches its secret exactly.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(Secret::Plain(expected)) => expected == password,
            Some(Secret::Hashed(stored_hash)) => {
                let parsed_hash = match PasswordHash::new(stored_hash) {
                    Ok(h) => h,
                    Err(e) => {
                        warn!(%username, "invalid password hash in config: {}", e);
                        return false;
                    }
                };
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok()
            }
            None => false,
        }
    }
}
