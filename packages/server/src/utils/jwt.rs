use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use common::{Actor, PermissionSet};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub uid: i32,    // Evaluator ID
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub account_locked: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize, // Expiration timestamp
}

impl Claims {
    pub fn into_actor(self) -> Actor {
        Actor {
            id: self.uid,
            username: self.sub,
            is_admin: self.is_admin,
            account_locked: self.account_locked,
            permissions: PermissionSet::from_names(&self.permissions),
        }
    }
}

/// Sign a token carrying `actor`'s identity and permissions, valid for `ttl`.
pub fn sign(actor: &Actor, secret: &str, ttl: Duration) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .context("token expiry out of range")?
        .timestamp();

    let claims = Claims {
        sub: actor.username.clone(),
        uid: actor.id,
        is_admin: actor.is_admin,
        account_locked: actor.account_locked,
        permissions: actor.permissions.names(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
