//! RS256 token validation.

use std::collections::BTreeMap;

use jwt_simple::prelude::*;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::TokenValidationError;
use crate::jwk::{Jwk, KeySet};

/// Validated token claims, registered and custom alike, keyed by name.
///
/// Timestamps are whole seconds since the epoch. A single audience stays a
/// string; several become a sorted array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimSet {
    claims: BTreeMap<String, Value>,
}

impl ClaimSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Value, TokenValidationError> {
        self.get(name)
            .ok_or_else(|| TokenValidationError::MissingClaim(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    fn from_jwt(claims: JWTClaims<Map<String, Value>>) -> Self {
        let mut out: BTreeMap<String, Value> = claims.custom.into_iter().collect();
        let mut put = |name: &str, value: Option<Value>| {
            if let Some(value) = value {
                out.insert(name.to_string(), value);
            }
        };
        let secs = |t: Option<UnixTimeStamp>| t.map(|t| Value::from(t.as_secs()));

        put("iss", claims.issuer.map(Value::String));
        put("sub", claims.subject.map(Value::String));
        put(
            "aud",
            claims.audiences.map(|aud| match aud {
                Audiences::AsString(s) => Value::String(s),
                Audiences::AsSet(set) => {
                    let mut all: Vec<String> = set.into_iter().collect();
                    all.sort();
                    Value::from(all)
                }
            }),
        );
        put("iat", secs(claims.issued_at));
        put("exp", secs(claims.expires_at));
        put("nbf", secs(claims.invalid_before));
        put("jti", claims.jwt_id.map(Value::String));
        put("nonce", claims.nonce.map(Value::String));
        Self { claims: out }
    }
}

impl FromIterator<(String, Value)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}

/// The `kid` header of a token, without checking anything else.
pub fn token_key_id(token: &str) -> Result<Option<String>, TokenValidationError> {
    let metadata = Token::decode_metadata(token)
        .map_err(|err| TokenValidationError::Malformed(err.to_string()))?;
    Ok(metadata.key_id().map(Into::into))
}

/// Verifies an RS256 token against `key` and returns its claims.
///
/// The signature is checked along with `exp` and `nbf` when present.
pub fn parse_and_validate(token: &str, key: &Jwk) -> Result<ClaimSet, TokenValidationError> {
    let metadata = Token::decode_metadata(token)
        .map_err(|err| TokenValidationError::Malformed(err.to_string()))?;
    if metadata.algorithm() != "RS256" {
        return Err(TokenValidationError::UnsupportedAlgorithm(
            metadata.algorithm().to_string(),
        ));
    }

    let public_key = key.public_key()?;
    let claims = public_key
        .verify_token::<Map<String, Value>>(token, None)
        .map_err(|err| TokenValidationError::Rejected(err.to_string()))?;
    let claims = ClaimSet::from_jwt(claims);
    debug!(kid = ?key.kid, claims = claims.len(), "token validated");
    Ok(claims)
}

/// Picks the key named by the token's `kid` and validates against it.
pub fn validate_with_keys(token: &str, keys: &KeySet) -> Result<ClaimSet, TokenValidationError> {
    let kid = token_key_id(token)?;
    let key = keys.resolve_key(kid.as_deref())?;
    parse_and_validate(token, key)
}
