//! JSON Web Keys (RFC 7517), RSA signing keys only.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jwt_simple::prelude::RS256PublicKey;
use serde::{Deserialize, Serialize};

use crate::error::TokenValidationError;

/// One RSA key as published by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Modulus, base64url.
    pub n: String,
    /// Public exponent, base64url.
    pub e: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    /// An RS256 signing key from big-endian modulus and exponent bytes.
    pub fn rs256(n: &[u8], e: &[u8], kid: Option<&str>) -> Self {
        Self {
            kty: "RSA".into(),
            alg: Some("RS256".into()),
            n: URL_SAFE_NO_PAD.encode(n),
            e: URL_SAFE_NO_PAD.encode(e),
            key_use: Some("sig".into()),
            key_ops: None,
            kid: kid.map(Into::into),
        }
    }

    /// Decoded `(n, e)`.
    pub fn components(&self) -> Result<(Vec<u8>, Vec<u8>), TokenValidationError> {
        Ok((decode_component("n", &self.n)?, decode_component("e", &self.e)?))
    }

    /// Checks that the key may verify RS256 signatures and builds it.
    pub fn public_key(&self) -> Result<RS256PublicKey, TokenValidationError> {
        if self.kty != "RSA" {
            return Err(TokenValidationError::InvalidKey(format!(
                "key type `{}` is not RSA",
                self.kty
            )));
        }
        if let Some(alg) = self.alg.as_deref().filter(|alg| *alg != "RS256") {
            return Err(TokenValidationError::UnsupportedAlgorithm(alg.to_string()));
        }
        if let Some(key_use) = self.key_use.as_deref().filter(|u| *u != "sig") {
            return Err(TokenValidationError::InvalidKey(format!(
                "key use `{key_use}` is not `sig`"
            )));
        }
        if let Some(ops) = &self.key_ops {
            if !ops.iter().any(|op| op == "verify") {
                return Err(TokenValidationError::InvalidKey(
                    "key_ops does not allow `verify`".into(),
                ));
            }
        }

        let (n, e) = self.components()?;
        let key = RS256PublicKey::from_components(&n, &e)
            .map_err(|err| TokenValidationError::InvalidKey(err.to_string()))?;
        Ok(match &self.kid {
            Some(kid) => key.with_key_id(kid),
            None => key,
        })
    }
}

fn decode_component(name: &str, value: &str) -> Result<Vec<u8>, TokenValidationError> {
    // Some providers pad their base64url output.
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|err| TokenValidationError::InvalidKey(format!("`{name}`: {err}")))?;
    if bytes.is_empty() {
        return Err(TokenValidationError::InvalidKey(format!("`{name}` is empty")));
    }
    Ok(bytes)
}

/// A provider's published keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<Jwk>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeySetOrKey {
    Set(KeySet),
    Key(Jwk),
}

impl KeySet {
    /// Parses `{"keys": [...]}` or a single bare JWK.
    pub fn from_json(json: &str) -> Result<Self, TokenValidationError> {
        let parsed: KeySetOrKey = serde_json::from_str(json)
            .map_err(|err| TokenValidationError::InvalidKeySet(err.to_string()))?;
        Ok(match parsed {
            KeySetOrKey::Set(set) => set,
            KeySetOrKey::Key(key) => Self { keys: vec![key] },
        })
    }

    /// Finds the key a token names in its `kid` header.
    ///
    /// A token without `kid` resolves only when the set holds exactly one key.
    pub fn resolve_key(&self, kid: Option<&str>) -> Result<&Jwk, TokenValidationError> {
        let found = match kid {
            Some(kid) => self.keys.iter().find(|k| k.kid.as_deref() == Some(kid)),
            None => match self.keys.as_slice() {
                [only] => Some(only),
                _ => None,
            },
        };
        found.ok_or_else(|| TokenValidationError::KeyNotFound(kid.map(Into::into)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET: &str = r#"{"keys":[
        {"kty":"RSA","alg":"RS256","use":"sig","kid":"a","n":"AQAB","e":"AQAB"},
        {"kty":"RSA","kid":"b","n":"AQAB","e":"AQAB"}
    ]}"#;

    #[test]
    fn test_parses_set_and_single_key() {
        let set = KeySet::from_json(SET).unwrap();
        assert_eq!(set.keys.len(), 2);
        assert_eq!(set.keys[0].key_use.as_deref(), Some("sig"));

        let single = KeySet::from_json(r#"{"kty":"RSA","n":"AQAB","e":"AQAB"}"#).unwrap();
        assert_eq!(single.keys.len(), 1);
        assert_eq!(single.keys[0].kid, None);

        assert!(matches!(
            KeySet::from_json(r#"{"keys": 3}"#),
            Err(TokenValidationError::InvalidKeySet(_))
        ));
    }

    #[test]
    fn test_resolve_by_kid() {
        let set = KeySet::from_json(SET).unwrap();
        assert_eq!(set.resolve_key(Some("b")).unwrap().kid.as_deref(), Some("b"));
        assert_eq!(
            set.resolve_key(Some("missing")),
            Err(TokenValidationError::KeyNotFound(Some("missing".into())))
        );
        // Ambiguous without a kid
        assert_eq!(set.resolve_key(None), Err(TokenValidationError::KeyNotFound(None)));

        let single = KeySet::from_json(r#"{"kty":"RSA","n":"AQAB","e":"AQAB"}"#).unwrap();
        assert!(single.resolve_key(None).is_ok());
    }

    #[test]
    fn test_rejects_unusable_keys() {
        let mut key = Jwk::rs256(&[0xC5; 256], &[1, 0, 1], None);
        key.alg = Some("RS512".into());
        assert_eq!(
            key.public_key().unwrap_err(),
            TokenValidationError::UnsupportedAlgorithm("RS512".into())
        );

        let mut key = Jwk::rs256(&[0xC5; 256], &[1, 0, 1], None);
        key.kty = "EC".into();
        assert!(matches!(key.public_key(), Err(TokenValidationError::InvalidKey(_))));

        let mut key = Jwk::rs256(&[0xC5; 256], &[1, 0, 1], None);
        key.key_use = Some("enc".into());
        assert!(matches!(key.public_key(), Err(TokenValidationError::InvalidKey(_))));

        let mut key = Jwk::rs256(&[0xC5; 256], &[1, 0, 1], None);
        key.key_ops = Some(vec!["encrypt".into()]);
        assert!(matches!(key.public_key(), Err(TokenValidationError::InvalidKey(_))));

        let mut key = Jwk::rs256(&[0xC5; 256], &[1, 0, 1], None);
        key.n = "not base64!".into();
        assert!(matches!(key.components(), Err(TokenValidationError::InvalidKey(_))));
    }

    #[test]
    fn test_components_survive_json() {
        let key = Jwk::rs256(&[7, 8, 9], &[1, 0, 1], Some("k1"));
        let json = serde_json::to_string(&KeySet { keys: vec![key.clone()] }).unwrap();
        assert!(json.contains(r#""use":"sig""#));
        let back = KeySet::from_json(&json).unwrap();
        assert_eq!(back.keys[0], key);
        assert_eq!(key.components().unwrap(), (vec![7, 8, 9], vec![1, 0, 1]));
    }
}
