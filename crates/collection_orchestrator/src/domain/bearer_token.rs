use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Tokens expiring within this many seconds are refreshed ahead of time
pub const EXPIRY_MARGIN_SECS: i64 = 240;

/// Allowed clock skew for tokens issued slightly in the future
pub const ISSUED_AT_TOLERANCE_SECS: i64 = 5;

/// Validity window claims embedded in the token payload (unix seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iat: i64,
    pub exp: i64,
}

/// Validity of a token at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    /// Expired or expiring within the refresh margin
    Expired,
    /// Issued further in the future than the skew tolerance allows
    NotYetValid,
    /// Claims segment missing or undecodable
    Malformed,
}

/// Opaque bearer credential with its decoded validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    raw: String,
    claims: Option<TokenClaims>,
}

impl BearerToken {
    /// Parse the body returned by the authentication endpoint.
    ///
    /// Surrounding quotes are stripped; a token without decodable claims is
    /// kept but always reported as [`TokenState::Malformed`].
    pub fn parse(body: &str) -> Self {
        let raw = body.trim().replace('"', "");
        let claims = decode_claims(&raw);
        Self { raw, claims }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> Option<TokenClaims> {
        self.claims
    }

    pub fn state_at(&self, now: i64) -> TokenState {
        let Some(claims) = self.claims else {
            return TokenState::Malformed;
        };

        if now + EXPIRY_MARGIN_SECS > claims.exp {
            TokenState::Expired
        } else if now + ISSUED_AT_TOLERANCE_SECS < claims.iat {
            TokenState::NotYetValid
        } else {
            TokenState::Valid
        }
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        self.state_at(now) == TokenState::Valid
    }
}

/// Read the claims without verifying the signature; the token is only
/// inspected for its validity window, the issuer checks it on every request.
fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Base64url encode a token segment without padding
pub fn encode_segment(plain: &str) -> String {
    URL_SAFE_NO_PAD.encode(plain.as_bytes())
}

/// Decode a base64url token segment, tolerating trailing padding
pub fn decode_segment(segment: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .ok()?;
    String::from_utf8(bytes).ok()
}
