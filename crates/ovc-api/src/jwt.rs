//! Expiry checks for itsyou.online JWTs
//!
//! Only the `exp` claim is inspected; signatures are verified by the API.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// Expiry timestamp (seconds since the epoch) of a JWT, if it can be decoded
pub fn expires_at(jwt: &str) -> Option<i64> {
    let mut segments = jwt.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    segments.next()?;

    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&decoded).ok()?;
    Some(claims.exp)
}

/// Whether a JWT has expired at `now`. Tokens that cannot be decoded count as
/// expired so that a fresh one is requested.
pub fn is_expired_at(jwt: &str, now: i64) -> bool {
    match expires_at(jwt) {
        Some(exp) => exp < now,
        None => true,
    }
}

pub fn is_expired(jwt: &str) -> bool {
    is_expired_at(jwt, chrono::Utc::now().timestamp())
}

#[cfg(test)]
pub(crate) fn encode_for_test(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES384","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{},"azp":"ovc"}}"#, exp));
    format!("{}.{}.signature", header, payload)
}
