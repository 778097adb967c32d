use crate::utils::error::{RaffleError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;

const HASH_ALGORITHM: &str = "pbkdf2_sha256";
const OUTPUT_LEN: usize = 32;
const SALT_LEN: usize = 16;

/// Hash a password into `pbkdf2_sha256$<iterations>$<salt hex>$<hash hex>`.
pub fn hash_password(password: &str, iterations: u32) -> Result<String> {
    if iterations == 0 {
        return Err(RaffleError::ConfigError {
            message: "password hash iterations must be non-zero".to_string(),
        });
    }
    let salt: [u8; SALT_LEN] = rand::random();
    let mut out = [0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut out);
    Ok(format!(
        "{HASH_ALGORITHM}${iterations}${}${}",
        hex_encode(&salt),
        hex_encode(&out)
    ))
}

/// Constant-time check of `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if algorithm != HASH_ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Some(salt), Some(expected)) = (hex_decode(salt), hex_decode(expected)) else {
        return false;
    };
    if iterations == 0 || expected.len() != OUTPUT_LEN {
        return false;
    }

    let mut out = [0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut out);
    subtle::ConstantTimeEq::ct_eq(out.as_ref(), expected.as_slice()).into()
}

pub fn hex_encode(bytes: &[u8]) -> String {
    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(LUT[(b >> 4) as usize] as char);
        out.push(LUT[(b & 0x0f) as usize] as char);
    }
    out
}

pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

fn token_error(message: impl Into<String>) -> RaffleError {
    RaffleError::TokenError {
        message: message.into(),
    }
}

fn b64url_decode(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s.as_bytes())
        .map_err(|e| token_error(format!("Invalid base64url: {e}")))
}

fn signer(secret: &[u8]) -> Result<Hmac<Sha256>> {
    Hmac::<Sha256>::new_from_slice(secret).map_err(|e| RaffleError::ConfigError {
        message: format!("Invalid HMAC key: {e}"),
    })
}

/// Encode claims as an HS256-signed JWT.
pub fn encode_hs256<T: Serialize>(secret: &[u8], claims: &T) -> Result<String> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };

    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = signer(secret)?;
    mac.update(signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{sig_b64}"))
}

/// Decode an HS256 JWT and verify its signature.
///
/// Expiry and token type are claim-level concerns left to the caller.
pub fn decode_hs256<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(token_error("Invalid JWT format"));
    };

    let header: JwtHeader = serde_json::from_slice(&b64url_decode(header_b64)?)
        .map_err(|e| token_error(format!("Invalid JWT header JSON: {e}")))?;
    if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
        return Err(token_error("Unsupported JWT header"));
    }

    let signing_input = format!("{header_b64}.{payload_b64}");
    let sig = b64url_decode(sig_b64)?;
    let mut mac = signer(secret)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&sig)
        .map_err(|_| token_error("Invalid JWT signature"))?;

    serde_json::from_slice(&b64url_decode(payload_b64)?)
        .map_err(|e| token_error(format!("Invalid JWT payload JSON: {e}")))
}
