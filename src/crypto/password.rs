//! Salted PBKDF2-SHA256 password hashes.
//!
//! Encoded as `pbkdf2_sha256$<iterations>$<salt>$<hash>` (base64, no padding)
//! so the work factor can change without invalidating stored hashes.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::CryptoError;

pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

const SCHEME: &str = "pbkdf2_sha256";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt = generate_salt();
    let hash = derive(password, &salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash.as_slice())
    )
}

/// Check `password` against an encoded hash in constant time.
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    match decode(encoded) {
        Ok(parts) => {
            let candidate = derive(password, &parts.salt, parts.iterations);
            candidate.as_slice().ct_eq(&parts.hash).into()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be decoded");
            false
        }
    }
}

/// Derive and compare against a fixed dummy hash, for sign-ins with no
/// stored hash. Costs as much as a real check at `iterations`; never verifies.
pub fn verify_without_hash(password: &str, iterations: u32) -> bool {
    let candidate = derive(password, &[0u8; SALT_LENGTH], iterations.max(1));
    let _ = std::hint::black_box(candidate.as_slice().ct_eq(&[0u8; HASH_LENGTH]));
    false
}

struct EncodedHash {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn decode(encoded: &str) -> Result<EncodedHash, CryptoError> {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CryptoError::MalformedHash("wrong number of fields"));
    };

    if scheme != SCHEME {
        return Err(CryptoError::MalformedHash("unknown scheme"));
    }
    let iterations: u32 = iterations
        .parse()
        .map_err(|_| CryptoError::MalformedHash("iterations"))?;
    if iterations == 0 {
        return Err(CryptoError::MalformedHash("iterations"));
    }
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| CryptoError::MalformedHash("salt"))?;
    let hash = STANDARD_NO_PAD
        .decode(hash)
        .map_err(|_| CryptoError::MalformedHash("hash"))?;
    if hash.len() != HASH_LENGTH {
        return Err(CryptoError::MalformedHash("hash length"));
    }

    Ok(EncodedHash { iterations, salt, hash })
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out[..]);
    out
}

/// Generate a cryptographically random salt
fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
