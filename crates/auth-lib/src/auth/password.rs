// ============================
// crates/auth-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use scrypt::Params;

/// Salt length in bytes, generated once per account
pub const SALT_BYTES: usize = 64;

/// Derived key length in bytes
pub const HASH_BYTES: usize = 64;

// scrypt cost parameters: N = 2^14, r = 8, p = 1
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Generate a fresh random salt
pub fn new_salt() -> [u8; SALT_BYTES] {
    let mut salt = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Hash a password with the given salt. Deterministic: the same
/// (password, salt) pair always yields the same base64 digest.
pub fn hash_password(plain: &str, salt: &[u8]) -> anyhow::Result<String> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, HASH_BYTES)
        .map_err(|e| anyhow::anyhow!("invalid scrypt params: {e}"))?;

    let mut derived = [0u8; HASH_BYTES];
    scrypt::scrypt(plain.as_bytes(), salt, &params, &mut derived)
        .map_err(|e| anyhow::anyhow!("scrypt failed: {e}"))?;

    Ok(STANDARD.encode(derived))
}

/// Verify a password against a stored base64 salt and digest. The comparison
/// is an exact match over the base64 encoding.
pub fn verify_password(plain: &str, salt_b64: &str, hash_b64: &str) -> anyhow::Result<bool> {
    let salt = STANDARD.decode(salt_b64)?;
    let recomputed = hash_password(plain, &salt)?;
    Ok(recomputed == hash_b64)
}
