use anyhow::anyhow;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hashes a password for storage. The output embeds the algorithm parameters
/// and a fresh random salt, so hashing the same password twice produces
/// different strings.
pub fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|hash_err| anyhow!("failed to hash password: {hash_err}"))?;

    Ok(hash.to_string())
}

/// Checks a candidate password against a stored hash. A stored hash that
/// cannot be parsed counts as a failed match, never as an authentication
/// success.
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok()
}
