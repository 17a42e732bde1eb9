use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2
};
use rand_core::OsRng;
use color_eyre::Result;
use eyre::eyre;

// Argon2id with the crate defaults, stored as a PHC string
// (algorithm, parameters and salt are all in there).
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| eyre!("Failed to hash password: {}", e))
}

// An unparsable hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
  match PasswordHash::new(hash) {
    Ok(parsed) => Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
    Err(_) => false
  }
}
