// src/services/password.rs
// DOCUMENTATION: Password hashing with Argon2id
// PURPOSE: Hash and verify user passwords; SECRET_KEY is used as the Argon2 secret

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::errors::FoodgramError;

fn hasher(secret: &[u8]) -> Result<Argon2<'_>, FoodgramError> {
    if secret.is_empty() {
        return Ok(Argon2::default());
    }
    Argon2::new_with_secret(secret, Algorithm::Argon2id, Version::V0x13, Params::default()).map_err(|e| {
        log::error!("Invalid Argon2 secret: {}", e);
        FoodgramError::InternalError
    })
}

/// Hash a password into a PHC string with a random salt
pub fn hash_password(password: &str, secret: &str) -> Result<String, FoodgramError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(secret.as_bytes())?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            FoodgramError::InternalError
        })?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string
pub fn verify_password(password: &str, hash: &str, secret: &str) -> Result<bool, FoodgramError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        log::error!("Stored password hash is malformed: {}", e);
        FoodgramError::InternalError
    })?;

    match hasher(secret.as_bytes())?.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            log::error!("Password verification failed: {}", e);
            Err(FoodgramError::InternalError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("bonappetit", "pepper").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("bonappetit", &hash, "pepper").unwrap());
        assert!(!verify_password("bonappetit!", &hash, "pepper").unwrap());
    }

    #[test]
    fn test_secret_is_part_of_the_hash() {
        let hash = hash_password("bonappetit", "pepper").unwrap();
        assert!(!verify_password("bonappetit", &hash, "other-pepper").unwrap());
    }

    #[test]
    fn test_unpeppered_hash() {
        let hash = hash_password("bonappetit", "").unwrap();
        assert!(verify_password("bonappetit", &hash, "").unwrap());
    }

    #[test]
    fn test_salt_is_random() {
        let a = hash_password("bonappetit", "").unwrap();
        let b = hash_password("bonappetit", "").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("bonappetit", "not-a-phc-string", "").is_err());
    }
}
