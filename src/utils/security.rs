//! Security Utilities
//!
//! Password hashing and verification built on bcrypt.

use bcrypt::{hash, verify, DEFAULT_COST};

/// Default bcrypt cost for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Hash a password with a custom bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost keeps the tests fast; production uses DEFAULT_BCRYPT_COST.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_password_hashing_round_trip() {
        let password = "Secret123";
        let hashed = hash_password_with_cost(password, TEST_COST).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let password = "Secret123";
        let hash1 = hash_password_with_cost(password, TEST_COST).unwrap();
        let hash2 = hash_password_with_cost(password, TEST_COST).unwrap();

        // Salted hashing yields distinct strings that both verify
        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_cross_verification_fails() {
        let hash_a = hash_password_with_cost("password-a", TEST_COST).unwrap();
        assert!(!verify_password("password-b", &hash_a).unwrap());
    }
}
