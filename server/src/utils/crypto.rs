//! Random keys and constant-time comparison

use rand::RngCore;
use subtle::ConstantTimeEq;

/// Generate a cryptographically secure random key
pub fn generate_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Per-process HS256 key used when no `JWT_SECRET` is configured
pub fn generate_signing_key() -> Vec<u8> {
    generate_key(32)
}

/// Constant-time string comparison
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_length() {
        assert_eq!(generate_key(16).len(), 16);
        assert_eq!(generate_signing_key().len(), 32);
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(generate_signing_key(), generate_signing_key());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("state-abc", "state-abc"));
        assert!(!constant_time_eq("state-abc", "state-abd"));
        assert!(!constant_time_eq("state", "state-abc"));
        assert!(constant_time_eq("", ""));
    }
}
