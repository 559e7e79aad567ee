//! ID and tracking-code generation.

use rand::Rng;
use ulid::Ulid;
use uuid::Uuid;

/// Length of a report tracking code.
pub const TRACKING_CODE_LEN: usize = 8;

/// Characters usable in a tracking code.
const TRACKING_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a cryptographically secure random token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a human-shareable report tracking code.
    ///
    /// Eight uppercase alphanumeric characters, uniformly sampled. The
    /// caller is responsible for retrying on the (unlikely) collision
    /// with an existing report.
    #[must_use]
    pub fn generate_tracking_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..TRACKING_CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..TRACKING_CODE_CHARSET.len());
                char::from(TRACKING_CODE_CHARSET[idx])
            })
            .collect()
    }
}

/// Check whether a candidate string has the shape of a tracking code.
#[must_use]
pub fn is_valid_tracking_code(code: &str) -> bool {
    code.len() == TRACKING_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32); // Simple UUID without hyphens
    }

    #[test]
    fn test_tracking_code_shape() {
        let id_gen = IdGenerator::new();

        for _ in 0..64 {
            let code = id_gen.generate_tracking_code();
            assert_eq!(code.len(), TRACKING_CODE_LEN);
            assert!(is_valid_tracking_code(&code), "bad code: {code}");
        }
    }

    #[test]
    fn test_tracking_code_validation_rejects_lowercase_and_short() {
        assert!(is_valid_tracking_code("A1B2C3D4"));
        assert!(!is_valid_tracking_code("a1b2c3d4"));
        assert!(!is_valid_tracking_code("A1B2C3"));
        assert!(!is_valid_tracking_code("A1B2C3D4E"));
        assert!(!is_valid_tracking_code("A1B2-3D4"));
    }
}
