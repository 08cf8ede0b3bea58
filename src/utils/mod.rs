//! Utility functions and helpers.
//!
//! Environment variable lookup, input normalisation and token generation.

pub mod env;
pub(crate) mod text;

pub use env::get_env_with_prefix;
pub(crate) use text::{is_valid_email, is_valid_slug, normalize_email, slugify};

/// Generate a URL-safe random token from 32 bytes of OS entropy.
pub(crate) fn generate_secure_token() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_secure_token();
        let b = generate_secure_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
