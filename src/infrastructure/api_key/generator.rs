//! API key generation
//!
//! Secrets are `<prefix><base64url random bytes>`. Only a salted SHA-256 hash is stored,
//! in the form `sha256$<salt>$<digest>`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::mask_secret;

/// Random characters of the secret that are copied into the lookup id
const LOOKUP_CHARS: usize = 8;
const SALT_BYTES: usize = 16;
const HASH_SCHEME: &str = "sha256";

/// A freshly generated secret and the values derived from it
#[derive(Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub secret: String,
    /// Non-secret index: type prefix + first random characters
    pub lookup_id: String,
    /// Salted hash for storage
    pub hash: String,
    /// Masked form for listings
    pub preview: String,
}

impl std::fmt::Debug for GeneratedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedApiKey")
            .field("secret", &"[hidden]")
            .field("lookup_id", &self.lookup_id)
            .field("preview", &self.preview)
            .finish()
    }
}

/// Generator for secure API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated keys (e.g. "pmp_")
    prefix: String,
    /// Number of random bytes to generate
    key_bytes: usize,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_bytes: 32,
        }
    }

    /// Set the number of random bytes
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes.max(LOOKUP_CHARS);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = vec![0u8; self.key_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let secret = format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(&random_bytes));
        self.derive(secret)
    }

    /// Derive lookup id, hash and preview for a secret carrying our prefix
    fn derive(&self, secret: String) -> GeneratedApiKey {
        let lookup_id = self
            .lookup_id(&secret)
            .unwrap_or_else(|| secret.clone());
        let hash = hash_secret(&secret, &random_salt());
        let preview = mask_secret(&secret);

        GeneratedApiKey {
            secret,
            lookup_id,
            hash,
            preview,
        }
    }

    /// Lookup id of a presented secret, `None` if it cannot be one of ours
    pub fn lookup_id(&self, secret: &str) -> Option<String> {
        let random = secret.strip_prefix(&self.prefix)?;
        let head = random.get(..LOOKUP_CHARS)?;
        Some(format!("{}{}", self.prefix, head))
    }

    /// Verify a presented secret against a stored hash
    pub fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        let mut parts = stored_hash.splitn(3, '$');
        let (Some(scheme), Some(salt), Some(_)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        if scheme != HASH_SCHEME {
            return false;
        }

        constant_time_compare(&hash_secret(secret, salt), stored_hash)
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new("pmp_")
    }
}

fn random_salt() -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    URL_SAFE_NO_PAD.encode(salt)
}

fn hash_secret(secret: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();
    format!("{}${}${}", HASH_SCHEME, salt, URL_SAFE_NO_PAD.encode(digest))
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key() {
        let generator = ApiKeyGenerator::default();
        let generated = generator.generate();

        assert!(generated.secret.starts_with("pmp_"));
        // 32 bytes base64-encoded = 43 chars, plus prefix
        assert_eq!(generated.secret.len(), "pmp_".len() + 43);
        assert_eq!(generated.lookup_id.len(), "pmp_".len() + 8);
        assert!(generated.secret.starts_with(&generated.lookup_id));
        assert!(generated.hash.starts_with("sha256$"));
        assert!(!generated.hash.contains(&generated.secret));
    }

    #[test]
    fn test_preview_masks_secret() {
        let generated = ApiKeyGenerator::default().generate();
        let secret = &generated.secret;

        assert_eq!(
            generated.preview,
            format!("{}...{}", &secret[..15], &secret[secret.len() - 4..])
        );
    }

    #[test]
    fn test_key_uniqueness() {
        let generator = ApiKeyGenerator::default();
        let key1 = generator.generate();
        let key2 = generator.generate();

        assert_ne!(key1.secret, key2.secret);
        assert_ne!(key1.hash, key2.hash);
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let generator = ApiKeyGenerator::default();
        let a = generator.derive("pmp_abcdefghijklmnop".to_string());
        let b = generator.derive("pmp_abcdefghijklmnop".to_string());

        assert_ne!(a.hash, b.hash);
        assert!(generator.verify("pmp_abcdefghijklmnop", &a.hash));
        assert!(generator.verify("pmp_abcdefghijklmnop", &b.hash));
    }

    #[test]
    fn test_verify() {
        let generator = ApiKeyGenerator::default();
        let generated = generator.generate();

        assert!(generator.verify(&generated.secret, &generated.hash));
        assert!(!generator.verify("pmp_wrong", &generated.hash));
        assert!(!generator.verify(&generated.secret, "garbage"));
        assert!(!generator.verify(&generated.secret, "md5$salt$digest"));
    }

    #[test]
    fn test_lookup_id() {
        let generator = ApiKeyGenerator::new("cidp_");

        assert_eq!(
            generator.lookup_id("cidp_abc12345xyz"),
            Some("cidp_abc12345".to_string())
        );
        assert_eq!(generator.lookup_id("pmp_abc12345xyz"), None);
        assert_eq!(generator.lookup_id("cidp_abc"), None);
    }

    #[test]
    fn test_custom_key_bytes() {
        let generated = ApiKeyGenerator::default().with_key_bytes(64).generate();
        // 64 bytes base64-encoded = 86 chars, plus prefix
        assert_eq!(generated.secret.len(), "pmp_".len() + 86);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let generated = ApiKeyGenerator::default().generate();
        let debug = format!("{:?}", generated);
        assert!(!debug.contains(&generated.secret));
    }
}
