use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// How passwords are turned into stored credentials and checked later.
///
/// Account storage only ever sees the output of [`CredentialHasher::hash`].
pub trait CredentialHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Salted SHA-256, stored as `<salt-hex>$<digest-hex>`. Digests are compared
/// in constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    fn digest(salt: &str, password: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl CredentialHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> String {
        let salt: [u8; 16] = rand::rng().random();
        let salt = hex::encode(salt);
        let digest = hex::encode(Self::digest(&salt, password));
        format!("{salt}${digest}")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt, digest)) = stored.split_once('$') else {
            return false;
        };
        let Ok(expected) = hex::decode(digest) else {
            return false;
        };
        Self::digest(salt, password).as_slice().ct_eq(expected.as_slice()).into()
    }
}
