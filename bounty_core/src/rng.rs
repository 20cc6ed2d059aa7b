use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::EngineError;

// Provably-fair derivation:
// HMAC-SHA256(key = hex-decoded server seed, msg = "{client_seed}:{nonce}")
// -> first STOP_PREFIX_BYTES of the digest, big-endian -> mod strip length.

pub type HmacSha256 = Hmac<Sha256>;

/// Digest prefix used for stop reduction. Changing it changes every stop.
pub const STOP_PREFIX_BYTES: usize = 6;
pub const SERVER_SEED_BYTES: usize = 32;

/// Hex SHA-256 of `input`. Commitments hash the hex text of the seed, not
/// the raw seed bytes.
pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Fresh 256-bit server seed, hex-encoded.
pub fn generate_server_seed() -> String {
    random_hex(&mut OsRng, SERVER_SEED_BYTES)
}

/// `len` bytes from `rng`, hex-encoded.
pub fn random_hex<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Big-endian integer of the first `STOP_PREFIX_BYTES` of `digest`, reduced
/// modulo `n`.
pub fn bytes_to_index(digest: &[u8], n: usize) -> usize {
    let value = digest
        .iter()
        .take(STOP_PREFIX_BYTES)
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    (value % n as u64) as usize
}

pub struct ProvablyFairRng {
    mac: HmacSha256,
    pub client_seed: String,
}

impl ProvablyFairRng {
    pub fn new(server_seed_hex: &str, client_seed: impl Into<String>) -> Result<Self, EngineError> {
        let key = hex::decode(server_seed_hex)
            .map_err(|e| EngineError::InvalidSeed(e.to_string()))?;
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| EngineError::InvalidSeed(e.to_string()))?;
        Ok(Self {
            mac,
            client_seed: client_seed.into(),
        })
    }

    pub fn hmac_bytes(&self, nonce: u64) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(format!("{}:{}", self.client_seed, nonce).as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    pub fn stop_index(&self, nonce: u64, strip_length: usize) -> usize {
        bytes_to_index(&self.hmac_bytes(nonce), strip_length)
    }
}
