//! # Identity Resolver
//!
//! Derives the [`Address`] used for every permission decision from a node's
//! public key: the last 20 bytes of Keccak-256 over the uncompressed key
//! without its `0x04` tag. Pure and deterministic.

use sha3::{Digest, Keccak256};

use crate::domain::{Address, PermissionError, PublicKey, ADDRESS_LEN};

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive the address of a validated public key.
pub fn address_of(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.to_uncompressed();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&uncompressed[1..]);

    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
    Address::new(address)
}

/// Parse raw SEC1 key bytes from a handshake and derive the address.
///
/// # Errors
///
/// `PermissionError::MalformedKey` when the bytes are not a valid key. This is
/// the only failure an admission check can surface besides transport errors.
pub fn resolve(key_bytes: &[u8]) -> Result<(PublicKey, Address), PermissionError> {
    let public_key = PublicKey::from_sec1_bytes(key_bytes)?;
    let address = address_of(&public_key);
    Ok((public_key, address))
}
