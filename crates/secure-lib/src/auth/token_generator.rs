// ============================
// crates/secure-lib/src/auth/token_generator.rs
// ============================
/** Secure identifier generation
This module provides cryptographically secure random identifiers for
request correlation and client-side record keys. */
use rand::{rngs::OsRng, RngCore};

/// Identifier size in bytes (32 bytes = 256 bits of entropy)
const ID_BYTES: usize = 32;

/** Generate a cryptographically secure random identifier
This uses OS-provided entropy, so identifiers are unpredictable and
collision-free for any practical volume.
# Returns
A lowercase hex string, 64 characters long */
pub fn generate_secure_id() -> String {
    let mut buffer = [0u8; ID_BYTES];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}
