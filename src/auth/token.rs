//! Session token value generation.

use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

/// Raw entropy per token value before encoding.
pub const TOKEN_BYTES: usize = 48;

/// Generate a fresh opaque session token value.
///
/// 48 bytes (384 bits) from the OS CSPRNG, base64url-encoded without
/// padding. The value has no internal structure; it is purely a lookup key
/// into the token store. Collisions are not retried anywhere - the store's
/// unique constraint treats one as a generator integrity failure.
pub fn generate_token() -> String {
    let mut token_bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}
