//! Rolling hash over a proposal id, used to make fallback output stable.

/// Seeds are kept below 2^28.
pub const SEED_MODULUS: u64 = 1 << 28;

/// Hashes a proposal id: `seed = (seed * 31 + unit) mod 2^28` over its UTF-16
/// code units, starting from 0.
pub fn proposal_seed(id: &str) -> u64 {
    id.encode_utf16()
        .fold(0u64, |seed, unit| (seed * 31 + u64::from(unit)) % SEED_MODULUS)
}

/// Confidence jitter in [-3, 3].
pub fn confidence_jitter(seed: u64) -> i64 {
    (seed % 7) as i64 - 3
}

/// Persona-match jitter in [-3, 3].
pub fn match_jitter(seed: u64) -> i64 {
    ((seed / 7) % 7) as i64 - 3
}

/// Picks an index in `0..len` from a seed and a salt.
///
/// Different salts decorrelate choices made from the same seed.
pub fn pick(seed: u64, salt: u64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((seed / salt.max(1)) % len as u64) as usize
}
