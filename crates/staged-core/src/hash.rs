//! 32-bit key hashing for bucketing.
//!
//! Buckets must agree across processes and machines, so the hash is a
//! fixed algorithm with a fixed seed: MurmurHash3 x86_32, seed 0. A key is
//! turned into bytes one per UTF-16 code unit (the unit's low byte), which
//! is how the JavaScript clients that assigned existing buckets read
//! strings. Not suitable for anything adversarial.

/// Deterministic 32-bit string hash.
pub trait KeyHasher {
    fn hash32(&self, key: &str) -> u32;
}

/// MurmurHash3 x86_32 with seed 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3;

impl KeyHasher for Murmur3 {
    fn hash32(&self, key: &str) -> u32 {
        murmur3_32(&code_unit_bytes(key), 0)
    }
}

/// Low byte of every UTF-16 code unit of `key`.
///
/// ASCII keys come out identical to their UTF-8 bytes.
pub fn code_unit_bytes(key: &str) -> Vec<u8> {
    key.encode_utf16().map(|unit| unit as u8).collect()
}

/// MurmurHash3 x86_32 over `bytes`.
pub fn murmur3_32(bytes: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut h = seed;
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h ^= mix_k1(k, C1, C2);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    // Tail (<=3 bytes), little-endian folded into k.
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (j, b) in tail.iter().enumerate() {
            k |= (*b as u32) << (8 * j);
        }
        h ^= mix_k1(k, C1, C2);
    }

    // Length is mixed in modulo 2^32.
    h ^= bytes.len() as u32;
    fmix32(h)
}

#[inline]
fn mix_k1(k: u32, c1: u32, c2: u32) -> u32 {
    k.wrapping_mul(c1).rotate_left(15).wrapping_mul(c2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
