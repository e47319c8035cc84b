//! Hash bucketer — maps a string key to a bucket in `1..=100`.

use staged_core::{KeyHasher, Murmur3};

/// Lowest bucket.
pub const MIN_BUCKET: u8 = 1;
/// Highest bucket.
pub const MAX_BUCKET: u8 = 100;

/// Bucket `key` with the default hasher (MurmurHash3 x86_32, seed 0).
pub fn bucket(key: &str) -> u8 {
    Bucketer::<Murmur3>::default().bucket(key)
}

/// Reduces a [`KeyHasher`] output to a percentage bucket.
#[derive(Debug, Clone, Default)]
pub struct Bucketer<H = Murmur3> {
    hasher: H,
}

impl<H: KeyHasher> Bucketer<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// `hash32(key) % 100 + 1`.
    pub fn bucket(&self, key: &str) -> u8 {
        (self.hasher.hash32(key) % 100) as u8 + MIN_BUCKET
    }
}
