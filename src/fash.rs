// Copyright (C) 2020-2026 Andy Kurnia.

// Fast insecure non-cryptographic hash for short tile sequences.

#[derive(Default)]
pub struct TileHasher(u64);

impl std::hash::Hasher for TileHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(3467) ^ (!b as u64);
        }
    }
}

pub type TileHasherDefault = std::hash::BuildHasherDefault<TileHasher>;
pub type TileHashMap<K, V> = std::collections::HashMap<K, V, TileHasherDefault>;
pub type TileHashSet<T> = std::collections::HashSet<T, TileHasherDefault>;
