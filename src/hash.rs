use std::hash::{BuildHasherDefault, Hash, Hasher};

const M: u32 = 0x5bd1e995;

/// Passes a single pre-mixed `u32` straight through as the hash value.
#[derive(Default)]
pub struct NoopHasher {
    state: u32,
}

impl Hasher for NoopHasher {
    fn write(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), 4);

        let mut word = [0; 4];
        word.copy_from_slice(&bytes[..4]);
        self.state = u32::from_ne_bytes(word);
    }

    fn write_u32(&mut self, i: u32) {
        self.state = i;
    }

    fn finish(&self) -> u64 {
        self.state as u64
    }
}

pub type BuildNoopHasher = BuildHasherDefault<NoopHasher>;

/// Undirected mesh edge; always stored with the smaller vertex first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeKey(pub u32, pub u32);

impl EdgeKey {
    pub fn new(a: u32, b: u32) -> Self {
        if a < b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut h1 = self.0;
        let mut h2 = self.1;

        // MurmurHash64B finalizer
        h1 ^= h2 >> 18;
        h1 = h1.wrapping_mul(M);
        h2 ^= h1 >> 22;
        h2 = h2.wrapping_mul(M);
        h1 ^= h2 >> 17;
        h1 = h1.wrapping_mul(M);
        h2 ^= h1 >> 19;
        h2 = h2.wrapping_mul(M);

        state.write_u32(h2);
    }
}

/// MurmurHash2 over a stream of indices.
pub fn checksum<I>(values: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    const R: u32 = 24;

    let mut h: u32 = 0;
    let mut len: u32 = 0;

    for mut k in values {
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= k;

        len = len.wrapping_add(1);
    }

    // fold the length in so that trailing zero indices still change the result
    h ^= len;
    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;

    h
}

#[cfg(test)]
mod test {
    use super::*;

    use std::collections::HashMap;

    #[test]
    fn test_edge_key_is_undirected() {
        assert_eq!(EdgeKey::new(7, 3), EdgeKey::new(3, 7));

        let mut map: HashMap<EdgeKey, u32, BuildNoopHasher> = HashMap::default();
        map.insert(EdgeKey::new(1, 2), 5);

        assert_eq!(map.get(&EdgeKey::new(2, 1)), Some(&5));
        assert_eq!(map.get(&EdgeKey::new(1, 3)), None);
    }

    #[test]
    fn test_checksum_sensitivity() {
        let a = checksum([0, 1, 2, 3]);

        assert_eq!(a, checksum([0, 1, 2, 3]));
        assert_ne!(a, checksum([0, 1, 2, 4]));
        assert_ne!(a, checksum([1, 0, 2, 3]));
        assert_ne!(checksum([0, 1, 2]), checksum([0, 1, 2, 0]));
    }
}
