//! byte encodings shared by address derivation and account filters

use {
    crate::error::MultisigError,
    rand::{distributions::Alphanumeric, Rng},
};

/// max number of bytes in a multisig base
pub const BASE_LIMIT: usize = 32;

/// Encodes a transaction index the way the program stores it (borsh `u32`, little endian).
///
/// Used for both the transaction address seed and the memcmp filter on the index field,
/// if the two ever disagree scans silently come back empty.
pub fn index_bytes(index: u32) -> [u8; 4] {
    index.to_le_bytes()
}

pub fn index_from_bytes(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Right pads `base` with zero bytes up to [`BASE_LIMIT`], an empty base is all zeros
pub fn encode_base(base: &str) -> Result<[u8; BASE_LIMIT], MultisigError> {
    let raw = base.as_bytes();
    if raw.len() > BASE_LIMIT {
        return Err(MultisigError::BaseTooLong {
            len: raw.len(),
            limit: BASE_LIMIT,
        });
    }
    let mut padded = [0u8; BASE_LIMIT];
    padded[..raw.len()].copy_from_slice(raw);
    Ok(padded)
}

/// inverse of [`encode_base`], trailing zero bytes are dropped
pub fn decode_base(base: &[u8; BASE_LIMIT]) -> String {
    let end = base
        .iter()
        .rposition(|b| *b != 0)
        .map(|idx| idx + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&base[..end]).into_owned()
}

/// random alphanumeric base filling the whole seed
pub fn random_base() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BASE_LIMIT)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index_bytes() {
        for index in [0u32, 1, 3, 255, 256, 65_535, 1 << 24, u32::MAX] {
            assert_eq!(index_from_bytes(index_bytes(index)), index);
        }
        // low byte first
        assert_eq!(index_bytes(1), [1, 0, 0, 0]);
        assert_eq!(index_bytes(0x0102_0304), [4, 3, 2, 1]);
    }

    #[test]
    fn test_encode_base() {
        let encoded = encode_base("treasury").unwrap();
        assert_eq!(&encoded[..8], b"treasury");
        assert!(encoded[8..].iter().all(|b| *b == 0));
        assert_eq!(decode_base(&encoded), "treasury");

        let full = "a".repeat(BASE_LIMIT);
        assert_eq!(decode_base(&encode_base(&full).unwrap()), full);

        assert_eq!(
            encode_base(&"a".repeat(BASE_LIMIT + 1)).unwrap_err(),
            MultisigError::BaseTooLong {
                len: BASE_LIMIT + 1,
                limit: BASE_LIMIT
            }
        );
        assert_eq!(encode_base("").unwrap(), [0u8; BASE_LIMIT]);
        assert_eq!(decode_base(&[0u8; BASE_LIMIT]), "");
        // limit is in bytes, not chars
        assert!(encode_base(&"é".repeat(17)).is_err());
    }

    #[test]
    fn test_random_base() {
        let base = random_base();
        assert_eq!(base.len(), BASE_LIMIT);
        assert!(encode_base(&base).is_ok());
        assert_ne!(base, random_base());
    }
}
