//! Length-prefixed padding to a multiple of the group's chunk size.
//!
//! This is *not* CCA-secure padding; its only job is to make an
//! arbitrary-length message split evenly into `L`-byte chunks so [`encode`]
//! can embed each chunk into a point. [`crate::group::encode`] and
//! [`crate::group::decode`] handle the point embedding itself.

use crate::error::{Error, Result};

/// Append a one-byte length residue and filler so the result is a positive
/// multiple of `chunk_len`.
///
/// `residue = len(m) mod chunk_len` is stored as the final byte; [`unpad`]
/// uses it to know how much of the last block is real payload.
pub fn pad(chunk_len: usize, m: &[u8]) -> Vec<u8> {
    assert!(chunk_len >= 1, "chunk_len must be at least 1");
    let residue = (m.len() % chunk_len) as u8;

    let mut out = m.to_vec();
    out.push(residue);

    // Fill up to the next multiple of chunk_len. Since we just appended one
    // byte, the current length is m.len() + 1; round that up.
    let filler_target = {
        let rem = out.len() % chunk_len;
        if rem == 0 {
            out.len()
        } else {
            out.len() + (chunk_len - rem)
        }
    };
    out.resize(filler_target.max(chunk_len), 0);
    out
}

/// Inverse of [`pad`]: read the residue byte and strip the final block down
/// to the recorded length.
pub fn unpad(chunk_len: usize, p: &[u8]) -> Result<Vec<u8>> {
    assert!(chunk_len >= 1, "chunk_len must be at least 1");
    if p.is_empty() || p.len() % chunk_len != 0 {
        return Err(Error::InvalidCiphertext);
    }
    let residue = *p.last().ok_or(Error::InvalidCiphertext)? as usize;
    if residue >= chunk_len {
        return Err(Error::InvalidCiphertext);
    }
    let full_len = (p.len() - chunk_len) + residue;
    Ok(p[..full_len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_for_various_lengths_and_chunk_sizes() {
        for chunk_len in 1..=37usize {
            for len in 0..=130usize {
                let m: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
                let p = pad(chunk_len, &m);
                assert_eq!(p.len() % chunk_len, 0);
                assert!(!p.is_empty());
                let back = unpad(chunk_len, &p).unwrap();
                assert_eq!(back, m, "chunk_len={chunk_len} len={len}");
            }
        }
    }

    #[test]
    fn empty_message_pads_to_one_block() {
        let p = pad(32, b"");
        assert_eq!(p.len(), 32);
        assert_eq!(unpad(32, &p).unwrap(), b"".to_vec());
    }

    #[test]
    fn rejects_malformed_ciphertext() {
        assert!(unpad(32, &[]).is_err());
        assert!(unpad(32, &[0u8; 31]).is_err());
        let mut bad = vec![0u8; 32];
        bad[31] = 32; // residue == chunk_len is invalid
        assert!(unpad(32, &bad).is_err());
    }
}
