//! Stable byte encodings for PRE ciphertexts, keys, and fragments.
//!
//! Every compound value here is serialized as a deterministic,
//! length-prefixed list of its already-tagged scalar/point encodings from
//! [`crate::group`]: a `u32` (big-endian) field count, then each field as a
//! `u32` length followed by its bytes. Two serializations are byte-equal
//! iff the values they encode are equal; the container format itself is
//! otherwise an implementation detail, not a wire contract other
//! implementations need to match.

use generic_ec::Curve;

use crate::bbs98::Ciphertext;
use crate::error::{Error, Result};
use crate::group;
use crate::umbral::{ChallengeResponse, EncryptedKey, ReCombined, ReEncryptedKey, RekeyFrag};

fn write_list(fields: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(fields.len() as u32).to_be_bytes());
    for field in fields {
        out.extend_from_slice(&(field.len() as u32).to_be_bytes());
        out.extend_from_slice(field);
    }
    out
}

fn read_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut cursor = 0usize;
    let take = |cursor: &mut usize, n: usize| -> Result<&[u8]> {
        let end = cursor.checked_add(n).ok_or(Error::InvalidEncoding)?;
        let slice = bytes.get(*cursor..end).ok_or(Error::InvalidEncoding)?;
        *cursor = end;
        Ok(slice)
    };

    let count_bytes = take(&mut cursor, 4)?;
    let count = u32::from_be_bytes(count_bytes.try_into().unwrap()) as usize;

    let mut fields = Vec::with_capacity(count);
    for _ in 0..count {
        let len_bytes = take(&mut cursor, 4)?;
        let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        fields.push(take(&mut cursor, len)?.to_vec());
    }
    if cursor != bytes.len() {
        return Err(Error::InvalidEncoding);
    }
    Ok(fields)
}

impl<E: Curve> Ciphertext<E> {
    /// `[c1] + c2_chunks`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut fields = vec![group::serialize_point(&self.c1)];
        fields.extend(self.c2.iter().map(group::serialize_point));
        write_list(&fields)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fields = read_list(bytes)?;
        let mut it = fields.iter();
        let c1 = group::deserialize_point(it.next().ok_or(Error::InvalidCiphertext)?)?;
        let c2 = it
            .map(|b| group::deserialize_point(b))
            .collect::<Result<Vec<_>>>()?;
        if c2.is_empty() {
            return Err(Error::InvalidCiphertext);
        }
        Ok(Self { c1, c2 })
    }
}

impl<E: Curve> EncryptedKey<E> {
    /// `[ekey, vcomp, scomp]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        write_list(&[
            group::serialize_point(&self.ekey),
            group::serialize_point(&self.vcomp),
            group::serialize_scalar(&self.scomp),
        ])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fields = read_list(bytes)?;
        let [ekey, vcomp, scomp] = <[Vec<u8>; 3]>::try_from(fields).map_err(|_| Error::InvalidEncoding)?;
        Ok(Self {
            ekey: group::deserialize_point(&ekey)?,
            vcomp: group::deserialize_point(&vcomp)?,
            scomp: group::deserialize_scalar(&scomp)?,
        })
    }
}

impl<E: Curve> RekeyFrag<E> {
    /// `[id, key, xcomp, u1, z1, z2]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        write_list(&[
            group::serialize_scalar(&self.id),
            group::serialize_scalar(&self.key),
            group::serialize_point(&self.xcomp),
            group::serialize_point(&self.u1),
            group::serialize_scalar(&self.z1),
            group::serialize_scalar(&self.z2),
        ])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fields = read_list(bytes)?;
        let [id, key, xcomp, u1, z1, z2] =
            <[Vec<u8>; 6]>::try_from(fields).map_err(|_| Error::InvalidEncoding)?;
        Ok(Self {
            id: group::deserialize_scalar(&id)?,
            key: group::deserialize_scalar(&key)?,
            xcomp: group::deserialize_point(&xcomp)?,
            u1: group::deserialize_point(&u1)?,
            z1: group::deserialize_scalar(&z1)?,
            z2: group::deserialize_scalar(&z2)?,
        })
    }
}

impl<E: Curve> ReEncryptedKey<E> {
    /// `[ekey, vcomp, re_id, xcomp]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        write_list(&[
            group::serialize_point(&self.ekey),
            group::serialize_point(&self.vcomp),
            group::serialize_scalar(&self.re_id),
            group::serialize_point(&self.xcomp),
        ])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fields = read_list(bytes)?;
        let [ekey, vcomp, re_id, xcomp] =
            <[Vec<u8>; 4]>::try_from(fields).map_err(|_| Error::InvalidEncoding)?;
        Ok(Self {
            ekey: group::deserialize_point(&ekey)?,
            vcomp: group::deserialize_point(&vcomp)?,
            re_id: group::deserialize_scalar(&re_id)?,
            xcomp: group::deserialize_point(&xcomp)?,
        })
    }
}

impl<E: Curve> ChallengeResponse<E> {
    /// `[e2, v2, u1, u2, z1, z2, z3]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        write_list(&[
            group::serialize_point(&self.e2),
            group::serialize_point(&self.v2),
            group::serialize_point(&self.u1),
            group::serialize_point(&self.u2),
            group::serialize_scalar(&self.z1),
            group::serialize_scalar(&self.z2),
            group::serialize_scalar(&self.z3),
        ])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fields = read_list(bytes)?;
        let [e2, v2, u1, u2, z1, z2, z3] =
            <[Vec<u8>; 7]>::try_from(fields).map_err(|_| Error::InvalidEncoding)?;
        Ok(Self {
            e2: group::deserialize_point(&e2)?,
            v2: group::deserialize_point(&v2)?,
            u1: group::deserialize_point(&u1)?,
            u2: group::deserialize_point(&u2)?,
            z1: group::deserialize_scalar(&z1)?,
            z2: group::deserialize_scalar(&z2)?,
            z3: group::deserialize_scalar(&z3)?,
        })
    }
}

impl<E: Curve> ReCombined<E> {
    pub fn to_bytes(&self) -> Vec<u8> {
        write_list(&[
            group::serialize_point(&self.ekey),
            group::serialize_point(&self.vcomp),
            group::serialize_point(&self.xcomp),
            group::serialize_point(&self.u1),
            group::serialize_scalar(&self.z1),
            group::serialize_scalar(&self.z2),
        ])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fields = read_list(bytes)?;
        let [ekey, vcomp, xcomp, u1, z1, z2] =
            <[Vec<u8>; 6]>::try_from(fields).map_err(|_| Error::InvalidEncoding)?;
        Ok(Self {
            ekey: group::deserialize_point(&ekey)?,
            vcomp: group::deserialize_point(&vcomp)?,
            xcomp: group::deserialize_point(&xcomp)?,
            u1: group::deserialize_point(&u1)?,
            z1: group::deserialize_scalar(&z1)?,
            z2: group::deserialize_scalar(&z2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbs98;
    use crate::group::DefaultCurve;
    use crate::params::{CurveId, PreParams};
    use crate::umbral::{encapsulate, reencrypt, split_rekey};
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(5)
    }

    #[test]
    fn bbs_ciphertext_roundtrips() {
        let mut rng = rng();
        let (_sk, pk) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let ct = bbs98::encrypt(&pk, b"roundtrip me", true, &mut rng).unwrap();
        let bytes = ct.to_bytes();
        assert_eq!(Ciphertext::<DefaultCurve>::from_bytes(&bytes).unwrap(), ct);
    }

    #[test]
    fn encrypted_key_roundtrips() {
        let mut rng = rng();
        let (_a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_k, ek) = encapsulate(&pub_a, &mut rng);
        let bytes = ek.to_bytes();
        assert_eq!(EncryptedKey::<DefaultCurve>::from_bytes(&bytes).unwrap(), ek);
    }

    #[test]
    fn fragment_and_reencryption_types_roundtrip() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (frags, _vk) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();

        let frag_bytes = frags[0].to_bytes();
        assert_eq!(RekeyFrag::<DefaultCurve>::from_bytes(&frag_bytes).unwrap(), frags[0]);

        let (_k, ek) = encapsulate(&pub_a, &mut rng);
        let (reenc, ch) = reencrypt(&params, &frags[0], &ek, &mut rng).unwrap();

        let reenc_bytes = reenc.to_bytes();
        assert_eq!(ReEncryptedKey::<DefaultCurve>::from_bytes(&reenc_bytes).unwrap(), reenc);

        let ch_bytes = ch.to_bytes();
        assert_eq!(ChallengeResponse::<DefaultCurve>::from_bytes(&ch_bytes).unwrap(), ch);
    }

    #[test]
    fn rejects_truncated_and_malformed_frames() {
        assert!(matches!(
            Ciphertext::<DefaultCurve>::from_bytes(&[0, 0, 0, 1]),
            Err(Error::InvalidEncoding)
        ));
        assert!(matches!(
            Ciphertext::<DefaultCurve>::from_bytes(&[]),
            Err(Error::InvalidEncoding)
        ));
    }
}
