//! BBS98: bidirectional, multi-hop, CPA-secure proxy re-encryption.
//!
//! A semi-trusted proxy holding a [`ReEncryptionKey`] can transform a
//! [`Ciphertext`] addressed to one key into one addressed to another,
//! without learning the plaintext. Re-encryption is transitive
//! (`rk_{A→C} = rk_{B→C} · rk_{A→B}`) and bidirectional
//! (`rk_{B→A} = rk_{A→B}⁻¹`) by construction — collusion between the proxy
//! and a delegatee recovers the delegator's key, and a re-encryption key
//! lets a proxy further re-delegate without limit. Not a flaw: [`umbral`]
//! is the unidirectional, threshold construction for when that trade-off
//! isn't acceptable.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::group;
use crate::padding;

/// A BBS98 private key `a ∈ Z_q*`.
#[derive(Clone)]
pub struct PrivateKey<E: Curve>(SecretScalar<E>);

/// A BBS98 public key `A = g^a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey<E: Curve>(Point<E>);

/// A bidirectional re-encryption key `rk = b · a⁻¹`.
#[derive(Clone)]
pub struct ReEncryptionKey<E: Curve>(Scalar<E>);

impl<E: Curve> PrivateKey<E> {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(group::random_scalar(rng))
    }

    pub fn public_key(&self) -> PublicKey<E> {
        PublicKey(Point::generator() * self.0.as_ref())
    }

    /// Access the underlying zeroizing secret scalar, for modules
    /// (e.g. [`crate::umbral`]) that need to do their own group arithmetic
    /// with the private key.
    pub fn as_secret_scalar(&self) -> &SecretScalar<E> {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        group::serialize_scalar(self.0.as_ref())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut s = group::deserialize_scalar::<E>(bytes)?;
        if s.is_zero() {
            return Err(Error::InvalidKey);
        }
        Ok(Self(SecretScalar::new(&mut s)))
    }
}

impl<E: Curve> PublicKey<E> {
    pub fn point(&self) -> Point<E> {
        self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        group::serialize_point(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let p = group::deserialize_point::<E>(bytes)?;
        if p.is_zero() {
            return Err(Error::InvalidKey);
        }
        Ok(Self(p))
    }
}

/// Generate a fresh `(PrivateKey, PublicKey)` pair.
pub fn keygen<E: Curve, R: RngCore + CryptoRng>(rng: &mut R) -> (PrivateKey<E>, PublicKey<E>) {
    let sk = PrivateKey::generate(rng);
    let pk = sk.public_key();
    (sk, pk)
}

/// A BBS98 ciphertext: `(c1, c2_1, ..., c2_n)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Ciphertext<E: Curve> {
    c1: Point<E>,
    c2: Vec<Point<E>>,
}

impl<E: Curve> Ciphertext<E> {
    pub fn num_chunks(&self) -> usize {
        self.c2.len()
    }
}

/// Encrypt `m` under `pub_b`, producing a ciphertext only `pub_b`'s holder
/// (or a delegatee of a re-encryption key rooted at it) can open.
pub fn encrypt<E: Curve, R: RngCore + CryptoRng>(
    pub_b: &PublicKey<E>,
    m: &[u8],
    padding: bool,
    rng: &mut R,
) -> Result<Ciphertext<E>> {
    let chunk_len = group::bitsize::<E>();
    let padded;
    let chunks: Vec<&[u8]> = if padding {
        padded = padding::pad(chunk_len, m);
        padded.chunks(chunk_len).collect()
    } else {
        if m.len() > chunk_len {
            return Err(Error::MessageTooLarge(m.len(), chunk_len));
        }
        vec![m]
    };

    let r = group::random_scalar::<E, R>(rng);
    let c1 = pub_b.point() * r.as_ref();
    let g_r = Point::generator() * r.as_ref();

    let mut c2 = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let encoded = group::encode::<E>(chunk, true)?;
        c2.push(g_r + encoded);
    }

    Ok(Ciphertext { c1, c2 })
}

/// Decrypt a ciphertext addressed to `priv_b`.
pub fn decrypt<E: Curve>(priv_b: &PrivateKey<E>, ct: &Ciphertext<E>, padding_on: bool) -> Result<Vec<u8>> {
    if ct.c2.is_empty() {
        return Err(Error::InvalidCiphertext);
    }
    let a_inv = group::invert::<E>(priv_b.0.as_ref()).map_err(|_| Error::InvalidKey)?;
    let p = ct.c1 * a_inv; // == g^r

    let mut chunks = Vec::with_capacity(ct.c2.len());
    for c2_i in &ct.c2 {
        let point = *c2_i - p;
        chunks.push(group::decode::<E>(&point)?);
    }

    if !padding_on {
        return Ok(chunks.into_iter().next().expect("checked non-empty above"));
    }

    let chunk_len = group::bitsize::<E>();
    let (last, rest) = chunks.split_last().expect("checked non-empty above");
    let mut out = Vec::with_capacity(rest.len() * chunk_len + last.len());
    for chunk in rest {
        out.extend_from_slice(chunk);
    }
    out.extend_from_slice(&padding::unpad(chunk_len, last)?);
    Ok(out)
}

/// `rekey(a, b) = b · a⁻¹`.
///
/// Bidirectional: `rekey(b, a) == rekey(a, b)⁻¹`. Multi-hop:
/// `rekey(a, c) == rekey(b, c) · rekey(a, b)` for any intermediate `b`.
pub fn rekey<E: Curve>(a: &PrivateKey<E>, b: &PrivateKey<E>) -> Result<ReEncryptionKey<E>> {
    let a_inv = group::invert::<E>(a.0.as_ref()).map_err(|_| Error::InvalidKey)?;
    Ok(ReEncryptionKey(*b.0.as_ref() * a_inv))
}

impl<E: Curve> ReEncryptionKey<E> {
    /// `rk_{B→A} = rk_{A→B}⁻¹`.
    pub fn invert(&self) -> Result<Self> {
        Ok(Self(group::invert::<E>(&self.0)?))
    }

    /// `rk_{A→C} = self · other`, i.e. `self` composed after `other`.
    pub fn compose(&self, other: &Self) -> Self {
        Self(self.0 * other.0)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        group::serialize_scalar(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let s = group::deserialize_scalar::<E>(bytes)?;
        if s.is_zero() {
            return Err(Error::InvalidKey);
        }
        Ok(Self(s))
    }
}

/// Transform `ct` under `rk`: only `c1` is rotated, `c2` is untouched.
pub fn reencrypt<E: Curve>(rk: &ReEncryptionKey<E>, ct: &Ciphertext<E>) -> Ciphertext<E> {
    Ciphertext {
        c1: ct.c1 * rk.0,
        c2: ct.c2.clone(),
    }
}
