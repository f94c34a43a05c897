//! KDF and hash-to-scalar primitives.
//!
//! `kdf` derives a fixed-length symmetric key from a shared group element.
//! `hash_points_to_scalar` is the Fiat-Shamir-style challenge hash used
//! throughout Umbral to turn a transcript of points into a scalar
//! challenge — the same role `Scalar::<E>::hash_concat` plays in
//! `cggmp21`'s key-refresh protocol (`key_refresh.rs`, computing `challenge`
//! from `rho_bytes`), except here the exact SHA-256-then-reduce formula is
//! pinned rather than left to `generic_ec`'s own hash-to-curve domain
//! separation, so it is implemented directly against `sha2`.

use generic_ec::{Curve, Point, Scalar};
use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};

use crate::group;

/// `HKDF-SHA-512(serialize(point)[1:], salt=∅, info=∅, L=keylen)`.
///
/// The leading type-tag byte from [`group::serialize_point`] is stripped so
/// the KDF input is the raw point encoding.
pub fn kdf<E: Curve>(point: &Point<E>, keylen: usize) -> Vec<u8> {
    let tagged = group::serialize_point(point);
    let ikm = &tagged[1..];

    let hk = Hkdf::<Sha512>::new(None, ikm);
    let mut okm = vec![0u8; keylen];
    hk.expand(&[], &mut okm)
        .expect("keylen is within HKDF-SHA-512's 255*64-byte output limit");
    okm
}

/// `SHA-256(serialize(P1) || ... || serialize(Pn))`, reduced mod `q`.
pub fn hash_points_to_scalar<E: Curve>(points: &[Point<E>]) -> Scalar<E> {
    let mut hasher = Sha256::new();
    for p in points {
        hasher.update(group::serialize_point(p));
    }
    let digest = hasher.finalize();
    scalar_from_be_bytes_mod_q(&digest)
}

/// Reduce a big-endian byte string modulo the scalar field order using
/// repeated Horner steps (`acc = acc * 256 + byte`), so we depend only on
/// `Scalar`'s `Zero`/`Add`/`Mul`/`From<u64>` arithmetic rather than on a
/// curve-specific "reduce these bytes" constructor.
fn scalar_from_be_bytes_mod_q<E: Curve>(bytes: &[u8]) -> Scalar<E> {
    let base = Scalar::<E>::from(256u64);
    bytes
        .iter()
        .fold(Scalar::<E>::zero(), |acc, &b| acc * base + Scalar::<E>::from(u64::from(b)))
}
