//! The abstract prime-order group `G`.
//!
//! This wraps [`generic_ec`]'s curve abstraction the same way `cggmp21` and
//! `key-share` do (see `IncompleteKeyShare<E, L>` in `key_share.rs`, which is
//! generic over `E: Curve` and stores `Point<E>`/`SecretScalar<E>` directly).
//! Everything in this module is generic over a curve `E: Curve`; the default
//! curve used by the rest of the crate is [`DefaultCurve`].
//!
//! `generic_ec` already gives us constant-time scalar/point arithmetic and
//! zeroizing secret scalars; what it does *not* give us is a fixed wire
//! format (a leading type-tag byte) or a message-to-point `encode`/`decode`
//! embedding, both implemented here.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::{Error, Result};

/// Default curve for the crate: secp256k1.
pub type DefaultCurve = generic_ec::curves::Secp256k1;

/// Leading byte distinguishing a serialized scalar from a serialized point.
mod tag {
    pub const SCALAR: u8 = 0x01;
    pub const POINT: u8 = 0x02;
}

/// Either a scalar or a point recovered from an opaque, tagged blob.
pub enum Tagged<E: Curve> {
    Scalar(Scalar<E>),
    Point(Point<E>),
}

/// Sample a uniformly random, non-zero secret scalar.
pub fn random_scalar<E: Curve, R: RngCore + CryptoRng>(rng: &mut R) -> SecretScalar<E> {
    SecretScalar::random(rng)
}

/// Sample a uniformly random group element `g^x` for a random `x`.
pub fn random_point<E: Curve, R: RngCore + CryptoRng>(rng: &mut R) -> Point<E> {
    Point::generator() * random_scalar::<E, R>(rng).as_ref()
}

/// The group's fixed generator `g`.
pub fn generator<E: Curve>() -> Point<E> {
    Point::generator().into()
}

/// Byte length of a scalar field element, i.e. `ceil(bits(q) / 8)`.
///
/// This is also the size used for the scalar half of the wire format.
pub fn scalar_byte_size<E: Curve>() -> usize {
    (E::Scalar::serialized_len_bits() + 7) / 8
}

/// The scalar field's order `q`, as big-endian bytes.
///
/// `Scalar<E>` can only represent residues mod `q`, so `q` itself (which is
/// congruent to `0`) can't be read back out of one directly; this computes
/// `q - 1` as a scalar, then adds `1` back in plain byte arithmetic.
pub fn order<E: Curve>() -> Vec<u8> {
    let q_minus_one = Scalar::<E>::zero() - Scalar::<E>::from(1u64);
    let mut bytes = q_minus_one.to_be_bytes().as_ref().to_vec();
    for byte in bytes.iter_mut().rev() {
        if *byte == 0xff {
            *byte = 0;
        } else {
            *byte += 1;
            break;
        }
    }
    bytes
}

/// Byte-length of a message chunk that [`encode`] can embed into a single
/// point.
///
/// Two bytes of the scalar-sized window are reserved: one for the retry
/// counter used by the x-coordinate embedding in [`encode`]/[`decode`], and
/// one recording the embedded message's true length, so [`decode`] can
/// reconstruct messages shorter than a full chunk exactly rather than
/// returning them zero-padded out to `bitsize` (see the module docs and
/// DESIGN.md).
pub fn bitsize<E: Curve>() -> usize {
    scalar_byte_size::<E>() - 2
}

/// Canonical serialization of a scalar: `[tag::SCALAR] || big-endian bytes`.
pub fn serialize_scalar<E: Curve>(s: &Scalar<E>) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + scalar_byte_size::<E>());
    out.push(tag::SCALAR);
    out.extend_from_slice(s.to_be_bytes().as_ref());
    out
}

/// Canonical serialization of a point: `[tag::POINT] || compressed SEC1`.
///
/// The encoding is always compressed; this keeps point serialization
/// byte-stable regardless of a caller's preference.
pub fn serialize_point<E: Curve>(p: &Point<E>) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(tag::POINT);
    out.extend_from_slice(p.to_bytes(true).as_ref());
    out
}

/// Parse an opaque, tagged blob back into a scalar or a point.
pub fn deserialize<E: Curve>(bytes: &[u8]) -> Result<Tagged<E>> {
    match bytes.split_first() {
        Some((&tag::SCALAR, rest)) => Scalar::<E>::from_be_bytes(rest)
            .map(Tagged::Scalar)
            .map_err(|_| Error::InvalidEncoding),
        Some((&tag::POINT, rest)) => Point::<E>::from_bytes(rest)
            .map(Tagged::Point)
            .map_err(|_| Error::InvalidEncoding),
        _ => Err(Error::InvalidEncoding),
    }
}

pub fn deserialize_scalar<E: Curve>(bytes: &[u8]) -> Result<Scalar<E>> {
    match deserialize(bytes)? {
        Tagged::Scalar(s) => Ok(s),
        Tagged::Point(_) => Err(Error::InvalidEncoding),
    }
}

pub fn deserialize_point<E: Curve>(bytes: &[u8]) -> Result<Point<E>> {
    match deserialize(bytes)? {
        Tagged::Point(p) => Ok(p),
        Tagged::Scalar(_) => Err(Error::InvalidEncoding),
    }
}

/// Embed up to [`bitsize`] bytes of plaintext into a group element.
///
/// Implements the classic x-coordinate-search embedding: the candidate
/// x-coordinate is `[retry counter] || [length byte] || zero padding ||
/// bytes`, right-aligned in the scalar-sized window; on the curves we
/// support, roughly half of candidate x-coordinates are valid, so the retry
/// loop terminates after a small number of iterations with overwhelming
/// probability. The length byte records `bytes.len()` so [`decode`] can
/// recover exactly `bytes` even when it is shorter than a full chunk,
/// instead of a zero-padded `bitsize`-byte string.
pub fn encode<E: Curve>(bytes: &[u8], compressed_flag: bool) -> Result<Point<E>> {
    let chunk = bitsize::<E>();
    if bytes.len() > chunk {
        return Err(Error::MessageTooLarge(bytes.len(), chunk));
    }
    let field_width = scalar_byte_size::<E>();
    let mut candidate = vec![0u8; field_width];
    candidate[1] = bytes.len() as u8;
    candidate[field_width - bytes.len()..].copy_from_slice(bytes);

    let parity: u8 = if compressed_flag { 0x02 } else { 0x03 };
    for counter in 0u8..=255 {
        candidate[0] = counter;
        let mut sec1 = Vec::with_capacity(1 + field_width);
        sec1.push(parity);
        sec1.extend_from_slice(&candidate);
        if let Ok(point) = Point::<E>::from_bytes(&sec1) {
            return Ok(point);
        }
    }
    Err(Error::InvalidEncoding)
}

/// Recover the bytes embedded by [`encode`], at their original length.
pub fn decode<E: Curve>(point: &Point<E>) -> Result<Vec<u8>> {
    let bytes = point.to_bytes(true);
    let x = &bytes.as_ref()[1..]; // drop the SEC1 parity byte
    if x.len() != scalar_byte_size::<E>() {
        return Err(Error::InvalidEncoding);
    }
    let length = x[1] as usize; // dropping x[0], the retry counter
    if length > bitsize::<E>() {
        return Err(Error::InvalidEncoding);
    }
    Ok(x[x.len() - length..].to_vec())
}

/// Modular inverse of a scalar; fails on zero.
pub fn invert<E: Curve>(s: &Scalar<E>) -> Result<Scalar<E>> {
    s.invert().ok_or(Error::ZeroDivision)
}
