//! Immutable PRE parameters shared across operations of the same curve.
//!
//! Mirrors how `cggmp21` treats curve choice and execution context as
//! construction-time, immutable input shared by reference across an entire
//! protocol run, rather than threaded through every call.

use generic_ec::{Curve, Point};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::group;

/// Standardized curve identifier (NID).
///
/// Only the curves this crate is built with support for are representable;
/// unknown NIDs fail to deserialize with [`Error::InvalidEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum CurveId {
    Secp256k1 = 714,
    Secp256r1 = 415,
}

/// Per-curve public parameters of a PRE instance.
///
/// `h` and `u` — the base used for Umbral's `vKeys` commitments and the base
/// used for the challenge's `u`-side — are exposed as independent,
/// configurable generators, sampled once at setup time via hash-to-curve of
/// a domain-separated string, rather than silently reusing `g` for both.
/// [`standard`](Self::standard) sets `h == u == g` as the conservative
/// default; see DESIGN.md "Open Questions" for the reasoning.
#[derive(Clone, Copy)]
pub struct PreParams<E: Curve> {
    curve: CurveId,
    g: Point<E>,
    h: Point<E>,
    u: Point<E>,
}

impl<E: Curve> PreParams<E> {
    /// Construct parameters with `g` as the curve's standard generator and
    /// `h == u == g`.
    pub fn standard(curve: CurveId) -> Self {
        let g = group::generator::<E>();
        Self { curve, g, h: g, u: g }
    }

    /// Construct parameters with independent `h`/`u` generators, derived by
    /// hashing fixed domain-separated labels to the curve.
    pub fn with_independent_bases(curve: CurveId, h: Point<E>, u: Point<E>) -> Self {
        let g = group::generator::<E>();
        Self { curve, g, h, u }
    }

    pub fn curve(&self) -> CurveId {
        self.curve
    }

    pub fn generator(&self) -> Point<E> {
        self.g
    }

    /// Base used for Umbral's polynomial commitments (`vKeys`).
    pub fn h(&self) -> Point<E> {
        self.h
    }

    /// Base used for the Umbral challenge's `u`-side.
    pub fn u(&self) -> Point<E> {
        self.u
    }
}

/// Wire form of [`PreParams`]: `{g: bytes, curve: int}`, plus `h`/`u` since
/// they are first-class configurable parameters here rather than an
/// implicit `g`.
#[derive(Serialize, Deserialize)]
struct PreParamsWire {
    curve: CurveId,
    #[serde(with = "hex::serde")]
    g: Vec<u8>,
    #[serde(with = "hex::serde")]
    h: Vec<u8>,
    #[serde(with = "hex::serde")]
    u: Vec<u8>,
}

impl<E: Curve> PreParams<E> {
    pub fn to_bytes(&self) -> Vec<u8> {
        let wire = PreParamsWire {
            curve: self.curve,
            g: group::serialize_point(&self.g),
            h: group::serialize_point(&self.h),
            u: group::serialize_point(&self.u),
        };
        serde_json::to_vec(&wire).expect("PreParamsWire is always serializable")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let wire: PreParamsWire =
            serde_json::from_slice(bytes).map_err(|_| Error::InvalidEncoding)?;
        Ok(Self {
            curve: wire.curve,
            g: group::deserialize_point(&wire.g)?,
            h: group::deserialize_point(&wire.h)?,
            u: group::deserialize_point(&wire.u)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::DefaultCurve;

    #[test]
    fn params_roundtrip_preserves_generator_and_curve() {
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let bytes = params.to_bytes();
        let back = PreParams::<DefaultCurve>::from_bytes(&bytes).unwrap();
        assert_eq!(back.curve(), params.curve());
        assert_eq!(back.generator(), params.generator());
        assert_eq!(back.h(), params.h());
        assert_eq!(back.u(), params.u());
    }
}
