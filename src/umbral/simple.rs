//! The simpler, non-threshold, non-verifiable Umbral mode.
//!
//! This is a direct single-hop rekey rather than a threshold split: one
//! proxy, one scalar, no committed polynomial. It is kept as a distinct,
//! clearly labeled entry point alongside the verifiable threshold variant
//! (the rest of [`crate::umbral`]), which is this crate's default. **It
//! offers no protection against a cheating proxy**: there is no
//! `VerificationKeys` to check a fragment against, and no
//! `ChallengeResponse` to catch a tampered re-encryption. Use
//! [`crate::umbral::split_rekey`] instead whenever the proxy isn't fully
//! trusted.

use generic_ec::Curve;
use serde::{Deserialize, Serialize};

use crate::bbs98::PrivateKey;
use crate::error::{Error, Result};
use crate::group;
use crate::umbral::EncryptedKey;

/// `rk = priv_A · priv_B⁻¹`.
///
/// Note the direction is the reverse of [`crate::bbs98::rekey`]'s
/// `b · a⁻¹`: this scalar is meant to be handed to the *delegatee* so they
/// can scale an `EncryptedKey` down to something only their own private
/// key recovers, rather than handed to a proxy the way BBS98's rekey is.
#[derive(Clone, Copy)]
pub struct SimpleRekey<E: Curve>(generic_ec::Scalar<E>);

pub fn rekey<E: Curve>(priv_a: &PrivateKey<E>, priv_b: &PrivateKey<E>) -> Result<SimpleRekey<E>> {
    let b_inv = group::invert::<E>(priv_b.as_secret_scalar().as_ref())?;
    Ok(SimpleRekey(*priv_a.as_secret_scalar().as_ref() * b_inv))
}

/// Re-encrypt `ek`, scaling both its components by `rk` so that
/// [`crate::umbral::decapsulate_original`] under `priv_B` recovers the same
/// key that `priv_A` would have recovered from the original `ek`.
pub fn reencrypt<E: Curve>(rk: &SimpleRekey<E>, ek: &EncryptedKey<E>) -> Result<EncryptedKey<E>> {
    if rk.0.is_zero() {
        return Err(Error::InvalidKey);
    }
    Ok(EncryptedKey {
        ekey: ek.ekey * rk.0,
        vcomp: ek.vcomp * rk.0,
        scomp: ek.scomp,
    })
}
