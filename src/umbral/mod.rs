//! Umbral: unidirectional, threshold proxy re-encryption as a KEM.
//!
//! A delegator splits a re-encryption key into `N` fragments held by `N`
//! proxies ("Ursulas"); any `t` of them can collaboratively transform an
//! [`EncryptedKey`] from delegator to delegatee. Fragments are verifiable
//! against a committed polynomial ([`kfrag::VerificationKeys`]) and a
//! delegatee can detect a cheating proxy via [`reencrypt::check_challenge`].
//!
//! This module's default is the verifiable, threshold variant; the
//! simpler non-interactive, single-hop mode with no fragment verifiability
//! is kept as a distinct, clearly labeled entry point in [`simple`].

mod kfrag;
mod reencrypt;
pub mod simple;

pub use kfrag::{
    check_kfrag_consistency, ensure_kfrag_consistency, split_rekey, RekeyFrag, VerificationKeys,
};
pub use reencrypt::{
    check_challenge, combine, decapsulate_reencrypted, ensure_challenge_response, reencrypt,
    ChallengeResponse, ReCombined,
};

use generic_ec::{Curve, Point, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::bbs98::{PrivateKey, PublicKey};
use crate::group;
use crate::hashing;

/// Symmetric key length produced by [`encapsulate`]/[`decapsulate_original`].
pub const KEY_BYTES: usize = 32;

/// `(ekey, vcomp, scomp)`.
///
/// Invariant: `g^scomp == vcomp · ekey^H(ekey, vcomp)`, checked explicitly
/// by [`reencrypt::reencrypt`] before a proxy does any exponentiation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct EncryptedKey<E: Curve> {
    pub(crate) ekey: Point<E>,
    pub(crate) vcomp: Point<E>,
    pub(crate) scomp: generic_ec::Scalar<E>,
}

impl<E: Curve> EncryptedKey<E> {
    pub fn ekey(&self) -> Point<E> {
        self.ekey
    }

    pub fn vcomp(&self) -> Point<E> {
        self.vcomp
    }
}

/// `encapsulate(pub_A) -> (K, EncryptedKey)`.
pub fn encapsulate<E: Curve, R: RngCore + CryptoRng>(
    pub_a: &PublicKey<E>,
    rng: &mut R,
) -> (Vec<u8>, EncryptedKey<E>) {
    let priv_r: SecretScalar<E> = group::random_scalar(rng);
    let priv_u: SecretScalar<E> = group::random_scalar(rng);
    let g = group::generator::<E>();

    let pub_r = g * priv_r.as_ref();
    let pub_u = g * priv_u.as_ref();

    let h = hashing::hash_points_to_scalar(&[pub_r, pub_u]);
    let s = *priv_u.as_ref() + *priv_r.as_ref() * h;

    let shared = pub_a.point() * (*priv_r.as_ref() + *priv_u.as_ref());
    let k = hashing::kdf(&shared, KEY_BYTES);

    (
        k,
        EncryptedKey {
            ekey: pub_r,
            vcomp: pub_u,
            scomp: s,
        },
    )
}

/// `decapsulate_original(priv_A, ek) -> K`.
pub fn decapsulate_original<E: Curve>(priv_a: &PrivateKey<E>, ek: &EncryptedKey<E>) -> Vec<u8> {
    let shared = (ek.ekey + ek.vcomp) * priv_a.as_secret_scalar().as_ref();
    hashing::kdf(&shared, KEY_BYTES)
}
