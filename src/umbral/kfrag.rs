//! Threshold split of a re-encryption key into verifiable fragments.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::bbs98::{PrivateKey, PublicKey};
use crate::error::{Error, FragmentId, Result};
use crate::group;
use crate::hashing;
use crate::params::PreParams;

/// One Shamir-like share of a re-encryption key, held by a single proxy
/// ("Ursula").
///
/// `(z1, z2)` is a Schnorr-style non-interactive proof, binding this
/// fragment to the delegator's private key, that the delegatee can verify
/// without learning `priv_A`.
///
/// Not `Copy`: `key` is the fragment's actual secret share and is wiped
/// on drop below. Unlike
/// `priv_A`/`priv_r`/`priv_u` this value must still round-trip through
/// [`crate::wire`] to reach the proxy that holds it, so it can't be held as
/// a `SecretScalar` the way [`PrivateKey`] is — the wipe here is a
/// best-effort overwrite of the field rather than `SecretScalar`'s stronger
/// guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RekeyFrag<E: Curve> {
    pub(crate) id: Scalar<E>,
    pub(crate) key: Scalar<E>,
    pub(crate) xcomp: Point<E>,
    pub(crate) u1: Point<E>,
    pub(crate) z1: Scalar<E>,
    pub(crate) z2: Scalar<E>,
}

impl<E: Curve> Drop for RekeyFrag<E> {
    fn drop(&mut self) {
        self.key = Scalar::zero();
    }
}

impl<E: Curve> RekeyFrag<E> {
    pub fn id(&self) -> Scalar<E> {
        self.id
    }

    /// Opaque identifier suitable for blaming a specific fragment in an
    /// error, derived from the fragment's public `id` scalar.
    pub fn fragment_id(&self) -> FragmentId {
        use sha2::Digest;
        let bytes = group::serialize_scalar(&self.id);
        let mut out = [0u8; 32];
        out.copy_from_slice(&sha2::Sha256::digest(bytes));
        FragmentId(out)
    }
}

/// Commitments `(h^c_0, ..., h^c_{t-1})` to the polynomial's coefficients.
/// Length is always `t`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct VerificationKeys<E: Curve>(pub(crate) Vec<Point<E>>);

impl<E: Curve> VerificationKeys<E> {
    pub fn threshold(&self) -> usize {
        self.0.len()
    }
}

/// Horner evaluation of `f(X) = Σ c_k X^k`, from the highest-degree
/// coefficient down.
fn poly_eval<E: Curve>(coeffs: &[SecretScalar<E>], x: &Scalar<E>) -> Scalar<E> {
    coeffs
        .iter()
        .rev()
        .fold(Scalar::<E>::zero(), |acc, c| acc * x + c.as_ref())
}

/// `split_rekey(priv_A, pub_B, t, N) -> (frags[N], vKeys[t])`.
pub fn split_rekey<E: Curve, R: RngCore + CryptoRng>(
    params: &PreParams<E>,
    priv_a: &PrivateKey<E>,
    pub_b: &PublicKey<E>,
    t: usize,
    n: usize,
    rng: &mut R,
) -> Result<(Vec<RekeyFrag<E>>, VerificationKeys<E>)> {
    if t == 0 || n < t {
        return Err(Error::InvalidKey);
    }

    let g = group::generator::<E>();

    // x, xcomp: binds the rekey to pub_B via a DH-tied scalar `d`.
    let x: SecretScalar<E> = group::random_scalar(rng);
    let xcomp = g * x.as_ref();
    let d = hashing::hash_points_to_scalar(&[xcomp, pub_b.point(), pub_b.point() * x.as_ref()]);
    let d_inv = group::invert::<E>(&d)?;

    // Polynomial f(X) = c_0 + c_1 X + ... + c_{t-1} X^{t-1}, c_0 = priv_A / d.
    // Coefficients are wiped on drop; only the public commitments derived
    // from them (`v_keys`) and the per-fragment evaluations survive this
    // function.
    let mut coeffs: Vec<SecretScalar<E>> = Vec::with_capacity(t);
    let mut c0 = *priv_a.as_secret_scalar().as_ref() * d_inv;
    coeffs.push(SecretScalar::new(&mut c0));
    for _ in 1..t {
        coeffs.push(group::random_scalar(rng));
    }

    let v_keys = VerificationKeys(coeffs.iter().map(|c| params.h() * c.as_ref()).collect());

    let mut frags = Vec::with_capacity(n);
    for _ in 0..n {
        let id = loop {
            let candidate = group::random_scalar::<E, R>(rng);
            if !candidate.as_ref().is_zero() {
                break *candidate.as_ref();
            }
        };
        let rk_i = poly_eval(&coeffs, &id);
        let u1 = params.u() * rk_i;

        let y: SecretScalar<E> = group::random_scalar(rng);
        let z1 = hashing::hash_points_to_scalar(&[xcomp, u1, g * y.as_ref()]);
        let z2 = *y.as_ref() - *priv_a.as_secret_scalar().as_ref() * z1;

        frags.push(RekeyFrag {
            id,
            key: rk_i,
            xcomp,
            u1,
            z1,
            z2,
        });
    }

    Ok((frags, v_keys))
}

/// `check_kFrag_consistency(params, frag, vKeys) -> bool`.
///
/// Evaluates `Π vKeys[k]^(id^k)` incrementally (accumulating `id^k` as it
/// goes, rather than recomputing each power from scratch) and compares
/// against the fragment's claimed `h^key`.
pub fn check_kfrag_consistency<E: Curve>(
    params: &PreParams<E>,
    frag: &RekeyFrag<E>,
    v_keys: &VerificationKeys<E>,
) -> bool {
    let mut acc = Point::<E>::zero();
    let mut id_power = Scalar::<E>::from(1u64);
    for vk in &v_keys.0 {
        acc = acc + *vk * id_power;
        id_power = id_power * frag.id;
    }
    acc == params.h() * frag.key
}

/// `Result`-returning wrapper around [`check_kfrag_consistency`], raising
/// [`Error::InconsistentFragment`] naming the offending fragment's id on a
/// failed verdict, per spec §7 ("enough context to blame the offending
/// fragment's `re_id`").
pub fn ensure_kfrag_consistency<E: Curve>(
    params: &PreParams<E>,
    frag: &RekeyFrag<E>,
    v_keys: &VerificationKeys<E>,
) -> Result<()> {
    if check_kfrag_consistency(params, frag, v_keys) {
        Ok(())
    } else {
        Err(Error::InconsistentFragment(Some(frag.fragment_id())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::DefaultCurve;
    use crate::params::{CurveId, PreParams};
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(7)
    }

    #[test]
    fn fragments_are_consistent_with_their_verification_keys() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, _) = crate::bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_, pub_b) = crate::bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (frags, v_keys) = split_rekey(&params, &a, &pub_b, 2, 5, &mut rng).unwrap();
        for frag in &frags {
            assert!(check_kfrag_consistency(&params, frag, &v_keys));
        }
    }

    #[test]
    fn tampered_fragment_key_fails_consistency() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, _) = crate::bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_, pub_b) = crate::bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (mut frags, v_keys) = split_rekey(&params, &a, &pub_b, 3, 4, &mut rng).unwrap();
        let replaced = *group::random_scalar::<DefaultCurve, _>(&mut rng).as_ref();
        frags[0].key = replaced;

        assert!(!check_kfrag_consistency(&params, &frags[0], &v_keys));
        for frag in &frags[1..] {
            assert!(check_kfrag_consistency(&params, frag, &v_keys));
        }
    }

    #[test]
    fn ensure_kfrag_consistency_raises_inconsistent_fragment_on_a_tampered_key() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, _) = crate::bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_, pub_b) = crate::bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (mut frags, v_keys) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();
        assert!(ensure_kfrag_consistency(&params, &frags[0], &v_keys).is_ok());

        let replaced = *group::random_scalar::<DefaultCurve, _>(&mut rng).as_ref();
        frags[0].key = replaced;

        match ensure_kfrag_consistency(&params, &frags[0], &v_keys) {
            Err(Error::InconsistentFragment(Some(id))) => {
                assert_eq!(id, frags[0].fragment_id())
            }
            other => panic!("expected InconsistentFragment, got {other:?}"),
        }
    }
}
