//! Proxy re-encryption step, threshold combination, and the delegatee-side
//! checks that detect a cheating proxy.

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{EncryptedKey, RekeyFrag};
use crate::bbs98::{PrivateKey, PublicKey};
use crate::error::{Error, FragmentId, Result};
use crate::group;
use crate::hashing;
use crate::params::PreParams;

/// `(ekey', vcomp', re_id, xcomp)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReEncryptedKey<E: Curve> {
    pub(crate) ekey: Point<E>,
    pub(crate) vcomp: Point<E>,
    pub(crate) re_id: Scalar<E>,
    pub(crate) xcomp: Point<E>,
}

impl<E: Curve> ReEncryptedKey<E> {
    /// Opaque identifier for blaming this re-encryption's originating
    /// fragment in an error, derived the same way as
    /// [`RekeyFrag::fragment_id`](super::RekeyFrag::fragment_id).
    pub fn fragment_id(&self) -> FragmentId {
        use sha2::Digest;
        let bytes = group::serialize_scalar(&self.re_id);
        let mut out = [0u8; 32];
        out.copy_from_slice(&sha2::Sha256::digest(bytes));
        FragmentId(out)
    }
}

/// The proxy's proof that it applied `frag.key` honestly.
///
/// Field names follow [`check_challenge`]'s own naming: `e2`/`v2` are the
/// challenge commitments (named `e_t`/`v_t` when produced in
/// [`reencrypt`]), `u1`/`u2` carry the fragment's original Schnorr
/// commitment and the challenge's own `u`-side commitment, and `z1`/`z2`
/// are copied straight from the fragment's own NIZK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ChallengeResponse<E: Curve> {
    pub(crate) e2: Point<E>,
    pub(crate) v2: Point<E>,
    pub(crate) u1: Point<E>,
    pub(crate) u2: Point<E>,
    pub(crate) z1: Scalar<E>,
    pub(crate) z2: Scalar<E>,
    pub(crate) z3: Scalar<E>,
}

/// `reencrypt(params, frag, ek) -> (ReEncryptedKey, ChallengeResponse)`.
///
/// The well-formedness check runs *after* `e1`/`v1` are computed. This
/// ordering is load-bearing, not incidental: checking before exponentiating
/// would let a network observer distinguish malformed ciphertexts from
/// honest ones by proxy timing alone.
///
/// `u_t`/`u2` are powers of `params.u()`, the same base `frag.u1` itself is
/// built from in [`super::split_rekey`] — not a hardcoded `g` — so the
/// challenge stays valid under [`PreParams::with_independent_bases`] and
/// not only under the `h == u == g` default.
pub fn reencrypt<E: Curve, R: RngCore + CryptoRng>(
    params: &PreParams<E>,
    frag: &RekeyFrag<E>,
    ek: &EncryptedKey<E>,
    rng: &mut R,
) -> Result<(ReEncryptedKey<E>, ChallengeResponse<E>)> {
    let e = ek.ekey;
    let v = ek.vcomp;
    let g = group::generator::<E>();

    let e1 = e * frag.key;
    let v1 = v * frag.key;

    let h = hashing::hash_points_to_scalar(&[e, v]);
    if g * ek.scomp != v + e * h {
        warn!("umbral: reencrypt rejected a malformed EncryptedKey");
        return Err(Error::InvalidCiphertext);
    }

    let t: SecretScalar<E> = group::random_scalar(rng);
    let e_t = e * t.as_ref();
    let v_t = v * t.as_ref();
    let u_t = params.u() * t.as_ref();

    let h_prime = hashing::hash_points_to_scalar(&[e, e1, e_t, v, v1, v_t, g, frag.u1, u_t]);
    let z3 = *t.as_ref() + h_prime * frag.key;

    Ok((
        ReEncryptedKey {
            ekey: e1,
            vcomp: v1,
            re_id: frag.id,
            xcomp: frag.xcomp,
        },
        ChallengeResponse {
            e2: e_t,
            v2: v_t,
            u1: frag.u1,
            u2: u_t,
            z1: frag.z1,
            z2: frag.z2,
            z3,
        },
    ))
}

/// Lagrange basis at `X = 0`: `Π_{j≠i} id_j · (id_j − id_i)⁻¹`.
///
/// Note the sign convention: this is *not* the textbook
/// `Π (0 − id_j) / (id_i − id_j)`, which is numerically equal but inverts a
/// different denominator; reimplementations must use exactly this formula
/// to stay bit-compatible with existing combine outputs.
fn lambda_coeff<E: Curve>(ids: &[Scalar<E>], i: usize) -> Result<Scalar<E>> {
    let mut res = Scalar::<E>::from(1u64);
    for (j, id_j) in ids.iter().enumerate() {
        if j != i {
            let denom = group::invert::<E>(&(*id_j - ids[i]))?;
            res = res * *id_j * denom;
        }
    }
    Ok(res)
}

/// Accumulated combination of `≥ t` `(ReEncryptedKey, ChallengeResponse)`
/// entries.
///
/// `xcomp`/`u1`/`z1`/`z2` are carried over from the first entry in input
/// order; the caller is assumed to have already checked that every entry
/// in the set shares the same `xcomp` (e.g. via [`check_challenge`]) before
/// combining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReCombined<E: Curve> {
    pub(crate) ekey: Point<E>,
    pub(crate) vcomp: Point<E>,
    pub(crate) xcomp: Point<E>,
    pub(crate) u1: Point<E>,
    pub(crate) z1: Scalar<E>,
    pub(crate) z2: Scalar<E>,
}

/// `combine(entries) -> ReCombined`. Requires at least one entry; callers
/// are responsible for ensuring `entries.len() >= t`.
pub fn combine<E: Curve>(
    entries: &[(ReEncryptedKey<E>, ChallengeResponse<E>)],
) -> Result<ReCombined<E>> {
    if entries.is_empty() {
        return Err(Error::InvalidCiphertext);
    }
    let ids: Vec<Scalar<E>> = entries.iter().map(|(rk, _)| rk.re_id).collect();

    let mut ekey = Point::<E>::zero();
    let mut vcomp = Point::<E>::zero();
    for (i, (rk, _)) in entries.iter().enumerate() {
        let lambda_i = lambda_coeff::<E>(&ids, i)?;
        ekey = ekey + rk.ekey * lambda_i;
        vcomp = vcomp + rk.vcomp * lambda_i;
    }

    let (first_rk, first_ch) = &entries[0];
    Ok(ReCombined {
        ekey,
        vcomp,
        xcomp: first_rk.xcomp,
        u1: first_ch.u1,
        z1: first_ch.z1,
        z2: first_ch.z2,
    })
}

/// `decapsulate_reencrypted(pub_B, priv_B, rc, pub_A, orig_ek) -> K`.
///
/// Fails with [`Error::UmbralError`] if the witness check does not hold —
/// either the original ciphertext was tampered with, or `rc` was combined
/// from shares belonging to different `EncryptedKey`s.
pub fn decapsulate_reencrypted<E: Curve>(
    pub_b: &PublicKey<E>,
    priv_b: &PrivateKey<E>,
    rc: &ReCombined<E>,
    pub_a: &PublicKey<E>,
    orig_ek: &EncryptedKey<E>,
) -> Result<Vec<u8>> {
    let d = hashing::hash_points_to_scalar(&[
        rc.xcomp,
        pub_b.point(),
        rc.xcomp * priv_b.as_secret_scalar().as_ref(),
    ]);

    let h = hashing::hash_points_to_scalar(&[orig_ek.ekey, orig_ek.vcomp]);
    let d_inv = group::invert::<E>(&d)?;
    let witness = pub_a.point() * (orig_ek.scomp * d_inv);
    if witness != rc.vcomp + rc.ekey * h {
        warn!("umbral: decapsulate_reencrypted rejected an inconsistent combined key");
        return Err(Error::UmbralError);
    }

    let shared = (rc.ekey + rc.vcomp) * d;
    Ok(hashing::kdf(&shared, super::KEY_BYTES))
}

/// `check_challenge(params, orig_ek, reenc, ch, pub_A) -> bool`.
///
/// Lets the delegatee prove a specific proxy cheated (by re-id) without
/// revealing any key material; does not itself abort anything.
///
/// `u_ok`'s base is `params.u()`, matching [`reencrypt`]'s `u_t`/`u2` and
/// [`super::split_rekey`]'s `u1` — hardcoding `g` here would only verify
/// correctly when `params.u() == g`.
pub fn check_challenge<E: Curve>(
    params: &PreParams<E>,
    orig_ek: &EncryptedKey<E>,
    reenc: &ReEncryptedKey<E>,
    ch: &ChallengeResponse<E>,
    pub_a: &PublicKey<E>,
) -> bool {
    let g = group::generator::<E>();
    let e = orig_ek.ekey;
    let v = orig_ek.vcomp;
    let e1 = reenc.ekey;
    let v1 = reenc.vcomp;

    let ycomp = g * ch.z2 + pub_a.point() * ch.z1;
    let h_prime =
        hashing::hash_points_to_scalar(&[e, e1, ch.e2, v, v1, ch.v2, g, ch.u1, ch.u2]);

    let z1_ok = ch.z1 == hashing::hash_points_to_scalar(&[reenc.xcomp, ch.u1, ycomp]);
    let e_ok = e * ch.z3 == ch.e2 + e1 * h_prime;
    let u_ok = params.u() * ch.z3 == ch.u2 + ch.u1 * h_prime;

    z1_ok && e_ok && u_ok
}

/// `Result`-returning wrapper around [`check_challenge`], raising
/// [`Error::ChallengeFailed`] naming the offending re-encryption's fragment
/// id on a failed verdict, per spec §7 ("enough context to blame the
/// offending fragment's `re_id`").
pub fn ensure_challenge_response<E: Curve>(
    params: &PreParams<E>,
    orig_ek: &EncryptedKey<E>,
    reenc: &ReEncryptedKey<E>,
    ch: &ChallengeResponse<E>,
    pub_a: &PublicKey<E>,
) -> Result<()> {
    if check_challenge(params, orig_ek, reenc, ch, pub_a) {
        Ok(())
    } else {
        Err(Error::ChallengeFailed(Some(reenc.fragment_id())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbs98;
    use crate::group::DefaultCurve;
    use crate::params::{CurveId, PreParams};
    use crate::umbral::{decapsulate_original, encapsulate, split_rekey};
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha20Rng {
        rand_chacha::ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn threshold_reencryption_reproduces_encapsulated_key() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (k, ek) = encapsulate(&pub_a, &mut rng);
        let (frags, _v_keys) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();

        // any 2-of-3 subset should work
        let subset = &frags[0..2];
        let entries: Vec<_> = subset
            .iter()
            .map(|frag| reencrypt(&params, frag, &ek, &mut rng).unwrap())
            .collect();
        let combined = combine(&entries).unwrap();

        let k2 = decapsulate_reencrypted(&pub_b, &b, &combined, &pub_a, &ek).unwrap();
        assert_eq!(k, k2);
        assert_eq!(k.len(), 32);
    }

    #[test]
    fn every_subset_of_size_t_reproduces_the_key() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (k, ek) = encapsulate(&pub_a, &mut rng);
        let (frags, _) = split_rekey(&params, &a, &pub_b, 2, 5, &mut rng).unwrap();

        for i in 0..frags.len() {
            for j in (i + 1)..frags.len() {
                let entries = vec![
                    reencrypt(&params, &frags[i], &ek, &mut rng).unwrap(),
                    reencrypt(&params, &frags[j], &ek, &mut rng).unwrap(),
                ];
                let combined = combine(&entries).unwrap();
                let recovered = decapsulate_reencrypted(&pub_b, &b, &combined, &pub_a, &ek).unwrap();
                assert_eq!(k, recovered, "subset ({i}, {j})");
            }
        }
    }

    #[test]
    fn challenge_holds_for_honest_reencryption() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (_k, ek) = encapsulate(&pub_a, &mut rng);
        let (frags, _) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();
        let (reenc, ch) = reencrypt(&params, &frags[0], &ek, &mut rng).unwrap();

        assert!(check_challenge(&params, &ek, &reenc, &ch, &pub_a));
    }

    #[test]
    fn challenge_holds_under_an_independent_u_base() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::with_independent_bases(
            CurveId::Secp256k1,
            group::random_point::<DefaultCurve, _>(&mut rng),
            group::random_point::<DefaultCurve, _>(&mut rng),
        );
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (_k, ek) = encapsulate(&pub_a, &mut rng);
        let (frags, v_keys) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();
        for frag in &frags {
            assert!(crate::umbral::check_kfrag_consistency(&params, frag, &v_keys));
        }
        let (reenc, ch) = reencrypt(&params, &frags[0], &ek, &mut rng).unwrap();

        assert!(check_challenge(&params, &ek, &reenc, &ch, &pub_a));
        assert!(ensure_challenge_response(&params, &ek, &reenc, &ch, &pub_a).is_ok());
    }

    #[test]
    fn challenge_fails_when_ekey_replaced_with_a_different_fragments_output() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (_b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (_k, ek) = encapsulate(&pub_a, &mut rng);
        let (frags, _) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();
        let (reenc0, ch0) = reencrypt(&params, &frags[0], &ek, &mut rng).unwrap();
        let (reenc1, _ch1) = reencrypt(&params, &frags[1], &ek, &mut rng).unwrap();

        let tampered = ReEncryptedKey {
            ekey: reenc1.ekey,
            ..reenc0
        };
        assert!(!check_challenge(&params, &ek, &tampered, &ch0, &pub_a));
    }

    #[test]
    fn tamper_detection_on_random_ekey_substitution() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (_k, ek) = encapsulate(&pub_a, &mut rng);
        let (frags, _) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();
        let entries: Vec<_> = frags[0..2]
            .iter()
            .map(|frag| reencrypt(&params, frag, &ek, &mut rng).unwrap())
            .collect();
        let mut combined = combine(&entries).unwrap();
        combined.ekey = group::random_point::<DefaultCurve, _>(&mut rng);

        assert!(matches!(
            decapsulate_reencrypted(&pub_b, &b, &combined, &pub_a, &ek),
            Err(Error::UmbralError)
        ));
    }

    #[test]
    fn tamper_detection_when_mixing_a_different_original_ciphertexts_share() {
        let mut rng = rng();
        let params = PreParams::<DefaultCurve>::standard(CurveId::Secp256k1);
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (b, pub_b) = bbs98::keygen::<DefaultCurve, _>(&mut rng);

        let (_k1, ek1) = encapsulate(&pub_a, &mut rng);
        let (_k2, ek2) = encapsulate(&pub_a, &mut rng);
        let (frags, _) = split_rekey(&params, &a, &pub_b, 2, 3, &mut rng).unwrap();

        let mut entries = vec![reencrypt(&params, &frags[0], &ek1, &mut rng).unwrap()];
        entries.push(reencrypt(&params, &frags[1], &ek2, &mut rng).unwrap());
        let combined = combine(&entries).unwrap();

        assert!(matches!(
            decapsulate_reencrypted(&pub_b, &b, &combined, &pub_a, &ek1),
            Err(Error::UmbralError)
        ));
    }

    #[test]
    fn decapsulate_original_matches_encapsulate() {
        let mut rng = rng();
        let (a, pub_a) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
        let (k, ek) = encapsulate(&pub_a, &mut rng);
        assert_eq!(decapsulate_original(&a, &ek), k);
    }
}
