//! Unified error surface.
//!
//! Every fallible operation in the crate returns one of these variants.
//! Structural errors (bad encodings) and cryptographic failures (a cheating
//! proxy) are both reported here; the crate never retries or recovers
//! locally, it only classifies and propagates.

use thiserror::Error;

/// Errors surfaced by any `npre` operation.
#[derive(Debug, Error)]
pub enum Error {
    /// A serialized scalar, point, or compound value could not be parsed.
    #[error("invalid encoding")]
    InvalidEncoding,

    /// A BBS98 or Umbral ciphertext was structurally malformed (wrong chunk
    /// count, bad padding byte, truncated list, ...).
    #[error("invalid ciphertext")]
    InvalidCiphertext,

    /// A key was zero, out of range, or otherwise unusable (e.g. inverting
    /// a zero scalar).
    #[error("invalid key")]
    InvalidKey,

    /// A `RekeyFrag` does not lie on the polynomial committed to by its
    /// `VerificationKeys`.
    #[error("fragment {0:?} is inconsistent with its verification keys")]
    InconsistentFragment(Option<FragmentId>),

    /// A `check_challenge` verification failed: the proxy's
    /// `ChallengeResponse` does not match its `ReEncryptedKey`.
    #[error("challenge response failed verification for fragment {0:?}")]
    ChallengeFailed(Option<FragmentId>),

    /// The witness check failed while decapsulating a reencrypted key:
    /// either the original ciphertext was tampered with, or the combined
    /// value was assembled from shares of different ciphertexts.
    #[error("umbral witness check failed, reencrypted key rejected")]
    UmbralError,

    /// The configured randomness source failed to produce entropy.
    /// `npre::group`'s sampling functions are bounded on the infallible
    /// `RngCore + CryptoRng` traits, the same bound
    /// `generic_ec::SecretScalar::random` itself takes, so this variant is
    /// part of the crate's error surface but isn't constructed by the
    /// infallible sampling path; a caller plugging in a `TryRngCore`-based
    /// source that can fail should map that failure to this variant at the
    /// call site.
    #[error("randomness source failed")]
    RandomnessFailure,

    /// An arbitrary-length message exceeded the group's plaintext-chunk
    /// size during point encoding.
    #[error("message of {0} bytes exceeds the {1}-byte chunk size")]
    MessageTooLarge(usize, usize),

    /// Attempted to invert the zero scalar.
    #[error("division by zero scalar")]
    ZeroDivision,
}

/// Opaque human-readable identifier for a `RekeyFrag`, carried on errors so
/// callers can blame the offending proxy without us handing back key
/// material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(pub [u8; 32]);

impl core::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
