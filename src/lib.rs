//! `npre`: proxy re-encryption over a generic prime-order elliptic-curve
//! group.
//!
//! Two constructions are provided:
//!
//! - [`bbs98`]: bidirectional, multi-hop, CPA-secure PRE for direct message
//!   encryption. A single re-encryption key lets a semi-trusted proxy
//!   transform ciphertexts end to end; see [`bbs98::rekey`].
//! - [`umbral`]: unidirectional, threshold PRE used as a KEM. A delegator's
//!   re-encryption key is split into `N` verifiable fragments
//!   ([`umbral::split_rekey`]); any `t` proxies acting independently can
//!   reconstruct a delegatee's key, and a cheating proxy can be caught via
//!   [`umbral::check_challenge`].
//!
//! Both constructions share the same curve abstraction ([`group`]), KDF and
//! challenge-hash primitives ([`hashing`]), and error type ([`error`]).
//!
//! # Choosing a construction
//!
//! Use [`bbs98`] when the proxy should be able to re-delegate further
//! (multi-hop) and bidirectionality between two specific parties is
//! acceptable. Use [`umbral`] when re-encryption must be one-way, or when no
//! single proxy should be trusted to perform it alone (threshold `t`-of-`N`).
//!
//! ```
//! use npre::{bbs98, group::DefaultCurve};
//! use rand::thread_rng;
//!
//! let mut rng = thread_rng();
//! let (alice_sk, alice_pk) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
//! let (bob_sk, bob_pk) = bbs98::keygen::<DefaultCurve, _>(&mut rng);
//!
//! let ct = bbs98::encrypt(&alice_pk, b"hello bob", true, &mut rng).unwrap();
//! let rk = bbs98::rekey(&alice_sk, &bob_sk).unwrap();
//! let ct_for_bob = bbs98::reencrypt(&rk, &ct);
//!
//! assert_eq!(bbs98::decrypt(&bob_sk, &ct_for_bob, true).unwrap(), b"hello bob");
//! ```

pub mod bbs98;
pub mod error;
pub mod group;
pub mod hashing;
pub mod padding;
pub mod params;
pub mod umbral;
pub mod wire;

pub use error::{Error, Result};
