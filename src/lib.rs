//! Montrepr is a Rust library for fixed-width multi-limb integers and
//! Montgomery-form modular arithmetic.
//!
//! The `repr` module defines `Repr<W>`, an unsigned integer over `W`
//! 64-bit limbs (`U256` is `Repr<4>`), with carry-propagating addition
//! and subtraction, shifts, comparisons, and full multiplication and
//! squaring into a double-width `WideRepr<W>`. Montgomery reduction
//! (CIOS variant) turns double-width products back into `W`-limb values
//! modulo an odd integer N.
//!
//! The `field` module builds on these primitives: a `FieldParams<W>`
//! holds a modulus and its derived Montgomery constants (computed by a
//! `const fn`, so that parameters can be stored in `static` items), and
//! an `Fp<'a, W>` is an element modulo N, stored in Montgomery
//! representation, that borrows its parameters. Predefined parameters are
//! provided for a few well-known 256-bit prime fields (BN254, P-256,
//! secp256k1), each selected by a crate feature (all enabled by default).
//!
//! # Conventions
//!
//! Functions that modify the object on which they are called have a name
//! in `set_*()`, or an explicitly in-place name (`add_nocarry()`,
//! `mont_mul_assign()`...); by-value variants (e.g. `Fp::square()`
//! versus `Fp::set_square()`) return a new instance and leave the
//! source unmodified. Field multiplication uses the usual `*` and `*=`
//! operators, on values and references alike.
//!
//! Nothing in this crate is constant-time: comparisons, bit length
//! computations and the final conditional subtraction of Montgomery
//! reduction all branch on the operand values. The crate is `no_std` and
//! never allocates.
//!
//! On x86-64 architectures, the `_addcarry_u64()` and `_subborrow_u64()`
//! intrinsics are used (from `core::arch::x86_64`); enabling the
//! `portable` feature replaces them with plain 128-bit arithmetic (which
//! is also what all other architectures use).

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub use rand_core::{CryptoRng, RngCore, Error as RngError};

pub(crate) mod backend;
pub mod repr;
pub mod field;

pub use repr::{Repr, WideRepr, U256, U256MulResult};
pub use field::{FieldParams, FieldParams256, Fp, Fp256};

#[cfg(feature = "bn254")]
pub use field::{BN254_FQ, BN254_FR};
#[cfg(feature = "p256")]
pub use field::P256_FP;
#[cfg(feature = "secp256k1")]
pub use field::SECP256K1_FP;
