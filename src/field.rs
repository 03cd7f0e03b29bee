//! Prime-field elements in Montgomery representation.
//!
//! A `FieldParams<W>` holds everything needed to compute modulo an odd
//! integer N over `W` limbs: N itself, R = 2^(64*W) mod N, R^2 mod N,
//! and `mont_inv` = -1/N mod 2^64. Parameters are derived once, with a
//! `const fn`, so that well-known moduli can be stored in `static`
//! items; a few such items are provided (`BN254_FQ`, `BN254_FR`,
//! `P256_FP`, `SECP256K1_FP`), each behind a crate feature of the same
//! (lowercase) curve name.
//!
//! An `Fp<'a, W>` is a value x in `0..N`, kept internally as x*R mod N,
//! along with a reference to its parameters. All elements that are
//! combined together must use the same parameters; this is checked only
//! in debug builds.
//!
//! ```
//! use montrepr::{U256, BN254_FQ};
//!
//! let a = BN254_FQ.element(U256::from_u64(2));
//! let b = BN254_FQ.element(U256::from_u64(3));
//! assert!((a * b).into_repr() == U256::from_u64(6));
//! ```

use core::fmt;
use core::ops::{Mul, MulAssign};

use rand_core::RngCore;

use super::backend::ninv64;
use super::repr::Repr;

/// Parameters for computations modulo an odd integer N > 1 over `W`
/// limbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldParams<const W: usize> {
    modulus: Repr<W>,
    r: Repr<W>,
    r2: Repr<W>,
    mont_inv: u64,
}

pub type FieldParams256 = FieldParams<4>;

// Given a < m, return 2*a mod m.
const fn dbl_mod<const W: usize>(a: &Repr<W>, m: &Repr<W>) -> Repr<W> {
    let mut d = [0u64; W];
    let mut hi = 0;
    let mut i = 0;
    while i < W {
        d[i] = (a.0[i] << 1) | hi;
        hi = a.0[i] >> 63;
        i += 1;
    }

    // 2*a < 2*m, hence a single subtraction suffices.
    let mut ge = hi != 0;
    if !ge {
        ge = true;
        let mut i = W;
        while i > 0 {
            i -= 1;
            if d[i] != m.0[i] {
                ge = d[i] > m.0[i];
                break;
            }
        }
    }
    if ge {
        let mut cc = 0u64;
        let mut i = 0;
        while i < W {
            let z = (d[i] as u128).wrapping_sub(m.0[i] as u128)
                .wrapping_sub(cc as u128);
            d[i] = z as u64;
            cc = (z >> 127) as u64;
            i += 1;
        }
    }
    Repr(d)
}

impl<const W: usize> FieldParams<W> {

    /// Derive the parameters for the provided modulus. The modulus must
    /// be odd and greater than 1; otherwise, `None` is returned.
    pub const fn new(modulus: Repr<W>) -> Option<Self> {
        if W == 0 || (modulus.0[0] & 1) == 0 {
            return None;
        }
        let mut i = 1;
        let mut hz = 0;
        while i < W {
            hz |= modulus.0[i];
            i += 1;
        }
        if hz == 0 && modulus.0[0] == 1 {
            return None;
        }

        // R = 2^(64*W) mod N, by doubling 1 (which is lower than N).
        let mut r = Repr::<W>::from_u64(1);
        let mut i = 0;
        while i < (W << 6) {
            r = dbl_mod(&r, &modulus);
            i += 1;
        }

        // R^2 = R*2^(64*W) mod N.
        let mut r2 = r;
        let mut i = 0;
        while i < (W << 6) {
            r2 = dbl_mod(&r2, &modulus);
            i += 1;
        }

        Some(Self {
            modulus,
            r,
            r2,
            mont_inv: ninv64(modulus.0[0]),
        })
    }

    /// Same as `new()`, but panics on an invalid modulus. In a `const`
    /// or `static` initializer, this turns an invalid modulus into a
    /// compilation error.
    pub const fn from_modulus(modulus: Repr<W>) -> Self {
        match Self::new(modulus) {
            Some(p) => p,
            None => panic!("modulus must be odd and greater than 1"),
        }
    }

    #[inline(always)]
    pub const fn modulus(&self) -> &Repr<W> {
        &self.modulus
    }

    /// 2^(64*W) mod N (also the Montgomery representation of 1).
    #[inline(always)]
    pub const fn mont_r(&self) -> &Repr<W> {
        &self.r
    }

    /// 2^(128*W) mod N.
    #[inline(always)]
    pub const fn mont_r2(&self) -> &Repr<W> {
        &self.r2
    }

    /// -1/N mod 2^64.
    #[inline(always)]
    pub const fn mont_inv(&self) -> u64 {
        self.mont_inv
    }

    /// Get the field element of value `x` (which should be lower than the
    /// modulus).
    #[inline(always)]
    pub fn element(&self, x: Repr<W>) -> Fp<'_, W> {
        Fp::new(x, self)
    }

    #[inline(always)]
    pub fn zero(&self) -> Fp<'_, W> {
        Fp { repr: Repr::ZERO, params: self }
    }

    #[inline(always)]
    pub fn one(&self) -> Fp<'_, W> {
        Fp { repr: self.r, params: self }
    }

    #[inline(always)]
    pub fn from_u64(&self, x: u64) -> Fp<'_, W> {
        Fp::from_u64(x, self)
    }
}

/// An element of the integers modulo N, in Montgomery representation.
#[derive(Clone, Copy)]
pub struct Fp<'a, const W: usize> {
    repr: Repr<W>,
    params: &'a FieldParams<W>,
}

pub type Fp256<'a> = Fp<'a, 4>;

impl<'a, const W: usize> Fp<'a, W> {

    /// Lift `x` into the field (conversion to Montgomery representation).
    /// If `x` is not lower than the modulus, then the result is the
    /// element `x mod N`.
    pub fn new(x: Repr<W>, params: &'a FieldParams<W>) -> Self {
        let mut repr = x;
        repr.mont_mul_assign(&params.r2, &params.modulus, params.mont_inv);
        Self { repr, params }
    }

    #[inline(always)]
    pub fn from_u64(x: u64, params: &'a FieldParams<W>) -> Self {
        Self::new(Repr::from_u64(x), params)
    }

    /// Get a uniformly random element (variable-time).
    pub fn random<T: RngCore + ?Sized>(params: &'a FieldParams<W>,
        rng: &mut T) -> Self
    {
        // Montgomery representation is a bijection over 0..N.
        Self { repr: Repr::random_below(&params.modulus, rng), params }
    }

    #[inline(always)]
    pub fn params(&self) -> &'a FieldParams<W> {
        self.params
    }

    /// Internal representation (x*R mod N).
    #[inline(always)]
    pub fn as_mont_repr(&self) -> &Repr<W> {
        &self.repr
    }

    #[inline]
    fn set_mul(&mut self, rhs: &Self) {
        debug_assert!(self.params.modulus == rhs.params.modulus);
        let p = self.params;
        self.repr.mont_mul_assign(&rhs.repr, &p.modulus, p.mont_inv);
    }

    #[inline]
    pub fn set_square(&mut self) {
        let p = self.params;
        self.repr.mont_square(&p.modulus, p.mont_inv);
    }

    #[inline(always)]
    pub fn square(self) -> Self {
        let mut r = self;
        r.set_square();
        r
    }

    /// Get the plain value of this element, in `0..N`.
    #[inline]
    pub fn into_repr(self) -> Repr<W> {
        self.repr.into_normal_repr(&self.params.modulus, self.params.mont_inv)
    }

    #[inline(always)]
    pub fn is_zero(&self) -> bool {
        self.repr.is_zero()
    }

    /// Compare this element with another one (variable-time).
    #[inline]
    pub fn equals(&self, rhs: &Self) -> bool {
        debug_assert!(self.params.modulus == rhs.params.modulus);
        self.repr == rhs.repr
    }
}

impl<'a, const W: usize> PartialEq for Fp<'a, W> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<'a, const W: usize> Eq for Fp<'a, W> { }

impl<'a, const W: usize> fmt::Display for Fp<'a, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.into_repr(), f)
    }
}

impl<'a, const W: usize> fmt::Debug for Fp<'a, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fp")
            .field("value", &self.into_repr())
            .field("modulus", &self.params.modulus)
            .finish()
    }
}

impl<'a, const W: usize> Mul<Fp<'a, W>> for Fp<'a, W> {
    type Output = Fp<'a, W>;

    #[inline(always)]
    fn mul(self, other: Fp<'a, W>) -> Fp<'a, W> {
        let mut r = self;
        r.set_mul(&other);
        r
    }
}

impl<'a, const W: usize> Mul<&Fp<'a, W>> for Fp<'a, W> {
    type Output = Fp<'a, W>;

    #[inline(always)]
    fn mul(self, other: &Fp<'a, W>) -> Fp<'a, W> {
        let mut r = self;
        r.set_mul(other);
        r
    }
}

impl<'a, const W: usize> Mul<Fp<'a, W>> for &Fp<'a, W> {
    type Output = Fp<'a, W>;

    #[inline(always)]
    fn mul(self, other: Fp<'a, W>) -> Fp<'a, W> {
        let mut r = *self;
        r.set_mul(&other);
        r
    }
}

impl<'a, const W: usize> Mul<&Fp<'a, W>> for &Fp<'a, W> {
    type Output = Fp<'a, W>;

    #[inline(always)]
    fn mul(self, other: &Fp<'a, W>) -> Fp<'a, W> {
        let mut r = *self;
        r.set_mul(other);
        r
    }
}

impl<'a, const W: usize> MulAssign<Fp<'a, W>> for Fp<'a, W> {
    #[inline(always)]
    fn mul_assign(&mut self, other: Fp<'a, W>) {
        self.set_mul(&other);
    }
}

impl<'a, const W: usize> MulAssign<&Fp<'a, W>> for Fp<'a, W> {
    #[inline(always)]
    fn mul_assign(&mut self, other: &Fp<'a, W>) {
        self.set_mul(other);
    }
}

/// Base field of BN254 (alt_bn128):
/// q = 21888242871839275222246405745257275088696311157297823662689037894645226208583
#[cfg(feature = "bn254")]
pub static BN254_FQ: FieldParams256 = FieldParams::from_modulus(
    Repr::w64be([
        0x30644E72E131A029, 0xB85045B68181585D,
        0x97816A916871CA8D, 0x3C208C16D87CFD47 ]));

/// Scalar field of BN254 (group order):
/// r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
#[cfg(feature = "bn254")]
pub static BN254_FR: FieldParams256 = FieldParams::from_modulus(
    Repr::w64be([
        0x30644E72E131A029, 0xB85045B68181585D,
        0x2833E84879B97091, 0x43E1F593F0000001 ]));

/// Base field of NIST P-256: p = 2^256 - 2^224 + 2^192 + 2^96 - 1
#[cfg(feature = "p256")]
pub static P256_FP: FieldParams256 = FieldParams::from_modulus(
    Repr::w64be([
        0xFFFFFFFF00000001, 0x0000000000000000,
        0x00000000FFFFFFFF, 0xFFFFFFFFFFFFFFFF ]));

/// Base field of secp256k1: p = 2^256 - 2^32 - 977
#[cfg(feature = "secp256k1")]
pub static SECP256K1_FP: FieldParams256 = FieldParams::from_modulus(
    Repr::w64be([
        0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF, 0xFFFFFFFEFFFFFC2F ]));

// ========================================================================

#[cfg(test)]
mod tests {

    use super::{FieldParams, FieldParams256, Fp};
    use crate::repr::{Repr, U256};
    use crate::repr::tests::{DRNG, zz, mkrnd};
    use num_bigint::BigUint;

    #[cfg(feature = "bn254")]
    use super::{BN254_FQ, BN254_FR};
    #[cfg(feature = "p256")]
    use super::P256_FP;
    #[cfg(feature = "secp256k1")]
    use super::SECP256K1_FP;

    // 2^256 - 189 (largest 256-bit prime)
    static P_MAX: FieldParams256 = FieldParams::from_modulus(
        Repr::w64le([
            0xFFFFFFFFFFFFFF43, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF ]));

    // Goldilocks prime, over a single limb; built in a const context.
    const GOLDILOCKS: FieldParams<1> = FieldParams::from_modulus(
        Repr::w64le([ 0xFFFFFFFF00000001 ]));

    fn check_params<const W: usize>(p: &FieldParams<W>) {
        let zm = zz(p.modulus().as_limbs());
        let zr = (BigUint::from(1u32) << (64 * W)) % &zm;
        assert!(zz(p.mont_r().as_limbs()) == zr);
        assert!(zz(p.mont_r2().as_limbs()) == (&zr * &zr) % &zm);
        assert_eq!(p.modulus().as_limbs()[0].wrapping_mul(p.mont_inv()),
            u64::MAX);
    }

    fn from_zz<const W: usize>(z: &BigUint) -> Repr<W> {
        let mut r = Repr::<W>::ZERO;
        for (i, w) in z.to_u64_digits().iter().enumerate() {
            r.as_limbs_mut()[i] = *w;
        }
        r
    }

    fn check_field<const W: usize>(p: &FieldParams<W>) {
        check_params(p);
        let zm = zz(p.modulus().as_limbs());
        for i in 0..100 {
            let za = zz(mkrnd::<W>(i).as_limbs()) % &zm;
            let zb = zz(mkrnd::<W>(i + 1000).as_limbs()) % &zm;
            let a = from_zz::<W>(&za);
            let b = from_zz::<W>(&zb);

            let x = p.element(a);
            let y = Fp::new(b, p);
            assert!(x.as_mont_repr().is_valid(p.modulus()));
            assert!(x.into_repr() == a);

            let z = x * y;
            assert!(zz(z.into_repr().as_limbs()) == (&za * &zb) % &zm);
            assert!(z == &x * &y);
            assert!(z == y * x);
            let mut t = x;
            t *= y;
            assert!(t == z);
            t = x;
            t *= &y;
            assert!(t == z);

            let s = x.square();
            assert!(s == x * x);
            assert!(zz(s.into_repr().as_limbs()) == (&za * &za) % &zm);

            assert!(x * p.one() == x);
            assert!((x * p.zero()).is_zero());
        }

        // Lifting a value not lower than the modulus reduces it.
        let x = p.element(Repr::MAX);
        let zx = zz(Repr::<W>::MAX.as_limbs());
        assert!(zz(x.into_repr().as_limbs()) == zx % &zm);
        assert!(p.element(*p.modulus()).is_zero());
    }

    #[cfg(feature = "bn254")]
    #[test]
    fn bn254() {
        let p = &BN254_FQ;
        let a = Fp::new(U256::from_u64(2), p);
        let b = Fp::new(U256::from_u64(3), p);
        let mut c = a;
        c *= b;
        assert!(c.into_repr() == U256::from_u64(6));
        assert_eq!(format!("{}", c),
            "0x0000000000000000000000000000000000000000000000000000000000000006");

        assert!(*p.mont_r() == U256::w64le([
            0xd35d438dc58f0d9d, 0x0a78eb28f5c70b3d,
            0x666ea36f7879462c, 0x0e0a77c19a07df2f ]));
        assert!(*p.mont_r2() == U256::w64le([
            0xf32cfc5b538afa89, 0xb5e71911d44501fb,
            0x47ab1eff0a417ff6, 0x06d89f71cab8351f ]));
        assert_eq!(p.mont_inv(), 0x87d20782e4866389);
        assert!(zz(p.modulus().as_limbs()) == BigUint::parse_bytes(
            b"21888242871839275222246405745257275088696311157297823662689037894645226208583", 10).unwrap());
        check_field(p);

        let p = &BN254_FR;
        assert!(*p.mont_r() == U256::w64le([
            0xac96341c4ffffffb, 0x36fc76959f60cd29,
            0x666ea36f7879462e, 0x0e0a77c19a07df2f ]));
        assert!(*p.mont_r2() == U256::w64le([
            0x1bb8e645ae216da7, 0x53fe3ab1e35c59e3,
            0x8c49833d53bb8085, 0x0216d0b17f4e44a5 ]));
        assert_eq!(p.mont_inv(), 0xc2e1f593efffffff);
        check_field(p);
    }

    #[cfg(feature = "p256")]
    #[test]
    fn p256() {
        let p = &P256_FP;
        assert!(*p.mont_r() == U256::w64le([
            0x0000000000000001, 0xFFFFFFFF00000000,
            0xFFFFFFFFFFFFFFFF, 0x00000000FFFFFFFE ]));
        assert!(*p.mont_r2() == U256::w64le([
            0x0000000000000003, 0xFFFFFFFBFFFFFFFF,
            0xFFFFFFFFFFFFFFFE, 0x00000004FFFFFFFD ]));
        assert_eq!(p.mont_inv(), 1);
        check_field(p);
    }

    #[cfg(feature = "secp256k1")]
    #[test]
    fn secp256k1() {
        let p = &SECP256K1_FP;
        assert!(*p.mont_r() == U256::from_u64(0x1000003D1));
        assert!(*p.mont_r2() == U256::w64le([ 0x000007A2000E90A1, 1, 0, 0 ]));
        assert_eq!(p.mont_inv(), 0xD838091DD2253531);
        check_field(p);
    }

    #[test]
    fn other_moduli() {
        check_field(&P_MAX);
        check_field(&GOLDILOCKS);
        let p = FieldParams::<2>::new(Repr::w64le([
            0xFFFFFFFFFFFFFFC5, 0xFFFFFFFFFFFFFFFF ])).unwrap();
        check_field(&p);
        let p = FieldParams::<3>::new(Repr::w64le([ 0x1D, 0, 0 ])).unwrap();
        check_field(&p);
        let p = FieldParams::<4>::new(U256::from_u64(3)).unwrap();
        check_field(&p);

        let gl = GOLDILOCKS;
        let x = gl.from_u64(0xFFFFFFFF00000000);
        assert!(x.square().into_repr() == Repr::<1>::ONE);
    }

    #[test]
    fn invalid_moduli() {
        assert!(FieldParams::<4>::new(U256::ZERO).is_none());
        assert!(FieldParams::<4>::new(U256::ONE).is_none());
        assert!(FieldParams::<4>::new(U256::from_u64(2)).is_none());
        assert!(FieldParams::<4>::new(U256::w64le([ 0, 0, 0, 1 ])).is_none());
        assert!(FieldParams::<0>::new(Repr::<0>::w64le([])).is_none());
        assert!(FieldParams::<4>::new(U256::w64le([ 1, 0, 0, 1 ])).is_some());
    }

    #[test]
    #[should_panic]
    fn invalid_modulus_panics() {
        let _ = FieldParams::<4>::from_modulus(U256::from_u64(1000));
    }

    #[test]
    fn one_zero() {
        let p = &P_MAX;
        assert!(p.one().into_repr() == U256::ONE);
        assert!(p.zero().into_repr() == U256::ZERO);
        assert!(p.zero().is_zero() && !p.one().is_zero());
        assert!(p.from_u64(1) == p.one());
        assert!(p.from_u64(0) == p.zero());
        assert!(*p.one().as_mont_repr() == *p.mont_r());
        assert!(core::ptr::eq(p.one().params(), p));
    }

    #[test]
    fn random() {
        let mut rng = DRNG::from_seed(b"field random");
        let p = &P_MAX;
        let mut prev = p.zero();
        for _ in 0..100 {
            let x = Fp::random(p, &mut rng);
            assert!(x.as_mont_repr().is_valid(p.modulus()));
            assert!(x.into_repr().is_valid(p.modulus()));
            assert!(x != prev);
            prev = x;
        }
    }

    #[test]
    fn rendering() {
        let p = &P_MAX;
        let x = p.from_u64(0xABCDEF);
        assert_eq!(format!("{}", x),
            "0x0000000000000000000000000000000000000000000000000000000000abcdef");
        let s = format!("{:?}", x);
        assert!(s.starts_with("Fp { value: 0x"));
        assert!(s.contains("modulus: 0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff43"));
    }

    #[test]
    fn shared_params() {
        let p = FieldParams256::new(U256::w64le([
            0xFFFFFFFFFFFFFF43, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF ])).unwrap();
        let results: std::vec::Vec<U256> = std::thread::scope(|s| {
            let hh: std::vec::Vec<_> = (0..4u64).map(|i| {
                let p = &p;
                s.spawn(move || {
                    let mut x = p.from_u64(i + 2);
                    for _ in 0..10 {
                        x.set_square();
                    }
                    x.into_repr()
                })
            }).collect();
            hh.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let zm = zz(p.modulus().as_limbs());
        for (i, r) in results.iter().enumerate() {
            let e = BigUint::from(1u32) << 10;
            let zx = BigUint::from(i as u64 + 2).modpow(&e, &zm);
            assert!(zz(r.as_limbs()) == zx);
        }
        assert!(p == P_MAX);
    }
}
