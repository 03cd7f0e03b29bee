//! Fixed-width unsigned integers.
//!
//! `Repr<W>` is an unsigned integer over exactly `W` limbs of 64 bits,
//! in little-endian order (limb 0 is the least significant). It has no
//! modulus of its own: values range over `0..2^(64*W)`, and the
//! operations which could overflow (`add_nocarry()`, `sub_noborrow()`,
//! `mul2()`, `shl()`) silently wrap modulo `2^(64*W)`. Callers use them
//! only where the mathematical result is known to fit.
//!
//! All arithmetic functions modify the value on which they are called,
//! and take the other operand (if any) by reference. The few functions
//! that return a value of the same type (e.g. `into_normal_repr()`) are
//! thin by-value wrappers around an in-place counterpart.
//!
//! Full products are returned as `WideRepr<W>` (2*`W` limbs); the only
//! consumer of such values is Montgomery reduction
//! (`WideRepr::mont_reduce()`).
//!
//! None of these functions are constant-time: comparisons, `num_bits()`
//! and the final conditional subtraction of Montgomery reduction all
//! branch on operand values.

use core::cmp::Ordering;
use core::fmt;

use rand_core::RngCore;

use super::backend::{addcarry_u64, subborrow_u64, mac_with_carry, adc};

/// An unsigned integer over `W` 64-bit limbs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Repr<const W: usize>(pub(crate) [u64; W]);

/// A double-width (2*`W` limbs) unsigned integer, as produced by full
/// multiplications.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WideRepr<const W: usize>([[u64; W]; 2]);

/// 256-bit integer.
pub type U256 = Repr<4>;

/// 512-bit product of two 256-bit integers.
pub type U256MulResult = WideRepr<4>;

impl<const W: usize> Repr<W> {

    /// Number of limbs.
    pub const LIMBS: usize = W;

    pub const ZERO: Self = Self([0u64; W]);
    pub const ONE: Self = Self::from_u64(1);
    pub const MAX: Self = Self([u64::MAX; W]);

    // Create a value from its limbs, in little-endian order (least
    // significant limb first).
    #[inline(always)]
    pub const fn w64le(x: [u64; W]) -> Self {
        Self(x)
    }

    // Create a value from its limbs, in big-endian order (most
    // significant limb first).
    pub const fn w64be(x: [u64; W]) -> Self {
        let mut d = [0u64; W];
        let mut i = 0;
        while i < W {
            d[i] = x[W - 1 - i];
            i += 1;
        }
        Self(d)
    }

    #[inline(always)]
    pub const fn from_u64(x: u64) -> Self {
        let mut d = [0u64; W];
        d[0] = x;
        Self(d)
    }

    /// Create a value from a 128-bit integer. With a single limb, the
    /// upper 64 bits are dropped.
    #[inline(always)]
    pub fn from_u128(x: u128) -> Self {
        let mut d = [0u64; W];
        d[0] = x as u64;
        if W > 1 {
            d[1] = (x >> 64) as u64;
        }
        Self(d)
    }

    #[inline(always)]
    pub const fn as_limbs(&self) -> &[u64; W] {
        &self.0
    }

    #[inline(always)]
    pub fn as_limbs_mut(&mut self) -> &mut [u64; W] {
        &mut self.0
    }

    #[inline(always)]
    pub const fn into_limbs(self) -> [u64; W] {
        self.0
    }

    /// Number of limbs (always `W`); for generic callers sizing
    /// auxiliary buffers.
    #[inline(always)]
    pub const fn num_limbs(&self) -> usize {
        W
    }

    /// Add `other` to this value. A carry out of the top limb is
    /// dropped (the result is taken modulo `2^(64*W)`).
    #[inline]
    pub fn add_nocarry(&mut self, other: &Self) {
        let mut cc = 0;
        for i in 0..W {
            (self.0[i], cc) = addcarry_u64(self.0[i], other.0[i], cc);
        }
    }

    /// Subtract `other` from this value. A borrow out of the top limb
    /// is dropped (the result is taken modulo `2^(64*W)`).
    #[inline]
    pub fn sub_noborrow(&mut self, other: &Self) {
        let mut cc = 0;
        for i in 0..W {
            (self.0[i], cc) = subborrow_u64(self.0[i], other.0[i], cc);
        }
    }

    /// Bit length of this value (0 for zero).
    pub fn num_bits(&self) -> u32 {
        let mut n = (W as u32) << 6;
        for i in (0..W).rev() {
            let lz = self.0[i].leading_zeros();
            n -= lz;
            if lz != 64 {
                return n;
            }
        }
        n
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().fold(0, |acc, &w| acc | w) == 0
    }

    #[inline(always)]
    pub fn is_odd(&self) -> bool {
        (self.0[0] & 1) != 0
    }

    #[inline(always)]
    pub fn is_even(&self) -> bool {
        (self.0[0] & 1) == 0
    }

    /// Halve this value (logical right shift by one bit).
    #[inline]
    pub fn div2(&mut self) {
        let mut t = 0;
        for i in (0..W).rev() {
            let t2 = self.0[i] << 63;
            self.0[i] = (self.0[i] >> 1) | t;
            t = t2;
        }
    }

    /// Double this value (left shift by one bit). The top bit is
    /// dropped.
    #[inline]
    pub fn mul2(&mut self) {
        let mut t = 0;
        for i in 0..W {
            let t2 = self.0[i] >> 63;
            self.0[i] = (self.0[i] << 1) | t;
            t = t2;
        }
    }

    /// Logical right shift by `n` bits. Shift counts of `64*W` or more
    /// yield zero.
    pub fn shr(&mut self, n: u32) {
        let n = n as usize;
        if n >= (W << 6) {
            *self = Self::ZERO;
            return;
        }
        let (q, r) = (n >> 6, (n & 63) as u32);
        for i in 0..W {
            let lo = if i + q < W { self.0[i + q] } else { 0 };
            if r == 0 {
                self.0[i] = lo;
            } else {
                let hi = if i + q + 1 < W { self.0[i + q + 1] } else { 0 };
                self.0[i] = (lo >> r) | (hi << (64 - r));
            }
        }
    }

    /// Left shift by `n` bits. Bits pushed out of the top limb are
    /// dropped; shift counts of `64*W` or more yield zero.
    pub fn shl(&mut self, n: u32) {
        let n = n as usize;
        if n >= (W << 6) {
            *self = Self::ZERO;
            return;
        }
        let (q, r) = (n >> 6, (n & 63) as u32);
        for i in (0..W).rev() {
            let hi = if i >= q { self.0[i - q] } else { 0 };
            if r == 0 {
                self.0[i] = hi;
            } else {
                let lo = if i > q { self.0[i - q - 1] } else { 0 };
                self.0[i] = (hi << r) | (lo >> (64 - r));
            }
        }
    }

    /// Three-way comparison, most significant limb first.
    pub fn compare(&self, other: &Self) -> Ordering {
        for i in (0..W).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Returns `true` if this value is in the `0..modulus` range.
    #[inline]
    pub fn is_valid(&self, modulus: &Self) -> bool {
        self.compare(modulus) == Ordering::Less
    }

    /// Subtract `modulus` once if this value is not lower than it. For
    /// an input lower than `2*modulus`, the output is fully reduced.
    #[inline]
    pub fn reduce(&mut self, modulus: &Self) {
        if !self.is_valid(modulus) {
            self.sub_noborrow(modulus);
        }
    }

    /// Schoolbook product of this value with `other`, over 2*`W` limbs.
    pub fn mul_wide(&self, other: &Self) -> WideRepr<W> {
        let mut r = WideRepr::<W>::ZERO;
        let t = r.as_limbs_mut();
        for k in 0..W {
            let f = self.0[k];
            let mut carry = 0;
            for i in 0..W {
                (t[k + i], carry) = mac_with_carry(
                    t[k + i], f, other.0[i], carry);
            }
            t[k + W] = carry;
        }
        r
    }

    /// Square of this value, over 2*`W` limbs. The result is the same as
    /// `self.mul_wide(self)`, but each cross product is computed only
    /// once.
    pub fn square_wide(&self) -> WideRepr<W> {
        let mut r = WideRepr::<W>::ZERO;
        let t = r.as_limbs_mut();

        // sum_{i<j} a_i*a_j*2^(64*(i+j)) < 2^(64*(2*W-1))
        // -> top limb remains at zero
        for k in 0..W {
            let f = self.0[k];
            let mut carry = 0;
            for i in (k + 1)..W {
                (t[k + i], carry) = mac_with_carry(
                    t[k + i], f, self.0[i], carry);
            }
            t[k + W] = carry;
        }

        // Double the partial sum.
        // -> t contains sum_{i!=j} a_i*a_j*2^(64*(i+j))
        let mut cc = 0;
        for w in t.iter_mut() {
            let ee = *w >> 63;
            *w = (*w << 1) | cc;
            cc = ee;
        }

        // Add the squares a_i*a_i*2^(64*2*i).
        let mut carry = 0;
        for k in 0..W {
            let f = self.0[k];
            let (lo, hi) = mac_with_carry(t[k << 1], f, f, carry);
            t[k << 1] = lo;
            (t[(k << 1) + 1], carry) = adc(t[(k << 1) + 1], hi, 0);
        }

        r
    }

    /// Montgomery multiplication:
    ///    self <- (self * other) / 2^(64*W) mod modulus
    /// `mont_inv` MUST be equal to `-1/modulus mod 2^64`. If one operand
    /// is lower than the modulus, then the output is fully reduced.
    #[inline]
    pub fn mont_mul_assign(&mut self, other: &Self, modulus: &Self,
        mont_inv: u64)
    {
        *self = self.mul_wide(other).mont_reduce(modulus, mont_inv);
    }

    /// Montgomery squaring:
    ///    self <- self^2 / 2^(64*W) mod modulus
    #[inline]
    pub fn mont_square(&mut self, modulus: &Self, mont_inv: u64) {
        *self = self.mul_wide(self).mont_reduce(modulus, mont_inv);
    }

    /// Convert this value out of Montgomery representation (in place):
    ///    self <- self / 2^(64*W) mod modulus
    #[inline]
    pub fn set_normal_repr(&mut self, modulus: &Self, mont_inv: u64) {
        *self = WideRepr::from(*self).mont_reduce(modulus, mont_inv);
    }

    /// Get the normal (non-Montgomery) value corresponding to this value
    /// in Montgomery representation.
    #[inline]
    pub fn into_normal_repr(self, modulus: &Self, mont_inv: u64) -> Self {
        let mut r = self;
        r.set_normal_repr(modulus, mont_inv);
        r
    }

    /// Draw a uniformly random value in `0..modulus` by rejection
    /// sampling (variable-time). A zero modulus yields zero.
    pub fn random_below<T: RngCore + ?Sized>(modulus: &Self, rng: &mut T)
        -> Self
    {
        let nb = modulus.num_bits() as usize;
        if nb == 0 {
            return Self::ZERO;
        }
        let top = (nb - 1) >> 6;
        let mask = u64::MAX >> ((64 - (nb & 63)) & 63);
        loop {
            let mut x = Self::ZERO;
            for i in 0..=top {
                x.0[i] = rng.next_u64();
            }
            x.0[top] &= mask;
            if x.is_valid(modulus) {
                return x;
            }
        }
    }
}

impl<const W: usize> WideRepr<W> {

    pub const ZERO: Self = Self([[0u64; W]; 2]);

    #[inline(always)]
    pub const fn from_halves(lo: Repr<W>, hi: Repr<W>) -> Self {
        Self([ lo.0, hi.0 ])
    }

    #[inline(always)]
    pub const fn low(&self) -> Repr<W> {
        Repr(self.0[0])
    }

    #[inline(always)]
    pub const fn high(&self) -> Repr<W> {
        Repr(self.0[1])
    }

    /// All 2*`W` limbs, least significant first.
    #[inline(always)]
    pub fn as_limbs(&self) -> &[u64] {
        self.0.as_flattened()
    }

    #[inline(always)]
    fn as_limbs_mut(&mut self) -> &mut [u64] {
        self.0.as_flattened_mut()
    }

    /// Montgomery reduction (CIOS): returns `self / 2^(64*W) mod modulus`.
    ///
    /// `mont_inv` MUST be equal to `-1/modulus mod 2^64`, and the
    /// modulus MUST be odd. The result is fully reduced provided that
    /// `self < 2^(64*W) * modulus` (e.g. the product of a value lower
    /// than the modulus with any `W`-limb value).
    pub fn mont_reduce(self, modulus: &Repr<W>, mont_inv: u64) -> Repr<W> {
        let mut t = self;
        let d = t.as_limbs_mut();

        // Each round adds k*m*2^(64*j), with k chosen so that limb j
        // becomes zero. carry2 is the extra bit above limb W+j.
        let mut carry2 = 0;
        for j in 0..W {
            let k = d[j].wrapping_mul(mont_inv);
            let mut carry = 0;
            for i in 0..W {
                (d[i + j], carry) = mac_with_carry(
                    d[i + j], k, modulus.0[i], carry);
            }
            (d[W + j], carry2) = adc(d[W + j], carry2, carry);
        }

        // The value is now lower than 2*m, but with m > 2^(64*W-1) it
        // may need an extra bit (carry2); in that case it is necessarily
        // greater than m, and the subtraction wraps to the right value.
        let mut r = t.high();
        if carry2 != 0 || !r.is_valid(modulus) {
            r.sub_noborrow(modulus);
        }
        r
    }
}

impl<const W: usize> From<Repr<W>> for WideRepr<W> {
    #[inline(always)]
    fn from(x: Repr<W>) -> Self {
        Self([ x.0, [0u64; W] ])
    }
}

impl<const W: usize> From<[u64; W]> for Repr<W> {
    #[inline(always)]
    fn from(x: [u64; W]) -> Self {
        Self(x)
    }
}

impl<const W: usize> Ord for Repr<W> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl<const W: usize> PartialOrd for Repr<W> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

// Hexadecimal rendering: "0x" then all limbs, most significant first,
// 16 lowercase digits each.
fn write_limbs(f: &mut fmt::Formatter<'_>, limbs: &[u64]) -> fmt::Result {
    f.write_str("0x")?;
    for w in limbs.iter().rev() {
        write!(f, "{:016x}", w)?;
    }
    Ok(())
}

impl<const W: usize> fmt::Display for Repr<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_limbs(f, &self.0)
    }
}

impl<const W: usize> fmt::Debug for Repr<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_limbs(f, &self.0)
    }
}

impl<const W: usize> fmt::Display for WideRepr<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_limbs(f, self.as_limbs())
    }
}

impl<const W: usize> fmt::Debug for WideRepr<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_limbs(f, self.as_limbs())
    }
}

// ========================================================================
