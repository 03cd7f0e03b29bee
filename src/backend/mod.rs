//! Word-level carry primitives.
//!
//! Everything above this module is written in terms of four operations
//! on 64-bit words:
//!
//!  - `addcarry_u64(x, y, c)`: returns `x + y + c mod 2^64` and the
//!    outgoing carry (0 or 1). The incoming carry `c` MUST be 0 or 1.
//!
//!  - `subborrow_u64(x, y, c)`: returns `x - y - c mod 2^64` and the
//!    outgoing borrow (0 or 1). The incoming borrow `c` MUST be 0 or 1.
//!
//!  - `mac_with_carry(a, b, c, carry)`: returns `(lo, hi)` such that
//!    `lo + hi*2^64 = a + b*c + carry`. All four inputs may range over
//!    the full 64-bit range; the maximum result is exactly `2^128 - 1`,
//!    so no bit is ever lost.
//!
//!  - `adc(a, b, carry)`: returns `(lo, hi)` such that
//!    `lo + hi*2^64 = a + b + carry`, with all three inputs being full
//!    64-bit words (`hi` is then at most 2).
//!
//! On x86_64, `addcarry_u64()` and `subborrow_u64()` map to the
//! `_addcarry_u64()` and `_subborrow_u64()` intrinsics, unless the
//! `portable` feature is set. All other targets use plain 128-bit
//! arithmetic, which compilers turn into the native multiply-high and
//! add-with-carry opcodes.

// Carrying addition and subtraction should use u64::carrying_add()
// and u64::borrowing_sub(), but these functions are currently only
// experimental.

#[cfg(all(target_arch = "x86_64", not(feature = "portable")))]
#[inline(always)]
pub(crate) fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_addcarry_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _addcarry_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(all(target_arch = "x86_64", not(feature = "portable"))))]
#[inline(always)]
pub(crate) const fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_add(y as u128).wrapping_add(c as u128);
    (z as u64, (z >> 64) as u8)
}

#[cfg(all(target_arch = "x86_64", not(feature = "portable")))]
#[inline(always)]
pub(crate) fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_subborrow_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _subborrow_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(all(target_arch = "x86_64", not(feature = "portable"))))]
#[inline(always)]
pub(crate) const fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(c as u128);
    (z as u64, (z >> 127) as u8)
}

// (2^64 - 1) + (2^64 - 1)^2 + (2^64 - 1) = 2^128 - 1: never overflows.
#[inline(always)]
pub(crate) const fn mac_with_carry(a: u64, b: u64, c: u64, carry: u64)
    -> (u64, u64)
{
    let z = (b as u128) * (c as u128) + (a as u128) + (carry as u128);
    (z as u64, (z >> 64) as u64)
}

#[inline(always)]
pub(crate) const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let z = (a as u128) + (b as u128) + (carry as u128);
    (z as u64, (z >> 64) as u64)
}

// Return -1/x mod 2^64. It is assumed that x is odd. Each step doubles
// the number of correct low bits; 2 - x is already correct on 2 bits,
// hence five steps reach 64 bits.
pub(crate) const fn ninv64(x: u64) -> u64 {
    let y = 2u64.wrapping_sub(x);
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    y.wrapping_neg()
}

// ========================================================================
