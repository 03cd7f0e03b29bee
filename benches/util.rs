// Cycle counter, with a nanosecond-clock fallback on architectures that
// do not expose one to user code.

#[cfg(target_arch = "x86_64")]
pub fn core_cycles() -> u64 {
    use core::arch::x86_64::{_mm_lfence, _rdtsc};
    unsafe {
        _mm_lfence();
        _rdtsc()
    }
}

#[cfg(target_arch = "aarch64")]
pub fn core_cycles() -> u64 {
    use core::arch::asm;
    let mut x: u64;
    unsafe {
        asm!("dsb sy", "mrs {}, pmccntr_el0", out(reg) x);
    }
    x
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub fn core_cycles() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_nanos() as u64,
        Err(_) => 0,
    }
}

// Run 10 batches of `f` and return the median batch time divided by the
// number of operations per batch.
pub fn median_of_10<F: FnMut()>(mut f: F, ops: f64) -> f64 {
    let mut tt = [0; 10];
    for i in 0..10 {
        let begin = core_cycles();
        f();
        let end = core_cycles();
        tt[i] = end.wrapping_sub(begin);
    }
    tt.sort();
    (tt[4] as f64) / ops
}
