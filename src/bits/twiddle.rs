//! Narrowing and sign extension through mask tables.
//!
//! `shrink(v, n)` keeps the low `n` bits of `v`. `extend(v, n)` treats the low
//! `n` bits as a two's-complement number and widens it with `(v ^ m) - m`
//! where `m = 1 << (n - 1)`. The input to `extend` must already be shrunk.

const fn shrink32_table() -> [u32; 33] {
    let mut table = [0u32; 33];
    let mut i = 1;
    while i <= 32 {
        table[i] = if i == 32 { u32::MAX } else { (1u32 << i) - 1 };
        i += 1;
    }
    table
}

const fn extend32_table() -> [u32; 33] {
    let mut table = [0u32; 33];
    let mut i = 1;
    while i <= 32 {
        table[i] = 1u32 << (i - 1);
        i += 1;
    }
    table
}

const fn shrink64_table() -> [u64; 65] {
    let mut table = [0u64; 65];
    let mut i = 1;
    while i <= 64 {
        table[i] = if i == 64 { u64::MAX } else { (1u64 << i) - 1 };
        i += 1;
    }
    table
}

const fn extend64_table() -> [u64; 65] {
    let mut table = [0u64; 65];
    let mut i = 1;
    while i <= 64 {
        table[i] = 1u64 << (i - 1);
        i += 1;
    }
    table
}

/// `SHRINK32[n]` has the low `n` bits set.
pub const SHRINK32: [u32; 33] = shrink32_table();
/// `EXTEND32[n]` is the sign bit of an `n`-bit value.
pub const EXTEND32: [u32; 33] = extend32_table();
pub const SHRINK64: [u64; 65] = shrink64_table();
pub const EXTEND64: [u64; 65] = extend64_table();

/// Width-changing operations on the signed integer wire types.
///
/// `bits` must be within `0..=` the type's width; wider requests are clamped.
pub trait BitWidth: Copy {
    fn shrink(self, bits: usize) -> Self;
    fn extend(self, bits: usize) -> Self;
}

macro_rules! impl_bit_width_32 {
    ($($ty:ty => $max:expr),* $(,)?) => {
        $(
            impl BitWidth for $ty {
                #[inline]
                fn shrink(self, bits: usize) -> Self {
                    ((self as i32) & SHRINK32[bits.min($max)] as i32) as $ty
                }

                #[inline]
                fn extend(self, bits: usize) -> Self {
                    let m = EXTEND32[bits.min($max)] as i32;
                    ((self as i32 ^ m).wrapping_sub(m)) as $ty
                }
            }
        )*
    };
}

impl_bit_width_32!(i8 => 8, i16 => 16, i32 => 32);

impl BitWidth for i64 {
    #[inline]
    fn shrink(self, bits: usize) -> Self {
        self & SHRINK64[bits.min(64)] as i64
    }

    #[inline]
    fn extend(self, bits: usize) -> Self {
        let m = EXTEND64[bits.min(64)] as i64;
        (self ^ m).wrapping_sub(m)
    }
}
