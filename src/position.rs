//! Integer widths accepted by [`HashIndex`](crate::HashIndex).
//!
//! The index is generic over three integer types:
//!
//! - a [`Position`] type, used to store offsets into the caller's array. Its
//!   all-bits-one pattern is reserved as [`Position::NULL`].
//! - a [`HashCode`] type, the hash value callers pass in. Only its low bits
//!   are used to pick a bucket.
//! - a [`SizeType`] type, used for the sizes reported through the public API.
//!
//! All three traits are sealed and implemented for the primitive integers.

use core::fmt::Debug;
use core::hash::Hash;

mod sealed {
    pub trait Sealed {}
}

/// An integer type usable as a position in the external array.
///
/// The bit pattern with every bit set (`MAX` for unsigned types, `-1` for
/// signed types) is reserved as [`NULL`](Position::NULL) and can never be
/// stored as a real position.
pub trait Position: Copy + Eq + Ord + Debug + Hash + sealed::Sealed + 'static {
    /// Marks an empty bucket or the end of a chain.
    const NULL: Self;

    /// Widens the position to a `usize` array offset.
    ///
    /// Must not be called on [`NULL`](Position::NULL).
    fn to_usize(self) -> usize;

    /// Narrows an array offset to a position.
    ///
    /// In debug builds, panics if `value` does not fit or collides with
    /// [`NULL`](Position::NULL).
    fn from_usize(value: usize) -> Self;

    /// A one-slot table holding only [`NULL`](Position::NULL).
    ///
    /// Unallocated indexes read through this table so lookups never need to
    /// branch on the empty case.
    #[doc(hidden)]
    fn null_slot() -> &'static [Self; 1];
}

/// An integer type usable as a hash code.
pub trait HashCode: Copy + Debug + sealed::Sealed {
    /// Reinterprets the hash as a `usize`, keeping the low bits.
    fn bucket_bits(self) -> usize;
}

/// An integer type used for the sizes exposed by the public API.
pub trait SizeType: Copy + Eq + Ord + Debug + sealed::Sealed {
    /// Widens the size to a `usize`.
    fn to_usize(self) -> usize;

    /// Narrows a `usize` to this size type.
    ///
    /// In debug builds, panics if `value` does not fit.
    fn from_usize(value: usize) -> Self;
}

macro_rules! impl_sealed {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}

        impl HashCode for $t {
            #[inline(always)]
            fn bucket_bits(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_sealed!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl Position for $t {
            const NULL: Self = <$t>::MAX;

            #[inline(always)]
            fn to_usize(self) -> usize {
                debug_assert!(self != Self::NULL);
                self as usize
            }

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                debug_assert!(
                    (value as u128) < <$t>::MAX as u128,
                    "position {value} does not fit in {}",
                    stringify!($t)
                );
                value as $t
            }

            fn null_slot() -> &'static [Self; 1] {
                static SLOT: [$t; 1] = [<$t>::MAX];
                &SLOT
            }
        }

        impl SizeType for $t {
            #[inline(always)]
            fn to_usize(self) -> usize {
                self as usize
            }

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                debug_assert!(
                    (value as u128) <= <$t>::MAX as u128,
                    "size {value} does not fit in {}",
                    stringify!($t)
                );
                value as $t
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl Position for $t {
            const NULL: Self = -1;

            #[inline(always)]
            fn to_usize(self) -> usize {
                debug_assert!(self >= 0, "negative position {self}");
                self as usize
            }

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                debug_assert!(
                    (value as u128) <= <$t>::MAX as u128,
                    "position {value} does not fit in {}",
                    stringify!($t)
                );
                value as $t
            }

            fn null_slot() -> &'static [Self; 1] {
                static SLOT: [$t; 1] = [-1];
                &SLOT
            }
        }

        impl SizeType for $t {
            #[inline(always)]
            fn to_usize(self) -> usize {
                debug_assert!(self >= 0, "negative size {self}");
                self as usize
            }

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                debug_assert!(
                    (value as u128) <= <$t>::MAX as u128,
                    "size {value} does not fit in {}",
                    stringify!($t)
                );
                value as $t
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64, usize);
impl_signed!(i8, i16, i32, i64, isize);
