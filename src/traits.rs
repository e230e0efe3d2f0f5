//! This module defines shared traits used across different kernels.

/// A trait that maps a signed integer type to its unsigned counterpart.
pub trait HasUnsigned {
    type Unsigned;

    /// Reinterprets the two's-complement bits as the unsigned type.
    fn to_unsigned_bits(self) -> Self::Unsigned;
}

/// A trait that maps an unsigned integer type to its signed counterpart.
pub trait HasSigned {
    type Signed;

    /// Reinterprets the bits as the two's-complement signed type.
    fn to_signed_bits(self) -> Self::Signed;
}

// Implement the traits for all primitive integer types.
macro_rules! impl_signed_unsigned_pair {
    ($S:ty, $U:ty) => {
        impl HasUnsigned for $S {
            type Unsigned = $U;

            #[inline]
            fn to_unsigned_bits(self) -> $U {
                self as $U
            }
        }
        impl HasSigned for $U {
            type Signed = $S;

            #[inline]
            fn to_signed_bits(self) -> $S {
                self as $S
            }
        }
    };
}

impl_signed_unsigned_pair!(i8, u8);
impl_signed_unsigned_pair!(i16, u16);
impl_signed_unsigned_pair!(i32, u32);
impl_signed_unsigned_pair!(i64, u64);
impl_signed_unsigned_pair!(i128, u128);
