//! Integer keys and their home-bucket reduction.

/// A fixed-width integer usable as a table key.
///
/// Keys are compared by equality only. The home bucket of a key is
/// `key mod buckets`; signed keys use the Euclidean remainder so negative keys
/// still land inside the bucket array.
///
/// For power-of-two bucket counts [`Key::masked_bucket`] with
/// `mask = buckets - 1` yields exactly the same bucket as [`Key::bucket`],
/// which is what lets the open-addressing table reduce with a single `&`.
pub trait Key: Copy + Eq {
    /// Returns `self mod buckets`.
    ///
    /// `buckets` must be non-zero.
    fn bucket(self, buckets: usize) -> usize;

    /// Returns the low bits of `self` selected by `mask`.
    fn masked_bucket(self, mask: usize) -> usize;
}

macro_rules! impl_key_unsigned {
    ($($t:ty),* $(,)?) => {
        $(
            impl Key for $t {
                #[inline(always)]
                fn bucket(self, buckets: usize) -> usize {
                    (self as u128 % buckets as u128) as usize
                }

                #[inline(always)]
                fn masked_bucket(self, mask: usize) -> usize {
                    (self as usize) & mask
                }
            }
        )*
    };
}

macro_rules! impl_key_signed {
    ($($t:ty),* $(,)?) => {
        $(
            impl Key for $t {
                #[inline(always)]
                fn bucket(self, buckets: usize) -> usize {
                    (self as i128).rem_euclid(buckets as i128) as usize
                }

                #[inline(always)]
                fn masked_bucket(self, mask: usize) -> usize {
                    // Sign extension keeps the two's-complement low bits, which
                    // are the Euclidean remainder for a power-of-two modulus.
                    (self as usize) & mask
                }
            }
        )*
    };
}

impl_key_unsigned!(u8, u16, u32, u64, u128, usize);
impl_key_signed!(i8, i16, i32, i64, i128, isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_bucket_is_modulo() {
        assert_eq!(17u64.bucket(4), 1);
        assert_eq!(16u32.bucket(16), 0);
        assert_eq!(250u8.bucket(7), 250 % 7);
        assert_eq!(u128::MAX.bucket(10), (u128::MAX % 10) as usize);
    }

    #[test]
    fn signed_bucket_is_euclidean() {
        assert_eq!((-1i64).bucket(8), 7);
        assert_eq!((-9i32).bucket(4), 3);
        assert_eq!((-6i16).bucket(3), 0);
        assert_eq!(i64::MIN.bucket(3), i64::MIN.rem_euclid(3) as usize);
    }

    #[test]
    fn mask_agrees_with_modulo_for_powers_of_two() {
        for buckets in [1usize, 2, 8, 64, 1024] {
            let mask = buckets - 1;
            for key in -300i64..300 {
                assert_eq!(key.masked_bucket(mask), key.bucket(buckets), "key {key}");
                assert_eq!((key as i8).masked_bucket(mask), (key as i8).bucket(buckets));
            }
            for key in 0u64..600 {
                assert_eq!(key.masked_bucket(mask), key.bucket(buckets));
            }
        }
    }
}
