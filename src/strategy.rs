use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

/// Hashing and equality for the keys of a hashed container.
///
/// Every `FixedMap` and `FixedSet` owns one strategy, injected at
/// construction. The strategy must be consistent: keys that compare equal
/// must hash to the same value, and the hash of a key must not change while
/// the key is stored.
pub trait KeyStrategy<K: ?Sized> {
    /// Computes the hash code of `key`.
    fn hash(&self, key: &K) -> u64;

    /// Returns `true` if `a` and `b` denote the same key.
    fn eq(&self, a: &K, b: &K) -> bool;
}

/// Scalar types that can be hashed by their bit pattern.
///
/// This is the key bound for the [`Identity`] strategy.
pub trait IdentityKey {
    /// The value's bit pattern, widened to 64 bits.
    fn identity_hash(&self) -> u64;

    /// Bitwise equality.
    fn identity_eq(&self, other: &Self) -> bool;
}

macro_rules! identity_key_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IdentityKey for $ty {
                #[inline(always)]
                fn identity_hash(&self) -> u64 {
                    *self as u64
                }

                #[inline(always)]
                fn identity_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_key_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

macro_rules! identity_key_wide {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IdentityKey for $ty {
                #[inline(always)]
                fn identity_hash(&self) -> u64 {
                    let bits = *self as u128;
                    (bits as u64) ^ ((bits >> 64) as u64)
                }

                #[inline(always)]
                fn identity_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_key_wide!(u128, i128);

impl IdentityKey for bool {
    #[inline(always)]
    fn identity_hash(&self) -> u64 {
        *self as u64
    }

    #[inline(always)]
    fn identity_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl IdentityKey for char {
    #[inline(always)]
    fn identity_hash(&self) -> u64 {
        *self as u64
    }

    #[inline(always)]
    fn identity_eq(&self, other: &Self) -> bool {
        self == other
    }
}

// Floats compare by bits, so `NaN` keys are findable and `0.0 != -0.0`.
impl IdentityKey for f32 {
    #[inline(always)]
    fn identity_hash(&self) -> u64 {
        self.to_bits() as u64
    }

    #[inline(always)]
    fn identity_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl IdentityKey for f64 {
    #[inline(always)]
    fn identity_hash(&self) -> u64 {
        self.to_bits()
    }

    #[inline(always)]
    fn identity_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

/// The default strategy for scalar keys: the hash is the key's bit pattern
/// and equality is bitwise.
///
/// # Examples
///
/// ```rust
/// use buffer_collections::FixedMap;
///
/// let mut map: FixedMap<i32, char> = FixedMap::with_capacity(4);
/// map.insert(7, 'x').unwrap();
/// assert_eq!(map.get(&7), Some(&'x'));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Identity;

impl<K> KeyStrategy<K> for Identity
where
    K: IdentityKey,
{
    #[inline(always)]
    fn hash(&self, key: &K) -> u64 {
        key.identity_hash()
    }

    #[inline(always)]
    fn eq(&self, a: &K, b: &K) -> bool {
        a.identity_eq(b)
    }
}

/// Content-based hashing through [`core::hash::Hash`] and equality through
/// [`Eq`].
///
/// Use this for string-like keys, where the identity of the pointer must not
/// matter.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "foldhash")]
/// # {
/// use buffer_collections::FixedSet;
/// use buffer_collections::strategy::DefaultHashed;
///
/// let mut set: FixedSet<&str, DefaultHashed> = FixedSet::with_capacity(4);
/// assert_eq!(set.insert("v1"), Ok(true));
/// assert!(set.contains(&"v1"));
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Hashed<B> {
    build_hasher: B,
}

impl<B> Hashed<B> {
    /// Wraps a hasher builder.
    pub fn new(build_hasher: B) -> Self {
        Self { build_hasher }
    }

    /// The wrapped hasher builder.
    pub fn build_hasher(&self) -> &B {
        &self.build_hasher
    }
}

impl<K, B> KeyStrategy<K> for Hashed<B>
where
    K: Hash + Eq + ?Sized,
    B: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.build_hasher.hash_one(key)
    }

    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`DefaultHashed`].
        pub type DefaultBuildHasher = foldhash::fast::FixedState;
        /// [`Hashed`] with the crate's default hasher builder.
        pub type DefaultHashed = Hashed<DefaultBuildHasher>;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`DefaultHashed`].
        pub type DefaultBuildHasher = std::hash::RandomState;
        /// [`Hashed`] with the crate's default hasher builder.
        pub type DefaultHashed = Hashed<DefaultBuildHasher>;
    }
}

/// A strategy assembled from a hash function and an equality function.
///
/// # Examples
///
/// ```rust
/// use buffer_collections::FixedMap;
/// use buffer_collections::strategy::FnStrategy;
///
/// #[derive(Clone)]
/// struct User {
///     name: &'static str,
///     age: u32,
/// }
///
/// fn name_hash(user: &User) -> u64 {
///     user.name.bytes().fold(5381u64, |h, b| h.wrapping_mul(33) ^ b as u64)
/// }
///
/// let strategy = FnStrategy::new(name_hash, |a: &User, b: &User| a.name == b.name);
/// let mut map = FixedMap::with_capacity_and_strategy(4, strategy);
/// map.insert(User { name: "first", age: 23 }, 123).unwrap();
/// assert_eq!(map.get(&User { name: "first", age: 99 }), Some(&123));
/// ```
#[derive(Clone, Copy)]
pub struct FnStrategy<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> FnStrategy<H, E> {
    /// Builds a strategy from the two functions.
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<H, E> Debug for FnStrategy<H, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnStrategy").finish_non_exhaustive()
    }
}

impl<K, H, E> KeyStrategy<K> for FnStrategy<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use core::hash::Hasher;

    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone, Default)]
    struct SipHashBuilder;

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(1, 2)
        }
    }

    #[test]
    fn identity_uses_bit_pattern() {
        assert_eq!(KeyStrategy::<i32>::hash(&Identity, &42), 42);
        assert_eq!(KeyStrategy::<u8>::hash(&Identity, &7), 7);
        assert_eq!(KeyStrategy::<char>::hash(&Identity, &'a'), 97);
        assert_eq!(KeyStrategy::<bool>::hash(&Identity, &true), 1);
        assert_eq!(
            KeyStrategy::<f64>::hash(&Identity, &1.5),
            1.5f64.to_bits()
        );
        assert!(KeyStrategy::<i64>::eq(&Identity, &-3, &-3));
        assert!(!KeyStrategy::<i64>::eq(&Identity, &-3, &3));
    }

    #[test]
    fn identity_floats_compare_bitwise() {
        assert!(KeyStrategy::<f32>::eq(&Identity, &f32::NAN, &f32::NAN));
        assert!(!KeyStrategy::<f32>::eq(&Identity, &0.0, &-0.0));
        assert!(KeyStrategy::<f32>::eq(&Identity, &1.1, &1.1));
    }

    #[test]
    fn identity_folds_wide_integers() {
        let wide: u128 = (1u128 << 64) | 5;
        assert_eq!(KeyStrategy::<u128>::hash(&Identity, &wide), 4);
    }

    #[test]
    fn hashed_is_content_based() {
        let strategy = Hashed::new(SipHashBuilder);
        let owned = alloc::string::String::from("key_1");
        let borrowed: &str = "key_1";

        let mut hasher = SipHasher::new_with_keys(1, 2);
        borrowed.hash(&mut hasher);
        assert_eq!(KeyStrategy::<str>::hash(&strategy, borrowed), hasher.finish());

        assert_eq!(
            KeyStrategy::<str>::hash(&strategy, owned.as_str()),
            KeyStrategy::<str>::hash(&strategy, borrowed)
        );
        assert!(KeyStrategy::<str>::eq(&strategy, owned.as_str(), borrowed));
        assert!(!KeyStrategy::<str>::eq(&strategy, "key_1", "key_2"));
    }

    #[test]
    fn fn_strategy_delegates() {
        let strategy = FnStrategy::new(
            |k: &u32| (*k as u64) % 3,
            |a: &u32, b: &u32| a % 10 == b % 10,
        );
        assert_eq!(strategy.hash(&7u32), 1);
        assert!(strategy.eq(&3u32, &13u32));
        assert!(!strategy.eq(&3u32, &4u32));
    }
}
