//! Key derivation from argument tuples.
//!
//! Every call through a [`crate::CachedFunc`] derives a string key from its
//! arguments. Key generation must be deterministic and pure: two calls with
//! equal arguments must produce identical keys, with no dependency on call
//! order or external state.

use std::fmt::{Display, Write};

/// Derives a cache key from a call's argument tuple.
///
/// Implementations must be deterministic and pure. Collisions between
/// distinguishable argument tuples are a correctness risk: two colliding
/// calls will share a cache slot.
pub trait KeyGenerator<A>: Send + Sync {
    fn key(&self, args: &A) -> String;
}

/// Writes each element of an argument tuple into a key buffer, in order.
///
/// Implemented for tuples of arity 0 through 8 whose elements are `Display`.
pub trait KeyParts {
    fn write_parts(&self, buf: &mut String, sep: &str);
}

impl KeyParts for () {
    fn write_parts(&self, _buf: &mut String, _sep: &str) {}
}

macro_rules! impl_key_parts {
    ($first_ty:ident: $first_idx:tt $(, $ty:ident: $idx:tt)*) => {
        impl<$first_ty: Display $(, $ty: Display)*> KeyParts
            for ($first_ty, $($ty,)*)
        {
            fn write_parts(&self, buf: &mut String, sep: &str) {
                let _ = sep;
                let _ = write!(buf, "{}", self.$first_idx);
                $(
                    buf.push_str(sep);
                    let _ = write!(buf, "{}", self.$idx);
                )*
            }
        }
    };
}

impl_key_parts!(A0: 0);
impl_key_parts!(A0: 0, A1: 1);
impl_key_parts!(A0: 0, A1: 1, A2: 2);
impl_key_parts!(A0: 0, A1: 1, A2: 2, A3: 3);
impl_key_parts!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4);
impl_key_parts!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5);
impl_key_parts!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6);
impl_key_parts!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6, A7: 7);

/// Default key generator: concatenates the `Display` rendering of each
/// argument in order, with no delimiter.
///
/// This matches the historical behavior, but it is collision-prone for
/// argument types whose renderings can run together: `(1, 23)` and `(12, 3)`
/// both produce `"123"`. Prefer [`DelimitedKeyGenerator`] when argument
/// renderings are ambiguous.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyGenerator;

impl DefaultKeyGenerator {
    pub fn new() -> Self {
        DefaultKeyGenerator
    }
}

impl<A> KeyGenerator<A> for DefaultKeyGenerator
where
    A: KeyParts + Send + Sync,
{
    fn key(&self, args: &A) -> String {
        let mut buf = String::new();
        args.write_parts(&mut buf, "");
        buf
    }
}

/// Delimiter-safe key generator: joins the `Display` rendering of each
/// argument with a separator.
///
/// The default separator is U+001F (unit separator), which does not occur in
/// typical argument renderings, so `(1, 23)` and `(12, 3)` derive distinct
/// keys. This is the recommended generator for new configurations.
#[derive(Debug, Clone)]
pub struct DelimitedKeyGenerator {
    separator: String,
}

impl DelimitedKeyGenerator {
    /// Create a generator with a custom separator.
    pub fn new(separator: impl Into<String>) -> Self {
        DelimitedKeyGenerator {
            separator: separator.into(),
        }
    }
}

impl Default for DelimitedKeyGenerator {
    fn default() -> Self {
        DelimitedKeyGenerator::new("\u{1f}")
    }
}

impl<A> KeyGenerator<A> for DelimitedKeyGenerator
where
    A: KeyParts + Send + Sync,
{
    fn key(&self, args: &A) -> String {
        let mut buf = String::new();
        args.write_parts(&mut buf, &self.separator);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_concatenates_without_delimiter() {
        let keygen = DefaultKeyGenerator::new();
        assert_eq!(keygen.key(&(2, 3)), "23");
        assert_eq!(keygen.key(&("user", 42)), "user42");
        assert_eq!(KeyGenerator::<()>::key(&keygen, &()), "");
    }

    #[test]
    fn test_default_is_collision_prone() {
        let keygen = DefaultKeyGenerator::new();
        assert_eq!(keygen.key(&(1, 23)), keygen.key(&(12, 3)));
    }

    #[test]
    fn test_delimited_distinguishes_adjacent_renderings() {
        let keygen = DelimitedKeyGenerator::default();
        assert_ne!(keygen.key(&(1, 23)), keygen.key(&(12, 3)));
        assert_eq!(keygen.key(&(1, 23)), "1\u{1f}23");
    }

    #[test]
    fn test_delimited_custom_separator() {
        let keygen = DelimitedKeyGenerator::new(":");
        assert_eq!(keygen.key(&("a", "b", "c")), "a:b:c");
    }

    #[test]
    fn test_key_is_deterministic() {
        let keygen = DefaultKeyGenerator::new();
        let args = (7_u64, "query", 3.5_f64);
        assert_eq!(keygen.key(&args), keygen.key(&args));
    }
}
