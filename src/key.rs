use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

const STRING_SEED: u64 = 31;
const STRING_MULTIPLIER: u64 = 31;

/// Rolling multiplicative hash over the UTF-8 bytes of a string key.
///
/// Starts at 31 and folds each byte in as `h * 31 + byte`, wrapping on
/// overflow. Bytes are widened as unsigned, never sign-extended, so a key
/// with bytes of 0x80 and above hashes the same on every target. Tables
/// built by a hasher over signed `char` place such keys on other slots.
#[inline]
pub(crate) fn string_hash(bytes: &[u8]) -> u64 {
    bytes.iter().fold(STRING_SEED, |h, &b| {
        h.wrapping_mul(STRING_MULTIPLIER).wrapping_add(b as u64)
    })
}

/// An owned table key.
///
/// Keys of different variants never compare equal, even when they hold the
/// same number: `Key::U8(1) != Key::U16(1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// An 8-bit unsigned integer key.
    U8(u8),
    /// A 16-bit unsigned integer key.
    U16(u16),
    /// A 32-bit unsigned integer key.
    U32(u32),
    /// A 64-bit unsigned integer key.
    U64(u64),
    /// A string key; the table owns a copy of its bytes.
    Str(Box<str>),
}

/// A borrowed table key, accepted by every lookup and mutation.
///
/// Converting into a [`Key`] copies string bytes, which only `insert` does.
///
/// ```rust
/// use prime_hash::KeyRef;
///
/// assert_eq!(KeyRef::from("Aa").hash_code(), KeyRef::from("BB").hash_code());
/// assert_ne!(KeyRef::from(1u8), KeyRef::from(1u16));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRef<'k> {
    /// An 8-bit unsigned integer key.
    U8(u8),
    /// A 16-bit unsigned integer key.
    U16(u16),
    /// A 32-bit unsigned integer key.
    U32(u32),
    /// A 64-bit unsigned integer key.
    U64(u64),
    /// A borrowed string key.
    Str(&'k str),
}

impl<'k> KeyRef<'k> {
    /// The capacity-independent hash of this key.
    ///
    /// Integer keys hash to their own value; string keys use the rolling
    /// `h * 31 + byte` hash seeded with 31.
    pub fn hash_code(self) -> u64 {
        match self {
            KeyRef::U8(v) => v as u64,
            KeyRef::U16(v) => v as u64,
            KeyRef::U32(v) => v as u64,
            KeyRef::U64(v) => v,
            KeyRef::Str(s) => string_hash(s.as_bytes()),
        }
    }

    /// Slot index this key starts probing from in a table of `capacity`
    /// slots.
    #[inline]
    pub(crate) fn home_slot(self, capacity: usize) -> usize {
        debug_assert!(capacity > 0);
        (self.hash_code() % capacity as u64) as usize
    }

    /// Only zero-length strings are empty; integer keys never are.
    #[inline]
    pub(crate) fn is_empty(self) -> bool {
        matches!(self, KeyRef::Str(s) if s.is_empty())
    }

    pub(crate) fn to_key(self) -> Key {
        match self {
            KeyRef::U8(v) => Key::U8(v),
            KeyRef::U16(v) => Key::U16(v),
            KeyRef::U32(v) => Key::U32(v),
            KeyRef::U64(v) => Key::U64(v),
            KeyRef::Str(s) => Key::Str(Box::from(s)),
        }
    }
}

impl Key {
    /// Borrows this key for lookups.
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            Key::U8(v) => KeyRef::U8(*v),
            Key::U16(v) => KeyRef::U16(*v),
            Key::U32(v) => KeyRef::U32(*v),
            Key::U64(v) => KeyRef::U64(*v),
            Key::Str(s) => KeyRef::Str(&**s),
        }
    }
}

impl PartialEq<KeyRef<'_>> for Key {
    #[inline]
    fn eq(&self, other: &KeyRef<'_>) -> bool {
        self.as_key_ref() == *other
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::U8(v) => write!(f, "{v}u8"),
            KeyRef::U16(v) => write!(f, "{v}u16"),
            KeyRef::U32(v) => write!(f, "{v}u32"),
            KeyRef::U64(v) => write!(f, "{v}u64"),
            KeyRef::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_key_ref(), f)
    }
}

impl<'k> From<&'k str> for KeyRef<'k> {
    fn from(value: &'k str) -> Self {
        KeyRef::Str(value)
    }
}

impl<'k> From<&'k String> for KeyRef<'k> {
    fn from(value: &'k String) -> Self {
        KeyRef::Str(value.as_str())
    }
}

impl<'k> From<&'k Key> for KeyRef<'k> {
    fn from(value: &'k Key) -> Self {
        value.as_key_ref()
    }
}

impl From<u8> for KeyRef<'_> {
    fn from(value: u8) -> Self {
        KeyRef::U8(value)
    }
}

impl From<u16> for KeyRef<'_> {
    fn from(value: u16) -> Self {
        KeyRef::U16(value)
    }
}

impl From<u32> for KeyRef<'_> {
    fn from(value: u32) -> Self {
        KeyRef::U32(value)
    }
}

impl From<u64> for KeyRef<'_> {
    fn from(value: u64) -> Self {
        KeyRef::U64(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Box::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value.into_boxed_str())
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn string_hash_matches_rolling_formula() {
        assert_eq!(string_hash(b""), 31);
        assert_eq!(string_hash(b"a"), 31 * 31 + 97);
        assert_eq!(string_hash(b"ab"), (31 * 31 + 97) * 31 + 98);
    }

    #[test]
    fn string_hash_wraps_instead_of_overflowing() {
        let long = "z".repeat(64);
        let expected = long
            .bytes()
            .fold(31u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64));
        assert_eq!(KeyRef::from(long.as_str()).hash_code(), expected);
    }

    #[test]
    fn non_ascii_bytes_are_unsigned() {
        // "é" is 0xC3 0xA9 in UTF-8.
        let key = KeyRef::from("é");
        assert_eq!(key.hash_code(), (31 * 31 + 0xC3) * 31 + 0xA9);
        assert_eq!(key.hash_code(), 36005);
        assert_eq!(key.home_slot(53), 18);

        // Sign-extending the same bytes would land on slot 41 instead.
        let signed = "é".bytes().fold(31u64, |h, b| {
            h.wrapping_mul(31).wrapping_add(b as i8 as i64 as u64)
        });
        assert_eq!(signed % 53, 41);
    }

    #[test]
    fn classic_collision_pair() {
        // "Aa" and "BB" share the same full hash, so they collide at every
        // capacity.
        let aa = KeyRef::from("Aa");
        let bb = KeyRef::from("BB");
        assert_eq!(aa.hash_code(), bb.hash_code());
        for capacity in [53, 97, 193] {
            assert_eq!(aa.home_slot(capacity), bb.home_slot(capacity));
        }
    }

    #[test]
    fn integer_keys_hash_to_themselves() {
        assert_eq!(KeyRef::from(7u8).home_slot(53), 7);
        assert_eq!(KeyRef::from(60u16).home_slot(53), 7);
        assert_eq!(KeyRef::from(106u32).home_slot(53), 0);
        assert_eq!(KeyRef::from(u64::MAX).hash_code(), u64::MAX);
    }

    #[test]
    fn equality_is_per_variant() {
        assert_ne!(KeyRef::U8(1), KeyRef::U16(1));
        assert_eq!(Key::from("k"), KeyRef::from("k"));
        assert!(Key::U32(5) != KeyRef::U64(5));
        let owned = KeyRef::from("copy").to_key();
        assert_eq!(owned, Key::Str("copy".into()));
    }

    #[test]
    fn only_empty_strings_are_empty() {
        assert!(KeyRef::from("").is_empty());
        assert!(!KeyRef::from(0u8).is_empty());
        assert!(!KeyRef::from("x").is_empty());
    }

    #[test]
    fn display_marks_variants() {
        assert_eq!(Key::U16(3).to_string(), "3u16");
        assert_eq!(format!("{}", Key::from("hi")), "\"hi\"");
    }
}
