//! Fresh alias generation.

use smol_str::SmolStr;

use crate::base::is_reserved_word;

/// Monotonic generator of synthetic names.
///
/// Names are the bijective base-26 spelling of a counter: `a`, `b`, …, `z`,
/// `aa`, `ab`, … Different counter values always spell different strings,
/// so nothing is returned twice until [`reset`](Self::reset). Spellings that
/// happen to be reserved words (`do`, `if`, `int`, …) are skipped.
#[derive(Clone, Debug, Default)]
pub struct AliasRegistry {
    counter: u64,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from `a`.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Number of names handed out (including skipped reserved spellings).
    pub fn issued(&self) -> u64 {
        self.counter
    }

    /// Return a name not returned since the last reset.
    pub fn next_name(&mut self) -> SmolStr {
        loop {
            let name = encode(self.counter);
            self.counter += 1;
            if !is_reserved_word(&name) {
                return name;
            }
        }
    }

    /// Return the next name `accept` agrees to. Rejected spellings are
    /// consumed like any other.
    pub fn next_name_where(&mut self, accept: impl Fn(&str) -> bool) -> SmolStr {
        loop {
            let name = self.next_name();
            if accept(&name) {
                return name;
            }
        }
    }
}

fn encode(mut n: u64) -> SmolStr {
    // 14 letters cover u64::MAX in bijective base 26.
    let mut buf = [0u8; 14];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'a' + (n % 26) as u8;
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    // Only ASCII lowercase letters were written.
    SmolStr::new(std::str::from_utf8(&buf[pos..]).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_encoding_sequence() {
        assert_eq!(encode(0), "a");
        assert_eq!(encode(25), "z");
        assert_eq!(encode(26), "aa");
        assert_eq!(encode(27), "ab");
        assert_eq!(encode(26 + 26 * 26), "aaa");
    }

    #[test]
    fn test_unique_after_reset() {
        let mut registry = AliasRegistry::new();
        let mut seen = FxHashSet::default();
        for _ in 0..10_000 {
            let name = registry.next_name();
            assert!(!name.bytes().any(|b| b.is_ascii_digit()));
            assert!(seen.insert(name), "registry returned a duplicate");
        }
    }

    #[test]
    fn test_skips_reserved_words() {
        let mut registry = AliasRegistry::new();
        for _ in 0..26 * 27 {
            let name = registry.next_name();
            assert!(!is_reserved_word(&name), "{name} is reserved");
        }
    }

    #[test]
    fn test_next_name_where_skips_rejected() {
        let mut registry = AliasRegistry::new();
        let taken = ["a", "b"];
        assert_eq!(registry.next_name_where(|n| !taken.contains(&n)), "c");
        assert_eq!(registry.issued(), 3);
        assert_eq!(registry.next_name(), "d");
    }

    #[test]
    fn test_reset() {
        let mut registry = AliasRegistry::new();
        let first = registry.next_name();
        registry.next_name();
        registry.reset();
        assert_eq!(registry.issued(), 0);
        assert_eq!(registry.next_name(), first);
    }
}
