//! Identifier classification.
//!
//! The rename engine never inspects characters itself; it asks an
//! [`IdentifierClassifier`]. [`JavaIdentifiers`] is the classifier for the
//! JVM/Dalvik target and is what [`crate::deobf::Deobfuscator::new`] uses
//! unless another one is supplied.

/// Java keywords plus the three reserved literals, sorted for binary search.
const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

/// Characters that are easy to confuse with each other in most fonts.
const CONFUSABLE: &[char] = &['l', 'I', '1', 'O', '0', '_', '$'];

/// Predicates deciding whether a bare identifier is usable in emitted source.
pub trait IdentifierClassifier {
    /// Syntactically valid and not reserved.
    fn is_valid_identifier(&self, name: &str) -> bool;

    /// A keyword or reserved literal of the target language.
    fn is_reserved(&self, name: &str) -> bool;

    /// Every character can be printed as-is in source text.
    fn is_all_printable(&self, name: &str) -> bool;

    /// The name looks machine-generated or deliberately confusing.
    fn looks_obfuscated(&self, name: &str) -> bool;
}

/// Classifier for Java source output.
#[derive(Clone, Copy, Debug, Default)]
pub struct JavaIdentifiers;

impl JavaIdentifiers {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierClassifier for JavaIdentifiers {
    fn is_valid_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !(is_java_start(first) && chars.all(is_java_part)) {
            return false;
        }
        !is_reserved_word(name)
    }

    fn is_reserved(&self, name: &str) -> bool {
        is_reserved_word(name)
    }

    fn is_all_printable(&self, name: &str) -> bool {
        name.chars().all(|ch| ch.is_ascii_graphic())
    }

    fn looks_obfuscated(&self, name: &str) -> bool {
        match name.chars().next() {
            None => false,
            Some(first) if first.is_ascii_digit() => true,
            Some(_) => name.chars().count() > 1 && name.chars().all(|ch| CONFUSABLE.contains(&ch)),
        }
    }
}

/// Check a name against the Java reserved word table.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

/// Check whether a name contains any ASCII digit.
pub fn contains_digit(name: &str) -> bool {
    name.bytes().any(|b| b.is_ascii_digit())
}

fn is_java_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_ident::is_xid_start(ch)
}

fn is_java_part(ch: char) -> bool {
    ch == '$' || unicode_ident::is_xid_continue(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_table_sorted() {
        let mut sorted = RESERVED_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_WORDS);
    }

    #[test]
    fn test_valid_identifier() {
        let java = JavaIdentifiers::new();
        assert!(java.is_valid_identifier("onClick"));
        assert!(java.is_valid_identifier("$jacocoData"));
        assert!(java.is_valid_identifier("_x1"));
        assert!(!java.is_valid_identifier(""));
        assert!(!java.is_valid_identifier("1abc"));
        assert!(!java.is_valid_identifier("a-b"));
        assert!(!java.is_valid_identifier("class"));
    }

    #[test]
    fn test_reserved() {
        let java = JavaIdentifiers::new();
        assert!(java.is_reserved("do"));
        assert!(java.is_reserved("null"));
        assert!(!java.is_reserved("Do"));
    }

    #[test]
    fn test_printable() {
        let java = JavaIdentifiers::new();
        assert!(java.is_all_printable("Main$1"));
        assert!(!java.is_all_printable("a\u{0}b"));
        assert!(!java.is_all_printable("tab\tname"));
        assert!(!java.is_all_printable("\u{202e}evil"));
    }

    #[test]
    fn test_obfuscated_heuristic() {
        let java = JavaIdentifiers::new();
        assert!(java.looks_obfuscated("lIl1"));
        assert!(java.looks_obfuscated("O0O"));
        assert!(java.looks_obfuscated("9lives"));
        assert!(!java.looks_obfuscated("a"));
        assert!(!java.looks_obfuscated("l"));
        assert!(!java.looks_obfuscated("Logger"));
    }

    #[test]
    fn test_contains_digit() {
        assert!(contains_digit("com.a1.b"));
        assert!(!contains_digit("com.example.Main"));
    }
}
