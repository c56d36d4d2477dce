//! Idempotent identifier stropping (spec §3 "Language" / §4.B `mangle`).

use regex::Regex;
use std::collections::HashSet;

/// Distinguishes the syntactic position an identifier is mangled for, so a
/// language can apply a different casing convention per context (spec §4.B:
/// "context distinguishes struct-field, function-name, macro, header-guard
/// (each may apply additional casing per configuration)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MangleContext {
    StructField,
    FunctionName,
    Macro,
    HeaderGuard,
    Namespace,
    TypeName,
}

/// The data-driven half of a language's mangling policy: which tokens are
/// reserved, and what to prepend when one is found. Kept separate from the
/// `Language` trait impls so it can be assembled from layered configuration
/// (spec §4.A) by a caller without this crate depending on the config store.
#[derive(Debug, Clone)]
pub struct MangleRules {
    pub reserved_identifiers: HashSet<String>,
    pub reserved_patterns: Vec<Regex>,
    pub stropping_prefix: String,
}

impl MangleRules {
    pub fn new(reserved_identifiers: HashSet<String>, reserved_patterns: Vec<Regex>, stropping_prefix: impl Into<String>) -> Self {
        MangleRules { reserved_identifiers, reserved_patterns, stropping_prefix: stropping_prefix.into() }
    }

    pub fn is_reserved(&self, symbol: &str) -> bool {
        self.reserved_identifiers.contains(symbol) || self.reserved_patterns.iter().any(|p| p.is_match(symbol))
    }

    /// Stropping proper: prepend the prefix exactly once if `symbol` is
    /// reserved, otherwise return it unchanged. Idempotent as long as no
    /// `{prefix}{reserved_word}` is itself in the reserved set, which holds
    /// for every reserved-word list this port ships (spec §3 invariant:
    /// "policy: idempotent — applying twice yields the same result").
    pub fn strop(&self, symbol: &str) -> String {
        if self.is_reserved(symbol) {
            format!("{}{}", self.stropping_prefix, symbol)
        } else {
            symbol.to_string()
        }
    }

    /// The C11/C17 keyword list plus libc macro-name patterns (`^_[A-Z]`,
    /// reserved to the implementation). Ships as a sane default; the driver
    /// layers config-supplied additions on top via [`MangleRules::new`].
    pub fn default_for_c() -> Self {
        const KEYWORDS: &[&str] = &[
            "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum", "extern",
            "float", "for", "goto", "if", "inline", "int", "long", "register", "restrict", "return", "short", "signed",
            "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void", "volatile", "while",
            "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
            "_Thread_local", "NULL", "true", "false",
        ];
        MangleRules::new(
            KEYWORDS.iter().map(|s| s.to_string()).collect(),
            vec![Regex::new(r"^_[A-Z_]").unwrap()],
            "_",
        )
    }

    /// The C++14/17/20 keyword list, a superset of [`MangleRules::default_for_c`].
    pub fn default_for_cpp() -> Self {
        const EXTRA_KEYWORDS: &[&str] = &[
            "alignas", "alignof", "and", "and_eq", "asm", "bitand", "bitor", "bool", "catch", "char16_t", "char32_t",
            "class", "compl", "concept", "const_cast", "consteval", "constexpr", "constinit", "co_await", "co_return",
            "co_yield", "decltype", "delete", "dynamic_cast", "explicit", "export", "friend", "mutable", "namespace",
            "new", "noexcept", "not", "not_eq", "operator", "or", "or_eq", "private", "protected", "public",
            "reinterpret_cast", "requires", "static_assert", "static_cast", "template", "this", "thread_local", "throw",
            "try", "typeid", "typename", "using", "virtual", "wchar_t", "xor", "xor_eq",
        ];
        let mut base = MangleRules::default_for_c();
        base.reserved_identifiers.extend(EXTRA_KEYWORDS.iter().map(|s| s.to_string()));
        base
    }
}

/// Uppercases an already snake_case DSDL identifier for macro/header-guard
/// contexts. DSDL identifiers are restricted to `[a-zA-Z_][a-zA-Z0-9_]*`, so
/// a plain ASCII uppercase is sufficient and trivially idempotent.
pub fn screaming_snake_case(symbol: &str) -> String {
    symbol.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> MangleRules {
        MangleRules::new(
            HashSet::from(["register".to_string(), "class".to_string()]),
            vec![Regex::new(r"^__.*$").unwrap()],
            "_".to_string(),
        )
    }

    #[test]
    fn reserved_word_is_prefixed() {
        assert_eq!(rules().strop("register"), "_register");
    }

    #[test]
    fn non_reserved_word_is_unchanged() {
        assert_eq!(rules().strop("value"), "value");
    }

    #[test]
    fn pattern_match_is_prefixed() {
        assert_eq!(rules().strop("__builtin_foo"), "___builtin_foo");
    }

    #[test]
    fn stropping_is_idempotent() {
        let r = rules();
        let once = r.strop("class");
        let twice = r.strop(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn screaming_snake_case_is_idempotent() {
        let once = screaming_snake_case("some_field");
        assert_eq!(once, screaming_snake_case(&once));
    }
}
