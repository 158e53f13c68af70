//! Betacode → Unicode Greek.
//!
//! Rules are applied one after another over the whole string, so their order
//! matters: `*a` has to fire before `a`, and the word-final sigma rule before
//! the plain sigma rule.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Ordered `(pattern, replacement)` rewrite rules.
pub const RULES: &[(&str, &str)] = &[
    // Diacritics become combining marks.
    (r"\)", "\u{0313}"),
    (r"\(", "\u{0314}"),
    (r"/", "\u{0301}"),
    (r"=", "\u{0342}"),
    (r"\\", "\u{0300}"),
    (r"\+", "\u{0308}"),
    (r"\|", "\u{0345}"),
    // Letters, capitals first.
    (r"\*a", "Α"),
    (r"a", "α"),
    (r"\*b", "Β"),
    (r"b", "β"),
    (r"\*g", "Γ"),
    (r"g", "γ"),
    (r"\*d", "Δ"),
    (r"d", "δ"),
    (r"\*e", "Ε"),
    (r"e", "ε"),
    (r"\*z", "Ζ"),
    (r"z", "ζ"),
    (r"\*h", "Η"),
    (r"h", "η"),
    (r"\*q", "Θ"),
    (r"q", "θ"),
    (r"\*i", "Ι"),
    (r"i", "ι"),
    (r"\*k", "Κ"),
    (r"k", "κ"),
    (r"\*l", "Λ"),
    (r"l", "λ"),
    (r"\*m", "Μ"),
    (r"m", "μ"),
    (r"\*n", "Ν"),
    (r"n", "ν"),
    (r"\*c", "Ξ"),
    (r"c", "ξ"),
    (r"\*o", "Ο"),
    (r"o", "ο"),
    (r"\*p", "Π"),
    (r"p", "π"),
    (r"\*r", "Ρ"),
    (r"r", "ρ"),
    (r"s\b", "ς"),
    (r"\*s", "Σ"),
    (r"s", "σ"),
    (r"\*t", "Τ"),
    (r"t", "τ"),
    (r"\*u", "Υ"),
    (r"u", "υ"),
    (r"\*f", "Φ"),
    (r"f", "φ"),
    (r"\*x", "Χ"),
    (r"x", "χ"),
    (r"\*y", "Ψ"),
    (r"y", "ψ"),
    (r"\*w", "Ω"),
    (r"w", "ω"),
];

// Moves the capital marker past any diacritics so it sits right before its letter.
static CAPITAL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\*)([^a-z ]+)").expect("capital marker pattern compiles"));

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(pattern).expect("betacode rule compiles");
            (re, *replacement)
        })
        .collect()
});

/// Transliterate betacode into Unicode Greek.
///
/// Total: characters no rule mentions pass through unchanged.
pub fn beta_to_unicode(beta: &str) -> String {
    let mut text = CAPITAL_MARKER.replace_all(beta, "${2}${1}").into_owned();
    for (re, replacement) in COMPILED.iter() {
        if let Cow::Owned(rewritten) = re.replace_all(&text, *replacement) {
            text = rewritten;
        }
    }
    text
}
