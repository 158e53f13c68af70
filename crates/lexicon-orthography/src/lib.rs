//! Orthography standardisation for Greek and Latin lemmas.
//!
//! Every lemma key in the system comes out of [`standardize`], whether it was
//! read from a dictionary headword or from a frequency table, so spelling
//! variants collapse the same way everywhere.
//!
//! 1. Compatibility-decompose (NFKD) and lowercase.
//! 2. Latin: fold `j` → `i` and `v` → `u`.
//! 3. Greek: fold the grave accent onto the acute, transliterate betacode
//!    with [`beta_to_unicode`], then decompose and lowercase the Greek.
//!
//! # Example
//! ```rust
//! use lexicon_orthography::standardize;
//! use lexicon_types::Language;
//!
//! assert_eq!(standardize(Language::Latin, "Iuvenis"), "iuuenis");
//! assert_eq!(standardize(Language::Greek, "lo\\gos"), "λο\u{301}γος");
//! assert_eq!(standardize(Language::Any, "Love"), "love");
//! ```

mod betacode;

pub use betacode::{RULES, beta_to_unicode};

use lexicon_types::Language;
use unicode_normalization::UnicodeNormalization;

/// Standardise a word's orthography for `language`.
///
/// Idempotent: standardising an already standardised word is a no-op.
pub fn standardize(language: Language, word: &str) -> String {
    let folded = decompose_lowercase(word);
    match language {
        Language::Latin => folded
            .chars()
            .map(|c| match c {
                'j' => 'i',
                'v' => 'u',
                other => other,
            })
            .collect(),
        Language::Greek => {
            let greek = beta_to_unicode(&folded.replace('\\', "/"));
            // Capital markers no letter consumed (`*s` at a word end, `**`).
            decompose_lowercase(&greek.replace('*', ""))
        }
        Language::Any => folded,
    }
}

fn decompose_lowercase(word: &str) -> String {
    word.nfkd().collect::<String>().to_lowercase()
}
