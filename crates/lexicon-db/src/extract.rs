use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use lexicon_orthography::{beta_to_unicode, standardize};
use lexicon_types::Language;
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::{LexiconError, Result};

/// One joined gloss string per lemma, in insertion order.
pub type FlatDefinitions = IndexMap<String, String>;

/// Glosses per standardised lemma, in the order lemmas were first seen.
///
/// Never holds the empty lemma or a lemma without glosses.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    entries: IndexMap<String, Vec<String>>,
}

/// Line counts from one extraction run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExtractStats {
    pub lines: usize,
    /// Lines that matched the entry pattern.
    pub entries: usize,
    /// Lines that did not look like an entry.
    pub skipped: usize,
    /// Entries contributing nothing: no gloss survived, or the headword was empty.
    pub empty: usize,
}

struct Patterns {
    entry: Regex,
    stop: Vec<Regex>,
    foreign: Regex,
    latin_gloss: Regex,
    greek_gloss: Regex,
    latin_headword: Regex,
    greek_headword: Regex,
    digits: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).expect("lexicon pattern compiles");
    Patterns {
        entry: re(r#"<entryFree [^>]*key="(.+?)"[^>]*>(.+?)</entryFree>"#),
        stop: [
            r"<cit>.*?</cit>",
            r"<bibl .+?>.*?</bibl>",
            r"<orth .+?>.*?</orth>",
            r"<etym .+?>.*?</etym>",
            r"<itype .+?>.*?</itype>",
            r"<pos .+?>.*?</pos>",
            r"<number .+?>.*?</number>",
            r"<gen .+?>.*?</gen>",
            r"<mood .+?>.*?</mood>",
            r"<case .+?>.*?</case>",
            r"<tns .+?>.*?</tns>",
            r"<per .+?>.*?</per>",
            r"<pron .+?>.*?</pron>",
            r"<date>.*?</date>",
            r"<usg .+?>.*?</usg>",
            r"<gramGrp .+?>.*?</gramGrp>",
        ]
        .into_iter()
        .map(re)
        .collect(),
        // Both lexica tag embedded Greek this way, and use <foreign> for nothing else.
        foreign: re(r#"<foreign lang="greek">(.+?)</foreign>"#),
        latin_gloss: re(r#"<hi [^>]*rend="ital"[^>]*>(.+?)</hi>"#),
        greek_gloss: re(r"<tr\b[^>]*>(.+?)</tr>"),
        latin_headword: re(r"[^a-zA-Z]"),
        greek_headword: re(r"[\^_]"),
        digits: re(r"[0-9]"),
    }
});

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append glosses to a lemma, creating it on first sight.
    ///
    /// Returns `false` (and stores nothing) for an empty lemma or gloss list.
    pub fn add(&mut self, lemma: String, glosses: Vec<String>) -> bool {
        if lemma.is_empty() || glosses.is_empty() {
            return false;
        }
        self.entries.entry(lemma).or_default().extend(glosses);
        true
    }

    pub fn get(&self, lemma: &str) -> Option<&[String]> {
        self.entries.get(lemma).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(lemma, glosses)| (lemma.as_str(), glosses.as_slice()))
    }

    /// Join each lemma's glosses with `"; "`.
    pub fn flatten(&self) -> FlatDefinitions {
        self.entries
            .iter()
            .map(|(lemma, glosses)| (lemma.clone(), glosses.join("; ")))
            .collect()
    }
}

/// Parse one dictionary line into its standardised headword and glosses.
///
/// `None` if the line is not an entry, and always for [`Language::Any`], which
/// has no lexicon markup. The gloss list may be empty.
pub fn extract_line(line: &str, language: Language) -> Option<(String, Vec<String>)> {
    let pat = &*PATTERNS;
    let (headword, gloss_re) = match language {
        Language::Latin => (&pat.latin_headword, &pat.latin_gloss),
        Language::Greek => (&pat.greek_headword, &pat.greek_gloss),
        Language::Any => return None,
    };
    let caps = pat.entry.captures(line)?;
    let cleaned = headword.replace_all(&caps[1], "");
    let lemma = standardize(language, &pat.digits.replace_all(&cleaned, ""));

    let mut body = caps[2].to_string();
    for stop in &pat.stop {
        if let Cow::Owned(stripped) = stop.replace_all(&body, "") {
            body = stripped;
        }
    }
    let body = pat
        .foreign
        .replace_all(&body, |c: &Captures<'_>| beta_to_unicode(&c[1]));

    let glosses = gloss_re
        .captures_iter(&body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|g| !g.trim().is_empty())
        .map(str::to_string)
        .collect();

    Some((lemma, glosses))
}

/// Stream dictionary lines into `defs`.
///
/// Lines that are not entries are skipped; glosses for a lemma seen before are
/// appended to its existing list.
pub fn extract_entries<R: BufRead>(
    reader: R,
    language: Language,
    defs: &mut Definitions,
) -> Result<ExtractStats> {
    let mut stats = ExtractStats::default();
    for line in reader.lines() {
        let line = line?;
        stats.lines += 1;
        match extract_line(&line, language) {
            None => stats.skipped += 1,
            Some((lemma, glosses)) => {
                stats.entries += 1;
                if !defs.add(lemma, glosses) {
                    stats.empty += 1;
                }
            }
        }
    }
    debug!(
        "{} lines, {} entries, {} skipped, {} empty",
        stats.lines, stats.entries, stats.skipped, stats.empty
    );
    Ok(stats)
}

/// Open a lexicon file and stream it into `defs`.
pub fn extract_file(
    path: impl AsRef<Path>,
    language: Language,
    defs: &mut Definitions,
) -> Result<ExtractStats> {
    let path = path.as_ref();
    info!("reading lexicon {}", path.display());
    let file = File::open(path).map_err(|source| LexiconError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let before = defs.len();
    let stats = extract_entries(BufReader::new(file), language, defs)?;
    info!(
        "{}: {} entries, {} new lemmas, {} without glosses",
        path.display(),
        stats.entries,
        defs.len() - before,
        stats.empty
    );
    Ok(stats)
}
