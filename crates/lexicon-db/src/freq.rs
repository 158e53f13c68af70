//! Frequency tables: a `# count: <total>` header followed by
//! `<lemma>\t<count>` lines in descending frequency.
//!
//! The same file yields two different weights. [`RankTable`] holds the
//! position-based `ln(1 + n)` used to penalise frequency mismatches between a
//! query and its candidates; [`FrequencyTable`] holds `count / total`, used to
//! decide which lemmas exist in the frequency data at all.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use lexicon_orthography::standardize;
use lexicon_types::Language;
use regex::Regex;
use tracing::info;

use crate::{LexiconError, Result};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+count:\s+(\d+)").expect("header pattern compiles"));
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]").expect("digit pattern compiles"));

/// Lemma → `ln(1 + line position)`, position counted from 0 after the header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankTable(HashMap<String, f64>);

/// Lemma → share of all tokens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyTable(HashMap<String, f64>);

macro_rules! lemma_table {
    ($name:ident) => {
        impl $name {
            pub fn get(&self, lemma: &str) -> Option<f64> {
                self.0.get(lemma).copied()
            }

            pub fn contains(&self, lemma: &str) -> bool {
                self.0.contains_key(lemma)
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Union of two tables; entries from `other` win on collision.
            pub fn merge(mut self, other: Self) -> Self {
                self.0.extend(other.0);
                self
            }

            pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
                self.0.iter().map(|(k, v)| (k.as_str(), *v))
            }
        }

        impl FromIterator<(String, f64)> for $name {
            fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

lemma_table!(RankTable);
lemma_table!(FrequencyTable);

/// Read the header and hand each `(position, line number, lemma, raw count)`
/// to `visit`. Positions skip blank lines; line numbers are 1-based and don't.
fn read_table<R, F>(language: Language, reader: R, source_name: &str, mut visit: F) -> Result<u64>
where
    R: BufRead,
    F: FnMut(usize, usize, String, &str) -> Result<()>,
{
    let mut lines = reader.lines();
    let head = lines.next().transpose()?.unwrap_or_default();
    let total: u64 = HEADER
        .captures(&head)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| LexiconError::MalformedHeader {
            source_name: source_name.to_string(),
        })?;

    let mut position = 0usize;
    for (lineno, line) in (2..).zip(lines) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (raw, count) = line
            .split_once('\t')
            .ok_or_else(|| LexiconError::MalformedLine {
                source_name: source_name.to_string(),
                line: lineno,
                reason: "expected <lemma>\\t<count>".to_string(),
            })?;
        let lemma = standardize(language, raw);
        let lemma = DIGITS.replace_all(&lemma, "").into_owned();
        visit(position, lineno, lemma, count.trim())?;
        position += 1;
    }
    Ok(total)
}

/// Parse a frequency table into log-rank weights.
pub fn load_ranks<R: BufRead>(
    language: Language,
    reader: R,
    source_name: &str,
) -> Result<RankTable> {
    let mut ranks = HashMap::new();
    read_table(language, reader, source_name, |n, _, lemma, _| {
        ranks.insert(lemma, (1.0 + n as f64).ln());
        Ok(())
    })?;
    Ok(RankTable(ranks))
}

/// Parse a frequency table into relative frequencies.
pub fn load_frequencies<R: BufRead>(
    language: Language,
    reader: R,
    source_name: &str,
) -> Result<FrequencyTable> {
    let mut counts = Vec::new();
    let total = read_table(language, reader, source_name, |_, lineno, lemma, count| {
        let count: f64 = count.parse().map_err(|_| LexiconError::MalformedLine {
            source_name: source_name.to_string(),
            line: lineno,
            reason: format!("bad count {count:?}"),
        })?;
        counts.push((lemma, count));
        Ok(())
    })?;
    let total = total as f64;
    Ok(counts
        .into_iter()
        .map(|(lemma, count)| (lemma, count / total))
        .collect())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    info!("reading frequency table {}", path.display());
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LexiconError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Rank weights from a frequency file on disk.
pub fn load_rank_file(language: Language, path: impl AsRef<Path>) -> Result<RankTable> {
    let path = path.as_ref();
    let ranks = load_ranks(language, open(path)?, &path.display().to_string())?;
    info!("{} ranked {} lemmas", language, ranks.len());
    Ok(ranks)
}

/// Relative frequencies from a frequency file on disk.
pub fn load_frequency_file(language: Language, path: impl AsRef<Path>) -> Result<FrequencyTable> {
    let path = path.as_ref();
    load_frequencies(language, open(path)?, &path.display().to_string())
}
