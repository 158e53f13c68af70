//! Shared types for the Greek/Latin synonym finder.
//!
//! Lemma keys are plain normalised strings; which language a lemma belongs to
//! is decided by its script alone (see [`is_greek`]). [`Language`] selects the
//! orthography rules applied while normalising, [`Script`] selects query and
//! candidate populations, and [`Shard`] splits the query workload across
//! independent processes.
//!
//! ```rust
//! use lexicon_types::{Script, Shard, is_greek};
//!
//! assert!(is_greek("λόγος"));
//! assert!(Script::Latin.matches("amor"));
//! let shard: Shard = "2:3".parse().unwrap();
//! assert!(shard.contains(5));
//! ```

use std::fmt;
use std::str::FromStr;

/// Orthography used when normalising a word.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Language {
    Latin,
    /// Greek in betacode.
    Greek,
    /// Already-extracted English gloss words: no language-specific folding.
    Any,
}

impl Language {
    /// Short code used in data file names (`la`, `grc`).
    pub fn code(self) -> &'static str {
        match self {
            Language::Latin => "la",
            Language::Greek => "grc",
            Language::Any => "any",
        }
    }

    /// Parse a data-file language code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "la" => Some(Language::Latin),
            "grc" => Some(Language::Greek),
            "any" => Some(Language::Any),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Latin => "latin",
            Language::Greek => "greek",
            Language::Any => "any",
        })
    }
}

/// True if any character lies above Latin-1, i.e. the lemma is Greek.
pub fn is_greek(form: &str) -> bool {
    form.chars().any(|c| c as u32 > 255)
}

/// Population of lemmas selected by script.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Script {
    Greek,
    Latin,
    Any,
}

impl Script {
    pub fn matches(self, lemma: &str) -> bool {
        match self {
            Script::Greek => is_greek(lemma),
            Script::Latin => !is_greek(lemma),
            Script::Any => true,
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Script::Greek => "greek",
            Script::Latin => "latin",
            Script::Any => "any",
        })
    }
}

impl FromStr for Script {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greek" | "grc" => Ok(Script::Greek),
            "latin" | "la" => Ok(Script::Latin),
            "any" => Ok(Script::Any),
            other => Err(format!("unknown language {other:?} (expected greek, latin or any)")),
        }
    }
}

/// One part of the query workload: shard `id` of `count`, numbered from 1.
///
/// Shard `i` of `n` owns every query index `q` with `q % n == i % n`, so the
/// shards of one `n` are disjoint and together cover all indices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Shard {
    id: usize,
    count: usize,
}

impl Shard {
    pub fn new(id: usize, count: usize) -> Result<Self, ShardError> {
        if count == 0 {
            return Err(ShardError::ZeroCount);
        }
        if id < 1 {
            return Err(ShardError::IdTooSmall);
        }
        if id > count {
            return Err(ShardError::IdExceedsCount { id, count });
        }
        Ok(Self { id, count })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether query index `q` belongs to this shard.
    pub fn contains(&self, q: usize) -> bool {
        q % self.count == self.id % self.count
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.count)
    }
}

impl FromStr for Shard {
    type Err = ShardError;

    /// Parse `I:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, count) = s.split_once(':').ok_or(ShardError::Format)?;
        let parse = |t: &str| {
            if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ShardError::Format);
            }
            t.parse::<usize>().map_err(|_| ShardError::Format)
        };
        Shard::new(parse(id)?, parse(count)?)
    }
}

/// Rejected shard specification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShardError {
    Format,
    ZeroCount,
    IdTooSmall,
    IdExceedsCount { id: usize, count: usize },
}

impl fmt::Display for ShardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardError::Format => f.write_str(
                "shard must have format I:N, where I and N are integers and I <= N",
            ),
            ShardError::ZeroCount => f.write_str("number of shards must be greater than 0"),
            ShardError::IdTooSmall => f.write_str("shard id must be greater than 0"),
            ShardError::IdExceedsCount { id, count } => {
                write!(f, "shard id {id} can't exceed number of shards {count}")
            }
        }
    }
}

impl std::error::Error for ShardError {}

/// A ranked candidate for a query lemma.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub lemma: String,
    pub score: f32,
}

/// Candidates for one query lemma, best first.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryResult {
    pub query: String,
    pub candidates: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_membership_by_code_point() {
        assert!(is_greek("ἄνθρωπος"));
        assert!(!is_greek("homo"));
        // Latin-1 accents are still Latin.
        assert!(!is_greek("café"));
        assert!(Script::Any.matches("homo"));
        assert!(Script::Greek.matches("λόγος"));
        assert!(!Script::Greek.matches("verbum"));
    }

    #[test]
    fn parses_shards() {
        assert_eq!("1:3".parse::<Shard>().unwrap(), Shard { id: 1, count: 3 });
        assert_eq!("3:3".parse::<Shard>().unwrap().id(), 3);
        assert_eq!("0:3".parse::<Shard>(), Err(ShardError::IdTooSmall));
        assert_eq!(
            "4:3".parse::<Shard>(),
            Err(ShardError::IdExceedsCount { id: 4, count: 3 })
        );
        assert_eq!("1:0".parse::<Shard>(), Err(ShardError::ZeroCount));
        assert_eq!("a:b".parse::<Shard>(), Err(ShardError::Format));
        assert_eq!("3".parse::<Shard>(), Err(ShardError::Format));
        assert_eq!("-1:3".parse::<Shard>(), Err(ShardError::Format));
    }

    #[test]
    fn shards_partition_indices() {
        let n = 3;
        let shards: Vec<Shard> = (1..=n).map(|i| Shard::new(i, n).unwrap()).collect();
        for q in 0..100 {
            let owners = shards.iter().filter(|s| s.contains(q)).count();
            assert_eq!(owners, 1, "index {q} owned by {owners} shards");
        }
        // Shard N takes the multiples of N.
        assert!(shards[2].contains(0));
        assert!(shards[0].contains(1));
    }

    #[test]
    fn language_codes_round_trip() {
        for lang in [Language::Latin, Language::Greek, Language::Any] {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!("Greek".parse::<Script>(), Ok(Script::Greek));
        assert!("klingon".parse::<Script>().is_err());
    }
}
