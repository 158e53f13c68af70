//! Turn Greek and Latin dictionaries into a lemma → definition-words corpus.
//!
//! The pipeline reads the Perseus XML lexica line by line (one `<entryFree>`
//! per line), keeps the English glosses of every headword, converts them into
//! bags of words and drops the words only a single lemma uses. It also reads
//! the per-language frequency tables used to rank lemmas.
//!
//! # Stages
//! 1. [`extract_file`] / [`extract_entries`]: headword → glosses
//!    ([`Definitions`]), flattened with [`Definitions::flatten`].
//! 2. [`bag_of_words`]: tokenise, optionally stem, remove hapax legomena.
//! 3. [`Corpus::from_bags`]: the ordered corpus plus its [`Lookup`].
//! 4. [`load_rank_file`] / [`load_frequency_file`]: frequency tables.
//!
//! Intermediate results can be saved and resumed through [`Checkpoints`].
//!
//! # Example
//! ```no_run
//! use lexicon_db::{Definitions, SnowballStemmer, build_corpus, extract_file};
//! use lexicon_types::Language;
//!
//! # fn main() -> Result<(), lexicon_db::LexiconError> {
//! let mut defs = Definitions::new();
//! extract_file("data/la.lexicon.xml", Language::Latin, &mut defs)?;
//! extract_file("data/grc.lexicon.xml", Language::Greek, &mut defs)?;
//! let stemmer = SnowballStemmer::english();
//! let corpus = build_corpus(&defs.flatten(), Some(&stemmer))?;
//! println!("{} lemmas", corpus.len());
//! # Ok(()) }
//! ```

mod checkpoint;
mod corpus;
mod extract;
mod freq;
mod lookup;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use checkpoint::{Checkpoints, names};
pub use corpus::{
    BagStats, Bags, Corpus, LemmaCounts, SnowballStemmer, Stem, bag_of_words, build_corpus,
    restrict_bags, tokenize,
};
pub use extract::{
    Definitions, ExtractStats, FlatDefinitions, extract_entries, extract_file, extract_line,
};
pub use freq::{
    FrequencyTable, RankTable, load_frequencies, load_frequency_file, load_rank_file, load_ranks,
};
pub use lookup::{Lookup, LookupBuilder};

/// Fatal input problems: missing files, malformed tables, broken checkpoints.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("can't read {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read failed: {0}")]
    Read(#[from] io::Error),
    #[error("can't find header in {source_name}")]
    MalformedHeader { source_name: String },
    #[error("{source_name}:{line}: {reason}")]
    MalformedLine {
        source_name: String,
        line: usize,
        reason: String,
    },
    #[error("duplicate lemma in lookup: {0}")]
    DuplicateLemma(String),
    #[error("lookup tables disagree at lemma {0}")]
    LookupMismatch(String),
    #[error("checkpoint {name}: {source}")]
    Checkpoint {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("checkpoint {name} is not valid JSON: {source}")]
    CheckpointJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = LexiconError> = std::result::Result<T, E>;
