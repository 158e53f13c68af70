//! Rank Latin (or Greek) candidate synonyms for every Greek (or Latin) lemma.
//!
//! Each lemma is represented by the words of its dictionary definitions. The
//! corpus built by `lexicon-db` is turned into a [`VectorSpace`], and
//! [`query_all`] pairs every query lemma with its most similar lemmas of the
//! other language, optionally penalising candidates whose corpus frequency
//! rank is far from the query's.
//!
//! ```no_run
//! use lexicon_db::Checkpoints;
//! use synonym_finder::pipeline::{self, DataPaths};
//! use synonym_finder::{QueryParams, SpaceConfig, TfidfSpace, query_all};
//!
//! # fn main() -> anyhow::Result<()> {
//! let corpus = pipeline::load_corpus(&Checkpoints::open("dictionary-data")?)?;
//! let ranks = pipeline::load_ranks(&DataPaths::new("data"))?;
//! let space = TfidfSpace::build(corpus.bags(), SpaceConfig::default());
//! for result in query_all(&space, corpus.lookup(), &ranks, &QueryParams::default())? {
//!     println!("{} -> {:?}", result.query, result.candidates);
//! }
//! # Ok(()) }
//! ```

pub mod output;
pub mod pipeline;
pub mod query;
pub mod space;

pub use output::{write_result, write_results};
pub use query::{QueryError, QueryParams, adjusted_score, for_each_result, query_all};
pub use space::{SpaceConfig, TfidfSpace, VectorSpace};
