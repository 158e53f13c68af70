use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use indexmap::IndexMap;
use lexicon_orthography::standardize;
use lexicon_types::Language;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use tracing::info;

use crate::extract::FlatDefinitions;
use crate::{LexiconError, Result};
use crate::lookup::{Lookup, LookupBuilder};

/// Token bags per lemma, in insertion order.
pub type Bags = IndexMap<String, Vec<String>>;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("non-word pattern compiles"));

/// Reduce a gloss word to its stem.
pub trait Stem {
    fn stem(&self, token: &str) -> String;
}

impl<F> Stem for F
where
    F: Fn(&str) -> String,
{
    fn stem(&self, token: &str) -> String {
        self(token)
    }
}

/// Snowball (Porter2) stemmer for English glosses.
pub struct SnowballStemmer(Stemmer);

impl SnowballStemmer {
    pub fn english() -> Self {
        Self(Stemmer::create(Algorithm::English))
    }
}

impl Stem for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.0.stem(token).into_owned()
    }
}

/// Number of distinct lemmas whose bag contains each token.
#[derive(Clone, Debug, Default)]
pub struct LemmaCounts(HashMap<String, usize>);

impl LemmaCounts {
    /// Count every token once per bag.
    pub fn count<'a, I>(bags: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for bag in bags {
            let distinct: HashSet<&String> = bag.iter().collect();
            for token in distinct {
                *counts.entry(token.clone()).or_default() += 1;
            }
        }
        Self(counts)
    }

    pub fn get(&self, token: &str) -> usize {
        self.0.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lemmas lost on the way from definitions to bags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BagStats {
    /// Glosses that produced no tokens at all.
    pub no_tokens: usize,
    /// Bags left empty once hapax legomena were removed.
    pub only_hapax: usize,
    /// Tokens used by exactly one lemma.
    pub hapax: usize,
}

impl BagStats {
    pub fn removed(&self) -> usize {
        self.no_tokens + self.only_hapax
    }
}

/// Split a gloss on non-word runs and standardise the pieces.
pub fn tokenize(gloss: &str, stemmer: Option<&dyn Stem>) -> Vec<String> {
    NON_WORD
        .split(gloss)
        .filter(|w| !w.trim().is_empty())
        .map(|w| standardize(Language::Any, w))
        .map(|w| match stemmer {
            Some(s) => s.stem(&w),
            None => w,
        })
        .collect()
}

/// Convert joined glosses into bags of words without hapax legomena.
///
/// Counting and filtering are separate passes: the filter reads the counts
/// taken before any removal and never re-counts.
pub fn bag_of_words(defs: &FlatDefinitions, stemmer: Option<&dyn Stem>) -> (Bags, BagStats) {
    let mut stats = BagStats::default();
    let tokenized: Bags = defs
        .iter()
        .map(|(lemma, gloss)| (lemma.clone(), tokenize(gloss, stemmer)))
        .collect();

    let counts = LemmaCounts::count(tokenized.values().map(Vec::as_slice));
    stats.hapax = counts.0.values().filter(|&&n| n == 1).count();

    let mut bags = Bags::with_capacity(tokenized.len());
    for (lemma, tokens) in tokenized {
        if tokens.is_empty() {
            stats.no_tokens += 1;
            continue;
        }
        let kept: Vec<String> = tokens.into_iter().filter(|t| counts.get(t) > 1).collect();
        if kept.is_empty() {
            stats.only_hapax += 1;
            continue;
        }
        bags.insert(lemma, kept);
    }

    info!(
        "{} bags of words, {} hapax legomena removed, lost {} empty definitions",
        bags.len(),
        stats.hapax,
        stats.removed()
    );
    (bags, stats)
}

/// Keep only the bags whose lemma passes `keep`, preserving order.
pub fn restrict_bags(bags: Bags, keep: impl Fn(&str) -> bool) -> Bags {
    let before = bags.len();
    let kept: Bags = bags.into_iter().filter(|(lemma, _)| keep(lemma)).collect();
    info!("restricted {} lemmas to {}", before, kept.len());
    kept
}

/// Ordered corpus of token bags and the lookup aligned with it.
///
/// `bags()[i]` is the bag of `lookup().lemma(i)`.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    bags: Vec<Vec<String>>,
    lookup: Lookup,
}

impl Corpus {
    /// Number the bags in their current order.
    pub fn from_bags(bags: Bags) -> Result<Self> {
        let mut builder = LookupBuilder::with_capacity(bags.len());
        let mut docs = Vec::with_capacity(bags.len());
        for (lemma, tokens) in bags {
            builder.push(lemma)?;
            docs.push(tokens);
        }
        Ok(Self {
            bags: docs,
            lookup: builder.build(),
        })
    }

    /// Reassemble a corpus from checkpointed parts.
    pub fn from_parts(bags: Vec<Vec<String>>, lookup: Lookup) -> Result<Self> {
        if bags.len() != lookup.len() {
            return Err(LexiconError::LookupMismatch(format!(
                "{} bags for {} lemmas",
                bags.len(),
                lookup.len()
            )));
        }
        Ok(Self { bags, lookup })
    }

    pub fn bags(&self) -> &[Vec<String>] {
        &self.bags
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    pub fn len(&self) -> usize {
        self.bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Vec<String>>, Lookup) {
        (self.bags, self.lookup)
    }
}

/// Definitions → bags → numbered corpus in one go.
pub fn build_corpus(defs: &FlatDefinitions, stemmer: Option<&dyn Stem>) -> Result<Corpus> {
    let (bags, _) = bag_of_words(defs, stemmer);
    Corpus::from_bags(bags)
}
