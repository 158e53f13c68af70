use indexmap::IndexMap;

use crate::{LexiconError, Result};

/// Bidirectional lemma ↔ id index with dense ids `0..len`.
///
/// Only [`LookupBuilder`] and the checked constructors create one, so both
/// directions always agree.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Lookup {
    by_word: IndexMap<String, usize>,
    by_id: Vec<String>,
}

/// Assigns the next id to each new lemma.
#[derive(Debug, Default)]
pub struct LookupBuilder {
    inner: Lookup,
}

impl LookupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            inner: Lookup {
                by_word: IndexMap::with_capacity(n),
                by_id: Vec::with_capacity(n),
            },
        }
    }

    /// Add a lemma, returning its id. A lemma may only be added once.
    pub fn push(&mut self, lemma: String) -> Result<usize> {
        if self.inner.by_word.contains_key(&lemma) {
            return Err(LexiconError::DuplicateLemma(lemma));
        }
        let id = self.inner.by_id.len();
        self.inner.by_word.insert(lemma.clone(), id);
        self.inner.by_id.push(lemma);
        Ok(id)
    }

    pub fn build(self) -> Lookup {
        self.inner
    }
}

impl Lookup {
    pub fn builder() -> LookupBuilder {
        LookupBuilder::new()
    }

    /// Rebuild from the id → lemma direction alone.
    pub fn from_ids(by_id: Vec<String>) -> Result<Self> {
        let mut builder = LookupBuilder::with_capacity(by_id.len());
        for lemma in by_id {
            builder.push(lemma)?;
        }
        Ok(builder.build())
    }

    /// Rebuild from both directions, checking that they are inverse.
    pub fn from_parts(by_word: IndexMap<String, usize>, by_id: Vec<String>) -> Result<Self> {
        let lookup = Self::from_ids(by_id)?;
        if by_word.len() != lookup.len() {
            return Err(LexiconError::LookupMismatch(format!(
                "{} words for {} ids",
                by_word.len(),
                lookup.len()
            )));
        }
        for (lemma, id) in &by_word {
            if lookup.id(lemma) != Some(*id) {
                return Err(LexiconError::LookupMismatch(lemma.clone()));
            }
        }
        Ok(lookup)
    }

    pub fn id(&self, lemma: &str) -> Option<usize> {
        self.by_word.get(lemma).copied()
    }

    pub fn lemma(&self, id: usize) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn by_word(&self) -> &IndexMap<String, usize> {
        &self.by_word
    }

    pub fn by_id(&self) -> &[String] {
        &self.by_id
    }

    /// `(id, lemma)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.by_id.iter().enumerate().map(|(i, l)| (i, l.as_str()))
    }
}
