//! The two batch stages: build the corpus from the lexica, and load what a
//! query run needs.

use std::path::{Path, PathBuf};

use lexicon_db::{
    Checkpoints, Corpus, Definitions, FlatDefinitions, FrequencyTable, Lookup, RankTable, Result,
    SnowballStemmer, Stem, bag_of_words, extract_file, load_frequency_file, load_rank_file, names,
    restrict_bags,
};
use lexicon_types::Language;
use tracing::info;

/// Lexica are read in this order, which fixes lemma ids.
pub const LANGUAGES: [Language; 2] = [Language::Latin, Language::Greek];

/// Location of the dictionaries and frequency tables.
#[derive(Clone, Debug)]
pub struct DataPaths {
    dir: PathBuf,
}

impl DataPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<code>.lexicon.xml`
    pub fn lexicon(&self, language: Language) -> PathBuf {
        self.dir.join(format!("{}.lexicon.xml", language.code()))
    }

    /// `<dir>/<code>.stem.freq`
    pub fn frequencies(&self, language: Language) -> PathBuf {
        self.dir.join(format!("{}.stem.freq", language.code()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOptions {
    /// Resume from the saved definitions instead of re-reading the lexica.
    pub cache: bool,
    /// Stem gloss words.
    pub stem: bool,
    /// Keep only lemmas present in the frequency tables.
    pub match_frequencies: bool,
}

/// Build the corpus and save every intermediate artifact to `store`.
pub fn read_lexicon(paths: &DataPaths, store: &Checkpoints, opts: ReadOptions) -> Result<Corpus> {
    let defs: FlatDefinitions = if opts.cache {
        store.load(names::DEFS_FULL)?
    } else {
        let mut defs = Definitions::new();
        for language in LANGUAGES {
            extract_file(paths.lexicon(language), language, &mut defs)?;
        }
        let flat = defs.flatten();
        store.save(names::DEFS_FULL, &flat)?;
        flat
    };
    info!("{} lemmas have definitions", defs.len());

    let stemmer = opts.stem.then(SnowballStemmer::english);
    let (mut bags, _) = bag_of_words(&defs, stemmer.as_ref().map(|s| s as &dyn Stem));

    if opts.match_frequencies {
        let freq = load_frequencies(paths)?;
        bags = restrict_bags(bags, |lemma| freq.contains(lemma));
    }
    info!("{} lemmas still have definitions", bags.len());

    let corpus = Corpus::from_bags(bags)?;
    store.save(names::DEFS_BOW, corpus.bags())?;
    store.save(names::LOOKUP_WORD, corpus.lookup().by_word())?;
    store.save(names::LOOKUP_ID, corpus.lookup().by_id())?;
    Ok(corpus)
}

/// Reassemble the corpus saved by [`read_lexicon`].
pub fn load_corpus(store: &Checkpoints) -> Result<Corpus> {
    let lookup = Lookup::from_parts(
        store.load(names::LOOKUP_WORD)?,
        store.load(names::LOOKUP_ID)?,
    )?;
    Corpus::from_parts(store.load(names::DEFS_BOW)?, lookup)
}

/// Rank weights for both languages in one table.
pub fn load_ranks(paths: &DataPaths) -> Result<RankTable> {
    let mut ranks = RankTable::default();
    for language in LANGUAGES {
        ranks = ranks.merge(load_rank_file(language, paths.frequencies(language))?);
    }
    Ok(ranks)
}

/// Relative frequencies for both languages in one table.
pub fn load_frequencies(paths: &DataPaths) -> Result<FrequencyTable> {
    let mut freq = FrequencyTable::default();
    for language in LANGUAGES {
        freq = freq.merge(load_frequency_file(language, paths.frequencies(language))?);
    }
    Ok(freq)
}
