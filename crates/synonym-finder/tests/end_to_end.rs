use std::fs;
use std::path::PathBuf;

use lexicon_db::{Checkpoints, names};
use lexicon_types::{QueryResult, Script, Shard};
use synonym_finder::pipeline::{self, DataPaths, ReadOptions};
use synonym_finder::{QueryParams, SpaceConfig, TfidfSpace, query_all, write_results};
use tempfile::TempDir;

const DATA_FILES: [&str; 4] = [
    "la.lexicon.xml",
    "grc.lexicon.xml",
    "la.stem.freq",
    "grc.stem.freq",
];

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../lexicon-db/tests/fixtures")
}

struct Workspace {
    _dir: TempDir,
    data: DataPaths,
    store: Checkpoints,
}

fn workspace(files: &[&str]) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir(&data_dir).unwrap();
    for name in files {
        fs::copy(fixture_dir().join(name), data_dir.join(name)).unwrap();
    }
    let store = Checkpoints::create(dir.path().join("dictionary-data")).unwrap();
    Workspace {
        data: DataPaths::new(data_dir),
        store,
        _dir: dir,
    }
}

fn run_queries(ws: &Workspace, params: &QueryParams, topics: usize) -> Vec<QueryResult> {
    let corpus = pipeline::load_corpus(&ws.store).unwrap();
    let ranks = pipeline::load_ranks(&ws.data).unwrap();
    let space = TfidfSpace::build(corpus.bags(), SpaceConfig { topics });
    query_all(&space, corpus.lookup(), &ranks, params).unwrap()
}

fn top(result: &QueryResult) -> Vec<&str> {
    result.candidates.iter().map(|c| c.lemma.as_str()).collect()
}

const EROS: &str = "ε\u{313}\u{301}ρως";
const LOGOS: &str = "λο\u{301}γος";
const PHILEO: &str = "φιλε\u{301}ω";

#[test]
fn greek_lemmas_find_latin_synonyms() {
    let ws = workspace(&DATA_FILES);
    let corpus = pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    assert_eq!(corpus.len(), 7);
    for name in [names::DEFS_FULL, names::DEFS_BOW, names::LOOKUP_WORD, names::LOOKUP_ID] {
        assert!(ws.store.exists(name), "{name}");
    }

    let results = run_queries(&ws, &QueryParams::default(), 0);
    let queries: Vec<&str> = results.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(queries, vec![EROS, LOGOS, PHILEO]);

    assert_eq!(top(&results[0]), vec!["amor", "amo"]);
    assert_eq!(top(&results[1]), vec!["sermo", "uerbum"]);
    assert_eq!(top(&results[2]), vec!["amo", "amor"]);
    assert!((results[1].candidates[0].score - 1.0).abs() < 1e-5);
    assert!((results[2].candidates[0].score - 1.0).abs() < 1e-5);
    for result in &results {
        assert!(result.candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn latin_lemmas_find_greek_synonyms() {
    let ws = workspace(&DATA_FILES);
    pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    let params = QueryParams {
        query_lang: Script::Latin,
        target_lang: Script::Greek,
        max_results: 1,
        ..QueryParams::default()
    };
    let results = run_queries(&ws, &params, 0);
    let pairs: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.query.as_str(), r.candidates[0].lemma.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("amor", EROS),
            ("amo", PHILEO),
            ("sermo", LOGOS),
            ("uerbum", LOGOS),
        ]
    );
}

#[test]
fn rank_weight_penalises_distant_lemmas() {
    let ws = workspace(&DATA_FILES);
    pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    let params = QueryParams {
        weight: 1.0,
        ..QueryParams::default()
    };
    let results = run_queries(&ws, &params, 0);
    let phileo = results.iter().find(|r| r.query == PHILEO).unwrap();
    assert_eq!(top(phileo), vec!["amo", "amor"]);
    // Rank ln 2 against rank 0.
    assert!((phileo.candidates[0].score - (1.0 - 2f32.ln())).abs() < 1e-4);
}

#[test]
fn shards_split_the_queries() {
    let ws = workspace(&DATA_FILES);
    pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    let all = run_queries(&ws, &QueryParams::default(), 0);

    let mut merged = Vec::new();
    for id in 1..=2 {
        let params = QueryParams {
            shard: Some(Shard::new(id, 2).unwrap()),
            ..QueryParams::default()
        };
        merged.extend(run_queries(&ws, &params, 0));
    }
    assert_eq!(merged.len(), all.len());
    merged.sort_by(|a, b| a.query.cmp(&b.query));
    let mut expected = all.clone();
    expected.sort_by(|a, b| a.query.cmp(&b.query));
    assert_eq!(merged, expected);
}

#[test]
fn results_are_written_one_line_per_query() {
    let ws = workspace(&DATA_FILES);
    pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    let results = run_queries(&ws, &QueryParams::default(), 0);

    let out_path = ws.data.dir().join("trans.csv");
    let mut file = fs::File::create(&out_path).unwrap();
    write_results(&mut file, &results, false).unwrap();
    drop(file);

    let text = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], format!("{LOGOS},sermo,uerbum"));

    let mut scored = Vec::new();
    write_results(&mut scored, &results, true).unwrap();
    let scored = String::from_utf8(scored).unwrap();
    let first = scored.lines().next().unwrap();
    let fields: Vec<&str> = first.split(',').collect();
    assert_eq!(fields[0], EROS);
    let (lemma, score) = fields[1].split_once(':').unwrap();
    assert_eq!(lemma, "amor");
    assert!(score.parse::<f32>().unwrap() > 0.0);
}

#[test]
fn cached_definitions_skip_the_lexica() {
    let ws = workspace(&DATA_FILES);
    let first = pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();

    let freq_only = workspace(&["la.stem.freq", "grc.stem.freq"]);
    let defs = fs::read(ws.store.path(names::DEFS_FULL)).unwrap();
    fs::write(freq_only.store.path(names::DEFS_FULL), defs).unwrap();

    let opts = ReadOptions {
        cache: true,
        ..ReadOptions::default()
    };
    let cached = pipeline::read_lexicon(&freq_only.data, &freq_only.store, opts).unwrap();
    assert_eq!(cached.bags(), first.bags());
    assert_eq!(cached.lookup(), first.lookup());

    let fresh = workspace(&["la.stem.freq", "grc.stem.freq"]);
    assert!(pipeline::read_lexicon(&fresh.data, &fresh.store, ReadOptions::default()).is_err());
}

#[test]
fn stemming_and_matching_still_build_a_corpus() {
    let ws = workspace(&DATA_FILES);
    let opts = ReadOptions {
        stem: true,
        match_frequencies: true,
        ..ReadOptions::default()
    };
    let corpus = pipeline::read_lexicon(&ws.data, &ws.store, opts).unwrap();
    assert_eq!(corpus.len(), 7);
    let amo = corpus.lookup().id("amo").unwrap();
    assert!(corpus.bags()[amo].iter().any(|t| t == "love"));

    let results = run_queries(&ws, &QueryParams::default(), 0);
    assert_eq!(top(&results[1]), vec!["sermo", "uerbum"]);
}

#[test]
fn topic_space_keeps_the_best_pairs() {
    let ws = workspace(&DATA_FILES);
    pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    let params = QueryParams {
        max_results: 1,
        ..QueryParams::default()
    };
    let results = run_queries(&ws, &params, 6);
    let logos = results.iter().find(|r| r.query == LOGOS).unwrap();
    assert_eq!(top(logos), vec!["sermo"]);
    let phileo = results.iter().find(|r| r.query == PHILEO).unwrap();
    assert_eq!(top(phileo), vec!["amo"]);
}

#[test]
fn missing_frequency_tables_stop_the_query() {
    let ws = workspace(&["la.lexicon.xml", "grc.lexicon.xml"]);
    pipeline::read_lexicon(&ws.data, &ws.store, ReadOptions::default()).unwrap();
    let err = pipeline::load_ranks(&ws.data).unwrap_err();
    assert!(err.to_string().contains("la.stem.freq"));
}
