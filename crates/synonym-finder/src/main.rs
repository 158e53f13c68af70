use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lexicon_db::Checkpoints;
use lexicon_types::{Script, Shard};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use synonym_finder::pipeline::{self, DataPaths, ReadOptions};
use synonym_finder::{QueryParams, SpaceConfig, TfidfSpace, for_each_result, write_result};

#[derive(Parser)]
#[command(name = "synonyms")]
#[command(about = "Greek/Latin synonym candidates from dictionary definitions")]
struct Cli {
    /// Directory holding the lexica and frequency tables.
    #[arg(long, global = true, env = "SYNONYMS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Directory for intermediate checkpoints.
    #[arg(long, global = true, env = "SYNONYMS_WORK_DIR", default_value = "dictionary-data")]
    work_dir: PathBuf,
    /// Only log warnings and errors.
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the lexica into a bag-of-words corpus.
    ReadLexicon(ReadLexiconArgs),
    /// Rank candidate synonyms for every query lemma.
    Query(QueryArgs),
}

#[derive(Args)]
struct ReadLexiconArgs {
    /// Use the cached definitions instead of re-reading the lexica.
    #[arg(short, long, default_value_t = false)]
    cache: bool,
    /// Apply the Porter2 stemmer to definitions.
    #[arg(short, long, default_value_t = false)]
    stem: bool,
    /// Keep only lemmas found in the frequency tables.
    #[arg(short, long = "match", default_value_t = false)]
    match_frequencies: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Language to translate from.
    #[arg(short, long, value_name = "LANG", default_value = "greek", value_parser = parse_query_lang)]
    query: Script,
    /// Language to translate to.
    #[arg(short, long, value_name = "LANG", default_value = "latin")]
    corpus: Script,
    /// Destination file.
    #[arg(short, long, value_name = "FILE", default_value = "trans.csv")]
    output: PathBuf,
    /// Reduce to N topics using LSI; 0 disables.
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    topics: usize,
    /// Max number of results for each query.
    #[arg(short, long, value_name = "N", default_value_t = 2, value_parser = parse_results)]
    results: usize,
    /// Penalise candidates by log-rank distance times F.
    #[arg(short, long, value_name = "F", default_value_t = 0.0, value_parser = parse_weight)]
    weight: f64,
    /// Only process shard I of N.
    #[arg(long, value_name = "I:N")]
    child: Option<Shard>,
    /// Write candidate lemmas without their scores.
    #[arg(long, default_value_t = false)]
    no_scores: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let paths = DataPaths::new(&cli.data_dir);
    match cli.command {
        Commands::ReadLexicon(args) => read_lexicon(&paths, &cli.work_dir, args),
        Commands::Query(args) => query(&paths, &cli.work_dir, args),
    }
}

fn read_lexicon(paths: &DataPaths, work_dir: &Path, args: ReadLexiconArgs) -> Result<()> {
    let start = Instant::now();
    let store = Checkpoints::create(work_dir)
        .with_context(|| format!("preparing {}", work_dir.display()))?;
    let opts = ReadOptions {
        cache: args.cache,
        stem: args.stem,
        match_frequencies: args.match_frequencies,
    };
    let corpus = pipeline::read_lexicon(paths, &store, opts).context("building corpus")?;
    info!(
        "{} lemmas indexed in {} ms",
        corpus.len(),
        start.elapsed().as_millis()
    );
    Ok(())
}

fn query(paths: &DataPaths, work_dir: &Path, args: QueryArgs) -> Result<()> {
    if let Some(shard) = args.child {
        info!("running as child {shard}");
    }
    let store = Checkpoints::open(work_dir)
        .with_context(|| format!("no corpus in {}; run read-lexicon first", work_dir.display()))?;
    let corpus = pipeline::load_corpus(&store).context("loading corpus")?;
    let ranks = pipeline::load_ranks(paths).context("loading frequency ranks")?;

    let start = Instant::now();
    let space = TfidfSpace::build(corpus.bags(), SpaceConfig {
        topics: args.topics,
    });
    info!("vector space built in {} ms", start.elapsed().as_millis());

    let params = QueryParams {
        query_lang: args.query,
        target_lang: args.corpus,
        max_results: args.results,
        weight: args.weight,
        shard: args.child,
    };
    info!(
        "translating {} to {}, writing {}",
        params.query_lang,
        params.target_lang,
        args.output.display()
    );

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    let with_scores = !args.no_scores;
    let written = for_each_result(&space, corpus.lookup(), &ranks, &params, |result| {
        write_result(&mut out, &result, with_scores)
            .with_context(|| format!("writing {}", args.output.display()))
    })?;
    out.flush()
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("{} queries written to {}", written, args.output.display());
    Ok(())
}

fn parse_query_lang(raw: &str) -> Result<Script, String> {
    match raw.parse::<Script>()? {
        Script::Any => Err("query language must be greek or latin".to_string()),
        script => Ok(script),
    }
}

fn parse_results(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_weight(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(w) if w.is_finite() && w >= 0.0 => Ok(w),
        Ok(_) => Err("must be a non-negative number".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new(default));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
