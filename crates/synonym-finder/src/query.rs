use bitvec::prelude::*;
use lexicon_db::{Lookup, RankTable};
use lexicon_types::{Candidate, QueryResult, Script, Shard};
use thiserror::Error;
use tracing::{debug, info};

use crate::space::VectorSpace;

type BitSet = BitVec<usize, Lsb0>;

#[derive(Clone, Copy, Debug)]
pub struct QueryParams {
    /// Lemmas to find candidates for.
    pub query_lang: Script,
    /// Lemmas allowed as candidates.
    pub target_lang: Script,
    pub max_results: usize,
    /// Penalty per unit of rank distance; 0 disables it.
    pub weight: f64,
    /// Process only this part of the query indices.
    pub shard: Option<Shard>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            query_lang: Script::Greek,
            target_lang: Script::Latin,
            max_results: 2,
            weight: 0.0,
            shard: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("vector space has {space} documents but the lookup has {lookup} lemmas")]
    SizeMismatch { space: usize, lookup: usize },
}

/// `sim - |rank_q - rank_c| * weight`.
pub fn adjusted_score(sim: f32, query_rank: f64, candidate_rank: f64, weight: f64) -> f32 {
    (sim as f64 - (query_rank - candidate_rank).abs() * weight) as f32
}

/// Ranked candidates for every query lemma, in query index order.
pub fn query_all(
    space: &dyn VectorSpace,
    lookup: &Lookup,
    ranks: &RankTable,
    params: &QueryParams,
) -> Result<Vec<QueryResult>, QueryError> {
    let mut results = Vec::new();
    for_each_result(space, lookup, ranks, params, |r| {
        results.push(r);
        Ok::<_, QueryError>(())
    })?;
    Ok(results)
}

/// Stream ranked candidates to `emit` one query at a time.
///
/// Only one similarity row is held at once. Returns the number of queries
/// processed.
pub fn for_each_result<F, E>(
    space: &dyn VectorSpace,
    lookup: &Lookup,
    ranks: &RankTable,
    params: &QueryParams,
    mut emit: F,
) -> Result<usize, E>
where
    F: FnMut(QueryResult) -> Result<(), E>,
    E: From<QueryError>,
{
    if space.len() != lookup.len() {
        return Err(QueryError::SizeMismatch {
            space: space.len(),
            lookup: lookup.len(),
        }
        .into());
    }

    let rank_by_id: Vec<Option<f64>> = lookup.iter().map(|(_, lemma)| ranks.get(lemma)).collect();

    let mut eligible: BitSet = BitVec::repeat(false, lookup.len());
    for (id, lemma) in lookup.iter() {
        if rank_by_id[id].is_some() && params.target_lang.matches(lemma) {
            eligible.set(id, true);
        }
    }
    info!(
        "{} of {} lemmas are {} candidates",
        eligible.count_ones(),
        lookup.len(),
        params.target_lang
    );

    let mut processed = 0usize;
    for (q, query) in lookup.iter() {
        if params.shard.is_some_and(|s| !s.contains(q)) {
            continue;
        }
        if !params.query_lang.matches(query) {
            continue;
        }
        let Some(query_rank) = rank_by_id[q] else {
            continue;
        };

        let row = space.similarities(q);
        let mut candidates: Vec<(usize, f32)> = eligible
            .iter_ones()
            .filter(|&c| c != q)
            .filter_map(|c| {
                let rank = rank_by_id[c]?;
                Some((c, adjusted_score(row[c], query_rank, rank, params.weight)))
            })
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(params.max_results);

        let candidates = candidates
            .into_iter()
            .filter_map(|(c, score)| {
                lookup.lemma(c).map(|lemma| Candidate {
                    lemma: lemma.to_string(),
                    score,
                })
            })
            .collect();
        emit(QueryResult {
            query: query.to_string(),
            candidates,
        })?;
        processed += 1;
        if processed % 1000 == 0 {
            debug!("{processed} queries done");
        }
    }
    info!("{processed} queries processed");
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed similarity matrix.
    struct Matrix(Vec<Vec<f32>>);

    impl VectorSpace for Matrix {
        fn len(&self) -> usize {
            self.0.len()
        }

        fn similarities(&self, doc: usize) -> Vec<f32> {
            self.0[doc].clone()
        }
    }

    fn lookup(lemmas: &[&str]) -> Lookup {
        Lookup::from_ids(lemmas.iter().map(|l| l.to_string()).collect()).unwrap()
    }

    fn ranks(entries: &[(&str, f64)]) -> RankTable {
        entries.iter().map(|(l, r)| (l.to_string(), *r)).collect()
    }

    fn lemmas(result: &QueryResult) -> Vec<&str> {
        result.candidates.iter().map(|c| c.lemma.as_str()).collect()
    }

    #[test]
    fn rank_penalty_is_subtracted() {
        let score = adjusted_score(0.9, 2.0, 0.5, 1.0);
        assert!((score - -0.6).abs() < 1e-6);
        assert_eq!(adjusted_score(0.9, 2.0, 0.5, 0.0), 0.9);
    }

    #[test]
    fn candidates_come_from_the_target_script_only() {
        let lookup = lookup(&["λογος", "uerbum", "sermo", "ρημα"]);
        let ranks = ranks(&[("λογος", 0.0), ("uerbum", 1.0), ("sermo", 2.0), ("ρημα", 1.0)]);
        let space = Matrix(vec![
            vec![1.0, 0.5, 0.7, 0.9],
            vec![0.5, 1.0, 0.2, 0.1],
            vec![0.7, 0.2, 1.0, 0.3],
            vec![0.9, 0.1, 0.3, 1.0],
        ]);
        let results = query_all(&space, &lookup, &ranks, &QueryParams::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].query, "λογος");
        assert_eq!(lemmas(&results[0]), vec!["sermo", "uerbum"]);
        assert_eq!(results[0].candidates[0].score, 0.7);
        assert_eq!(results[1].query, "ρημα");
        assert_eq!(lemmas(&results[1]), vec!["sermo", "uerbum"]);
    }

    #[test]
    fn query_is_never_its_own_candidate() {
        let lookup = lookup(&["a", "b", "c"]);
        let ranks = ranks(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);
        let space = Matrix(vec![vec![1.0, 0.2, 0.1]; 3]);
        let params = QueryParams {
            query_lang: Script::Latin,
            target_lang: Script::Latin,
            max_results: 5,
            ..QueryParams::default()
        };
        let results = query_all(&space, &lookup, &ranks, &params).unwrap();
        assert_eq!(lemmas(&results[0]), vec!["b", "c"]);
        // Earlier queries stay available to later ones.
        assert_eq!(lemmas(&results[1]), vec!["a", "c"]);
        assert_eq!(lemmas(&results[2]), vec!["a", "b"]);
    }

    #[test]
    fn unranked_lemmas_are_neither_queries_nor_candidates() {
        let lookup = lookup(&["λογος", "uerbum", "sermo", "ρημα"]);
        let ranks = ranks(&[("λογος", 0.0), ("uerbum", 1.0)]);
        let space = Matrix(vec![vec![0.5; 4]; 4]);
        let results = query_all(&space, &lookup, &ranks, &QueryParams::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(lemmas(&results[0]), vec!["uerbum"]);
    }

    #[test]
    fn weight_reorders_by_rank_distance() {
        let lookup = lookup(&["λογος", "uerbum", "sermo"]);
        let ranks = ranks(&[("λογος", 2.0), ("uerbum", 0.5), ("sermo", 2.0)]);
        let space = Matrix(vec![vec![1.0, 0.9, 0.5]; 3]);
        let unweighted = query_all(&space, &lookup, &ranks, &QueryParams::default()).unwrap();
        assert_eq!(lemmas(&unweighted[0]), vec!["uerbum", "sermo"]);

        let params = QueryParams {
            weight: 1.0,
            ..QueryParams::default()
        };
        let weighted = query_all(&space, &lookup, &ranks, &params).unwrap();
        assert_eq!(lemmas(&weighted[0]), vec!["sermo", "uerbum"]);
        assert_eq!(weighted[0].candidates[0].score, 0.5);
        assert!((weighted[0].candidates[1].score - -0.6).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_engine_order_and_results_are_truncated() {
        let lookup = lookup(&["λογος", "d", "c", "b", "a"]);
        let ranks: RankTable = ["λογος", "d", "c", "b", "a"]
            .iter()
            .map(|l| (l.to_string(), 0.0))
            .collect();
        let space = Matrix(vec![vec![1.0, 0.4, 0.4, 0.9, 0.4]; 5]);
        let params = QueryParams {
            max_results: 3,
            ..QueryParams::default()
        };
        let results = query_all(&space, &lookup, &ranks, &params).unwrap();
        assert_eq!(lemmas(&results[0]), vec!["b", "d", "c"]);
    }

    #[test]
    fn shards_partition_the_queries() {
        let names: Vec<String> = (0..10).map(|i| format!("w{i}")).collect();
        let lookup = Lookup::from_ids(names.clone()).unwrap();
        let ranks: RankTable = names.iter().map(|n| (n.clone(), 0.0)).collect();
        let space = Matrix(vec![vec![0.0; 10]; 10]);
        let base = QueryParams {
            query_lang: Script::Latin,
            target_lang: Script::Latin,
            ..QueryParams::default()
        };

        let mut seen = Vec::new();
        for id in 1..=3 {
            let params = QueryParams {
                shard: Some(Shard::new(id, 3).unwrap()),
                ..base
            };
            for r in query_all(&space, &lookup, &ranks, &params).unwrap() {
                let q = lookup.id(&r.query).unwrap();
                assert_eq!(q % 3, id % 3);
                seen.push(q);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn any_target_accepts_both_scripts() {
        let lookup = lookup(&["λογος", "uerbum", "ρημα"]);
        let ranks = ranks(&[("λογος", 0.0), ("uerbum", 0.0), ("ρημα", 0.0)]);
        let space = Matrix(vec![vec![1.0, 0.2, 0.8]; 3]);
        let params = QueryParams {
            target_lang: Script::Any,
            ..QueryParams::default()
        };
        let results = query_all(&space, &lookup, &ranks, &params).unwrap();
        assert_eq!(lemmas(&results[0]), vec!["ρημα", "uerbum"]);
    }

    #[test]
    fn mismatched_space_is_rejected() {
        let lookup = lookup(&["a", "b"]);
        let space = Matrix(vec![vec![1.0]]);
        let err = query_all(&space, &lookup, &RankTable::default(), &QueryParams::default())
            .unwrap_err();
        assert!(matches!(err, QueryError::SizeMismatch { space: 1, lookup: 2 }));
    }

    #[test]
    fn emit_errors_stop_the_run() {
        let lookup = lookup(&["λογος", "ρημα", "uerbum"]);
        let ranks = ranks(&[("λογος", 0.0), ("ρημα", 0.0), ("uerbum", 0.0)]);
        let space = Matrix(vec![vec![0.0; 3]; 3]);
        let mut calls = 0;
        let err = for_each_result(&space, &lookup, &ranks, &QueryParams::default(), |_| {
            calls += 1;
            Err::<(), _>(QueryError::SizeMismatch { space: 0, lookup: 0 })
        })
        .unwrap_err();
        assert!(matches!(err, QueryError::SizeMismatch { .. }));
        assert_eq!(calls, 1);
    }
}
