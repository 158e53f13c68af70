//! Vector spaces over token bags.
//!
//! The query engine only needs one dense similarity row per document, aligned
//! with the input order. [`TfidfSpace`] provides it from TF-IDF weights and
//! cosine similarity, optionally after projecting every document onto a small
//! number of latent topics (LSI).

use std::collections::HashMap;

use indexmap::IndexMap;
use ndarray::{Array2, Axis};
use tracing::{debug, info};

/// Anything that can score one document against all the others.
pub trait VectorSpace {
    /// Number of documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Similarity of `doc` to every document, position `i` for document `i`.
    fn similarities(&self, doc: usize) -> Vec<f32>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SpaceConfig {
    /// Latent topics to keep; 0 keeps the full TF-IDF space.
    pub topics: usize,
}

const LSI_ITERATIONS: usize = 24;

type SparseVec = Vec<(usize, f64)>;

#[derive(Debug)]
enum Vectors {
    /// Unit TF-IDF vectors plus the term → (doc, weight) index used to score them.
    Sparse {
        docs: Vec<SparseVec>,
        postings: Vec<Vec<(usize, f64)>>,
    },
    /// Unit rows in topic space, documents × topics.
    Topics(Array2<f64>),
}

/// TF-IDF weighted bags with cosine similarity.
///
/// Term weight is `tf * log2(n_docs / df)`; every document vector is scaled to
/// unit length, so cosine is a plain dot product. A document whose terms all
/// occur everywhere ends up as the zero vector and scores 0 against everything.
#[derive(Debug)]
pub struct TfidfSpace {
    terms: usize,
    vectors: Vectors,
}

impl TfidfSpace {
    pub fn build<B: AsRef<[String]>>(bags: &[B], config: SpaceConfig) -> Self {
        let mut dictionary: IndexMap<&str, usize> = IndexMap::new();
        let mut counted: Vec<Vec<(usize, f64)>> = Vec::with_capacity(bags.len());
        for bag in bags {
            let mut tf: HashMap<usize, f64> = HashMap::new();
            for token in bag.as_ref() {
                let next = dictionary.len();
                let id = *dictionary.entry(token.as_str()).or_insert(next);
                *tf.entry(id).or_default() += 1.0;
            }
            let mut tf: Vec<(usize, f64)> = tf.into_iter().collect();
            tf.sort_unstable_by_key(|&(id, _)| id);
            counted.push(tf);
        }

        let terms = dictionary.len();
        let mut df = vec![0usize; terms];
        for doc in &counted {
            for &(id, _) in doc {
                df[id] += 1;
            }
        }
        let n_docs = bags.len() as f64;
        let idf: Vec<f64> = df.iter().map(|&d| (n_docs / d as f64).log2()).collect();

        let docs: Vec<SparseVec> = counted
            .into_iter()
            .map(|doc| {
                let weighted: SparseVec = doc
                    .into_iter()
                    .map(|(id, tf)| (id, tf * idf[id]))
                    .filter(|&(_, w)| w.abs() > 1e-12)
                    .collect();
                normalized_sparse(weighted)
            })
            .collect();
        info!("tf-idf space: {} documents, {} terms", docs.len(), terms);

        let vectors = if config.topics > 0 {
            Vectors::Topics(project_topics(&docs, terms, config.topics))
        } else {
            let mut postings = vec![Vec::new(); terms];
            for (doc_id, doc) in docs.iter().enumerate() {
                for &(term, w) in doc {
                    postings[term].push((doc_id, w));
                }
            }
            Vectors::Sparse { docs, postings }
        };
        Self { terms, vectors }
    }

    /// Size of the token dictionary.
    pub fn terms(&self) -> usize {
        self.terms
    }

    /// Dimensions of the topic space, if one was built.
    pub fn topics(&self) -> Option<usize> {
        match &self.vectors {
            Vectors::Topics(docs) => Some(docs.ncols()),
            Vectors::Sparse { .. } => None,
        }
    }
}

impl VectorSpace for TfidfSpace {
    fn len(&self) -> usize {
        match &self.vectors {
            Vectors::Sparse { docs, .. } => docs.len(),
            Vectors::Topics(docs) => docs.nrows(),
        }
    }

    fn similarities(&self, doc: usize) -> Vec<f32> {
        match &self.vectors {
            Vectors::Sparse { docs, postings } => {
                let mut row = vec![0f64; docs.len()];
                for &(term, w) in &docs[doc] {
                    for &(other, v) in &postings[term] {
                        row[other] += w * v;
                    }
                }
                row.into_iter().map(|s| s as f32).collect()
            }
            Vectors::Topics(docs) => docs
                .dot(&docs.row(doc))
                .iter()
                .map(|&s| s as f32)
                .collect(),
        }
    }
}

fn normalized_sparse(mut v: SparseVec) -> SparseVec {
    let norm = v.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut v {
            *w /= norm;
        }
    }
    v
}

/// Project unit TF-IDF vectors onto the top `k` left singular vectors of the
/// term × document matrix, found by subspace iteration on `A·Aᵀ`.
///
/// Returns one unit row per document (documents × topics).
fn project_topics(docs: &[SparseVec], terms: usize, k: usize) -> Array2<f64> {
    let k = k.min(terms).min(docs.len());
    if k < 1 {
        return Array2::zeros((docs.len(), 0));
    }

    // Deterministic, well-spread starting basis (terms × k).
    let mut basis = Array2::from_shape_fn((terms, k), |(t, j)| {
        ((t * k + j + 1) as f64 * 0.618_033_988_749_895).fract() - 0.5
    });
    orthonormalize(&mut basis);

    for _ in 0..LSI_ITERATIONS {
        // Y = Aᵀ·Q (documents × k), then Z = A·Y (terms × k).
        let y = doc_coordinates(docs, &basis);
        let mut next = Array2::<f64>::zeros((terms, k));
        for (doc, coords) in docs.iter().zip(y.rows()) {
            for &(term, w) in doc {
                next.row_mut(term).scaled_add(w, &coords);
            }
        }
        orthonormalize(&mut next);
        basis = next;
    }
    debug!("lsi: {} topics over {} terms", k, terms);

    let projected = doc_coordinates(docs, &basis);
    let norms = projected.map_axis(Axis(1), |row| {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 { norm } else { 1.0 }
    });
    let projected = projected / &norms.insert_axis(Axis(1));
    info!("projected {} documents onto {} topics", projected.nrows(), k);
    projected
}

/// `Aᵀ·basis` for sparse document columns.
fn doc_coordinates(docs: &[SparseVec], basis: &Array2<f64>) -> Array2<f64> {
    let mut coords = Array2::<f64>::zeros((docs.len(), basis.ncols()));
    for (doc, mut row) in docs.iter().zip(coords.rows_mut()) {
        for &(term, w) in doc {
            row.scaled_add(w, &basis.row(term));
        }
    }
    coords
}

/// Modified Gram-Schmidt over columns; columns that collapse are zeroed.
fn orthonormalize(q: &mut Array2<f64>) {
    for i in 0..q.ncols() {
        let (done, mut rest) = q.view_mut().split_at(Axis(1), i);
        let mut col = rest.column_mut(0);
        for prev in done.columns() {
            let proj = col.dot(&prev);
            col.scaled_add(-proj, &prev);
        }
        let norm = col.dot(&col).sqrt();
        if norm > 1e-10 {
            col /= norm;
        } else {
            col.fill(0.0);
        }
    }
}
