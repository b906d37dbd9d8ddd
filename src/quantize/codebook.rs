//! Vector quantization codebook built with k-means

use crate::error::{ClassifierError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_SEED: u64 = 42;
const MAX_ITERATIONS: usize = 100;

/// Shared symbol alphabet: K centroids over L-dimensional signal vectors
///
/// Fitted once per training run on the union of all classes' vectors, so
/// every class model speaks the same alphabet.
#[derive(Debug, Clone)]
pub struct Codebook {
    /// Centroid matrix (K x L)
    centroids: Array2<f64>,
}

impl Codebook {
    /// Fit centroids with the default seed
    pub fn fit(vectors: &[Array1<f64>], k: usize) -> Result<Self> {
        Self::fit_seeded(vectors, k, DEFAULT_SEED)
    }

    /// Fit `k` centroids to the given vectors
    ///
    /// Runs k-means++ seeding followed by Lloyd iterations until the
    /// assignments stop changing or the iteration cap is reached. The
    /// result is a local optimum, deterministic for a fixed seed and
    /// input order.
    pub fn fit_seeded(vectors: &[Array1<f64>], k: usize, seed: u64) -> Result<Self> {
        if vectors.is_empty() {
            return Err(ClassifierError::EmptyInput("no vectors to cluster"));
        }

        let dim = vectors[0].len();
        if dim == 0 {
            return Err(ClassifierError::EmptyInput("zero-length signal vector"));
        }
        for v in vectors {
            if v.len() != dim {
                return Err(ClassifierError::DimensionMismatch {
                    expected: dim,
                    actual: v.len(),
                });
            }
        }

        if k == 0 || k > vectors.len() {
            return Err(ClassifierError::InvalidConfiguration(format!(
                "cluster count {} must be between 1 and {}",
                k,
                vectors.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = seed_centroids(vectors, k, dim, &mut rng);

        let mut assignments: Vec<usize> =
            vectors.iter().map(|v| nearest(&centroids, v.view())).collect();

        for _ in 0..MAX_ITERATIONS {
            // Recompute each centroid as the mean of its cluster. A cluster
            // with no members keeps its previous centroid.
            let mut sums = Array2::<f64>::zeros((k, dim));
            let mut counts = vec![0usize; k];
            for (v, &cluster) in vectors.iter().zip(assignments.iter()) {
                let mut row = sums.row_mut(cluster);
                row += v;
                counts[cluster] += 1;
            }
            for cluster in 0..k {
                if counts[cluster] > 0 {
                    let mean = sums.row(cluster).mapv(|s| s / counts[cluster] as f64);
                    centroids.row_mut(cluster).assign(&mean);
                }
            }

            let new_assignments: Vec<usize> =
                vectors.iter().map(|v| nearest(&centroids, v.view())).collect();

            if new_assignments == assignments {
                break;
            }
            assignments = new_assignments;
        }

        Ok(Self { centroids })
    }

    /// Create from precomputed centroids
    pub fn from_centroids(centroids: Array2<f64>) -> Result<Self> {
        if centroids.nrows() == 0 || centroids.ncols() == 0 {
            return Err(ClassifierError::InvalidConfiguration(
                "centroid matrix must have at least one row and column".to_string(),
            ));
        }
        Ok(Self { centroids })
    }

    /// Map a signal vector to the index of its nearest centroid
    ///
    /// Exact distance ties go to the lowest centroid index.
    pub fn nearest_symbol(&self, vector: &Array1<f64>) -> Result<usize> {
        if vector.len() != self.dimension() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            });
        }
        Ok(nearest(&self.centroids, vector.view()))
    }

    /// Size of the symbol alphabet
    pub fn symbol_count(&self) -> usize {
        self.centroids.nrows()
    }

    /// Signal vector length the codebook was fitted on
    pub fn dimension(&self) -> usize {
        self.centroids.ncols()
    }

    /// Centroid matrix (K x L)
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }
}

/// Index of the centroid row nearest to `v`, lowest index on ties
fn nearest(centroids: &Array2<f64>, v: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (j, row) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(row, v);
        if dist < best_dist {
            best_dist = dist;
            best = j;
        }
    }
    best
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// k-means++ seeding: first centroid uniform, the rest weighted by the
/// squared distance to the nearest centroid chosen so far
fn seed_centroids(
    vectors: &[Array1<f64>],
    k: usize,
    dim: usize,
    rng: &mut StdRng,
) -> Array2<f64> {
    let mut centroids = Array2::zeros((k, dim));

    let first = rng.gen_range(0..vectors.len());
    centroids.row_mut(0).assign(&vectors[first]);

    let mut dists: Vec<f64> = vectors
        .iter()
        .map(|v| squared_distance(centroids.row(0), v.view()))
        .collect();

    for c in 1..k {
        let total: f64 = dists.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut idx = vectors.len() - 1;
            for (i, &d) in dists.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    idx = i;
                    break;
                }
            }
            idx
        } else {
            // All remaining points coincide with a chosen centroid
            rng.gen_range(0..vectors.len())
        };
        centroids.row_mut(c).assign(&vectors[chosen]);

        for (i, v) in vectors.iter().enumerate() {
            let d = squared_distance(centroids.row(c), v.view());
            if d < dists[i] {
                dists[i] = d;
            }
        }
    }

    centroids
}
