//! Discrete-output hidden Markov class model

use super::algorithms::{forward, forward_backward};
use crate::error::{ClassifierError, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_TOL: f64 = 1e-4;
const DEFAULT_SEED: u64 = 42;

/// Hidden Markov model over a discrete symbol alphabet
///
/// One model is trained per rhythm class. Construction gives uniform
/// parameters, so an untrained model can already score sequences (every
/// length-T sequence gets exactly `-T * ln(n_symbols)`). Training
/// re-initializes from the seed and re-estimates in place.
#[derive(Debug, Clone)]
pub struct ClassModel {
    /// Initial state probabilities (N)
    pub initial_probs: Array1<f64>,
    /// State transition matrix (N x N)
    pub transition_matrix: Array2<f64>,
    /// Symbol emission matrix (N x K)
    pub emission_matrix: Array2<f64>,
    /// Training log-likelihood history, one entry per EM iteration
    pub log_likelihood_history: Vec<f64>,
    /// Convergence tolerance
    pub tol: f64,
    seed: u64,
}

impl ClassModel {
    /// Create an untrained model with uniform parameters
    ///
    /// `n_states` and `n_symbols` must both be at least 1; the builder
    /// layer rejects zero values before models are constructed.
    pub fn new(n_states: usize, n_symbols: usize) -> Self {
        Self {
            initial_probs: Array1::from_elem(n_states, 1.0 / n_states as f64),
            transition_matrix: Array2::from_elem(
                (n_states, n_states),
                1.0 / n_states as f64,
            ),
            emission_matrix: Array2::from_elem(
                (n_states, n_symbols),
                1.0 / n_symbols as f64,
            ),
            log_likelihood_history: vec![],
            tol: DEFAULT_TOL,
            seed: DEFAULT_SEED,
        }
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the seed for training re-initialization
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of hidden states
    pub fn n_states(&self) -> usize {
        self.initial_probs.len()
    }

    /// Size of the symbol alphabet
    pub fn n_symbols(&self) -> usize {
        self.emission_matrix.ncols()
    }

    /// Fit the model to symbol sequences using Baum-Welch (EM)
    ///
    /// Parameters are re-initialized from the seed, then re-estimated
    /// until the total log-likelihood improves by less than `tol` or
    /// `max_iterations` is reached. Stopping at the cap is not an error;
    /// the parameters of the last iteration are kept.
    ///
    /// # Returns
    /// Final total log-likelihood over all sequences
    pub fn train(&mut self, sequences: &[Vec<usize>], max_iterations: usize) -> Result<f64> {
        if sequences.is_empty() {
            return Err(ClassifierError::EmptyInput("no training sequences"));
        }
        for sequence in sequences {
            self.validate_sequence(sequence)?;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.randomize(&mut rng);

        self.log_likelihood_history.clear();
        let mut prev_ll = f64::NEG_INFINITY;

        let n = self.n_states();
        let k = self.n_symbols();

        for iter in 0..max_iterations {
            // E-step: accumulate expected counts across all sequences
            let mut pi_num = Array1::<f64>::zeros(n);
            let mut trans_num = Array2::<f64>::zeros((n, n));
            let mut trans_den = Array1::<f64>::zeros(n);
            let mut emis_num = Array2::<f64>::zeros((n, k));
            let mut emis_den = Array1::<f64>::zeros(n);
            let mut total_ll = 0.0;

            for sequence in sequences {
                let (gamma, xi_sum, log_ll) = forward_backward(
                    sequence,
                    &self.initial_probs,
                    &self.transition_matrix,
                    &self.emission_matrix,
                );
                total_ll += log_ll;

                let t = sequence.len();
                for i in 0..n {
                    pi_num[i] += gamma[[0, i]];
                }
                for i in 0..n {
                    for j in 0..n {
                        trans_num[[i, j]] += xi_sum[[i, j]];
                    }
                }
                for t_idx in 0..t {
                    for i in 0..n {
                        let g = gamma[[t_idx, i]];
                        if t_idx + 1 < t {
                            trans_den[i] += g;
                        }
                        emis_num[[i, sequence[t_idx]]] += g;
                        emis_den[i] += g;
                    }
                }
            }

            // M-step: renormalize the accumulated counts
            let pi_total = pi_num.sum();
            if pi_total > 1e-300 {
                self.initial_probs = pi_num.mapv(|p| p / pi_total);
            } else {
                self.initial_probs = Array1::from_elem(n, 1.0 / n as f64);
            }

            for i in 0..n {
                if trans_den[i] > 1e-300 {
                    for j in 0..n {
                        self.transition_matrix[[i, j]] = trans_num[[i, j]] / trans_den[i];
                    }
                } else {
                    // State never left; keep a uniform row
                    for j in 0..n {
                        self.transition_matrix[[i, j]] = 1.0 / n as f64;
                    }
                }
                normalize_row(&mut self.transition_matrix, i);
            }

            for i in 0..n {
                if emis_den[i] > 1e-300 {
                    for s in 0..k {
                        self.emission_matrix[[i, s]] = emis_num[[i, s]] / emis_den[i];
                    }
                } else {
                    // State never occupied; keep a uniform row
                    for s in 0..k {
                        self.emission_matrix[[i, s]] = 1.0 / k as f64;
                    }
                }
                normalize_row(&mut self.emission_matrix, i);
            }

            self.log_likelihood_history.push(total_ll);

            // Check convergence
            if (total_ll - prev_ll).abs() < self.tol {
                tracing::info!("Converged after {} iterations", iter + 1);
                break;
            }

            prev_ll = total_ll;

            if (iter + 1) % 10 == 0 {
                tracing::debug!("Iteration {}: log-likelihood = {:.4}", iter + 1, total_ll);
            }
        }

        Ok(*self.log_likelihood_history.last().unwrap_or(&0.0))
    }

    /// Log-likelihood of a symbol sequence under the current parameters
    pub fn evaluate(&self, sequence: &[usize]) -> Result<f64> {
        self.validate_sequence(sequence)?;

        Ok(forward(
            sequence,
            &self.initial_probs,
            &self.transition_matrix,
            &self.emission_matrix,
        ))
    }

    fn validate_sequence(&self, sequence: &[usize]) -> Result<()> {
        if sequence.is_empty() {
            return Err(ClassifierError::EmptyInput("empty symbol sequence"));
        }
        let k = self.n_symbols();
        for &symbol in sequence {
            if symbol >= k {
                return Err(ClassifierError::SymbolOutOfRange {
                    symbol,
                    alphabet: k,
                });
            }
        }
        Ok(())
    }

    /// Random re-initialization: near-uniform initial probabilities, a
    /// diagonally dominant transition matrix, and near-uniform emissions
    fn randomize(&mut self, rng: &mut StdRng) {
        let n = self.n_states();
        let k = self.n_symbols();

        let mut initial = Array1::zeros(n);
        for i in 0..n {
            initial[i] = rng.gen::<f64>() + 0.1;
        }
        let sum = initial.sum();
        self.initial_probs = initial.mapv(|p| p / sum);

        let mut transition = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    transition[[i, j]] = 0.8 + rng.gen::<f64>() * 0.15;
                } else {
                    transition[[i, j]] = rng.gen::<f64>() * 0.1;
                }
            }
        }
        self.transition_matrix = transition;
        for i in 0..n {
            normalize_row(&mut self.transition_matrix, i);
        }

        let mut emission = Array2::zeros((n, k));
        for i in 0..n {
            for s in 0..k {
                emission[[i, s]] = rng.gen::<f64>() + 0.1;
            }
        }
        self.emission_matrix = emission;
        for i in 0..n {
            normalize_row(&mut self.emission_matrix, i);
        }
    }
}

/// Normalize one matrix row to sum to 1
fn normalize_row(matrix: &mut Array2<f64>, row: usize) {
    let row_sum: f64 = matrix.row(row).sum();
    if row_sum > 1e-300 {
        for j in 0..matrix.ncols() {
            matrix[[row, j]] /= row_sum;
        }
    }
}
