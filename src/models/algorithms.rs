//! HMM algorithms: scaled Forward and Forward-Backward over discrete emissions

use ndarray::{Array1, Array2};

/// Emission probabilities for every time step (T x N)
///
/// Symbols must lie in `[0, emission_matrix.ncols())`; callers validate
/// sequences before invoking the passes.
fn emission_probs(sequence: &[usize], emission_matrix: &Array2<f64>) -> Array2<f64> {
    let t = sequence.len();
    let n = emission_matrix.nrows();

    let mut probs = Array2::zeros((t, n));
    for (t_idx, &symbol) in sequence.iter().enumerate() {
        for j in 0..n {
            probs[[t_idx, j]] = emission_matrix[[j, symbol]];
        }
    }
    probs
}

/// Scaled forward pass
///
/// # Returns
/// (alpha, scale, log_likelihood)
/// - alpha: scaled forward probabilities (T x N)
/// - scale: per-step normalizers (T)
/// - log_likelihood: log P(sequence | model)
fn scaled_forward(
    sequence: &[usize],
    initial_probs: &Array1<f64>,
    transition_matrix: &Array2<f64>,
    emission_matrix: &Array2<f64>,
) -> (Array2<f64>, Array1<f64>, f64) {
    let t = sequence.len();
    let n = initial_probs.len();

    if t == 0 {
        return (Array2::zeros((0, n)), Array1::zeros(0), 0.0);
    }

    let emissions = emission_probs(sequence, emission_matrix);

    let mut alpha = Array2::zeros((t, n));
    let mut scale = Array1::zeros(t);

    // Initialization
    for j in 0..n {
        alpha[[0, j]] = initial_probs[j] * emissions[[0, j]];
    }
    scale[0] = alpha.row(0).sum();
    if scale[0] > 1e-300 {
        for j in 0..n {
            alpha[[0, j]] /= scale[0];
        }
    }

    // Recursion
    for t_idx in 1..t {
        for j in 0..n {
            let mut sum = 0.0;
            for i in 0..n {
                sum += alpha[[t_idx - 1, i]] * transition_matrix[[i, j]];
            }
            alpha[[t_idx, j]] = sum * emissions[[t_idx, j]];
        }

        scale[t_idx] = alpha.row(t_idx).sum();
        if scale[t_idx] > 1e-300 {
            for j in 0..n {
                alpha[[t_idx, j]] /= scale[t_idx];
            }
        }
    }

    let log_likelihood: f64 = scale.iter().map(|s| (s + 1e-300).ln()).sum();

    (alpha, scale, log_likelihood)
}

/// Log-likelihood of a symbol sequence under the model
pub fn forward(
    sequence: &[usize],
    initial_probs: &Array1<f64>,
    transition_matrix: &Array2<f64>,
    emission_matrix: &Array2<f64>,
) -> f64 {
    let (_, _, log_likelihood) =
        scaled_forward(sequence, initial_probs, transition_matrix, emission_matrix);
    log_likelihood
}

/// Forward-Backward pass producing the expected counts one EM step needs
///
/// # Returns
/// (gamma, xi_sum, log_likelihood)
/// - gamma: posterior state probabilities (T x N)
/// - xi_sum: expected transition counts summed over time (N x N)
/// - log_likelihood: log P(sequence | model)
pub fn forward_backward(
    sequence: &[usize],
    initial_probs: &Array1<f64>,
    transition_matrix: &Array2<f64>,
    emission_matrix: &Array2<f64>,
) -> (Array2<f64>, Array2<f64>, f64) {
    let t = sequence.len();
    let n = initial_probs.len();

    if t == 0 {
        return (Array2::zeros((0, n)), Array2::zeros((n, n)), 0.0);
    }

    let emissions = emission_probs(sequence, emission_matrix);
    let (alpha, scale, log_likelihood) =
        scaled_forward(sequence, initial_probs, transition_matrix, emission_matrix);

    // Backward pass
    let mut beta = Array2::zeros((t, n));

    // Initialization
    for j in 0..n {
        beta[[t - 1, j]] = 1.0;
    }

    // Recursion
    for t_idx in (0..t - 1).rev() {
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..n {
                sum += transition_matrix[[i, j]]
                    * emissions[[t_idx + 1, j]]
                    * beta[[t_idx + 1, j]];
            }
            beta[[t_idx, i]] = sum;
        }

        // Scale with the forward normalizers
        if scale[t_idx + 1] > 1e-300 {
            for i in 0..n {
                beta[[t_idx, i]] /= scale[t_idx + 1];
            }
        }
    }

    // Gamma (posterior state probabilities)
    let mut gamma = Array2::zeros((t, n));
    for t_idx in 0..t {
        let mut sum = 0.0;
        for j in 0..n {
            gamma[[t_idx, j]] = alpha[[t_idx, j]] * beta[[t_idx, j]];
            sum += gamma[[t_idx, j]];
        }
        if sum > 1e-300 {
            for j in 0..n {
                gamma[[t_idx, j]] /= sum;
            }
        }
    }

    // Xi summed over time: expected transition counts
    let mut xi_sum = Array2::zeros((n, n));
    for t_idx in 0..t - 1 {
        let mut normalizer = 0.0;
        let mut step = Array2::zeros((n, n));

        for i in 0..n {
            for j in 0..n {
                let xi_ij = alpha[[t_idx, i]]
                    * transition_matrix[[i, j]]
                    * emissions[[t_idx + 1, j]]
                    * beta[[t_idx + 1, j]];
                step[[i, j]] = xi_ij;
                normalizer += xi_ij;
            }
        }

        if normalizer > 1e-300 {
            for i in 0..n {
                for j in 0..n {
                    xi_sum[[i, j]] += step[[i, j]] / normalizer;
                }
            }
        }
    }

    (gamma, xi_sum, log_likelihood)
}
