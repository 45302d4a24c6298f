use std::cmp::Ordering;
use thiserror::Error;

/// SimError is used if some input or configuration value does not fulfill the posed
/// requirements. InvalidInput is recoverable (the offending value is rejected and the previous
/// state is kept), ConfigurationError is fatal and raised before the race starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
}

/// argmax returns the index of the maximum value in the array x.
pub fn argmax<T: std::cmp::PartialOrd>(x: &[T]) -> usize {
    let (max_idx, _max_val) =
        x.iter()
            .enumerate()
            .fold((0, &x[0]), |(idx_max, val_max), (idx, val)| {
                if val_max >= val {
                    (idx_max, val_max)
                } else {
                    (idx, val)
                }
            });
    max_idx
}

/// max returns the maximum value in the array x.
pub fn max<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> T {
    let &max_val = x.iter().fold(
        &x[0],
        |val_max, val| {
            if val_max > val {
                val_max
            } else {
                val
            }
        },
    );
    max_val
}

pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that sort the array x. The sort is stable, i.e. equal values keep
/// their original order, which keeps the simulation deterministic.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    match order {
        SortOrder::Ascending => {
            idxs.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            idxs.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    };

    idxs
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing. Values outside the data range are clamped to the first/last value.
/// Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if xp.len() != fp.len() || xp.is_empty() {
        panic!("Number of items in xp and fp must be equal and non-zero!")
    }

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..xp.len() {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}

/// is_strictly_increasing checks if the values in x are strictly increasing (required for the
/// sampling points of lin_interp).
pub fn is_strictly_increasing(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] < w[1])
}
