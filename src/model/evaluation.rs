use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// Row indices of a shuffled train/test partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded RNG and hold out `ceil(n * test_size)`
/// rows for testing. The same seed always yields the same partition.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * test_size.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(n_samples);
    let train = indices.split_off(n_test);

    Split {
        train,
        test: indices,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitMetrics {
    pub samples: usize,
    pub r_squared: f64,
    pub rmse: f64,
}

impl FitMetrics {
    /// Coefficient of determination and root mean squared error.
    ///
    /// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Option<Self> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return None;
        }

        let n = actual.len() as f64;
        let mean = actual.iter().sum::<f64>() / n;
        let ss_res: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Some(Self {
            samples: actual.len(),
            r_squared,
            rmse: (ss_res / n).sqrt(),
        })
    }
}
