//! # Embedding Generation
//!
//! Dense per-token vectors produced after training. Values come from the
//! deterministic seed formula or a uniform draw; correctness is judged
//! only on the final matrix, so accelerated paths share the CPU contract.

use rand::Rng;
use rand::distributions::Uniform;

/// Value scheme for generated embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingScheme {
    /// `E[i][j] = (j+1) * 0.01 / ((j % d_val)+1) * seed_i^((j % d_val)+1)`.
    #[default]
    Formula,

    /// Every value drawn independently from the seed range.
    Uniform,
}

/// Execution path for embedding generation.
///
/// Non-CPU paths share the CPU input/output contract; when the requested
/// accelerator is not compiled in, generation warns and falls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accelerator {
    /// Plain CPU loop.
    #[default]
    Cpu,

    /// CUDA kernels.
    Cuda,

    /// OpenCL kernels.
    OpenCl,
}

/// Options for [`generate_embeddings`].
#[derive(Debug, Clone)]
pub struct EmbeddingOptions {
    /// Embedding dimension `d`.
    pub dim: usize,

    /// Formula divisor; the exponent cycles through `1..=d_val`.
    pub d_val: usize,

    /// Uniform range `[r1, r2]` for per-token seeds.
    pub seed_range: (f32, f32),

    /// Value scheme.
    pub scheme: EmbeddingScheme,

    /// Execution path.
    pub accelerator: Accelerator,
}

impl EmbeddingOptions {
    /// Create options with the default seed range, scheme, and path.
    pub fn new(
        dim: usize,
        d_val: usize,
    ) -> Self {
        Self {
            dim,
            d_val,
            seed_range: (-10.0, 10.0),
            scheme: EmbeddingScheme::default(),
            accelerator: Accelerator::default(),
        }
    }

    /// Set the seed range.
    pub fn with_seed_range(
        self,
        r1: f32,
        r2: f32,
    ) -> Self {
        Self {
            seed_range: (r1, r2),
            ..self
        }
    }

    /// Set the value scheme.
    pub fn with_scheme(
        self,
        scheme: EmbeddingScheme,
    ) -> Self {
        Self { scheme, ..self }
    }

    /// Set the execution path.
    pub fn with_accelerator(
        self,
        accelerator: Accelerator,
    ) -> Self {
        Self {
            accelerator,
            ..self
        }
    }
}

/// A dense `n x d` embedding table with the per-token seeds that produced
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    /// Embedding dimension.
    pub dim: usize,

    /// Per-token seeds, one per row.
    pub seeds: Vec<f32>,

    /// Row-per-token values.
    pub vectors: Vec<Vec<f32>>,
}

impl EmbeddingTable {
    /// The number of rows.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The vector of row `index`.
    pub fn vector(
        &self,
        index: usize,
    ) -> &[f32] {
        &self.vectors[index]
    }

    /// The multiplicative inverse of every row: `v / |v|^2`, so that
    /// `v . inverse(v) = 1` for non-zero rows. Zero rows invert to zero.
    pub fn inverses(&self) -> Vec<Vec<f32>> {
        self.vectors
            .iter()
            .map(|vector| {
                let magnitude: f32 = vector.iter().map(|v| v * v).sum();
                if magnitude == 0.0 {
                    vec![0.0; vector.len()]
                } else {
                    vector.iter().map(|v| v / magnitude).collect()
                }
            })
            .collect()
    }
}

/// One coordinate of the formula scheme.
///
/// The exponent cycles as `(j % d_val) + 1`, so the first coordinate uses
/// exponent 1 rather than dividing by zero.
pub fn formula_value(
    j: usize,
    d_val: usize,
    seed: f32,
) -> f32 {
    let cycle = (j % d_val) + 1;
    (j as f32 + 1.0) * 0.01 / cycle as f32 * seed.powi(cycle as i32)
}

/// Generate an embedding table for `n` tokens.
///
/// Seeds are drawn uniformly from the configured range regardless of
/// scheme, so a formula table can be regenerated from its persisted seeds.
pub fn generate_embeddings<R: Rng>(
    n: usize,
    options: &EmbeddingOptions,
    rng: &mut R,
) -> EmbeddingTable {
    assert!(options.dim > 0, "embedding dimension must be positive");
    assert!(options.d_val > 0, "formula divisor must be positive");

    if options.accelerator != Accelerator::Cpu {
        log::warn!(
            "{:?} acceleration is not compiled in; using the CPU path",
            options.accelerator,
        );
    }

    let (r1, r2) = options.seed_range;
    let seed_dist = Uniform::new_inclusive(r1, r2);
    let seeds: Vec<f32> = (0..n).map(|_| rng.sample(seed_dist)).collect();

    let vectors: Vec<Vec<f32>> = match options.scheme {
        EmbeddingScheme::Formula => seeds
            .iter()
            .map(|&seed| {
                (0..options.dim)
                    .map(|j| formula_value(j, options.d_val, seed))
                    .collect()
            })
            .collect(),
        EmbeddingScheme::Uniform => (0..n)
            .map(|_| (0..options.dim).map(|_| rng.sample(seed_dist)).collect())
            .collect(),
    };

    log::info!(
        "generated {n} x {} embeddings ({:?} scheme)",
        options.dim,
        options.scheme,
    );

    EmbeddingTable {
        dim: options.dim,
        seeds,
        vectors,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_formula_first_coordinate_is_finite() {
        // Exponent cycling starts at 1; j = 0 never divides by zero.
        let value = formula_value(0, 4, 2.0);
        assert!(value.is_finite());
        assert!((value - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_formula_values() {
        // d_val = 2: exponents cycle 1, 2, 1, 2, ...
        let seed = 3.0;
        assert!((formula_value(0, 2, seed) - 0.01 * 3.0).abs() < 1e-6);
        assert!((formula_value(1, 2, seed) - 0.02 / 2.0 * 9.0).abs() < 1e-6);
        assert!((formula_value(2, 2, seed) - 0.03 * 3.0).abs() < 1e-6);
        assert!((formula_value(3, 2, seed) - 0.04 / 2.0 * 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_generate_formula_matches_seeds() {
        let options = EmbeddingOptions::new(8, 4);
        let mut rng = StdRng::seed_from_u64(7);
        let table = generate_embeddings(16, &options, &mut rng);

        assert_eq!(table.len(), 16);
        assert_eq!(table.seeds.len(), 16);
        for (row, &seed) in table.vectors.iter().zip(&table.seeds) {
            assert_eq!(row.len(), 8);
            for (j, &value) in row.iter().enumerate() {
                assert!(value.is_finite());
                assert!((value - formula_value(j, 4, seed)).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_generate_uniform_stays_in_range() {
        let options = EmbeddingOptions::new(16, 4)
            .with_scheme(EmbeddingScheme::Uniform)
            .with_seed_range(-1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(11);
        let table = generate_embeddings(32, &options, &mut rng);

        for row in &table.vectors {
            for &value in row {
                assert!((-1.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic_per_rng_seed() {
        let options = EmbeddingOptions::new(4, 2);

        let mut rng = StdRng::seed_from_u64(42);
        let first = generate_embeddings(8, &options, &mut rng);

        let mut rng = StdRng::seed_from_u64(42);
        let second = generate_embeddings(8, &options, &mut rng);

        assert_eq!(first, second);
    }

    #[test]
    fn test_inverses_dot_to_one() {
        let table = EmbeddingTable {
            dim: 3,
            seeds: vec![1.0, 2.0],
            vectors: vec![vec![1.0, 2.0, 2.0], vec![0.0, 0.0, 0.0]],
        };

        let inverses = table.inverses();

        let dot: f32 = table.vectors[0]
            .iter()
            .zip(&inverses[0])
            .map(|(a, b)| a * b)
            .sum();
        assert!((dot - 1.0).abs() < 1e-6);

        assert_eq!(inverses[1], vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_vocab_generates_empty_table() {
        let options = EmbeddingOptions::new(4, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let table = generate_embeddings(0, &options, &mut rng);

        assert!(table.is_empty());
        assert!(table.seeds.is_empty());
    }
}
