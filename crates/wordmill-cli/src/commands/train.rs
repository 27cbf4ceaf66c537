use std::path::PathBuf;

use compact_str::CompactString;
use wordmill::artifacts;
use wordmill::corpus::{CorpusReader, CorpusReaderOptions, collect_corpus_files};
use wordmill::embedding::{
    Accelerator, EmbeddingOptions, EmbeddingScheme, generate_embeddings,
};
use wordmill::errors::WordmillError;
use wordmill::segment::Segmenter;
use wordmill::stats::build_token_stats;
use wordmill::training::BpeTrainerOptions;
use wordmill::types::WMHashMap;

use crate::LogArgs;

/// Embedding value scheme.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemeArg {
    /// Deterministic seed formula.
    Formula,

    /// Independent uniform draws.
    Uniform,
}

impl From<SchemeArg> for EmbeddingScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Formula => EmbeddingScheme::Formula,
            SchemeArg::Uniform => EmbeddingScheme::Uniform,
        }
    }
}

/// Embedding execution path.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum AcceleratorArg {
    /// Plain CPU loop.
    Cpu,

    /// CUDA kernels.
    Cuda,

    /// OpenCL kernels.
    Opencl,
}

impl From<AcceleratorArg> for Accelerator {
    fn from(arg: AcceleratorArg) -> Self {
        match arg {
            AcceleratorArg::Cpu => Accelerator::Cpu,
            AcceleratorArg::Cuda => Accelerator::Cuda,
            AcceleratorArg::Opencl => Accelerator::OpenCl,
        }
    }
}

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Directory of UTF-8 text files to train on.
    input_dir: PathBuf,

    /// Destination directory for artifacts.
    out_dir: PathBuf,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Number of BPE merges to perform.
    #[arg(long)]
    merges: usize,

    /// Embedding dimension.
    #[arg(long, default_value = "64")]
    dim: usize,

    /// Formula divisor; the embedding exponent cycles through `1..=d_val`.
    #[arg(long, default_value = "4")]
    d_val: usize,

    /// Seed range for embedding generation.
    #[arg(
        long,
        num_args = 2,
        value_names = ["R1", "R2"],
        default_values_t = [-10.0, 10.0],
        allow_negative_numbers = true
    )]
    seed_range: Vec<f32>,

    /// Embedding value scheme.
    #[arg(long, value_enum, default_value = "formula")]
    scheme: SchemeArg,

    /// Embedding execution path.
    #[arg(long, value_enum, default_value = "cpu")]
    accelerator: AcceleratorArg,

    /// Worker thread budget; defaults to the hardware parallelism.
    #[arg(long)]
    threads: Option<usize>,
}

impl TrainArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;
        self.validate()?;

        type K = CompactString;
        type C = u64;

        let files = collect_corpus_files(&self.input_dir)?;
        log::info!(
            "found {} files for training in {}",
            files.len(),
            self.input_dir.display(),
        );

        let mut reader_options = CorpusReaderOptions::default();
        reader_options.threads = self.threads;
        let reader = CorpusReader::new(reader_options);

        let word_counts: WMHashMap<K, C> = reader.read_files(&files);
        log::info!("aggregation complete: {} unique raw tokens", word_counts.len());
        if word_counts.is_empty() {
            log::warn!("empty corpus; artifacts will be empty");
        }

        std::fs::create_dir_all(&self.out_dir)?;
        artifacts::save_unique_tokens(
            &word_counts,
            &self.out_dir.join(artifacts::UNIQUE_TOKENS_FILE),
        )?;

        let vocab = BpeTrainerOptions::new(self.merges).init().train(&word_counts);
        log::info!("vocabulary learning complete: {} tokens", vocab.len());

        let segmenter = Segmenter::from_vocab(&vocab);

        let stats = build_token_stats(&word_counts, &segmenter);
        artifacts::save_token_stats(&stats, &self.out_dir.join(artifacts::TOKEN_STATS_FILE))?;
        artifacts::save_merge_history(
            vocab.merges(),
            &self.out_dir.join(artifacts::MERGE_HISTORY_FILE),
        )?;

        let embedding_options = EmbeddingOptions::new(self.dim, self.d_val)
            .with_seed_range(self.seed_range[0], self.seed_range[1])
            .with_scheme(self.scheme.into())
            .with_accelerator(self.accelerator.into());
        let table = generate_embeddings(vocab.len(), &embedding_options, &mut rand::thread_rng());

        artifacts::save_embeddings(
            vocab.tokens(),
            &table,
            &self.out_dir.join(artifacts::EMBEDDINGS_FILE),
        )?;
        artifacts::save_seeds(vocab.tokens(), &table, &self.out_dir.join(artifacts::SEEDS_FILE))?;

        log::info!(
            "training complete: {} tokens, {} merges performed, artifacts in {}",
            vocab.len(),
            vocab.merges_performed(),
            self.out_dir.display(),
        );
        Ok(())
    }

    fn validate(&self) -> Result<(), WordmillError> {
        if self.merges == 0 {
            return Err(WordmillError::Config(
                "--merges must be a positive integer".to_owned(),
            ));
        }
        if self.dim == 0 {
            return Err(WordmillError::Config(
                "--dim must be a positive integer".to_owned(),
            ));
        }
        if self.d_val == 0 {
            return Err(WordmillError::Config(
                "--d-val must be a positive integer".to_owned(),
            ));
        }
        if self.seed_range[0] > self.seed_range[1] {
            return Err(WordmillError::Config(format!(
                "seed range [{}, {}] is inverted",
                self.seed_range[0], self.seed_range[1],
            )));
        }
        Ok(())
    }
}
