//! # Artifact Loaders
//!
//! Tolerant readers for the persisted artifacts. Malformed numeric fields
//! warn (capped per file), default to zero, and never abort a load.

use std::path::Path;

use crate::artifacts::dialect::{HeaderMode, WarnBudget, is_header, open_reader};
use crate::artifacts::{EMBEDDINGS_FILE, EMBEDDINGS_ONLY_FILE, TOKEN_STATS_FILE};
use crate::errors::WordmillError;
use crate::segment::Segmenter;
use crate::types::{CountType, WMHashMap};

/// How many malformed-field warnings one load emits before suppressing.
const PARSE_WARN_LIMIT: usize = 5;

/// Load `token,repetitions` statistics.
///
/// Rows with an empty token are kept (the empty token is a legal key);
/// malformed counts default to zero.
pub fn load_token_stats<C: CountType>(
    path: &Path,
    header: HeaderMode,
) -> anyhow::Result<WMHashMap<String, C>> {
    let mut reader = open_reader(path)?;
    let mut warnings = WarnBudget::new(PARSE_WARN_LIMIT);
    let mut stats = WMHashMap::new();

    let mut first = true;
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if core::mem::take(&mut first) && is_header(header, &record) {
            log::debug!("skipping header line of {}", path.display());
            continue;
        }
        if record.iter().all(str::is_empty) {
            continue;
        }

        let token = record.get(0).unwrap_or_default().to_owned();
        let raw_count = record.get(1).unwrap_or_default();
        let count = parse_count::<C>(raw_count).unwrap_or_else(|| {
            warnings.warn(|| {
                format!(
                    "{}:{}: malformed count {raw_count:?}; defaulting to 0",
                    path.display(),
                    line + 1,
                )
            });
            C::zero()
        });

        stats.insert(token, count);
    }

    log::info!("loaded {} token stats from {}", stats.len(), path.display());
    Ok(stats)
}

/// Load a token-to-vector embedding table.
///
/// Rows with an empty token are skipped with a warning; malformed values
/// default to zero.
pub fn load_embeddings(
    path: &Path,
    header: HeaderMode,
) -> anyhow::Result<WMHashMap<String, Vec<f32>>> {
    let mut reader = open_reader(path)?;
    let mut warnings = WarnBudget::new(PARSE_WARN_LIMIT);
    let mut embeddings = WMHashMap::new();

    let mut first = true;
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if core::mem::take(&mut first) && is_header(header, &record) {
            log::debug!("skipping header line of {}", path.display());
            continue;
        }
        if record.iter().all(str::is_empty) {
            continue;
        }

        let token = record.get(0).unwrap_or_default();
        if token.is_empty() {
            warnings.warn(|| {
                format!("{}:{}: empty token; row skipped", path.display(), line + 1)
            });
            continue;
        }

        let mut vector = Vec::with_capacity(record.len().saturating_sub(1));
        for raw in record.iter().skip(1) {
            let value = raw.trim_matches(['"', '\'']).parse::<f32>().unwrap_or_else(|_| {
                warnings.warn(|| {
                    format!(
                        "{}:{}: malformed value {raw:?}; defaulting to 0",
                        path.display(),
                        line + 1,
                    )
                });
                0.0
            });
            vector.push(value);
        }

        embeddings.insert(token.to_owned(), vector);
    }

    log::info!(
        "loaded {} embedding rows from {}",
        embeddings.len(),
        path.display(),
    );
    Ok(embeddings)
}

/// Load a single-column token list, such as the pre-BPE unique tokens.
pub fn load_unique_tokens(
    path: &Path,
    header: HeaderMode,
) -> anyhow::Result<Vec<String>> {
    let mut reader = open_reader(path)?;
    let mut tokens = Vec::new();

    let mut first = true;
    for record in reader.records() {
        let record = record?;
        if core::mem::take(&mut first) && is_header(header, &record) {
            log::debug!("skipping header line of {}", path.display());
            continue;
        }
        if record.iter().all(str::is_empty) {
            continue;
        }
        tokens.push(record.get(0).unwrap_or_default().to_owned());
    }

    log::info!("loaded {} tokens from {}", tokens.len(), path.display());
    Ok(tokens)
}

/// Rebuild a [`Segmenter`] from a persisted artifact directory.
///
/// Only the token statistics file is required; its key set is the
/// vocabulary, re-sorted by descending length for greedy matching.
pub fn load_segmenter(dir: &Path) -> anyhow::Result<Segmenter> {
    let stats_path = dir.join(TOKEN_STATS_FILE);
    if !stats_path.is_file() {
        return Err(WordmillError::MissingArtifact(format!(
            "{} (run training first)",
            stats_path.display(),
        ))
        .into());
    }

    let stats = load_token_stats::<u64>(&stats_path, HeaderMode::Auto)?;
    let tokens = stats.into_iter().map(|(token, _)| token).collect();
    Ok(Segmenter::new(tokens))
}

/// Locate the embeddings artifact in `dir`, trying the conventional names.
pub fn find_embeddings_file(dir: &Path) -> Option<std::path::PathBuf> {
    [EMBEDDINGS_FILE, EMBEDDINGS_ONLY_FILE]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn parse_count<C: CountType>(raw: &str) -> Option<C> {
    let cleaned = raw.trim().trim_matches(['"', '\'']);
    cleaned.parse::<u64>().ok().and_then(C::from_u64)
}
