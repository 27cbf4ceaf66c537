//! # Artifact Writers

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::artifacts::dialect::write_field;
use crate::embedding::EmbeddingTable;
use crate::training::MergeRecord;
use crate::types::{CountType, StringChunkType, WMHashMap};

/// Save the pre-BPE unique tokens, one per row under a `token` header,
/// sorted for reproducible output.
pub fn save_unique_tokens<K, C>(
    word_counts: &WMHashMap<K, C>,
    path: &Path,
) -> anyhow::Result<()>
where
    K: StringChunkType,
    C: CountType,
{
    let mut tokens: Vec<&str> = word_counts.keys().map(AsRef::as_ref).collect();
    tokens.sort_unstable();

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "token")?;
    for token in tokens {
        write_field(&mut writer, token)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    log::info!("saved {} unique tokens to {}", word_counts.len(), path.display());
    Ok(())
}

/// Save final token statistics as `token,repetitions`, sorted
/// alphabetically by token.
pub fn save_token_stats<C: CountType>(
    stats: &WMHashMap<String, C>,
    path: &Path,
) -> anyhow::Result<()> {
    let rows = crate::stats::sorted_stats(stats);

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "token,repetitions")?;
    for (token, count) in rows {
        write_field(&mut writer, token)?;
        writeln!(writer, ",{count}")?;
    }
    writer.flush()?;

    log::info!("saved {} token stats to {}", stats.len(), path.display());
    Ok(())
}

/// Save the merge history as `left,right,token` rows in merge order.
pub fn save_merge_history(
    merges: &[MergeRecord],
    path: &Path,
) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "left,right,token")?;
    for merge in merges {
        write_field(&mut writer, &merge.left)?;
        writer.write_all(b",")?;
        write_field(&mut writer, &merge.right)?;
        writer.write_all(b",")?;
        write_field(&mut writer, &merge.token)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    log::info!("saved {} merges to {}", merges.len(), path.display());
    Ok(())
}

/// Iterate `tokens` in alphabetical order paired with their original index.
fn alphabetical_indices(tokens: &[String]) -> Vec<(usize, &String)> {
    let mut rows: Vec<(usize, &String)> = tokens.iter().enumerate().collect();
    rows.sort_unstable_by(|a, b| a.1.cmp(b.1));
    rows
}

/// Save the embedding table, one row per token: the token field followed
/// by `d` fixed-precision values. No header; rows sorted alphabetically by
/// token while vectors keep their trained indices.
pub fn save_embeddings(
    tokens: &[String],
    table: &EmbeddingTable,
    path: &Path,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        tokens.len() == table.len(),
        "vocabulary size {} does not match embedding rows {}",
        tokens.len(),
        table.len(),
    );

    let mut writer = BufWriter::new(File::create(path)?);
    for (index, token) in alphabetical_indices(tokens) {
        write_field(&mut writer, token)?;
        for value in table.vector(index) {
            write!(writer, ",{value:.8}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    log::info!(
        "saved {} x {} embeddings to {}",
        table.len(),
        table.dim,
        path.display(),
    );
    Ok(())
}

/// Save the per-token seeds as `token,seed`, sorted alphabetically.
pub fn save_seeds(
    tokens: &[String],
    table: &EmbeddingTable,
    path: &Path,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        tokens.len() == table.seeds.len(),
        "vocabulary size {} does not match seed rows {}",
        tokens.len(),
        table.seeds.len(),
    );

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "token,seed")?;
    for (index, token) in alphabetical_indices(tokens) {
        write_field(&mut writer, token)?;
        writeln!(writer, ",{:.8}", table.seeds[index])?;
    }
    writer.flush()?;

    log::info!("saved {} seeds to {}", table.seeds.len(), path.display());
    Ok(())
}
