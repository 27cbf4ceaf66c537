use std::io::BufRead;
use std::path::PathBuf;

use wordmill::artifacts;

use crate::LogArgs;

/// Args for the tokenize command.
#[derive(clap::Args, Debug)]
pub struct TokenizeArgs {
    /// Directory holding trained artifacts.
    artifact_dir: PathBuf,

    /// Text to tokenize; omit to read lines from `--file` or stdin.
    text: Option<String>,

    /// Tokenize each line of this file instead.
    #[arg(long)]
    file: Option<PathBuf>,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl TokenizeArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        let segmenter = artifacts::load_segmenter(&self.artifact_dir)?;
        log::info!("loaded {} vocabulary tokens", segmenter.tokens().len());

        if let Some(text) = &self.text {
            println!("{}", segmenter.split_sentence(text).join(" "));
            return Ok(());
        }

        if let Some(path) = &self.file {
            let reader = std::io::BufReader::new(std::fs::File::open(path)?);
            for line in reader.lines() {
                println!("{}", segmenter.split_sentence(&line?).join(" "));
            }
            return Ok(());
        }

        for line in std::io::stdin().lock().lines() {
            println!("{}", segmenter.split_sentence(&line?).join(" "));
        }
        Ok(())
    }
}
