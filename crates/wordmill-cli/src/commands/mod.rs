mod tokenize;
mod train;

/// Subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Train a vocabulary and embeddings from a directory of text files.
    Train(train::TrainArgs),

    /// Tokenize text with previously trained artifacts.
    Tokenize(tokenize::TokenizeArgs),
}

impl Commands {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Train(args) => args.run(),
            Commands::Tokenize(args) => args.run(),
        }
    }
}
