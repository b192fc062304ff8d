//! Satira CLI
//!
//! Cross-validated fake-news vs. satire classification over two article
//! dumps.
//!
//! # Usage
//!
//! ```bash
//! # Base DistilBERT checkpoint in ./distilbert-base-uncased
//! satira fakes_df.tsv satires_df.tsv --model-dir distilbert-base-uncased
//!
//! # Domain-adapted masked-LM weights by alias
//! satira fakes_df.tsv satires_df.tsv \
//!     --model-dir distilbert-base-uncased \
//!     --weights external7.5m --params-dir /data/model-params
//! ```

use clap::Parser;
use satira::corpus::{build_corpus, corpus_stats, TextField};
use satira::device::ComputeDevice;
use satira::encoder::{Encoder, EncoderConfig, WeightRegistry};
use satira::experiment::{CrossValidation, ExperimentConfig};
use satira::tokenizer::{SequenceEncoder, WordPieceTokenizer};
use satira::Result;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    about = "Fake-news vs. satire classification with stratified k-fold cross-validation"
)]
struct Cli {
    /// TSV of fake-news articles (title/body columns)
    fakes: PathBuf,

    /// TSV of satire articles (title/body columns)
    satires: PathBuf,

    /// Directory with the base checkpoint: vocab.txt plus model.safetensors
    #[arg(long)]
    model_dir: PathBuf,

    /// Pretrained encoder weights: an alias or a checkpoint path
    /// (defaults to the base checkpoint in --model-dir)
    #[arg(long)]
    weights: Option<String>,

    /// Directory holding alias checkpoints
    #[arg(long)]
    params_dir: Option<PathBuf>,

    /// Article field to classify on
    #[arg(long, value_enum, default_value_t = TextField::Body)]
    text_field: TextField,

    /// Training epochs per fold
    #[arg(long, default_value_t = 10)]
    epochs: usize,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    folds: usize,

    /// Training batch size
    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Head learning rate
    #[arg(long, default_value_t = 1e-5)]
    learn_rate: f32,

    /// Decoupled weight decay
    #[arg(long, default_value_t = 1e-3)]
    weight_decay: f32,

    /// Validation checkpoints per epoch
    #[arg(long, default_value_t = 1)]
    checkpoints_per_epoch: usize,

    /// Shuffle and initialization seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn run(cli: Cli) -> Result<()> {
    let device = ComputeDevice::auto_detect();
    eprintln!("Using device: {device}");

    let config = ExperimentConfig {
        n_epochs: cli.epochs,
        n_folds: cli.folds,
        batch_size: cli.batch_size,
        learn_rate: cli.learn_rate,
        weight_decay: cli.weight_decay,
        checkpoints_per_epoch: cli.checkpoints_per_epoch,
        text_field: cli.text_field,
        seed: cli.seed,
        ..ExperimentConfig::default()
    };

    let corpus = build_corpus(&cli.fakes, &cli.satires, config.seed)?;
    let stats = corpus_stats(&corpus);
    eprintln!(
        "Loaded {} articles ({} fake, {} satire)",
        stats.total(),
        stats.n_fake,
        stats.n_satire
    );

    let tokenizer = WordPieceTokenizer::from_file(cli.model_dir.join("vocab.txt"))?;
    let seq_encoder = SequenceEncoder::new(tokenizer, config.max_seq_len)?;

    let weights_path = match &cli.weights {
        Some(name) => WeightRegistry::resolve(name, cli.params_dir.as_deref())?,
        None => cli.model_dir.clone(),
    };
    eprintln!("Loading encoder weights from {}", weights_path.display());
    let encoder = Encoder::from_pretrained(&weights_path, EncoderConfig::distilbert_base())?;

    let report = CrossValidation::new(config).run(&corpus, &seq_encoder, &encoder)?;
    println!("{}", report.render());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
