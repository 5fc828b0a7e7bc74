use anyhow::Context;
use clap::Parser;
use ink_easel::{
    config::{self, LoggingConfig},
    display::PngDisplay,
    Easel, Provider, Request,
};
use simplelog::{CombinedLogger, SimpleLogger, WriteLogger};
use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

#[derive(Parser, Debug)]
struct Opt {
    /// Configuration file. Created from `.config.example.toml` next to it if
    /// missing.
    #[arg(long, default_value = ".config.toml")]
    config: PathBuf,
    /// Use this provider instead of picking one by weight.
    #[arg(long, value_enum)]
    provider: Option<Provider>,
    /// Generate from this prompt instead of building one.
    #[arg(long)]
    prompt: Option<String>,
    /// Do not keep generated images.
    #[arg(long)]
    no_save: bool,
    /// Write the frame here instead of the configured output.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    if let Some(parent) = logging.log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.log_file)
        .with_context(|| format!("opening {}", logging.log_file.display()))?;
    CombinedLogger::init(vec![
        SimpleLogger::new(logging.log_level, Default::default()),
        WriteLogger::new(logging.log_level, Default::default(), file),
    ])?;
    Ok(())
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let Opt {
        config,
        provider,
        prompt,
        no_save,
        output,
    } = Parser::parse();

    let config = config::load(&config)?;
    init_logging(&config.logging)?;

    let display = PngDisplay::new(
        config.display.width,
        config.display.height,
        output.unwrap_or_else(|| config.display.output.clone()),
    );
    let request = Request {
        provider,
        prompt,
        save: !no_save,
    };
    let outcome = Easel::new(config, display)
        .run(&request, &mut rand::thread_rng())
        .await?;
    log::info!(
        "Showing {:?} by {:?} from {}",
        outcome.title,
        outcome.artist,
        outcome.provider
    );
    Ok(())
}
