use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sample_relay_core::{AppConfig, ChannelRegistry, SampleStream};
use tracing_subscriber::EnvFilter;

fn main() -> sample_relay_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stream {
            blocks,
            channels,
            config,
        } => run_stream(blocks, channels, config.as_deref()),
        Commands::InitConfig { output } => run_init_config(&output),
    }
}

fn run_stream(
    blocks: usize,
    channels: u32,
    config_path: Option<&std::path::Path>,
) -> sample_relay_core::Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.validate()?;

    let mut registry = ChannelRegistry::new();
    for _ in 0..channels {
        let id = registry.next_free();
        registry.register(id);
    }
    tracing::info!(
        channels = registry.len(),
        ids = ?registry.ids().collect::<Vec<_>>(),
        "registered pipeline channels"
    );

    let block_size = config.pipeline.block_size;
    let (writer, reader) = SampleStream::from_config::<f32>(&config.pipeline);
    tracing::info!(
        blocks,
        block_size,
        capacity = config.pipeline.capacity,
        sample_rate = config.pipeline.sample_rate,
        "starting stream"
    );

    let producer = std::thread::spawn(move || -> sample_relay_core::Result<usize> {
        let mut pushed = 0;
        for block in 0..blocks {
            let base = (block * block_size) as f32;
            let samples: Vec<f32> = (0..block_size).map(|i| base + i as f32).collect();
            writer.write_all(&samples)?;
            pushed += samples.len();
        }
        Ok(pushed)
    });

    let expected = blocks * block_size;
    let mut received = 0_usize;
    let mut peak = 0.0_f32;
    let mut out = vec![0.0_f32; block_size];
    while received < expected {
        let read = reader.read(&mut out)?;
        if read == 0 {
            std::thread::yield_now();
            continue;
        }
        for sample in &out[..read] {
            peak = peak.max(*sample);
        }
        received += read;
    }

    let pushed = producer
        .join()
        .map_err(|_| sample_relay_core::SampleRelayError::msg("producer thread panicked"))??;

    tracing::info!(pushed, received, peak, "stream complete");
    Ok(())
}

fn run_init_config(output: &std::path::Path) -> sample_relay_core::Result<()> {
    let config = AppConfig::default();
    config.save(output)?;
    tracing::info!(?output, "wrote default configuration");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Sample Relay demo pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pump synthetic sample blocks through a producer/consumer pair.
    Stream {
        /// Number of blocks to push through the pipeline.
        #[arg(short, long, default_value_t = 64)]
        blocks: usize,
        /// Number of channel IDs to register before streaming.
        #[arg(short, long, default_value_t = 2)]
        channels: u32,
        /// Optional JSON configuration file to load.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a default JSON configuration file.
    InitConfig {
        /// Output path for the generated configuration.
        output: PathBuf,
    },
}
