use clap::Parser;
use eyre::Context;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_collector::{
    Cli, Collector, CollectorConfig, CsvChannelSource, CsvExport, Export, RecordFilter, Settings,
    YouTubeClient,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    // Everything that can be wrong with the configuration is caught here,
    // before a single request goes out.
    let settings = Settings::load(&cli.config)?;
    let config = CollectorConfig::resolve(&cli, &settings)?;
    tracing::debug!(?config, "resolved configuration");

    if cli.save_config {
        Settings::from(&config)
            .save(&cli.config)
            .context("save settings")?;
    }

    let source = CsvChannelSource::new(&config.source);
    let client = YouTubeClient::new(config.api_key.clone(), config.proxy.as_deref())
        .context("set up YouTube client")?;
    let sink = CsvExport::new(&config.output_dir);

    let handle = Collector::new(client, sink, RecordFilter::new(config.threshold)).spawn(&source)?;
    let outcome = handle.finish(|event| println!("{event}")).await?;

    let summary = &outcome.result;
    tracing::info!(
        channels = summary.channels.len(),
        records = summary.records.len(),
        exported = matches!(outcome.export, Export::Written(_)),
        "collection finished"
    );

    Ok(())
}
