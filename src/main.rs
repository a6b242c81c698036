//! Process glue: decode a MARC file and index it, driven by the environment.

use marcdex::{
    BulkIndexer, EmbeddingClient, PipelineConfig, Processor, Result, RunStats,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marcdex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PipelineConfig::from_env();
    match run(&config) {
        Ok(stats) => {
            tracing::info!(
                seen = stats.records_seen,
                emitted = stats.records_emitted,
                errors = stats.records_errored,
                rejected = stats.titles_rejected,
                resync_steps = stats.resync_steps,
                "processing complete"
            );
        },
        Err(e) => {
            tracing::error!(error = %e, "processing failed");
            std::process::exit(1);
        },
    }
}

fn run(config: &PipelineConfig) -> Result<RunStats> {
    let indexer = BulkIndexer::new(&config.elasticsearch_url, &config.index_name)?
        .with_credentials(&config.elasticsearch_username, &config.elasticsearch_password);
    indexer.ensure_index()?;

    let embedder = EmbeddingClient::new(&config.ollama_url, &config.embedding_model)?;

    let mut processor = Processor::new(indexer)
        .with_batch_size(config.batch_size)
        .with_embedder(Box::new(embedder));
    processor.process_file(&config.marc_file)
}
