use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use svg_outline_stroke::config::Settings;
use svg_outline_stroke::outline::{CommandOutliner, OutlineOptions, OutlineStage};
use svg_outline_stroke::pipeline::{source, DestStage, Pipeline, SourceOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("svg_outline_stroke=info".parse()?),
        )
        .init();

    info!("[Startup] svg-outline-stroke initializing...");

    let settings = Settings::new()?;
    info!(
        "[Config] {} -> {} (read_mode={:?}, stream_mode={:?}, concurrency={})",
        settings.pipeline.input_root.display(),
        settings.pipeline.output_root.display(),
        settings.pipeline.read_mode,
        settings.outliner.stream_mode,
        settings.pipeline.concurrency
    );

    let outliner = CommandOutliner::from_settings(&settings.outliner);
    match outliner.probe().await {
        Ok(identity) => info!("[Outliner] Using {} ({})", outliner.program().display(), identity),
        Err(e) => warn!(
            "[Outliner] Probe failed for {}: {}",
            outliner.program().display(),
            e
        ),
    }

    let stage = OutlineStage::new(Arc::new(outliner))
        .with_options(OutlineOptions::new(settings.outliner.options.clone()))
        .with_stream_mode(settings.outliner.stream_mode);

    let pipeline = Pipeline::new()
        .concurrency(settings.pipeline.concurrency)
        .stage(stage)
        .stage(DestStage::new(settings.pipeline.output_root.clone()));

    let files = source::src(
        settings.pipeline.input_root.clone(),
        SourceOptions::from_settings(&settings.pipeline),
    );

    let mut results = pipeline.run(files);
    let mut written = 0usize;
    while let Some(result) = results.next().await {
        let file = result?;
        debug!("[Startup] Done: {}", file.path.display());
        written += 1;
    }

    info!(
        "[Startup] {} file(s) written to {}",
        written,
        settings.pipeline.output_root.display()
    );
    Ok(())
}
