use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use tgspider_core::{
    config::Config,
    logging::{self, TracingDiagnostics},
    spider::Spider,
};
use tgspider_report::HtmlRenderer;
use tgspider_telegram::TelegramPreviewSource;

/// Usage: `tgspider [config.json] [output-file]`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("tgspider")?;

    let mut args = env::args().skip(1);
    let config_path = PathBuf::from(args.next().unwrap_or_else(|| "config.json".to_string()));
    let output = args.next().map(PathBuf::from);

    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // Ctrl-C stops the scan between channels; whatever was collected up to
    // that point is still compiled into a report.
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let spider = Spider::new(
        config,
        Arc::new(TelegramPreviewSource::new()),
        Arc::new(HtmlRenderer),
        Arc::new(TracingDiagnostics),
    );

    spider.run(output.as_deref(), &cancel).await?;
    Ok(())
}
