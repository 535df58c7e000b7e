//! End-to-end pipeline: configuration → scan → report model → document.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio_util::sync::CancellationToken;

use crate::{
    aggregate::GroupAggregator,
    config::Config,
    logging::{DiagLevel, Diagnostics},
    render::ReportRenderer,
    report,
    source::MessageSource,
    Result,
};

/// Drives one scan-and-report run against injected collaborators.
pub struct Spider {
    config: Config,
    source: Arc<dyn MessageSource>,
    renderer: Arc<dyn ReportRenderer>,
    diag: Arc<dyn Diagnostics>,
}

impl Spider {
    pub fn new(
        config: Config,
        source: Arc<dyn MessageSource>,
        renderer: Arc<dyn ReportRenderer>,
        diag: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            config,
            source,
            renderer,
            diag,
        }
    }

    /// Run the full pipeline and return the path of the written report.
    ///
    /// The date window is parsed and the keyword patterns are compiled before
    /// any history is touched; either failing aborts the run. Per-channel
    /// fetch failures never do: they are reported and the run continues.
    pub async fn run(&self, output: Option<&Path>, cancel: &CancellationToken) -> Result<PathBuf> {
        let window = self.config.window()?;
        let keywords = self.config.compile_keywords()?;

        let aggregator = GroupAggregator::new(self.source.as_ref(), self.diag.as_ref());
        let results = aggregator
            .run(&self.config.groups, window, &keywords, cancel)
            .await;

        self.diag.emit(
            DiagLevel::Info,
            &format!("collected {} matching messages", results.total_entries()),
        );

        let model = report::build(&results);

        let path = match output {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(report::default_file_name(
                &self.config.start_date,
                &self.config.end_date,
                self.renderer.extension(),
            )),
        };

        self.renderer.render(&model, &path)?;
        self.diag.emit(
            DiagLevel::Info,
            &format!("report saved to {}", path.display()),
        );

        Ok(path)
    }
}
