use std::path::Path;

use crate::{report::ReportModel, Result};

/// Document renderer port.
///
/// The core hands over the logical report structure; markup and file-format
/// details belong to adapter crates.
pub trait ReportRenderer: Send + Sync {
    /// File extension (without the dot) used when deriving an output name.
    fn extension(&self) -> &'static str;

    /// Serialize `model` into the file at `path`.
    ///
    /// Failures surface as `Error::Render`. The model stays with the caller,
    /// so a failed render can be retried against another target.
    fn render(&self, model: &ReportModel, path: &Path) -> Result<()>;
}
