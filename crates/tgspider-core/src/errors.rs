/// Core error type for the spider.
///
/// Adapter crates should map their specific errors into this type so the
/// pipeline can apply one policy per failure class: config errors abort the
/// run, channel fetch errors are isolated per channel, render errors leave
/// the in-memory report intact for a retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("fetch failed for channel {channel}: {reason}")]
    ChannelFetch { channel: String, reason: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
