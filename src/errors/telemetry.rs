#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry push failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("record append failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("record file error: {0}")]
    Io(#[from] std::io::Error),
}
