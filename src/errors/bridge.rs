#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("bridge i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("incomplete write to bridge port")]
    IncompleteWrite,

    #[error("unparsable bridge response: {0:?}")]
    BadResponse(String),
}
