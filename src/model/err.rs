use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("unable to read instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to read instance: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed instance at line {line}: {reason}")]
    MalformedInstance { line: u64, reason: String },
}

impl InstanceError {
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedInstance {
            line,
            reason: reason.into(),
        }
    }
}
