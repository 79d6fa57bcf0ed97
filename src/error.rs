use thiserror::Error;

#[derive(Error, Debug)]
pub enum SenseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sensor not ready after {polls} polls")]
    SensorTimeout { polls: u32 },

    #[error("Trace line {line}: {reason}")]
    TraceParse { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SenseError>;
