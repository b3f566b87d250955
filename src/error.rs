use thiserror::Error;

/// Errors raised while setting up, running or writing out a comparison run.
#[derive(Error, Debug)]
pub enum FctError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Progress bar template rejected: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    #[error("Plotting failed: {0}")]
    Plot(String),
}

pub type FctResult<T> = Result<T, FctError>;
