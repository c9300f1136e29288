use std::io;

use thiserror::Error;

/// Failures of a single scan. The display text is what the client sees in
/// the terminal error frame.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to start scanner `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("scanner output is not available")]
    MissingStdout,

    #[error("failed to read scanner output: {0}")]
    Read(#[source] io::Error),

    #[error("scanner output line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("failed to wait for scanner: {0}")]
    Wait(#[source] io::Error),

    #[error("failed to kill scanner: {0}")]
    Kill(#[source] io::Error),

    #[error("scanner exited with status {0}")]
    ExitStatus(i32),

    #[error("scanner was terminated by a signal")]
    Terminated,
}

pub type Result<T> = std::result::Result<T, ScanError>;
