use std::fmt;

use super::error::{AssemblerError, ErrorKind, ProcessorError, RetrievedError};

/// The exit statuses a host reports for a parse. Numbers are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok,
    MissingOutputFile,
    ReadingOutputFile,
    InvalidContent,
    NoRetrievedFolder,
    MissingOutputFiles,
}

impl ExitCode {
    pub fn status(&self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::MissingOutputFile => 1000,
            Self::ReadingOutputFile => 1001,
            Self::InvalidContent => 1002,
            Self::NoRetrievedFolder => 1003,
            Self::MissingOutputFiles => 1004,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Ok => "",
            Self::MissingOutputFile => "Could not locate the output file.",
            Self::ReadingOutputFile => "Could not read the output file.",
            Self::InvalidContent => "Data format is unknown and could not be parsed.",
            Self::NoRetrievedFolder => "Could not obtain the retrieved folder.",
            Self::MissingOutputFiles => "Could not locate any of the required output files.",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "{}", self.status())
        } else {
            write!(f, "{} ({})", self.status(), self.message())
        }
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::MissingFile => Self::MissingOutputFile,
            ErrorKind::ReadError => Self::ReadingOutputFile,
            ErrorKind::InvalidLayout
            | ErrorKind::NotImplemented
            | ErrorKind::MalformedField
            | ErrorKind::InvalidContent
            | ErrorKind::CalibrationMismatch => Self::InvalidContent,
        }
    }
}

impl From<&AssemblerError> for ExitCode {
    fn from(err: &AssemblerError) -> Self {
        err.kind().into()
    }
}

impl From<&RetrievedError> for ExitCode {
    fn from(err: &RetrievedError) -> Self {
        match err {
            RetrievedError::NoRetrievedFolder(_) => Self::NoRetrievedFolder,
            RetrievedError::MissingOutputFiles { .. } => Self::MissingOutputFiles,
            RetrievedError::TooManyFiles(_) => ErrorKind::NotImplemented.into(),
            RetrievedError::IOError(_) => Self::ReadingOutputFile,
            RetrievedError::AssemblerError(e) => e.into(),
        }
    }
}

impl From<&ProcessorError> for ExitCode {
    fn from(err: &ProcessorError) -> Self {
        match err {
            ProcessorError::AssemblerError(e) => e.into(),
            ProcessorError::CalibrationError(e) => e.kind().into(),
            ProcessorError::ConfigError(_) => Self::InvalidContent,
            ProcessorError::WriterError(_)
            | ProcessorError::SendError(_)
            | ProcessorError::IoError(_) => Self::ReadingOutputFile,
        }
    }
}
