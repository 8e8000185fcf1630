use std::path::PathBuf;
use thiserror::Error;

use super::worker_status::WorkerStatus;

/// The coarse failure taxonomy reported to whatever host drives the parser.
///
/// Every error in this crate can be reduced to one of these kinds, which is what
/// [`ExitCode`](super::exit_code::ExitCode) is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingFile,
    ReadError,
    InvalidLayout,
    NotImplemented,
    MalformedField,
    InvalidContent,
    CalibrationMismatch,
}

#[derive(Debug, Clone, Error)]
pub enum LayoutError {
    #[error("Layout for channel {0} declares more than one time column")]
    DuplicateTime(usize),
    #[error("Layout for channel {0} declares more than one id column")]
    DuplicateId(usize),
    #[error("Layout for channel {0} does not declare a time column")]
    MissingTime(usize),
    #[error("Layout for channel {0} has a column entry at position {1} which is not a single-key mapping")]
    BadColumnSpec(usize, usize),
    #[error("Layout does not declare any channels")]
    NoChannels,
}

impl LayoutError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidLayout
    }
}

#[derive(Debug, Clone, Error)]
pub enum TokenizerError {
    #[error("Comments spanning multiple lines ({0}) are not implemented")]
    MultiLineComment(String),
    #[error("Comment line {0} is outside of the file, which only has {1} lines")]
    CommentOutOfRange(usize, usize),
    #[error("Could not interpret comment range {0}")]
    BadCommentSpec(String),
}

impl TokenizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MultiLineComment(_) => ErrorKind::NotImplemented,
            Self::CommentOutOfRange(..) | Self::BadCommentSpec(_) => ErrorKind::InvalidContent,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TimeError {
    #[error("Could not interpret {0:?} as a date and time")]
    Unparsable(String),
}

#[derive(Debug, Clone, Error)]
pub enum ExtractorError {
    #[error("Line {line}, channel {channel}: field {value:?} in column {column} is not a number. A field with an empty string might have been detected. Are you sure you have specified correct ignore fields in the parameters?")]
    MalformedField {
        line: usize,
        channel: usize,
        column: usize,
        value: String,
    },
    #[error("Line {line}, channel {channel}: expected {expected} columns but only {found} remain on the row")]
    MissingColumns {
        line: usize,
        channel: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: time field failed to parse: {source}")]
    Timestamp {
        line: usize,
        #[source]
        source: TimeError,
    },
}

impl ExtractorError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedField
    }
}

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Could not parse log file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Assembler failed to read {0:?}: {1}")]
    ReadError(PathBuf, #[source] std::io::Error),
    #[error("Assembler failed due to layout error: {0}")]
    LayoutError(#[from] LayoutError),
    #[error("Assembler failed due to tokenizer error: {0}")]
    TokenizerError(#[from] TokenizerError),
    #[error("Assembler failed due to extractor error: {0}")]
    ExtractorError(#[from] ExtractorError),
    #[error("Assembler found no data rows at or after line {0}")]
    EmptyData(usize),
    #[error("Assembler could not shape channel {0} into a matrix: {1}")]
    Shape(usize, #[source] ndarray::ShapeError),
}

impl AssemblerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadFilePath(_) => ErrorKind::MissingFile,
            Self::ReadError(..) => ErrorKind::ReadError,
            Self::LayoutError(e) => e.kind(),
            Self::TokenizerError(e) => e.kind(),
            Self::ExtractorError(e) => e.kind(),
            Self::EmptyData(_) | Self::Shape(..) => ErrorKind::InvalidContent,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CalibrationError {
    #[error("Calibration for {channel} has {given} factors but the channel has {expected} area columns")]
    LengthMismatch {
        channel: String,
        expected: usize,
        given: usize,
    },
    #[error("Calibration covers {given} channels but the data has {expected}")]
    ChannelCountMismatch { expected: usize, given: usize },
    #[error("Calibration was given data without a {0} array")]
    MissingChannel(String),
    #[error("Calibration entry {1} of channel {0} is not a single species-factor pair")]
    BadEntry(usize, usize),
}

impl CalibrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. } | Self::ChannelCountMismatch { .. } => {
                ErrorKind::CalibrationMismatch
            }
            Self::MissingChannel(_) => ErrorKind::InvalidContent,
            Self::BadEntry(..) => ErrorKind::InvalidLayout,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum RetrievedError {
    #[error("Retrieved folder {0:?} does not exist")]
    NoRetrievedFolder(PathBuf),
    #[error("Found files {found:?}, expected to find {expected:?}")]
    MissingOutputFiles {
        found: Vec<String>,
        expected: Vec<String>,
    },
    #[error("Only one file is currently supported for parsing, {0} were expected")]
    TooManyFiles(usize),
    #[error("Retrieved folder failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Retrieved folder failed due to assembler error: {0}")]
    AssemblerError(#[from] AssemblerError),
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("ResultWriter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("ResultWriter failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Assembler error: {0}")]
    AssemblerError(#[from] AssemblerError),
    #[error("Processor failed due to Calibration error: {0}")]
    CalibrationError(#[from] CalibrationError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to ResultWriter error: {0}")]
    WriterError(#[from] WriterError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
