//! # gc_logger
//!
//! gc_logger reads the text logs written by gas chromatograph (GC) control software and
//! turns them into numeric arrays, written in Rust. A log is a table of delimited rows,
//! each row carrying the readings of one or more GC channels side by side: a timestamp,
//! a sample id, a block of concentrations, some unused columns and a block of peak areas.
//! gc_logger extracts one matrix per channel, an elapsed time series and a sample id
//! series, and optionally converts peak areas into concentrations using per species
//! calibration factors.
//!
//! ## Installation
//!
//! The only method of install is from source. With a Rust toolchain available, use
//! `cargo install --path ./gc_logger_cli` from the top level repository. The binary
//! `gc_logger_cli` is installed to your cargo install location.
//!
//! ## Configuration
//!
//! A job is described by a YAML file. `gc_logger_cli new -p config.yml` writes a
//! template. The format is as follows:
//!
//! ```yml
//! data_files:
//! - /path/to/gc_run_1.txt
//! output_path: /path/to/results
//! n_threads: 1
//! gc:
//!   separator: "\t"
//!   comment_range: null
//!   data_start_line: 1
//!   data_layout:
//!   - - time: '%m/%d/%y %H:%M:%S'
//!     - id: int
//!     - CO2 concentration: float
//!     - ignore: float
//!     - CO2 area: float
//! calibration:
//! - - CO2: 1.0
//! ```
//!
//! - `separator`: the field delimiter. An empty separator splits on any whitespace.
//! - `comment_range`: a single line index holding a free text comment, or `null`.
//! - `data_start_line`: the first line holding data.
//! - `data_layout`: one ordered list of single-key columns per channel. The key `time`
//!   marks the timestamp column and its value may give a strftime format; `id` marks the
//!   sample id; `ignore` marks a column to skip. Any other key labels a data column.
//!   Channel blocks follow each other on the row in the order given.
//! - `calibration`: optional, one list of `{species: factor}` entries per channel, in
//!   the order of that channel's area columns.
//!
//! ## Output
//!
//! For each data file a YAML result is written to `output_path` with the same stem:
//!
//! ```text
//! gc_run_1.yml
//! version, source
//! metadata - start_time, comments, labels
//! arrays
//! |---- channel_#: records x fields
//! |---- time: seconds since the first record
//! |---- id
//! concentrations (if calibrated)
//! |---- channel_#: records x species
//! ```
//!
//! Failures are reported with the stable exit statuses of [`exit_code::ExitCode`].
//!
//! ## Embedding in a workflow host
//!
//! `gc_logger_cli` works from a list of data files. A host that stages a calculation and
//! gets a folder of output files back should go through
//! [`retrieved::RetrievedFolder::parse`] instead. It checks that the folder exists and
//! holds every expected file, then parses the single data file with a [`parser::GcParser`].
//! The resulting error maps to the same [`exit_code::ExitCode`] statuses
//! (`NoRetrievedFolder`, `MissingOutputFiles`, ...).
pub mod assembler;
pub mod calibration;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod extractor;
pub mod layout;
pub mod parser;
pub mod process;
pub mod retrieved;
pub mod time_normalizer;
pub mod tokenizer;
pub mod worker_status;
pub mod writer;
