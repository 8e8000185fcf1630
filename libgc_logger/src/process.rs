use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::calibration::{calculate_concentrations, CalibrationTable};
use super::config::Config;
use super::error::ProcessorError;
use super::exit_code::ExitCode;
use super::parser::GcParser;
use super::worker_status::{BarColor, WorkerStatus};
use super::writer::ResultWriter;

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Parse one data file, calibrate it if the job has a calibration, and write the result.
pub fn process_file(
    config: &Config,
    parser: &GcParser,
    table: Option<&CalibrationTable>,
    path: &Path,
) -> Result<PathBuf, ProcessorError> {
    let output_path = config.get_output_file_name(path)?;
    let output = parser.parse_file(path)?;
    let concentrations = match table {
        Some(table) => Some(calculate_concentrations(
            &output.data,
            parser.layouts(),
            table,
        )?),
        None => None,
    };
    let writer = ResultWriter::new(&output_path);
    writer.write(path, &output, concentrations.as_ref())?;
    Ok(output_path)
}

/// Process a subset of data files.
///
/// A file that fails is logged with its exit code and skipped. Returns the number of
/// failed files. Errors in the configuration itself or in reporting stop the worker.
pub fn process_subset(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
    subset: Vec<PathBuf>,
) -> Result<usize, ProcessorError> {
    let parser = GcParser::new(&config.gc)?;
    let table = match &config.calibration {
        Some(spec) => Some(CalibrationTable::from_spec(spec)?),
        None => None,
    };

    let n_files = subset.len().max(1) as f32;
    let mut n_failed = 0;
    for (idx, path) in subset.iter().enumerate() {
        let label = file_label(path);
        tx.send(WorkerStatus::new(
            idx as f32 / n_files,
            &label,
            worker_id,
            BarColor::CYAN,
        ))?;
        log::info!("Processing file {}...", path.display());
        match process_file(&config, &parser, table.as_ref(), path) {
            Ok(output_path) => {
                log::info!(
                    "Finished processing file {}, results in {}.",
                    label,
                    output_path.display()
                );
                tx.send(WorkerStatus::new(
                    (idx + 1) as f32 / n_files,
                    &label,
                    worker_id,
                    BarColor::GREEN,
                ))?;
            }
            Err(e) => {
                let code = ExitCode::from(&e);
                log::error!("File {} failed with exit code {}: {}", label, code, e);
                n_failed += 1;
                tx.send(WorkerStatus::new(
                    (idx + 1) as f32 / n_files,
                    &label,
                    worker_id,
                    BarColor::RED,
                ))?;
            }
        }
    }
    Ok(n_failed)
}

/// Divide the data files into a set of subsets (per thread/worker)
pub fn create_subsets(config: &Config) -> Vec<Vec<PathBuf>> {
    let mut subsets: Vec<Vec<PathBuf>> = vec![Vec::new(); config.n_threads.max(1) as usize];
    let n_subsets = subsets.len();

    for (idx, file) in config.data_files.iter().enumerate() {
        subsets[idx % n_subsets].push(file.clone())
    }

    subsets
}
