use ndarray::ArrayView2;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::assembler::{Metadata, ParseOutput, ID_NAME, TIME_NAME};
use super::calibration::ConcentrationResult;
use super::error::WriterError;

/// This is the version of the output format
const FORMAT_VERSION: &str = "1.0";

// Structure
// version, source
// metadata - start_time, comments, labels
// arrays
// |---- channel_#: [[f64]] (records x fields)
// |---- time: [f64]
// |---- id: [i64]
// concentrations (optional)
// |---- channel_#: [[f64]] (records x species)
#[derive(Debug, Serialize)]
struct ResultBundle<'a> {
    version: String,
    source: String,
    metadata: &'a Metadata,
    arrays: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    concentrations: Option<BTreeMap<String, Vec<Vec<f64>>>>,
}

fn matrix_rows(matrix: ArrayView2<'_, f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Writes the result of one parse as a YAML document.
///
/// The whole document is built in memory and written once on `write`.
#[derive(Debug)]
pub struct ResultWriter {
    path: PathBuf,
}

impl ResultWriter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(
        &self,
        source: &Path,
        output: &ParseOutput,
        concentrations: Option<&ConcentrationResult>,
    ) -> Result<(), WriterError> {
        let mut arrays = BTreeMap::new();
        for (channel, name) in output.data.channel_names().into_iter().enumerate() {
            if let Some(matrix) = output.data.channel(channel) {
                arrays.insert(name, serde_yaml::to_value(matrix_rows(matrix))?);
            }
        }
        arrays.insert(
            TIME_NAME.to_string(),
            serde_yaml::to_value(output.data.time().to_vec())?,
        );
        arrays.insert(
            ID_NAME.to_string(),
            serde_yaml::to_value(output.data.id().to_vec())?,
        );

        let concentrations = concentrations.map(|result| {
            result
                .iter()
                .map(|(name, matrix)| (name.clone(), matrix_rows(matrix.view())))
                .collect()
        });

        let bundle = ResultBundle {
            version: format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION),
            source: source.to_string_lossy().to_string(),
            metadata: &output.metadata,
            arrays,
            concentrations,
        };

        let yaml = serde_yaml::to_string(&bundle)?;
        let mut file = File::create(&self.path)?;
        file.write_all(yaml.as_bytes())?;
        log::info!("Wrote results to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::{gc_example_config, GC_EXAMPLE};
    use crate::parser::GcParser;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_bundle() {
        let parser = GcParser::new(&gc_example_config()).unwrap();
        let output = parser.parse_str(GC_EXAMPLE).unwrap();
        let file = NamedTempFile::new().unwrap();
        let path = file.path();

        let writer = ResultWriter::new(path);
        writer
            .write(Path::new("gc_example.txt"), &output, None)
            .unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(doc["source"].as_str(), Some("gc_example.txt"));
        assert_eq!(
            doc["metadata"]["start_time"].as_str(),
            Some("2019-03-14T09:58:12Z")
        );
        assert_eq!(doc["arrays"]["channel_2"][4][2].as_f64(), Some(8564457.0));
        assert_eq!(doc["arrays"]["id"][6].as_i64(), Some(7));
        assert_eq!(doc["arrays"]["time"][1].as_f64(), Some(868.0));
        assert!(doc.get("concentrations").is_none());
    }
}
