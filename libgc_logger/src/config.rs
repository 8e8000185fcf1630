use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::layout::ColumnSpec;
use super::tokenizer::CommentRange;

/// Per channel, an ordered list of single-key `{species: factor}` mappings
pub type CalibrationSpec = Vec<Vec<BTreeMap<String, f64>>>;

fn default_separator() -> String {
    String::from(" ")
}

/// How to read one gas chromatograph log.
///
/// Immutable once loaded; every parse gets its own accumulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub comment_range: Option<CommentRange>,
    pub data_start_line: usize,
    pub data_layout: Vec<Vec<ColumnSpec>>,
}

impl Default for ParseConfig {
    /// A single channel with time, id, one concentration and one area
    fn default() -> Self {
        let column = |key: &str, value: &str| {
            let mut spec = ColumnSpec::new();
            spec.insert(key.to_string(), value.to_string());
            spec
        };
        Self {
            separator: String::from("\t"),
            comment_range: None,
            data_start_line: 1,
            data_layout: vec![vec![
                column("time", "%m/%d/%y %H:%M:%S"),
                column("id", "int"),
                column("CO2 concentration", "float"),
                column("ignore", "float"),
                column("CO2 area", "float"),
            ]],
        }
    }
}

/// Structure representing a full processing job. Contains pathing, the parser settings
/// and the optional calibration. Configs are seralizable and deserializable to YAML using
/// serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_files: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub n_threads: i32,
    pub gc: ParseConfig,
    #[serde(default)]
    pub calibration: Option<CalibrationSpec>,
}

impl Default for Config {
    /// Generate a new Config object. Paths will be empty/invalid
    fn default() -> Self {
        let mut co2 = BTreeMap::new();
        co2.insert(String::from("CO2"), 1.0);
        Self {
            data_files: vec![],
            output_path: PathBuf::from("None"),
            n_threads: 1,
            gc: ParseConfig::default(),
            calibration: Some(vec![vec![co2]]),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Get the path of the result file for a given data file
    pub fn get_output_file_name(&self, data_file: &Path) -> Result<PathBuf, ConfigError> {
        let stem = data_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("gc_data"));
        if self.output_path.exists() {
            Ok(self.output_path.join(format!("{stem}.yml")))
        } else {
            Err(ConfigError::BadFilePath(self.output_path.clone()))
        }
    }

    pub fn is_n_threads_valid(&self) -> bool {
        self.n_threads >= 1
    }

    pub fn has_calibration(&self) -> bool {
        self.calibration.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GC_YAML: &str = r#"
data_files: [gc_example.txt]
output_path: /tmp
n_threads: 2
gc:
  separator: "\t"
  comment_range: "0"
  data_start_line: 2
  data_layout:
    - - time: "%m/%d/%y %H:%M:%S"
      - id: int
      - CO2 concentration: float
      - ignore: float
      - CO2 area: float
calibration:
  - - CO2: 2.5e-5
"#;

    #[test]
    fn test_read_yaml() {
        let config: Config = serde_yaml::from_str(GC_YAML).unwrap();
        assert_eq!(config.n_threads, 2);
        assert_eq!(config.gc.separator, "\t");
        assert_eq!(
            config.gc.comment_range,
            Some(CommentRange::Range(String::from("0")))
        );
        assert_eq!(config.gc.data_layout[0].len(), 5);
        assert_eq!(config.gc.data_layout[0][0]["time"], "%m/%d/%y %H:%M:%S");
        let calibration = config.calibration.unwrap();
        assert_eq!(calibration[0][0]["CO2"], 2.5e-5);
    }

    #[test]
    fn test_parse_config_defaults() {
        let yaml = "data_start_line: 0\ndata_layout:\n  - - time: datetime\n    - a: float\n";
        let config: ParseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.separator, " ");
        assert_eq!(config.comment_range, None);

        let line: ParseConfig =
            serde_yaml::from_str(&format!("comment_range: 3\n{yaml}")).unwrap();
        assert_eq!(line.comment_range, Some(CommentRange::Line(3)));
    }

    #[test]
    fn test_template_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.gc, config.gc);
        assert!(back.is_n_threads_valid());
        assert!(back.has_calibration());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            Config::read_config_file(Path::new("/definitely/not/here.yml")),
            Err(ConfigError::BadFilePath(_))
        ));
    }
}
