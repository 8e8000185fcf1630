use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::assembler::ParseOutput;
use super::error::RetrievedError;
use super::parser::GcParser;

/// A directory holding the data files handed back after staging.
///
/// This is the entry point for workflow hosts; the CLI reads its data files directly.
/// Only the directory contents are inspected; nothing is copied or moved.
#[derive(Debug, Clone)]
pub struct RetrievedFolder {
    path: PathBuf,
}

impl RetrievedFolder {
    pub fn new(path: &Path) -> Result<Self, RetrievedError> {
        if !path.is_dir() {
            return Err(RetrievedError::NoRetrievedFolder(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the files directly inside the folder, sorted
    pub fn list_object_names(&self) -> Result<Vec<String>, RetrievedError> {
        let mut names = Vec::new();
        for item in self.path.read_dir()? {
            let item = item?;
            if item.file_type()?.is_file() {
                names.push(item.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Check that every expected file was retrieved
    pub fn check_expected(&self, expected: &[String]) -> Result<(), RetrievedError> {
        let found = self.list_object_names()?;
        let found_set: BTreeSet<&String> = found.iter().collect();
        if expected.iter().all(|name| found_set.contains(name)) {
            Ok(())
        } else {
            log::error!("Found files {found:?}, expected to find {expected:?}");
            Err(RetrievedError::MissingOutputFiles {
                found,
                expected: expected.to_vec(),
            })
        }
    }

    /// Verify the folder content and parse the single expected data file
    pub fn parse(&self, parser: &GcParser, expected: &[String]) -> Result<ParseOutput, RetrievedError> {
        self.check_expected(expected)?;
        match expected {
            [filename] => Ok(parser.parse_file(&self.path.join(filename))?),
            _ => Err(RetrievedError::TooManyFiles(expected.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_code::ExitCode;
    use crate::parser::tests::{gc_example_config, GC_EXAMPLE};
    use tempfile::tempdir;

    #[test]
    fn test_missing_folder() {
        let err = RetrievedFolder::new(Path::new("/no/such/retrieved")).unwrap_err();
        assert_eq!(ExitCode::from(&err), ExitCode::NoRetrievedFolder);
    }

    #[test]
    fn test_parse_retrieved_file() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("gc_example.txt"), GC_EXAMPLE).unwrap();
        std::fs::write(dir.join("_scheduler-stdout.txt"), "").unwrap();

        let folder = RetrievedFolder::new(dir).unwrap();
        assert_eq!(
            folder.list_object_names().unwrap(),
            vec!["_scheduler-stdout.txt", "gc_example.txt"]
        );
        let parser = GcParser::new(&gc_example_config()).unwrap();
        let output = folder
            .parse(&parser, &[String::from("gc_example.txt")])
            .unwrap();
        assert_eq!(output.data.n_records(), 7);

        let missing = folder
            .parse(&parser, &[String::from("other.txt")])
            .unwrap_err();
        assert_eq!(ExitCode::from(&missing), ExitCode::MissingOutputFiles);

        std::fs::write(dir.join("second.txt"), GC_EXAMPLE).unwrap();
        let too_many = folder
            .parse(
                &parser,
                &[String::from("gc_example.txt"), String::from("second.txt")],
            )
            .unwrap_err();
        assert!(matches!(too_many, RetrievedError::TooManyFiles(2)));
    }
}
