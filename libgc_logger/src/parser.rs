use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::assembler::{ArrayAssembler, ParseOutput};
use super::config::ParseConfig;
use super::error::AssemblerError;
use super::extractor::extract_record;
use super::layout::{resolve_layouts, ChannelLayout};
use super::tokenizer::RowTokenizer;

/// GcParser turns gas chromatograph logs into arrays.
///
/// The layouts and tokenizer are resolved once from the ParseConfig, so a bad
/// configuration fails before any file is touched. The parser itself holds no state
/// between parses and can be reused for any number of files.
#[derive(Debug, Clone)]
pub struct GcParser {
    layouts: Vec<ChannelLayout>,
    tokenizer: RowTokenizer,
    data_start_line: usize,
}

impl GcParser {
    pub fn new(config: &ParseConfig) -> Result<Self, AssemblerError> {
        let layouts = resolve_layouts(&config.data_layout)?;
        let tokenizer = RowTokenizer::new(&config.separator, config.comment_range.as_ref())?;
        Ok(Self {
            layouts,
            tokenizer,
            data_start_line: config.data_start_line,
        })
    }

    pub fn layouts(&self) -> &[ChannelLayout] {
        &self.layouts
    }

    /// Read a whole log file and parse it.
    ///
    /// The file is closed before parsing starts.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutput, AssemblerError> {
        if !path.exists() {
            return Err(AssemblerError::BadFilePath(path.to_path_buf()));
        }
        let mut contents = String::new();
        {
            let mut file =
                File::open(path).map_err(|e| AssemblerError::ReadError(path.to_path_buf(), e))?;
            file.read_to_string(&mut contents)
                .map_err(|e| AssemblerError::ReadError(path.to_path_buf(), e))?;
        }
        log::info!(
            "Read {} from {}",
            human_bytes::human_bytes(contents.len() as f64),
            path.display()
        );
        self.parse_str(&contents)
    }

    /// Parse the full content of a log
    pub fn parse_str(&self, content: &str) -> Result<ParseOutput, AssemblerError> {
        let tokenized = self.tokenizer.split_content(content, self.data_start_line)?;
        let mut assembler = ArrayAssembler::new(&self.layouts);
        for row in tokenized.rows.iter() {
            let record = extract_record(&self.layouts, &row.fields, row.line)?;
            assembler.append_record(record);
        }
        log::info!(
            "Parsed {} records over {} channels",
            assembler.n_records(),
            self.layouts.len()
        );
        assembler.finish(tokenized.comment, self.data_start_line)
    }
}
