use serde::{Deserialize, Serialize};

use super::error::TokenizerError;

/// Where the comment of a log lives.
///
/// A plain integer (or a string holding one) is a single line index. Strings with a `-`
/// or `,` describe a multi-line range, which is accepted by the configuration but not
/// implemented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentRange {
    Line(usize),
    Range(String),
}

impl CommentRange {
    /// The single line index of the comment
    pub fn comment_line(&self) -> Result<usize, TokenizerError> {
        match self {
            Self::Line(line) => Ok(*line),
            Self::Range(range) => {
                if range.contains('-') || range.contains(',') {
                    Err(TokenizerError::MultiLineComment(range.clone()))
                } else {
                    range
                        .trim()
                        .parse()
                        .map_err(|_| TokenizerError::BadCommentSpec(range.clone()))
                }
            }
        }
    }
}

/// A line of the log which is to be parsed as data
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow<'a> {
    pub line: usize,
    pub fields: Vec<&'a str>,
}

/// The content of a log split into comment and data rows
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedContent<'a> {
    pub comment: Option<String>,
    pub rows: Vec<DataRow<'a>>,
}

/// Splits raw log lines into fields.
#[derive(Debug, Clone)]
pub struct RowTokenizer {
    separator: String,
    comment_line: Option<usize>,
}

impl RowTokenizer {
    /// Create a tokenizer. Fails if the comment range is not a single line.
    pub fn new(separator: &str, comment_range: Option<&CommentRange>) -> Result<Self, TokenizerError> {
        let comment_line = match comment_range {
            Some(range) => Some(range.comment_line()?),
            None => None,
        };
        Ok(Self {
            separator: separator.to_string(),
            comment_line,
        })
    }

    /// Split one line into its raw fields.
    ///
    /// Separators are not collapsed, so two tabs in a row make an empty field. An empty
    /// separator falls back to splitting on runs of whitespace.
    pub fn tokenize<'a>(&self, line: &'a str) -> Vec<&'a str> {
        if self.separator.is_empty() {
            line.split_whitespace().collect()
        } else {
            line.split(self.separator.as_str()).collect()
        }
    }

    /// Capture the comment and tokenize every row from `data_start_line` on.
    ///
    /// Blank lines and the comment line itself never become data rows.
    pub fn split_content<'a>(
        &self,
        content: &'a str,
        data_start_line: usize,
    ) -> Result<TokenizedContent<'a>, TokenizerError> {
        let lines: Vec<&str> = content.lines().collect();

        let comment = match self.comment_line {
            Some(line) => match lines.get(line) {
                Some(text) => Some(text.to_string()),
                None => return Err(TokenizerError::CommentOutOfRange(line, lines.len())),
            },
            None => None,
        };

        let mut rows = Vec::new();
        for (line, text) in lines.iter().enumerate().skip(data_start_line) {
            if Some(line) == self.comment_line {
                log::debug!("Skipping comment on line {line}");
                continue;
            }
            if text.trim().is_empty() {
                log::debug!("Skipping blank line {line}");
                continue;
            }
            rows.push(DataRow {
                line,
                fields: self.tokenize(text),
            });
        }

        Ok(TokenizedContent { comment, rows })
    }
}
