// A channel layout is declared in the configuration as an ordered list of single-key
// mappings, one per column of the raw log:
// [{time: fmt}, {id: int}, {He concentration: float}, {ignore: float}, {He area: float}]
// The key decides what the column is; the value is only a type hint, except for time
// where it is taken as the preferred strftime format.
//
// Everything the extractor needs is resolved here once, so rows never look at keys again.
// The adjusted indices describe where time and id sit after the ignore columns have been
// removed from a channel block (and, for id, after time has been removed as well).
use std::collections::BTreeMap;

use super::error::LayoutError;

const TIME_KEY: &str = "time";
const ID_KEY: &str = "id";
const IGNORE_KEY: &str = "ignore";
/// Labels containing this are the leading, already-computed concentration columns
const CONCENTRATION_MARKER: &str = "concentration";

/// One column entry as it appears in the configuration
pub type ColumnSpec = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    Time(Option<String>),
    Id,
    Ignore,
    Field(String),
}

impl ColumnRole {
    /// Classify a column by its key
    pub fn from_entry(key: &str, value: &str) -> Self {
        match key {
            TIME_KEY => {
                let hint = value.trim();
                if hint.contains('%') {
                    Self::Time(Some(hint.to_string()))
                } else {
                    Self::Time(None)
                }
            }
            ID_KEY => Self::Id,
            IGNORE_KEY => Self::Ignore,
            label => Self::Field(label.to_string()),
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Field(_))
    }
}

/// The resolved column layout of one instrument channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    roles: Vec<ColumnRole>,
    time_index: usize,
    id_index: Option<usize>,
    ignore_indices: Vec<usize>,
    field_labels: Vec<String>,
    time_format: Option<String>,
    compact_time_index: usize,
    compact_id_index: Option<usize>,
}

impl ChannelLayout {
    /// Resolve a layout from an ordered list of roles.
    ///
    /// `channel` is only used to label errors.
    pub fn new(channel: usize, roles: Vec<ColumnRole>) -> Result<Self, LayoutError> {
        let mut time: Option<(usize, Option<String>)> = None;
        let mut id_index: Option<usize> = None;
        let mut ignore_indices: Vec<usize> = Vec::new();
        let mut field_labels: Vec<String> = Vec::new();

        for (index, role) in roles.iter().enumerate() {
            match role {
                ColumnRole::Time(fmt) => {
                    if time.is_some() {
                        return Err(LayoutError::DuplicateTime(channel));
                    }
                    time = Some((index, fmt.clone()));
                }
                ColumnRole::Id => {
                    if id_index.is_some() {
                        return Err(LayoutError::DuplicateId(channel));
                    }
                    id_index = Some(index);
                }
                ColumnRole::Ignore => ignore_indices.push(index),
                ColumnRole::Field(label) => field_labels.push(label.clone()),
            }
        }

        let (time_index, time_format) = time.ok_or(LayoutError::MissingTime(channel))?;

        // Ignore columns to the left shift time and id down by one each
        let mut compact_time_index = time_index;
        let mut compact_id_index = id_index;
        for ignore in ignore_indices.iter() {
            if *ignore < time_index {
                compact_time_index -= 1;
            }
            if let (Some(id), Some(compact)) = (id_index, compact_id_index.as_mut()) {
                if *ignore < id {
                    *compact -= 1;
                }
            }
        }
        // Time is pulled out before id
        if let Some(id) = compact_id_index.as_mut() {
            if *id > compact_time_index {
                *id -= 1;
            }
        }

        Ok(Self {
            roles,
            time_index,
            id_index,
            ignore_indices,
            field_labels,
            time_format,
            compact_time_index,
            compact_id_index,
        })
    }

    /// Resolve a layout from the configuration form
    pub fn from_spec(channel: usize, spec: &[ColumnSpec]) -> Result<Self, LayoutError> {
        let mut roles = Vec::with_capacity(spec.len());
        for (index, entry) in spec.iter().enumerate() {
            let mut entries = entry.iter();
            match (entries.next(), entries.next()) {
                (Some((key, value)), None) => roles.push(ColumnRole::from_entry(key, value)),
                _ => return Err(LayoutError::BadColumnSpec(channel, index)),
            }
        }
        Self::new(channel, roles)
    }

    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    pub fn id_index(&self) -> Option<usize> {
        self.id_index
    }

    pub fn ignore_indices(&self) -> &[usize] {
        &self.ignore_indices
    }

    pub fn field_labels(&self) -> &[String] {
        &self.field_labels
    }

    pub fn field_count(&self) -> usize {
        self.field_labels.len()
    }

    /// Total number of raw columns this channel occupies on a row
    pub fn column_count(&self) -> usize {
        self.roles.len()
    }

    pub fn time_format(&self) -> Option<&str> {
        self.time_format.as_deref()
    }

    /// Position of the time field once the ignore columns are gone
    pub fn compact_time_index(&self) -> usize {
        self.compact_time_index
    }

    /// Position of the id field once the ignore columns and the time field are gone
    pub fn compact_id_index(&self) -> Option<usize> {
        self.compact_id_index
    }

    /// Number of fields labeled as concentrations. These lead the area columns.
    pub fn concentration_count(&self) -> usize {
        self.field_labels
            .iter()
            .filter(|label| label.contains(CONCENTRATION_MARKER))
            .count()
    }
}

/// Resolve every channel of a `data_layout` configuration entry
pub fn resolve_layouts(spec: &[Vec<ColumnSpec>]) -> Result<Vec<ChannelLayout>, LayoutError> {
    if spec.is_empty() {
        return Err(LayoutError::NoChannels);
    }
    spec.iter()
        .enumerate()
        .map(|(channel, columns)| ChannelLayout::from_spec(channel, columns))
        .collect()
}
