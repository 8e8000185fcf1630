use chrono::{DateTime, Utc};

use super::error::ExtractorError;
use super::layout::ChannelLayout;
use super::time_normalizer::parse_timestamp;

/// The fields of one channel block, separated by role
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFields<'a> {
    pub time: &'a str,
    pub id: Option<&'a str>,
    pub values: Vec<f64>,
}

/// One data row, fully converted.
///
/// Time and id come from the first channel only. `unused_fields` counts trailing fields
/// past the last channel block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub line: usize,
    pub timestamp: DateTime<Utc>,
    pub sample_id: i64,
    pub channels: Vec<Vec<f64>>,
    pub unused_fields: usize,
}

/// Sample ids are integers; anything else becomes 0
pub fn parse_sample_id(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Split one channel's block of raw fields into time, id and values.
///
/// `block` starts at the first column of the channel. Ignore columns are removed first,
/// then the time field, then the id field; whatever remains are the data fields, which
/// must all convert to floats.
pub fn extract_channel<'a>(
    layout: &ChannelLayout,
    block: &[&'a str],
    line: usize,
    channel: usize,
) -> Result<ChannelFields<'a>, ExtractorError> {
    if block.len() < layout.column_count() {
        return Err(ExtractorError::MissingColumns {
            line,
            channel,
            expected: layout.column_count(),
            found: block.len(),
        });
    }

    let mut fields: Vec<&'a str> = block[..layout.column_count()].to_vec();
    for (n_removed, ignore) in layout.ignore_indices().iter().enumerate() {
        fields.remove(ignore - n_removed);
    }
    let time = fields.remove(layout.compact_time_index());
    let id = layout.compact_id_index().map(|index| fields.remove(index));

    // Recover the raw column of each remaining field for diagnostics
    let field_columns = layout
        .roles()
        .iter()
        .enumerate()
        .filter(|(_, role)| !role.is_structural())
        .map(|(column, _)| column);

    let mut values = Vec::with_capacity(layout.field_count());
    for (value, column) in fields.iter().zip(field_columns) {
        match value.trim().parse::<f64>() {
            Ok(v) => values.push(v),
            Err(_) => {
                return Err(ExtractorError::MalformedField {
                    line,
                    channel,
                    column,
                    value: value.to_string(),
                })
            }
        }
    }

    Ok(ChannelFields { time, id, values })
}

/// Extract every channel of a tokenized row, in declared order.
///
/// Each channel block follows directly after the previous one.
pub fn extract_record(
    layouts: &[ChannelLayout],
    fields: &[&str],
    line: usize,
) -> Result<ParsedRecord, ExtractorError> {
    let mut offset: usize = 0;
    let mut timestamp: Option<DateTime<Utc>> = None;
    let mut sample_id: i64 = 0;
    let mut channels = Vec::with_capacity(layouts.len());

    for (channel, layout) in layouts.iter().enumerate() {
        let block = fields.get(offset..).unwrap_or(&[]);
        let extracted = extract_channel(layout, block, line, channel)?;
        if channel == 0 {
            timestamp = Some(
                parse_timestamp(extracted.time, layout.time_format())
                    .map_err(|source| ExtractorError::Timestamp { line, source })?,
            );
            sample_id = extracted.id.map(parse_sample_id).unwrap_or(0);
        }
        channels.push(extracted.values);
        offset += layout.column_count();
    }

    let timestamp = match timestamp {
        Some(ts) => ts,
        None => {
            return Err(ExtractorError::MissingColumns {
                line,
                channel: 0,
                expected: 1,
                found: 0,
            })
        }
    };

    Ok(ParsedRecord {
        line,
        timestamp,
        sample_id,
        channels,
        unused_fields: fields.len().saturating_sub(offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimeError;
    use crate::layout::ColumnRole;

    fn field(name: &str) -> ColumnRole {
        ColumnRole::Field(name.to_string())
    }

    fn gc_layout() -> ChannelLayout {
        ChannelLayout::new(
            0,
            vec![
                ColumnRole::Time(None),
                ColumnRole::Id,
                field("CO2 concentration"),
                ColumnRole::Ignore,
                field("CO2 area"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_extract_with_blank_ignore() {
        let block = ["03/14/19 09:58:12", "7", "1.5", "", "250"];
        let fields = extract_channel(&gc_layout(), &block, 3, 0).unwrap();
        assert_eq!(fields.time, "03/14/19 09:58:12");
        assert_eq!(fields.id, Some("7"));
        assert_eq!(fields.values, vec![1.5, 250.0]);
    }

    #[test]
    fn test_scattered_structural_columns() {
        let layout = ChannelLayout::new(
            0,
            vec![
                ColumnRole::Ignore,
                field("a"),
                ColumnRole::Id,
                ColumnRole::Ignore,
                ColumnRole::Time(None),
                field("b"),
                ColumnRole::Ignore,
            ],
        )
        .unwrap();
        let block = ["x", "1", "42", "y", "2019-03-14 10:00:00", "2", "z"];
        let fields = extract_channel(&layout, &block, 0, 0).unwrap();
        assert_eq!(fields.time, "2019-03-14 10:00:00");
        assert_eq!(fields.id, Some("42"));
        assert_eq!(fields.values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_missing_ignore_declaration() {
        // The blank column is not declared as ignore, so it lands in the data fields
        let layout = ChannelLayout::new(
            1,
            vec![ColumnRole::Time(None), field("a"), field("b")],
        )
        .unwrap();
        let block = ["2019-03-14 10:00:00", "", "2"];
        match extract_channel(&layout, &block, 5, 1) {
            Err(ExtractorError::MalformedField {
                line,
                channel,
                column,
                value,
            }) => {
                assert_eq!((line, channel, column), (5, 1, 1));
                assert_eq!(value, "");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_short_row() {
        let block = ["03/14/19 09:58:12", "7", "1.5"];
        assert!(matches!(
            extract_channel(&gc_layout(), &block, 2, 0),
            Err(ExtractorError::MissingColumns {
                expected: 5,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_record_takes_time_and_id_from_first_channel() {
        let layouts = vec![gc_layout(), gc_layout()];
        let fields = [
            "03/14/19 09:58:12", "A12", "1.5", "", "250",
            "garbage", "99", "2.5", "", "350", "extra",
        ];
        let record = extract_record(&layouts, &fields, 4).unwrap();
        assert_eq!(record.sample_id, 0);
        assert_eq!(record.channels, vec![vec![1.5, 250.0], vec![2.5, 350.0]]);
        assert_eq!(record.unused_fields, 1);
        assert_eq!(record.line, 4);
    }

    #[test]
    fn test_bad_first_channel_time() {
        let layouts = vec![gc_layout()];
        let fields = ["later", "1", "1.5", "", "250"];
        match extract_record(&layouts, &fields, 9) {
            Err(ExtractorError::Timestamp {
                line: 9,
                source: TimeError::Unparsable(value),
            }) => assert_eq!(value, "later"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_sample_id_default() {
        assert_eq!(parse_sample_id(" 12 "), 12);
        assert_eq!(parse_sample_id("12.0"), 0);
        assert_eq!(parse_sample_id(""), 0);
    }
}
