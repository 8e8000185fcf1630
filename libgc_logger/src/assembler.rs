use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::Serialize;

use super::error::AssemblerError;
use super::extractor::ParsedRecord;
use super::layout::ChannelLayout;
use super::time_normalizer::TimeNormalizer;

pub const TIME_NAME: &str = "time";
pub const ID_NAME: &str = "id";

/// Output name of a channel, counted from 1
pub fn channel_name(channel: usize) -> String {
    format!("channel_{}", channel + 1)
}

/// The numeric arrays of one parsed log.
///
/// Each channel matrix has one row per record and one column per data field.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResult {
    channels: Vec<Array2<f64>>,
    time: Array1<f64>,
    id: Array1<i64>,
}

impl SeriesResult {
    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn n_records(&self) -> usize {
        self.time.len()
    }

    pub fn channel(&self, channel: usize) -> Option<ArrayView2<'_, f64>> {
        self.channels.get(channel).map(|c| c.view())
    }

    /// Look up a channel matrix by its output name
    pub fn get_array(&self, name: &str) -> Option<ArrayView2<'_, f64>> {
        self.channel_names()
            .iter()
            .position(|n| n == name)
            .and_then(|channel| self.channel(channel))
    }

    pub fn channel_names(&self) -> Vec<String> {
        (0..self.channels.len()).map(channel_name).collect()
    }

    /// Seconds since the first record
    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.time.view()
    }

    pub fn id(&self) -> ArrayView1<'_, i64> {
        self.id.view()
    }
}

/// Descriptive information about one parsed log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub start_time: DateTime<Utc>,
    pub comments: Option<String>,
    pub labels: Vec<Vec<String>>,
}

/// Everything a single parse produces
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub data: SeriesResult,
    pub metadata: Metadata,
}

/// ArrayAssembler takes ParsedRecords and accumulates them into the output arrays.
///
/// Values are kept row-major per channel and only shaped into matrices when the
/// assembler is finished.
#[derive(Debug)]
pub struct ArrayAssembler<'a> {
    layouts: &'a [ChannelLayout],
    channel_data: Vec<Vec<f64>>,
    time: Vec<f64>,
    id: Vec<i64>,
    normalizer: TimeNormalizer,
    n_rows_with_unused: usize,
}

impl<'a> ArrayAssembler<'a> {
    pub fn new(layouts: &'a [ChannelLayout]) -> Self {
        Self {
            layouts,
            channel_data: vec![Vec::new(); layouts.len()],
            time: Vec::new(),
            id: Vec::new(),
            normalizer: TimeNormalizer::new(),
            n_rows_with_unused: 0,
        }
    }

    /// Add one record. The record must come from the same layouts.
    pub fn append_record(&mut self, record: ParsedRecord) {
        self.time.push(self.normalizer.normalize(record.timestamp));
        self.id.push(record.sample_id);
        for (data, values) in self.channel_data.iter_mut().zip(record.channels) {
            data.extend(values);
        }
        if record.unused_fields > 0 {
            self.n_rows_with_unused += 1;
        }
    }

    pub fn n_records(&self) -> usize {
        self.time.len()
    }

    /// Shape the accumulated data and attach the metadata. Consumes the assembler.
    ///
    /// `data_start_line` is only used to report an empty result.
    pub fn finish(
        self,
        comments: Option<String>,
        data_start_line: usize,
    ) -> Result<ParseOutput, AssemblerError> {
        let start_time = match self.normalizer.reference() {
            Some(start) => start,
            None => return Err(AssemblerError::EmptyData(data_start_line)),
        };
        if self.n_rows_with_unused > 0 {
            log::warn!(
                "{} rows had fields past the last declared channel; they were skipped",
                self.n_rows_with_unused
            );
        }
        if self.normalizer.n_backwards() > 0 {
            log::warn!(
                "Time went backwards {} times; elapsed time is not monotonic",
                self.normalizer.n_backwards()
            );
        }

        let n_records = self.time.len();
        let mut channels = Vec::with_capacity(self.layouts.len());
        for (channel, (layout, data)) in self.layouts.iter().zip(self.channel_data).enumerate() {
            let matrix = Array2::from_shape_vec((n_records, layout.field_count()), data)
                .map_err(|e| AssemblerError::Shape(channel, e))?;
            channels.push(matrix);
        }

        let labels = self
            .layouts
            .iter()
            .map(|layout| layout.field_labels().to_vec())
            .collect();

        Ok(ParseOutput {
            data: SeriesResult {
                channels,
                time: Array1::from_vec(self.time),
                id: Array1::from_vec(self.id),
            },
            metadata: Metadata {
                start_time,
                comments,
                labels,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ColumnRole;
    use chrono::TimeZone;

    fn layouts() -> Vec<ChannelLayout> {
        let first = ChannelLayout::new(
            0,
            vec![
                ColumnRole::Time(None),
                ColumnRole::Field("a".into()),
                ColumnRole::Field("b".into()),
            ],
        )
        .unwrap();
        let second = ChannelLayout::new(
            1,
            vec![ColumnRole::Time(None), ColumnRole::Field("c".into())],
        )
        .unwrap();
        vec![first, second]
    }

    fn record(seconds: i64, id: i64, a: f64) -> ParsedRecord {
        ParsedRecord {
            line: 0,
            timestamp: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::seconds(seconds),
            sample_id: id,
            channels: vec![vec![a, a * 2.0], vec![a * 3.0]],
            unused_fields: 0,
        }
    }

    #[test]
    fn test_assemble() {
        let layouts = layouts();
        let mut assembler = ArrayAssembler::new(&layouts);
        assembler.append_record(record(0, 1, 1.0));
        assembler.append_record(record(30, 2, 2.0));
        assert_eq!(assembler.n_records(), 2);
        let output = assembler.finish(Some(String::from("note")), 1).unwrap();

        assert_eq!(output.data.channel_names(), vec!["channel_1", "channel_2"]);
        let first = output.data.get_array("channel_1").unwrap();
        assert_eq!(first.shape(), &[2, 2]);
        assert_eq!(first[[1, 1]], 4.0);
        assert_eq!(output.data.get_array("channel_2").unwrap()[[1, 0]], 6.0);
        assert!(output.data.get_array("channel_3").is_none());
        assert_eq!(output.data.time().to_vec(), vec![0.0, 30.0]);
        assert_eq!(output.data.id().to_vec(), vec![1, 2]);
        assert_eq!(
            output.metadata.start_time,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(output.metadata.comments.as_deref(), Some("note"));
        assert_eq!(output.metadata.labels, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_empty_is_invalid() {
        let layouts = layouts();
        let assembler = ArrayAssembler::new(&layouts);
        assert!(matches!(
            assembler.finish(None, 4),
            Err(AssemblerError::EmptyData(4))
        ));
    }
}
