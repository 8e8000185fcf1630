use ndarray::{s, Array1, Array2, ArrayView2};
use std::collections::BTreeMap;

use super::assembler::{channel_name, SeriesResult};
use super::config::CalibrationSpec;
use super::error::CalibrationError;
use super::layout::ChannelLayout;

/// A calibration factor converts a raw peak area of one species into a concentration
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    pub species: String,
    pub factor: f64,
}

/// Calibration entries of every channel, in the order of the channels' area columns.
///
/// Factors are matched to columns by position, not by species name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibrationTable {
    channels: Vec<Vec<CalibrationEntry>>,
}

impl CalibrationTable {
    pub fn new(channels: Vec<Vec<CalibrationEntry>>) -> Self {
        Self { channels }
    }

    /// Build the table from the `calibration` configuration entry
    pub fn from_spec(spec: &CalibrationSpec) -> Result<Self, CalibrationError> {
        let mut channels = Vec::with_capacity(spec.len());
        for (channel, entries) in spec.iter().enumerate() {
            let mut table = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                let mut pairs = entry.iter();
                match (pairs.next(), pairs.next()) {
                    (Some((species, factor)), None) => table.push(CalibrationEntry {
                        species: species.clone(),
                        factor: *factor,
                    }),
                    _ => return Err(CalibrationError::BadEntry(channel, index)),
                }
            }
            channels.push(table);
        }
        Ok(Self { channels })
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, channel: usize) -> Option<&[CalibrationEntry]> {
        self.channels.get(channel).map(|c| c.as_slice())
    }

    /// The labels of the area columns a channel's entries are meant for
    pub fn area_labels(&self, channel: usize) -> Vec<String> {
        self.channel(channel)
            .unwrap_or(&[])
            .iter()
            .map(|entry| format!("{} area", entry.species))
            .collect()
    }
}

/// Concentration matrices keyed by the channel names of the source data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConcentrationResult {
    channels: BTreeMap<String, Array2<f64>>,
}

impl ConcentrationResult {
    pub fn get_array(&self, name: &str) -> Option<ArrayView2<'_, f64>> {
        self.channels.get(name).map(|c| c.view())
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.channels.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Array2<f64>)> {
        self.channels.iter()
    }
}

/// Multiply the area columns of one channel by their calibration factors.
///
/// The concentration columns lead the data matrix, so the area block starts after as
/// many columns as the layout has concentration labels. The result has one column per
/// calibration entry.
pub fn calculate_channel_concentration(
    data: ArrayView2<'_, f64>,
    layout: &ChannelLayout,
    entries: &[CalibrationEntry],
    name: &str,
) -> Result<Array2<f64>, CalibrationError> {
    let offset = layout.concentration_count().min(data.ncols());
    let area = data.slice(s![.., offset..]);
    if area.ncols() != entries.len() {
        return Err(CalibrationError::LengthMismatch {
            channel: name.to_string(),
            expected: area.ncols(),
            given: entries.len(),
        });
    }
    let factors: Array1<f64> = entries.iter().map(|entry| entry.factor).collect();
    Ok(&area * &factors)
}

/// Compute the concentrations of every channel of a parsed log
pub fn calculate_concentrations(
    data: &SeriesResult,
    layouts: &[ChannelLayout],
    table: &CalibrationTable,
) -> Result<ConcentrationResult, CalibrationError> {
    if table.n_channels() != data.n_channels() {
        return Err(CalibrationError::ChannelCountMismatch {
            expected: data.n_channels(),
            given: table.n_channels(),
        });
    }

    let mut result = ConcentrationResult::default();
    for (channel, layout) in layouts.iter().enumerate() {
        let name = channel_name(channel);
        let matrix = data
            .channel(channel)
            .ok_or_else(|| CalibrationError::MissingChannel(name.clone()))?;
        let entries = table.channel(channel).unwrap_or(&[]);
        let concentration = calculate_channel_concentration(matrix, layout, entries, &name)?;
        log::debug!(
            "Calibrated {} ({})",
            name,
            table.area_labels(channel).join(", ")
        );
        result.channels.insert(name, concentration);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::{gc_example_config, GC_EXAMPLE};
    use crate::error::ErrorKind;
    use crate::parser::GcParser;
    use ndarray::array;

    fn entries(factors: &[f64]) -> Vec<CalibrationEntry> {
        factors
            .iter()
            .enumerate()
            .map(|(i, factor)| CalibrationEntry {
                species: format!("S{i}"),
                factor: *factor,
            })
            .collect()
    }

    fn two_area_layout() -> ChannelLayout {
        use crate::layout::ColumnRole;
        ChannelLayout::new(
            0,
            vec![
                ColumnRole::Time(None),
                ColumnRole::Field("A concentration".into()),
                ColumnRole::Field("A area".into()),
                ColumnRole::Field("B area".into()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_channel_concentration() {
        let data = array![[9.0, 10.0, 20.0], [9.0, 30.0, 40.0]];
        let result =
            calculate_channel_concentration(data.view(), &two_area_layout(), &entries(&[0.5, 2.0]), "channel_1")
                .unwrap();
        assert_eq!(result, array![[5.0, 40.0], [15.0, 80.0]]);
    }

    #[test]
    fn test_calibration_is_column_wise() {
        let data = array![[9.0, 10.0, 20.0], [9.0, 30.0, 40.0]];
        let layout = two_area_layout();
        let base =
            calculate_channel_concentration(data.view(), &layout, &entries(&[0.5, 2.0]), "c").unwrap();
        let scaled =
            calculate_channel_concentration(data.view(), &layout, &entries(&[1.5, 2.0]), "c").unwrap();
        assert_eq!(scaled.column(0).to_vec(), (&base.column(0) * 3.0).to_vec());
        assert_eq!(scaled.column(1), base.column(1));
    }

    #[test]
    fn test_length_mismatch() {
        let data = array![[9.0, 10.0, 20.0]];
        let result =
            calculate_channel_concentration(data.view(), &two_area_layout(), &entries(&[1.0]), "channel_2");
        if let Err(err) = &result {
            assert_eq!(err.kind(), ErrorKind::CalibrationMismatch);
        }
        match result {
            Err(CalibrationError::LengthMismatch {
                channel,
                expected,
                given,
            }) => {
                assert_eq!(channel, "channel_2");
                assert_eq!((expected, given), (2, 1));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_gc_example_concentrations() {
        let yaml = r#"
- - He: 1.0
  - H2: 2.0
  - O2: 1.0
  - N2: 1.0
  - CH4: 1.0
  - CO: 0.5
- - CO2: 1.0e-3
  - H2O: 1.0
"#;
        let spec: CalibrationSpec = serde_yaml::from_str(yaml).unwrap();
        let table = CalibrationTable::from_spec(&spec).unwrap();
        assert_eq!(table.area_labels(1), vec!["CO2 area", "H2O area"]);

        let parser = GcParser::new(&gc_example_config()).unwrap();
        let output = parser.parse_str(GC_EXAMPLE).unwrap();
        let result = calculate_concentrations(&output.data, parser.layouts(), &table).unwrap();

        assert_eq!(result.names().collect::<Vec<_>>(), vec!["channel_1", "channel_2"]);
        let first = result.get_array("channel_1").unwrap();
        assert_eq!(first.shape(), &[7, 6]);
        assert_eq!(first[[0, 0]], 481157.0);
        assert_eq!(first[[0, 1]], 2.0 * 5637748.0);
        assert_eq!(first[[0, 5]], 0.5 * 286470.0);
        let second = result.get_array("channel_2").unwrap();
        assert_eq!(second.shape(), &[7, 2]);
        assert_eq!(second[[0, 0]], 356906.0 * 1.0e-3);
        assert_eq!(second[[0, 1]], 513533.0);
    }

    #[test]
    fn test_channel_count_mismatch() {
        let parser = GcParser::new(&gc_example_config()).unwrap();
        let output = parser.parse_str(GC_EXAMPLE).unwrap();
        let table = CalibrationTable::new(vec![entries(&[1.0; 6])]);
        assert!(matches!(
            calculate_concentrations(&output.data, parser.layouts(), &table),
            Err(CalibrationError::ChannelCountMismatch {
                expected: 2,
                given: 1
            })
        ));
    }

    #[test]
    fn test_bad_entry() {
        let mut entry = BTreeMap::new();
        entry.insert(String::from("CO2"), 1.0);
        entry.insert(String::from("H2O"), 1.0);
        let err = CalibrationTable::from_spec(&vec![vec![entry]]).unwrap_err();
        assert!(matches!(err, CalibrationError::BadEntry(0, 0)));
        assert_eq!(err.kind(), ErrorKind::InvalidLayout);
        assert_eq!(
            CalibrationError::MissingChannel(String::from("channel_3")).kind(),
            ErrorKind::InvalidContent
        );
    }
}
