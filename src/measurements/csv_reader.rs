//! # CSV reader for long-format measurement tables
//!
//! Loads a long-format table (one row per subject × sampling occasion) into
//! [`Measurement`]s. Everything dataset-specific lives in a [`LoadConfig`]:
//! column names, an optional condition filter, the mapping from sampling
//! occasion labels to clock hours, and the mapping from group codes to labels.
//!
//! ## Row policy
//! -----------------
//! Rows are processed in file order:
//!
//! 1. A row whose value cell is empty or a missing-value marker (`NA`, `NaN`, …)
//!    is **dropped**.
//! 2. A row failing the condition filter is **dropped**.
//! 3. A row whose time-point label is not in `time_point_hours` is **dropped**
//!    (when the map is empty, the time column is read directly as hours).
//! 4. Any remaining row with an empty id/group/time cell, an unparsable number,
//!    or a group code absent from a non-empty `group_labels` map is an
//!    [`CosinorError::InvalidInput`] and aborts the load.
//!
//! Header names are trimmed before lookup; a required column missing from the
//! header, or a row with fewer fields than the header, is an input error as well.
use std::fs::File;
use std::io;
use std::path::Path;

use ahash::RandomState;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::{Group, Hour, SubjectId};
use crate::cosinor_errors::CosinorError;
use crate::measurements::Measurement;

type LabelMap<V> = HashMap<String, V, RandomState>;

const MISSING_MARKERS: [&str; 6] = ["", "na", "nan", "n/a", "null", "none"];

/// Dataset description used by [`read_measurements_csv`].
///
/// Defaults
/// -----------------
/// * columns: `id`, `Group`, `TimePoint`, `Value`
/// * no condition filter
/// * `time_point_hours`: `1→1, 2→3, 3→6, 4→10, 5→14, 6→16, 7→24`
/// * `group_labels`: `1→HC, 2→MDD`
/// * delimiter: `,`
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub id_column: String,
    pub group_column: String,
    pub time_column: String,
    pub value_column: String,
    /// `(column, accepted value)`; rows with any other value are dropped
    pub condition: Option<(String, String)>,
    pub time_point_hours: LabelMap<Hour>,
    pub group_labels: LabelMap<String>,
    pub delimiter: u8,
}

impl Default for LoadConfig {
    fn default() -> Self {
        let time_point_hours = [(1, 1.0), (2, 3.0), (3, 6.0), (4, 10.0), (5, 14.0), (6, 16.0), (7, 24.0)]
            .into_iter()
            .map(|(tp, h)| (tp.to_string(), h))
            .collect();
        let group_labels = [("1", "HC"), ("2", "MDD")]
            .into_iter()
            .map(|(code, label)| (code.to_string(), label.to_string()))
            .collect();

        LoadConfig {
            id_column: "id".into(),
            group_column: "Group".into(),
            time_column: "TimePoint".into(),
            value_column: "Value".into(),
            condition: None,
            time_point_hours,
            group_labels,
            delimiter: b',',
        }
    }
}

impl LoadConfig {
    pub fn builder() -> LoadConfigBuilder {
        LoadConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadConfigBuilder {
    config: LoadConfig,
}

impl LoadConfigBuilder {
    pub fn id_column(mut self, v: impl Into<String>) -> Self {
        self.config.id_column = v.into();
        self
    }
    pub fn group_column(mut self, v: impl Into<String>) -> Self {
        self.config.group_column = v.into();
        self
    }
    pub fn time_column(mut self, v: impl Into<String>) -> Self {
        self.config.time_column = v.into();
        self
    }
    pub fn value_column(mut self, v: impl Into<String>) -> Self {
        self.config.value_column = v.into();
        self
    }
    pub fn condition(mut self, column: impl Into<String>, accepted: impl Into<String>) -> Self {
        self.config.condition = Some((column.into(), accepted.into()));
        self
    }
    pub fn delimiter(mut self, v: u8) -> Self {
        self.config.delimiter = v;
        self
    }

    /// Replace the occasion → hour map. An empty map reads the time column as hours.
    pub fn time_point_hours<I, K>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Hour)>,
        K: AsRef<str>,
    {
        self.config.time_point_hours = pairs
            .into_iter()
            .map(|(k, h)| (normalize_label(k.as_ref()), h))
            .collect();
        self
    }

    /// Replace the group code → label map. An empty map keeps raw cells as labels.
    pub fn group_labels<I, K, L>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: Into<String>,
    {
        self.config.group_labels = pairs
            .into_iter()
            .map(|(k, l)| (normalize_label(k.as_ref()), l.into()))
            .collect();
        self
    }

    pub fn build(self) -> Result<LoadConfig, CosinorError> {
        let c = &self.config;
        let columns = [&c.id_column, &c.group_column, &c.time_column, &c.value_column];
        if columns.iter().any(|name| name.trim().is_empty()) {
            return Err(CosinorError::InvalidLoadConfig(
                "column names must not be empty".into(),
            ));
        }
        if let Some((name, _)) = &c.condition {
            if name.trim().is_empty() {
                return Err(CosinorError::InvalidLoadConfig(
                    "condition column must not be empty".into(),
                ));
            }
        }
        if c.time_point_hours
            .values()
            .any(|h| !h.is_finite() || *h < 0.0)
        {
            return Err(CosinorError::InvalidLoadConfig(
                "time_point_hours must map to finite, non-negative hours".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Spreadsheet exports turn integer codes into `"1.0"`; fold those back to `"1"`.
fn normalize_label(raw: &str) -> String {
    let s = raw.trim();
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => format!("{}", x as i64),
        _ => s.to_string(),
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim().to_ascii_lowercase().as_str())
}

struct ColumnIndex {
    id: usize,
    group: usize,
    time: usize,
    value: usize,
    condition: Option<(usize, String)>,
}

fn column_index(headers: &csv::StringRecord, config: &LoadConfig) -> Result<ColumnIndex, CosinorError> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name.trim())
            .ok_or_else(|| CosinorError::InvalidInput(format!("missing column '{name}'")))
    };

    let condition = match &config.condition {
        Some((name, accepted)) => Some((find(name)?, accepted.trim().to_string())),
        None => None,
    };

    Ok(ColumnIndex {
        id: find(&config.id_column)?,
        group: find(&config.group_column)?,
        time: find(&config.time_column)?,
        value: find(&config.value_column)?,
        condition,
    })
}

fn parse_number(cell: &str, what: &str, line: u64) -> Result<f64, CosinorError> {
    cell.trim()
        .parse::<f64>()
        .map_err(|_| CosinorError::InvalidInput(format!("line {line}: unparsable {what} '{cell}'")))
}

fn required<'r>(record: &'r csv::StringRecord, idx: usize, what: &str, line: u64) -> Result<&'r str, CosinorError> {
    match record.get(idx).map(str::trim) {
        Some(cell) if !is_missing(cell) => Ok(cell),
        _ => Err(CosinorError::InvalidInput(format!("line {line}: missing {what}"))),
    }
}

/// Read measurements from any CSV source.
///
/// Arguments
/// -----------------
/// * `reader`: the CSV byte stream (header row first).
/// * `config`: dataset description, see [`LoadConfig`].
///
/// Return
/// ----------
/// * The retained measurements in file order.
pub fn read_measurements_from_reader<R: io::Read>(
    reader: R,
    config: &LoadConfig,
) -> Result<Vec<Measurement>, CosinorError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = column_index(&headers, config)?;

    let mut measurements = Vec::new();
    let (mut dropped_missing, mut dropped_filter) = (0usize, 0usize);

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() < headers.len() {
            return Err(CosinorError::InvalidInput(format!(
                "line {line}: {} fields, header has {}",
                record.len(),
                headers.len()
            )));
        }

        let value_cell = record.get(cols.value).unwrap_or("");
        if is_missing(value_cell) {
            dropped_missing += 1;
            continue;
        }

        if let Some((idx, accepted)) = &cols.condition {
            if record.get(*idx).map(str::trim) != Some(accepted.as_str()) {
                dropped_filter += 1;
                continue;
            }
        }

        let time_cell = required(&record, cols.time, "time point", line)?;
        let time_h = if config.time_point_hours.is_empty() {
            parse_number(time_cell, "time", line)?
        } else {
            match config.time_point_hours.get(&normalize_label(time_cell)) {
                Some(h) => *h,
                None => {
                    dropped_filter += 1;
                    continue;
                }
            }
        };

        let subject_id: SubjectId = match required(&record, cols.id, "subject id", line)?.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        };

        let group_cell = required(&record, cols.group, "group", line)?;
        let group = if config.group_labels.is_empty() {
            Group::from(group_cell)
        } else {
            match config.group_labels.get(&normalize_label(group_cell)) {
                Some(label) => Group::from(label.as_str()),
                None => {
                    return Err(CosinorError::InvalidInput(format!(
                        "line {line}: unknown group code '{group_cell}'"
                    )))
                }
            }
        };

        let value = parse_number(value_cell, "value", line)?;

        let m = Measurement {
            subject_id,
            group,
            time_h,
            value,
        };
        m.validate()?;
        measurements.push(m);
    }

    debug!(
        kept = measurements.len(),
        dropped_missing, dropped_filter, "measurement table loaded"
    );
    Ok(measurements)
}

/// Read measurements from a CSV file on disk.
pub fn read_measurements_csv(
    path: impl AsRef<Path>,
    config: &LoadConfig,
) -> Result<Vec<Measurement>, CosinorError> {
    let file = File::open(path)?;
    read_measurements_from_reader(io::BufReader::new(file), config)
}
