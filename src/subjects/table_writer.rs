//! # CSV output of a fit run
//!
//! Persist a [`FitTable`] as two comma-separated tables:
//!
//! * the **parameter table**, one row per fitted subject, columns
//!   [`PARAMETER_COLUMNS`],
//! * the **skip table**, one row per degenerate subject, columns
//!   [`SKIP_COLUMNS`].
//!
//! Both tables always start with their header line, even when empty. Rows
//! follow the order of the table, which is the subject order of the run.
//! Floating-point cells use the shortest representation that reads back to
//! the same `f64`, so writing the same table twice gives identical bytes.
//!
//! Multiple numerical warnings on one subject are joined with `;` in the
//! `warnings` column.
use std::io;
use std::path::Path;

use csv::WriterBuilder;
use itertools::Itertools;
use serde::Serialize;

use crate::cosinor_errors::CosinorError;
use crate::subjects::fit_table::{FitResult, FitTable, SkipRecord};

pub const PARAMETER_COLUMNS: [&str; 14] = [
    "id",
    "Group",
    "mesor",
    "beta_cos1",
    "beta_sin1",
    "amp24",
    "acrophase24_h",
    "beta_cos2",
    "beta_sin2",
    "amp12",
    "acrophase12_h",
    "R2",
    "n",
    "warnings",
];

pub const SKIP_COLUMNS: [&str; 4] = ["id", "Group", "n", "reason"];

#[derive(Serialize)]
struct ParameterRow<'a> {
    id: String,
    group: &'a str,
    mesor: f64,
    beta_cos1: f64,
    beta_sin1: f64,
    amp24: f64,
    acrophase24_h: f64,
    beta_cos2: f64,
    beta_sin2: f64,
    amp12: f64,
    acrophase12_h: f64,
    r2: f64,
    n: usize,
    warnings: String,
}

impl<'a> From<&'a FitResult> for ParameterRow<'a> {
    fn from(r: &'a FitResult) -> Self {
        ParameterRow {
            id: r.subject_id.to_string(),
            group: r.group.as_str(),
            mesor: r.mesor,
            beta_cos1: r.coefficients.cos1,
            beta_sin1: r.coefficients.sin1,
            amp24: r.amp24,
            acrophase24_h: r.acrophase24_h,
            beta_cos2: r.coefficients.cos2,
            beta_sin2: r.coefficients.sin2,
            amp12: r.amp12,
            acrophase12_h: r.acrophase12_h,
            r2: r.r_squared,
            n: r.n_measurements,
            warnings: r.warnings.iter().join(";"),
        }
    }
}

#[derive(Serialize)]
struct SkipRow<'a> {
    id: String,
    group: &'a str,
    n: usize,
    reason: String,
}

impl<'a> From<&'a SkipRecord> for SkipRow<'a> {
    fn from(s: &'a SkipRecord) -> Self {
        SkipRow {
            id: s.subject_id.to_string(),
            group: s.group.as_str(),
            n: s.n_measurements,
            reason: s.reason.to_string(),
        }
    }
}

fn write_rows<W, T, R>(writer: W, header: &[&str], rows: R) -> Result<(), CosinorError>
where
    W: io::Write,
    T: Serialize,
    R: IntoIterator<Item = T>,
{
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the parameter table of `table` to any writer.
pub fn write_parameter_table_to<W: io::Write>(
    writer: W,
    table: &FitTable,
) -> Result<(), CosinorError> {
    write_rows(
        writer,
        &PARAMETER_COLUMNS,
        table.results.iter().map(ParameterRow::from),
    )
}

/// Write the parameter table of `table` to `path`, truncating an existing file.
pub fn write_parameter_table<P: AsRef<Path>>(path: P, table: &FitTable) -> Result<(), CosinorError> {
    let file = std::fs::File::create(path)?;
    write_parameter_table_to(io::BufWriter::new(file), table)
}

/// Write the skip table of `table` to any writer.
pub fn write_skip_table_to<W: io::Write>(writer: W, table: &FitTable) -> Result<(), CosinorError> {
    write_rows(
        writer,
        &SKIP_COLUMNS,
        table.skipped.iter().map(SkipRow::from),
    )
}

/// Write the skip table of `table` to `path`, truncating an existing file.
pub fn write_skip_table<P: AsRef<Path>>(path: P, table: &FitTable) -> Result<(), CosinorError> {
    let file = std::fs::File::create(path)?;
    write_skip_table_to(io::BufWriter::new(file), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{Group, SubjectId};
    use crate::cosinor_errors::{DegenerateReason, NumericWarning};
    use crate::regression::HarmonicCoefficients;

    fn table() -> FitTable {
        FitTable {
            results: vec![FitResult {
                subject_id: SubjectId::Int(7),
                group: Group::from("HC"),
                n_measurements: 7,
                mesor: 10.5,
                coefficients: HarmonicCoefficients {
                    mesor: 10.5,
                    cos1: 1.0,
                    sin1: -2.0,
                    cos2: 0.25,
                    sin2: 0.0,
                },
                amp24: 2.0,
                acrophase24_h: 4.0,
                peak24_h: 20.0,
                amp12: 0.25,
                acrophase12_h: 0.0,
                peak12_h: 0.0,
                r_squared: 0.75,
                adjusted_r_squared: Some(0.125),
                condition_number: 3.0,
                warnings: vec![
                    NumericWarning::ConstantSignal,
                    NumericWarning::RSquaredOutOfRange(-0.5),
                ],
            }],
            skipped: vec![SkipRecord {
                subject_id: SubjectId::String("A12".into()),
                group: Group::from("MDD"),
                n_measurements: 3,
                reason: DegenerateReason::TooFewMeasurements {
                    found: 3,
                    required: 5,
                },
            }],
        }
    }

    fn to_string(f: impl Fn(&mut Vec<u8>) -> Result<(), CosinorError>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn parameter_table_layout() {
        let t = table();
        let out = to_string(|b| write_parameter_table_to(b, &t));
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,Group,mesor,beta_cos1,beta_sin1,amp24,acrophase24_h,beta_cos2,beta_sin2,amp12,acrophase12_h,R2,n,warnings"
        );
        assert_eq!(
            lines.next().unwrap(),
            "7,HC,10.5,1.0,-2.0,2.0,4.0,0.25,0.0,0.25,0.0,0.75,7,constant_signal;r2_out_of_range(-5.000e-1)"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn skip_table_layout() {
        let t = table();
        let out = to_string(|b| write_skip_table_to(b, &t));
        assert_eq!(
            out,
            "id,Group,n,reason\nA12,MDD,3,\"too few measurements (3 found, 5 required)\"\n"
        );
    }

    #[test]
    fn empty_table_keeps_header() {
        let t = FitTable::default();
        assert_eq!(to_string(|b| write_skip_table_to(b, &t)), "id,Group,n,reason\n");
        assert_eq!(
            to_string(|b| write_parameter_table_to(b, &t)).lines().count(),
            1
        );
    }

    #[test]
    fn path_variant_writes_same_bytes() {
        let t = table();
        let path = std::env::temp_dir().join(format!("cosinor_params_{}.csv", std::process::id()));
        write_parameter_table(&path, &t).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(on_disk, to_string(|b| write_parameter_table_to(b, &t)));
    }
}
