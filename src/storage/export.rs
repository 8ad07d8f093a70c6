//! CSV export of the flattened master tables.
//!
//! Minimal CSV writer (quotes + separators). std-only on the I/O side; the
//! row shapes live in [`crate::models`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{LapRow, MasterTables, PitRow, StintRow, SummaryRow};

pub const LAPS_OUT: &str = "master_laps.csv";
pub const PIT_OUT: &str = "master_pit.csv";
pub const STINTS_OUT: &str = "master_stints.csv";
pub const SUMMARY_OUT: &str = "master_summary.csv";

const SEP: char = ',';

/// Write the four master datasets into `out_dir`, returning the paths written.
///
/// Unlike cache writes, an export failure is a hard error: the operator asked
/// for output files and got none.
pub fn write_master_tables(tables: &MasterTables, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let written = vec![
        write_table(
            out_dir.join(LAPS_OUT),
            &LapRow::HEADERS,
            tables.laps.iter().map(LapRow::record),
        )?,
        write_table(
            out_dir.join(PIT_OUT),
            &PitRow::HEADERS,
            tables.pits.iter().map(PitRow::record),
        )?,
        write_table(
            out_dir.join(STINTS_OUT),
            &StintRow::HEADERS,
            tables.stints.iter().map(StintRow::record),
        )?,
        write_table(
            out_dir.join(SUMMARY_OUT),
            &SummaryRow::HEADERS,
            tables.summary.iter().map(SummaryRow::record),
        )?,
    ];

    Ok(written)
}

fn write_table<I>(path: PathBuf, headers: &[&str], rows: I) -> Result<PathBuf>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut w = BufWriter::new(File::create(&path)?);
    write_row(&mut w, headers)?;
    for row in rows {
        write_row(&mut w, &row)?;
    }
    w.flush()?;
    Ok(path)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{}", SEP)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn quotes_fields_containing_separators() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a,b", "plain", "say \"hi\""]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"a,b\",plain,\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn writes_all_four_files_with_headers() {
        let tmp = TempDir::new().unwrap();
        let tables = MasterTables::default();

        let written = write_master_tables(&tables, tmp.path()).unwrap();
        assert_eq!(written.len(), 4);

        let laps = std::fs::read_to_string(tmp.path().join(LAPS_OUT)).unwrap();
        assert_eq!(laps.lines().next().unwrap(), LapRow::HEADERS.join(","));

        let summary = std::fs::read_to_string(tmp.path().join(SUMMARY_OUT)).unwrap();
        assert_eq!(summary.lines().next().unwrap(), SummaryRow::HEADERS.join(","));
    }

    #[test]
    fn writes_rows_after_header() {
        let tmp = TempDir::new().unwrap();
        let mut tables = MasterTables::default();
        tables.pits.push(PitRow {
            session_key: 10022,
            track: "Jeddah".to_string(),
            driver: "Max Verstappen".to_string(),
            driver_number: Some(1),
            lap: Some(14),
            pit_duration: Some(22.5),
            team: "RedBull".to_string(),
        });

        write_master_tables(&tables, tmp.path()).unwrap();

        let pit = std::fs::read_to_string(tmp.path().join(PIT_OUT)).unwrap();
        let mut lines = pit.lines();
        lines.next();
        assert_eq!(
            lines.next().unwrap(),
            "10022,Jeddah,Max Verstappen,1,14,22.5,RedBull"
        );
    }
}
