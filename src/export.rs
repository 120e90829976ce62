//! Flat tabular export of trophy records
//!
//! One row per trophy, one column per attribute. Rows serialize with serde for
//! table views and are written as RFC 4180 CSV for downloads.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::data::TrophyRecord;

/// Column names, in output order
pub const COLUMNS: [&str; 8] = [
    "game",
    "name",
    "description",
    "trophy_type",
    "rarity_percent",
    "rarity_tier",
    "earned_at",
    "icon_url",
];

const EARNED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A trophy record flattened to strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrophyRow {
    pub game: String,
    pub name: String,
    pub description: String,
    pub trophy_type: String,
    pub rarity_percent: String,
    pub rarity_tier: String,
    /// Empty when the trophy has no earned date
    pub earned_at: String,
    pub icon_url: String,
}

impl TrophyRow {
    /// Cells in [`COLUMNS`] order
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.game,
            &self.name,
            &self.description,
            &self.trophy_type,
            &self.rarity_percent,
            &self.rarity_tier,
            &self.earned_at,
            &self.icon_url,
        ]
    }
}

impl From<&TrophyRecord> for TrophyRow {
    fn from(record: &TrophyRecord) -> Self {
        Self {
            game: record.game.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            trophy_type: record.trophy_type.label().to_string(),
            rarity_percent: record
                .rarity_percent
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default(),
            rarity_tier: record
                .rarity_tier
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            earned_at: record
                .earned_at
                .map(|at| at.format(EARNED_AT_FORMAT).to_string())
                .unwrap_or_default(),
            icon_url: record.icon_url.clone().unwrap_or_default(),
        }
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

/// Writes a header row and one row per record
pub fn write_csv<'a, W, I>(mut w: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a TrophyRecord>,
{
    write_row(&mut w, &COLUMNS)?;
    for record in records {
        let row = TrophyRow::from(record);
        write_row(&mut w, &row.cells())?;
    }
    w.flush()
}

/// Writes the CSV to a file, replacing it if present
pub fn write_csv_file<'a, I>(path: &Path, records: I) -> io::Result<()>
where
    I: IntoIterator<Item = &'a TrophyRecord>,
{
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), records)
}
