use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use crate::error::Result;

/// Marker shown while a row is untouched. The checker paints the marker cell
/// red for the duration of a run and restores whatever was there before.
pub const DEFAULT_MARKER: &str = "#ffffff";

/// The grid of cells the checker reads from and writes back into.
///
/// Rows and columns are 1-based; row 1 is the header row. Absent or blank
/// cells read as the empty string. Each row also carries one marker value
/// used purely for in-progress feedback.
pub trait Worksheet {
    fn value(&self, row: u32, column: u32) -> Result<String>;

    fn set_value(&mut self, row: u32, column: u32, value: &str) -> Result<()>;

    fn marker(&self, row: u32) -> Result<String>;

    fn set_marker(&mut self, row: u32, marker: &str) -> Result<()>;
}

/// In-memory worksheet, loadable from and saveable to CSV.
#[derive(Debug, Clone, Default)]
pub struct GridSheet {
    cells: BTreeMap<(u32, u32), String>,
    markers: BTreeMap<u32, String>,
}

impl GridSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Self::new();
        for (row_index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = row_index as u32 + 1;
            for (col_index, value) in record.iter().enumerate() {
                if !value.is_empty() {
                    sheet.cells.insert((row, col_index as u32 + 1), value.to_string());
                }
            }
        }
        Ok(sheet)
    }

    pub fn to_csv_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)
    }

    pub fn to_csv_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        let last_row = self.last_row();
        let last_column = self.last_column();
        for row in 1..=last_row {
            let mut record = Vec::with_capacity(last_column as usize);
            for column in 1..=last_column {
                record.push(
                    self.cells
                        .get(&(row, column))
                        .map(String::as_str)
                        .unwrap_or(""),
                );
            }
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn last_row(&self) -> u32 {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    pub fn last_column(&self) -> u32 {
        self.cells.keys().map(|(_, col)| *col).max().unwrap_or(0)
    }
}

impl Worksheet for GridSheet {
    fn value(&self, row: u32, column: u32) -> Result<String> {
        Ok(self.cells.get(&(row, column)).cloned().unwrap_or_default())
    }

    fn set_value(&mut self, row: u32, column: u32, value: &str) -> Result<()> {
        self.cells.insert((row, column), value.to_string());
        Ok(())
    }

    fn marker(&self, row: u32) -> Result<String> {
        Ok(self
            .markers
            .get(&row)
            .cloned()
            .unwrap_or_else(|| DEFAULT_MARKER.to_string()))
    }

    fn set_marker(&mut self, row: u32, marker: &str) -> Result<()> {
        self.markers.insert(row, marker.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_cells_read_as_empty() {
        let sheet = GridSheet::new();
        assert_eq!(sheet.value(5, 53).unwrap(), "");
    }

    #[test]
    fn test_set_and_get_value() {
        let mut sheet = GridSheet::new();
        sheet.set_value(2, 56, "時系列信号を二値信号に変換する").unwrap();
        assert_eq!(sheet.value(2, 56).unwrap(), "時系列信号を二値信号に変換する");
    }

    #[test]
    fn test_marker_defaults_and_round_trips() {
        let mut sheet = GridSheet::new();
        assert_eq!(sheet.marker(2).unwrap(), DEFAULT_MARKER);
        sheet.set_marker(2, "#ff0000").unwrap();
        assert_eq!(sheet.marker(2).unwrap(), "#ff0000");
    }

    #[test]
    fn test_csv_round_trip() {
        let csv_data = "Name,Mechanism\nnode-a,積分器で平滑化する\nnode-b,\n";
        let sheet = GridSheet::from_csv_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(sheet.value(1, 1).unwrap(), "Name");
        assert_eq!(sheet.value(2, 2).unwrap(), "積分器で平滑化する");
        assert_eq!(sheet.value(3, 2).unwrap(), "");
        assert_eq!(sheet.last_row(), 3);

        let mut out = Vec::new();
        sheet.to_csv_writer(&mut out).unwrap();
        let reloaded = GridSheet::from_csv_reader(out.as_slice()).unwrap();
        assert_eq!(reloaded.value(2, 2).unwrap(), "積分器で平滑化する");
        assert_eq!(reloaded.value(3, 1).unwrap(), "node-b");
    }
}
