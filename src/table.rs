//! Framework-free model of the treatment table: one row per tooth, one text
//! cell per treatment parameter.

use crate::config::TOOTH_ROWS;
use crate::utils::{parse_cell_value, validate_cell_input, CellEdit, CellError, Column};
use crate::{Row, StepConfig, StepError};
use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("tooth {0} is not part of the table")]
    UnknownTooth(u8),
    #[error("tooth {tooth}, {column}: cell is blank")]
    BlankCell { tooth: u8, column: Column },
    #[error(transparent)]
    Cell(#[from] CellError),
    #[error(transparent)]
    Step(#[from] StepError),
    #[error("csv: {0}")]
    Csv(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub tooth: u8,
    pub cells: [String; 6],
}

impl TableRow {
    fn zeroed(tooth: u8) -> Self {
        Self {
            tooth,
            cells: Column::ALL.map(Column::zero_text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentTable {
    rows: Vec<TableRow>,
}

impl Default for TreatmentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TreatmentTable {
    /// All 32 teeth in display order with every cell at zero.
    pub fn new() -> Self {
        Self {
            rows: TOOTH_ROWS.iter().map(|&t| TableRow::zeroed(t)).collect(),
        }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn cell(&self, tooth: u8, column: Column) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.tooth == tooth)
            .map(|r| r.cells[column.index()].as_str())
    }

    /// Apply a user edit. A rejected edit leaves the cell as it was.
    pub fn set_cell(&mut self, tooth: u8, column: Column, input: &str) -> Result<(), TableError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.tooth == tooth)
            .ok_or(TableError::UnknownTooth(tooth))?;

        let edit = validate_cell_input(input, column).map_err(|e| {
            warn!("Tooth {}: rejected edit: {}", tooth, e);
            e
        })?;
        let cell = &mut row.cells[column.index()];
        match edit {
            CellEdit::Set(text) => *cell = text,
            CellEdit::Clear => cell.clear(),
        }
        debug!("Tooth {} {} = '{}'", tooth, column, cell);
        Ok(())
    }

    /// Parse every cell. Blank cells are reported, never read as zero.
    pub fn numeric_rows(&self) -> Result<Vec<Row>, TableError> {
        self.rows
            .iter()
            .map(|row| -> Result<Row, TableError> {
                let values = Column::ALL
                    .iter()
                    .map(|&column| {
                        parse_cell_value(&row.cells[column.index()]).ok_or(TableError::BlankCell {
                            tooth: row.tooth,
                            column,
                        })
                    })
                    .collect::<Result<Vec<f64>, TableError>>()?;
                Ok(Row::new(row.tooth, values))
            })
            .collect()
    }

    /// Upper bound for the playback slider.
    pub fn step_bound(&self, config: &StepConfig) -> Result<u32, TableError> {
        let rows = self.numeric_rows()?;
        Ok(config.derive_collection_step(&rows)?)
    }

    /// Load a table from CSV text.
    ///
    /// The header names the tooth column first, then any of the six column
    /// labels in any order. Teeth missing from the file keep zero cells.
    pub fn from_csv_str(csv_content: &str) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let headers = reader.headers().map_err(|e| TableError::Csv(e.to_string()))?;
        let columns = headers
            .iter()
            .skip(1)
            .map(|label| {
                Column::from_label(label)
                    .ok_or_else(|| TableError::Csv(format!("unknown column '{}'", label)))
            })
            .collect::<Result<Vec<Column>, TableError>>()?;

        let mut table = Self::new();
        let mut loaded = 0;
        for record in reader.records() {
            let record = record.map_err(|e| TableError::Csv(e.to_string()))?;
            let tooth_text = record.get(0).unwrap_or_default();
            let tooth: u8 = tooth_text
                .parse()
                .map_err(|_| TableError::Csv(format!("invalid tooth '{}'", tooth_text)))?;

            for (column, text) in columns.iter().zip(record.iter().skip(1)) {
                table.set_cell(tooth, *column, text)?;
            }
            loaded += 1;
        }

        info!("Loaded {} rows from CSV content", loaded);
        Ok(table)
    }
}
