//! Import realized ledger entries from CSV (`month,income,expense`)

use std::io::Read;
use std::path::Path;

use csv::{Reader, Trim};
use log::info;

use super::{coerce_amount, FundLedger, LedgerError};
use crate::params::YearMonth;

/// Raw CSV row; amounts stay text so blanks coerce like form input
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    month: String,
    #[serde(default)]
    income: String,
    #[serde(default)]
    expense: String,
}

impl CsvRow {
    fn to_entry(&self) -> Result<(YearMonth, f64, f64), LedgerError> {
        let month: YearMonth = self
            .month
            .parse()
            .map_err(|_| LedgerError::InvalidMonth(self.month.clone()))?;
        Ok((month, coerce_amount(&self.income), coerce_amount(&self.expense)))
    }
}

/// Append every row of a CSV stream to the ledger.
///
/// Rows are validated before any is added, so a bad row leaves the ledger
/// unchanged. Returns the number of entries added.
pub fn import_entries_csv<R: Read>(ledger: &mut FundLedger, reader: R) -> Result<usize, LedgerError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let rows = parse_rows(&mut csv_reader)?;

    for &(month, income, expense) in &rows {
        ledger.add_entry(month, income, expense);
    }
    info!("Imported {} ledger entries", rows.len());
    Ok(rows.len())
}

/// Import entries from a CSV file on disk
pub fn import_entries_csv_path<P: AsRef<Path>>(ledger: &mut FundLedger, path: P) -> Result<usize, LedgerError> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    import_entries_csv(ledger, file)
}

fn parse_rows<R: Read>(reader: &mut Reader<R>) -> Result<Vec<(YearMonth, f64, f64)>, LedgerError> {
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        rows.push(row.to_entry()?);
    }
    Ok(rows)
}
