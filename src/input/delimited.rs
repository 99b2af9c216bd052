use super::Table;
use crate::core::Cell;
use std::io::Read;

/// Read a CSV table. Every value is kept as text and parsed per row later.
pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|record| record.map(|r| r.iter().map(Cell::text).collect::<Vec<_>>()))
        .collect::<Result<Vec<Vec<Cell>>, _>>()?;
    log::debug!("CSV headers: {:?}", headers);
    Ok(Table::new(headers, rows))
}
