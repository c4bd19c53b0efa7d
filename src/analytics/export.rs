use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::model::{Column, Record, JOIN_YEAR_HEADER};
use crate::data::view::View;
use crate::error::ExportError;

/// Write `records` as CSV: a header with the source column names in source
/// order, followed by `Join_Year`, then one row per record.
pub fn write_csv<'r, W: Write>(
    schema: &[Column],
    records: impl IntoIterator<Item = &'r Record>,
    writer: W,
) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = schema.iter().map(|c| c.header()).collect();
    header.push(JOIN_YEAR_HEADER);
    csv.write_record(&header)?;

    let mut rows = 0;
    for record in records {
        let mut cells: Vec<String> = schema.iter().map(|&c| record.cell(c)).collect();
        cells.push(record.join_year.to_string());
        csv.write_record(&cells)?;
        rows += 1;
    }

    csv.flush()?;
    Ok(rows)
}

/// The view as CSV text, ready to hand to a download collaborator.
pub fn view_to_csv(view: &View<'_>) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(view.store().schema(), view.records(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Write the view to `path`, returning the number of data rows written.
pub fn export_view(view: &View<'_>, path: &Path) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    let rows = write_csv(view.store().schema(), view.records(), file)?;
    log::info!("Exported {rows} customers to {}", path.display());
    Ok(rows)
}
