use crate::config::CsvConfig;
use crate::error::{io_error, CoreResult};
use crate::tagged::TaggedError;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

pub type Record = Vec<String>;
pub type Row = BTreeMap<String, String>;

pub fn read_csv_file(path: impl AsRef<Path>) -> CoreResult<Vec<Record>> {
    read_csv_file_with(path, &CsvConfig::default())
}

/// Read every record of a headerless CSV file. All records must have the
/// same number of fields.
pub fn read_csv_file_with(path: impl AsRef<Path>, cfg: &CsvConfig) -> CoreResult<Vec<Record>> {
    read_records(open(path.as_ref())?, cfg, false)
}

pub fn write_csv_file<R, S>(path: impl AsRef<Path>, records: &[R]) -> CoreResult<()>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    write_csv_file_with(path, records, &CsvConfig::default())
}

pub fn write_csv_file_with<R, S>(
    path: impl AsRef<Path>,
    records: &[R],
    cfg: &CsvConfig,
) -> CoreResult<()>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    write_records(File::create(path)?, records, cfg)?;
    tracing::debug!(path = %path.display(), records = records.len(), "wrote csv file");
    Ok(())
}

/// Append records to an existing CSV file.
pub fn append_to_csv_file<R, S>(path: impl AsRef<Path>, records: &[R]) -> CoreResult<()>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    write_records(file, records, &CsvConfig::default())?;
    tracing::debug!(path = %path.display(), records = records.len(), "appended csv records");
    Ok(())
}

pub fn filter_csv_data<F>(records: Vec<Record>, mut keep: F) -> Vec<Record>
where
    F: FnMut(&[String]) -> bool,
{
    records.into_iter().filter(|r| keep(r)).collect()
}

/// Write each field followed by a space, one record per line.
pub fn print_csv_data<W: Write>(records: &[Record], out: &mut W) -> CoreResult<()> {
    for record in records {
        for field in record {
            write!(out, "{} ", field)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn read_csv_with_header(path: impl AsRef<Path>) -> CoreResult<Vec<Row>> {
    read_csv_with_header_with(path, &CsvConfig::default())
}

/// Map every data row onto the header row. Rows with a different number of
/// fields than the header are skipped.
pub fn read_csv_with_header_with(path: impl AsRef<Path>, cfg: &CsvConfig) -> CoreResult<Vec<Row>> {
    let path = path.as_ref();
    let records = read_records(open(path)?, cfg, true)?;
    let mut records = records.into_iter();
    let Some(headers) = records.next() else {
        return Err(
            TaggedError::validation(format!("CSV file {} is empty", path.display())).into(),
        );
    };

    let mut rows: Vec<Row> = Vec::new();
    for (idx, record) in records.enumerate() {
        if record.len() != headers.len() {
            tracing::warn!(
                path = %path.display(),
                row = idx + 1,
                fields = record.len(),
                expected = headers.len(),
                "skipping malformed csv row"
            );
            continue;
        }
        rows.push(headers.iter().cloned().zip(record).collect());
    }
    Ok(rows)
}

pub fn write_csv_with_header(path: impl AsRef<Path>, rows: &[Row]) -> CoreResult<()> {
    write_csv_with_header_with(path, rows, &CsvConfig::default())
}

/// Write a header row taken from the keys of the first row, then one record
/// per row. Keys missing from later rows are written as empty fields.
pub fn write_csv_with_header_with(
    path: impl AsRef<Path>,
    rows: &[Row],
    cfg: &CsvConfig,
) -> CoreResult<()> {
    let Some(first) = rows.first() else {
        return Err(TaggedError::validation("no data to write").into());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let mut records: Vec<Vec<&str>> = Vec::with_capacity(rows.len() + 1);
    records.push(headers.clone());
    for row in rows {
        records.push(
            headers
                .iter()
                .map(|h| row.get(*h).map(String::as_str).unwrap_or(""))
                .collect(),
        );
    }
    write_csv_file_with(path, &records, cfg)
}

fn open(path: &Path) -> CoreResult<File> {
    File::open(path).map_err(|e| io_error(path, e))
}

fn read_records<R: Read>(reader: R, cfg: &CsvConfig, flexible: bool) -> CoreResult<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(flexible)
        .delimiter(cfg.delimiter_byte()?)
        .from_reader(reader);
    let mut records: Vec<Record> = Vec::new();
    for rec in rdr.records() {
        records.push(rec?.iter().map(str::to_string).collect());
    }
    Ok(records)
}

fn write_records<W, R, S>(writer: W, records: &[R], cfg: &CsvConfig) -> CoreResult<()>
where
    W: Write,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .delimiter(cfg.delimiter_byte()?)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    for r in records {
        wtr.write_record(r.as_ref().iter().map(|f| f.as_ref()))?;
    }
    wtr.flush()?;
    Ok(())
}
