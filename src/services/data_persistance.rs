use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use crate::domain::{CompanyRecord, EnrichedRow};

pub const SAMPLE_COMPANIES: [&str; 5] = ["OpenAI", "DeepMind", "Zoho", "Freshworks", "Stripe"];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input is missing the required '{0}' column")]
    MissingColumn(String),
    #[error("Malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Company names from the `column` column, trimmed, blanks dropped.
/// Cells that are not valid utf-8 are read as windows-1252.
pub fn read_company_names<R: Read>(reader: R, column: &str) -> Result<Vec<String>, InputError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let column_idx = reader
        .byte_headers()?
        .iter()
        .position(|header| decode_cell(header).trim() == column)
        .ok_or_else(|| InputError::MissingColumn(column.to_string()))?;

    let mut names = vec![];
    for record in reader.byte_records() {
        let record = record?;
        let name = match record.get(column_idx) {
            Some(cell) => decode_cell(cell).trim().to_string(),
            None => continue,
        };
        if !name.is_empty() {
            names.push(name);
        }
    }

    log::info!("Loaded {} companies from input", names.len());
    Ok(names)
}

fn decode_cell(cell: &[u8]) -> String {
    match std::str::from_utf8(cell) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(cell).0.into_owned(),
    }
}

pub fn read_company_names_from_path(
    path: impl AsRef<Path>,
    column: &str,
) -> Result<Vec<String>, InputError> {
    read_company_names(File::open(path)?, column)
}

pub fn write_records<W: Write>(writer: W, records: &[CompanyRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(EnrichedRow::from(record))?;
    }
    // header row even when nothing was processed
    if records.is_empty() {
        writer.write_record([
            "company_name",
            "website",
            "industry",
            "summary_from_llm",
            "automation_pitch_from_llm",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_records_to_path(
    path: impl AsRef<Path>,
    records: &[CompanyRecord],
) -> Result<(), csv::Error> {
    let path = path.as_ref();
    write_records(File::create(path)?, records)?;
    log::info!("Results saved to {}", path.display());
    Ok(())
}

pub fn write_sample<W: Write>(writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["company_name"])?;
    for name in SAMPLE_COMPANIES {
        writer.write_record([name])?;
    }
    writer.flush()?;
    Ok(())
}

/// Returns false when the file already exists and was left untouched.
pub fn write_sample_companies(path: impl AsRef<Path>) -> Result<bool, csv::Error> {
    let path = path.as_ref();
    if path.exists() {
        log::info!("Sample file {} already exists", path.display());
        return Ok(false);
    }

    write_sample(File::create(path)?)?;
    log::info!("Created sample file: {}", path.display());
    Ok(true)
}
