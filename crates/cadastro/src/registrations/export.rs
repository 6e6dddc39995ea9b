use chrono::{DateTime, Local};

use super::domain::Registration;
use super::store::{format_timestamp, COLUMNS};

/// Rendered spreadsheet ready to be served as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv buffer: {0}")]
    Flush(#[from] std::io::Error),
    #[error("csv output is not utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// `cadastros_<YYYYMMDD_HHMMSS>.csv`, stamped in server local time.
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("cadastros_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Writes every column in schema order. With no rows the header is left empty so the file
/// holds a single blank line.
pub fn render_csv(registrations: &[Registration]) -> Result<String, ExportError> {
    if registrations.is_empty() {
        return Ok("\r\n".to_string());
    }

    let mut buffer = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(&mut buffer);

        writer.write_record(COLUMNS)?;
        for registration in registrations {
            writer.write_record(record(registration))?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(buffer)?)
}

pub fn build_export(
    registrations: &[Registration],
    at: DateTime<Local>,
) -> Result<CsvExport, ExportError> {
    Ok(CsvExport {
        filename: export_filename(at),
        body: render_csv(registrations)?,
    })
}

fn record(registration: &Registration) -> [String; 24] {
    [
        registration.id.to_string(),
        registration.name.clone(),
        registration.email.clone(),
        registration.phone.clone(),
        registration.tax_id.clone(),
        registration.legal_name.clone(),
        registration.trade_name.clone(),
        registration.postal_code.clone(),
        registration.street.clone(),
        registration.number.clone(),
        registration.complement.clone(),
        registration.neighborhood.clone(),
        registration.city.clone(),
        registration.state.clone(),
        registration.website.clone(),
        registration.social_handle.clone(),
        registration.employee_bracket.clone(),
        registration.partner_companies.clone(),
        registration.segment.clone(),
        registration.referral_source.clone(),
        if registration.terms_accepted { "1" } else { "0" }.to_string(),
        registration.status.as_str().to_string(),
        format_timestamp(&registration.created_at),
        registration.notes.clone(),
    ]
}
