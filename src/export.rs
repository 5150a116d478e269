//! File export for appointment lists.
//!
//! This module writes a (usually date-filtered) appointment list to disk in
//! TXT, CSV or JSON with consistent formatting, for handing reports to the
//! accountant or pulling data into another tool.

use crate::error::Result;
use crate::models::{Appointment, OutputFormat};
use csv::Writer;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write appointments to a file in the specified format.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_appointments(
    appointments: &[Appointment],
    format: OutputFormat,
    file_path: &Path,
) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    match format {
        OutputFormat::Txt => write_txt_file(appointments, file_path),
        OutputFormat::Csv => write_csv_file(appointments, file_path),
        OutputFormat::Json => write_json_file(appointments, file_path),
    }
}

/// Format: `fecha hora, cliente, servicio, precio` (one line per appointment)
fn write_txt_file(appointments: &[Appointment], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);

    for appointment in appointments {
        writeln!(
            writer,
            "{} {}, {}, {}, {:.2}",
            appointment.date.format("%Y-%m-%d"),
            appointment.time,
            appointment.client_name.as_deref().unwrap_or("?"),
            appointment.service_name.as_deref().unwrap_or("?"),
            appointment.price_charged
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Includes a header row mirroring the store's display columns.
fn write_csv_file(appointments: &[Appointment], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "ID",
        "Fecha",
        "Hora",
        "Cliente",
        "Servicio",
        "Categoria",
        "Precio",
        "Propina",
        "Canal",
        "Pago",
    ])?;

    for appointment in appointments {
        writer.write_record([
            appointment.id.to_string(),
            appointment.date.format("%Y-%m-%d").to_string(),
            appointment.time.clone(),
            appointment.client_name.clone().unwrap_or_default(),
            appointment.service_name.clone().unwrap_or_default(),
            appointment.category_name.clone().unwrap_or_default(),
            format!("{:.2}", appointment.price_charged),
            format!("{:.2}", appointment.tip),
            appointment.channel.clone(),
            appointment.payment_method.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Outputs a pretty-printed JSON array of appointment objects.
fn write_json_file(appointments: &[Appointment], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, appointments)?;
    Ok(())
}
