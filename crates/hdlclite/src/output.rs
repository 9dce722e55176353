use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded frame, with its header when data-frame parsing is on.
pub struct FrameRecord<'a> {
    pub index: usize,
    pub address: Option<u8>,
    pub control: Option<u8>,
    pub payload: &'a [u8],
}

#[derive(Serialize)]
struct FrameOutput {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    control: Option<u8>,
    payload_size: usize,
    payload: String,
    payload_hex: String,
}

#[derive(Serialize)]
struct EntryOutput {
    index: usize,
    size: usize,
    payload: String,
    payload_hex: String,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    checksum: &'a str,
    frame_size: usize,
    frame_hex: String,
}

pub fn print_frame(record: &FrameRecord<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                index: record.index,
                address: record.address,
                control: record.control,
                payload_size: record.payload.len(),
                payload: payload_preview(record.payload),
                payload_hex: hex_string(record.payload),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "ADDRESS", "CONTROL", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    record.index.to_string(),
                    optional_byte(record.address),
                    optional_byte(record.control),
                    record.payload.len().to_string(),
                    payload_preview(record.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match (record.address, record.control) {
            (Some(address), Some(control)) => println!(
                "frame={} address={address:#04x} control={control:#04x} size={} payload={}",
                record.index,
                record.payload.len(),
                payload_preview(record.payload)
            ),
            _ => println!(
                "frame={} size={} payload={}",
                record.index,
                record.payload.len(),
                payload_preview(record.payload)
            ),
        },
        OutputFormat::Raw => print_raw(record.payload),
    }
}

pub fn print_entry(index: usize, entry: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&EntryOutput {
            index,
            size: entry.len(),
            payload: payload_preview(entry),
            payload_hex: hex_string(entry),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    entry.len().to_string(),
                    payload_preview(entry),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "entry={index} size={} payload={}",
            entry.len(),
            payload_preview(entry)
        ),
        OutputFormat::Raw => print_raw(entry),
    }
}

pub fn print_encoded(checksum: &str, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            checksum,
            frame_size: wire.len(),
            frame_hex: hex_string(wire),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHECKSUM", "SIZE", "FRAME"])
                .add_row(vec![
                    checksum.to_string(),
                    wire.len().to_string(),
                    hex_string(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex_string(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Lowercase hex with no separators.
pub fn hex_string(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn optional_byte(byte: Option<u8>) -> String {
    byte.map(|b| format!("{b:#04x}"))
        .unwrap_or_else(|| "-".to_string())
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => format!("<binary {} bytes>", payload.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_is_lowercase_and_padded() {
        assert_eq!(hex_string(&[0x7E, 0x01, 0xAB]), "7e01ab");
        assert_eq!(hex_string(&[]), "");
    }

    #[test]
    fn preview_marks_binary_payloads() {
        assert_eq!(payload_preview(b"hello"), "hello");
        assert_eq!(payload_preview(&[0xFF, 0xFE]), "<binary 2 bytes>");
        assert_eq!(payload_preview(b"a\x00b"), "<binary 3 bytes>");
    }

    #[test]
    fn optional_byte_formats_hex() {
        assert_eq!(optional_byte(Some(b'R')), "0x52");
        assert_eq!(optional_byte(None), "-");
    }
}
