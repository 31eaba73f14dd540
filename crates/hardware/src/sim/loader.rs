//! Trace Loading.
//!
//! A trace is plain text with one processor access per line:
//!
//! ```text
//! # op  address  size  [data]
//! R     0x0000   1
//! W     0x0010   4     deadbeef
//! ```
//!
//! `op` is `R` (load) or `W` (store), case-insensitive. The address is hexadecimal with
//! an optional `0x` prefix, the size is decimal, and a store's data is exactly `size`
//! bytes of hexadecimal. Blank lines and `#` comments are ignored.

use std::fs;
use std::path::Path;

use crate::common::data::AccessType;
use crate::common::error::TraceError;

/// One recorded processor access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Load or store.
    pub kind: AccessType,
    /// Address of the first byte.
    pub address: u64,
    /// Access size in bytes.
    pub size: usize,
    /// Store payload; empty for loads.
    pub data: Vec<u8>,
}

impl TraceRecord {
    /// Creates a load record.
    pub const fn read(address: u64, size: usize) -> Self {
        Self {
            kind: AccessType::Read,
            address,
            size,
            data: Vec::new(),
        }
    }

    /// Creates a store record; the size is `data.len()`.
    pub fn write(address: u64, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        Self {
            kind: AccessType::Write,
            address,
            size: data.len(),
            data,
        }
    }
}

/// Reads and parses the trace file at `path`.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceRecord>, TraceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&text)
}

/// Parses trace text.
pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>, TraceError> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let record = parse_line(content).map_err(|reason| TraceError::Parse {
            line: index + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_line(content: &str) -> Result<TraceRecord, String> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    let (op, address, size, data) = match fields.as_slice() {
        [op, address, size] => (*op, *address, *size, None),
        [op, address, size, data] => (*op, *address, *size, Some(*data)),
        _ => return Err(format!("expected 3 or 4 fields, found {}", fields.len())),
    };

    let address = parse_hex_u64(address)?;
    let size: usize = size
        .parse()
        .map_err(|_| format!("invalid size '{size}'"))?;

    match (op.to_ascii_uppercase().as_str(), data) {
        ("R", None) => Ok(TraceRecord::read(address, size)),
        ("R", Some(_)) => Err("load records take no data".to_string()),
        ("W", Some(data)) => {
            let bytes = parse_hex_bytes(data)?;
            if bytes.len() != size {
                return Err(format!(
                    "store of {size} bytes carries {} bytes of data",
                    bytes.len()
                ));
            }
            Ok(TraceRecord::write(address, bytes))
        }
        ("W", None) => Err("store records need data".to_string()),
        _ => Err(format!("unknown operation '{op}'")),
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn parse_hex_u64(s: &str) -> Result<u64, String> {
    u64::from_str_radix(strip_hex_prefix(s), 16).map_err(|_| format!("invalid address '{s}'"))
}

fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let digits = strip_hex_prefix(s);
    if digits.len() % 2 != 0 || !digits.is_ascii() {
        return Err(format!("invalid data '{s}'"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| format!("invalid data '{s}'")))
        .collect()
}
