use bytes::BufMut;
use chrono::{Datelike, NaiveDate};

use super::varint::{read_varint, varint_len, write_varint};
use crate::error::{Result, StoreError};
use crate::table::Row;
use crate::value::{DateInterval, Value};

// Value tags stored in a record header
const TAG_INTEGER: u64 = 1;
const TAG_REAL: u64 = 2;
const TAG_TEXT: u64 = 3;
const TAG_DATE: u64 = 4;
const TAG_DATE_INTERVAL: u64 = 5;

/// Record header: its own size (including the size varint) followed by one
/// tag per value.
#[derive(Debug)]
pub struct RecordHeader {
    pub size: u64,
    pub value_tags: Vec<u64>,
}

impl RecordHeader {
    pub fn for_row(row: &[Value]) -> Self {
        let value_tags: Vec<u64> = row.iter().map(value_tag).collect();
        let tags_len: usize = value_tags.iter().map(|&t| varint_len(t)).sum();

        // The size varint counts itself, so settle its width first.
        let mut size = tags_len + 1;
        while tags_len + varint_len(size as u64) != size {
            size = tags_len + varint_len(size as u64);
        }

        RecordHeader {
            size: size as u64,
            value_tags,
        }
    }

    pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self> {
        let (header_size, bytes_read) = read_varint(data, offset)?;
        let end = usize::try_from(header_size)
            .ok()
            .and_then(|size| offset.checked_add(size))
            .filter(|&end| end <= data.len() && end >= offset + bytes_read)
            .ok_or_else(|| {
                StoreError::corrupt(format!("bad record header size {} at offset {}", header_size, offset))
            })?;

        let mut pos = offset + bytes_read;
        let mut value_tags = Vec::new();
        while pos < end {
            let (tag, bytes_read) = read_varint(data, pos)?;
            pos += bytes_read;
            value_tags.push(tag);
        }
        if pos != end {
            return Err(StoreError::corrupt(format!(
                "record header at offset {} overruns its size",
                offset
            )));
        }

        Ok(RecordHeader {
            size: header_size,
            value_tags,
        })
    }

    fn write_to<B: BufMut>(&self, buf: &mut B) {
        write_varint(buf, self.size);
        for &tag in &self.value_tags {
            write_varint(buf, tag);
        }
    }
}

fn value_tag(value: &Value) -> u64 {
    match value {
        Value::Integer(_) => TAG_INTEGER,
        Value::Real(_) => TAG_REAL,
        Value::Text(_) => TAG_TEXT,
        Value::Date(_) => TAG_DATE,
        Value::DateInterval(_) => TAG_DATE_INTERVAL,
    }
}

/// Append one row as a record: header, then the value bodies in order.
pub fn encode_record<B: BufMut>(buf: &mut B, row: &[Value]) {
    RecordHeader::for_row(row).write_to(buf);
    for value in row {
        match value {
            Value::Integer(i) => buf.put_i64(*i),
            Value::Real(r) => buf.put_u64(r.to_bits()),
            Value::Text(s) => {
                write_varint(buf, s.len() as u64);
                buf.put_slice(s.as_bytes());
            }
            Value::Date(d) => buf.put_i32(d.num_days_from_ce()),
            Value::DateInterval(i) => {
                buf.put_i32(i.start().num_days_from_ce());
                buf.put_i32(i.end().num_days_from_ce());
            }
        }
    }
}

/// Decode the record starting at `offset`.
/// Returns (row, bytes_read)
pub fn decode_record(data: &[u8], offset: usize) -> Result<(Row, usize)> {
    let header = RecordHeader::from_bytes(data, offset)?;
    let mut pos = offset + header.size as usize;

    let mut row = Vec::with_capacity(header.value_tags.len());
    for &tag in &header.value_tags {
        let (value, bytes_read) = decode_value(tag, data, pos)?;
        row.push(value);
        pos += bytes_read;
    }

    Ok((row, pos - offset))
}

fn decode_value(tag: u64, data: &[u8], offset: usize) -> Result<(Value, usize)> {
    match tag {
        TAG_INTEGER => {
            let bytes = take::<8>(data, offset)?;
            Ok((Value::Integer(i64::from_be_bytes(bytes)), 8))
        }
        TAG_REAL => {
            let bytes = take::<8>(data, offset)?;
            Ok((Value::Real(f64::from_bits(u64::from_be_bytes(bytes))), 8))
        }
        TAG_TEXT => {
            let (len, bytes_read) = read_varint(data, offset)?;
            let start = offset + bytes_read;
            let text = usize::try_from(len)
                .ok()
                .and_then(|len| data.get(start..start.checked_add(len)?))
                .ok_or_else(|| StoreError::corrupt(format!("truncated text at offset {}", offset)))?;
            let text = std::str::from_utf8(text).map_err(|e| {
                StoreError::corrupt(format!("invalid UTF-8 at offset {}: {}", start, e))
            })?;
            Ok((Value::Text(text.to_string()), bytes_read + text.len()))
        }
        TAG_DATE => Ok((Value::Date(read_date(data, offset)?), 4)),
        TAG_DATE_INTERVAL => {
            let start = read_date(data, offset)?;
            let end = read_date(data, offset + 4)?;
            let interval = DateInterval::new(start, end).map_err(|e| StoreError::corrupt(e.to_string()))?;
            Ok((Value::DateInterval(interval), 8))
        }
        _ => Err(StoreError::corrupt(format!("invalid value tag: {}", tag))),
    }
}

fn read_date(data: &[u8], offset: usize) -> Result<NaiveDate> {
    let days = i32::from_be_bytes(take::<4>(data, offset)?);
    NaiveDate::from_num_days_from_ce_opt(days)
        .ok_or_else(|| StoreError::corrupt(format!("date out of range: {} days", days)))
}

fn take<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| data.get(offset..end))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| StoreError::corrupt(format!("not enough data for {} bytes at offset {}", N, offset)))
}
