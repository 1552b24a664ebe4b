//! Binary encoding of a whole database.
//!
//! Layout (integers big-endian, counts and lengths as varints):
//!
//! ```text
//! magic "TBST" | version u16 | database name
//! table count
//!   table name | field count | (field name, type tag u8)* | row count | record*
//! crc32 of everything above
//! ```
//!
//! Decoding is strict: anything that does not match this layout exactly is
//! reported as `StoreError::CorruptStore`.

pub mod record;
pub mod varint;

use bytes::{BufMut, Bytes, BytesMut};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::table::Table;
use crate::value::FieldType;
use crate::{STORE_HEADER_SIZE, STORE_MAGIC, STORE_VERSION};

use record::{decode_record, encode_record};
use varint::{read_varint, write_varint};

const CHECKSUM_SIZE: usize = 4;

fn field_type_tag(field_type: FieldType) -> u8 {
    match field_type {
        FieldType::Integer => 1,
        FieldType::Real => 2,
        FieldType::Char => 3,
        FieldType::Text => 4,
        FieldType::Date => 5,
        FieldType::DateInterval => 6,
    }
}

fn field_type_from_tag(tag: u8) -> Result<FieldType> {
    FieldType::ALL
        .into_iter()
        .find(|&t| field_type_tag(t) == tag)
        .ok_or_else(|| StoreError::corrupt(format!("invalid field type tag: {}", tag)))
}

pub fn encode_database(db: &Database) -> Bytes {
    let mut buf = BytesMut::with_capacity(256);
    buf.put_slice(STORE_MAGIC);
    buf.put_u16(STORE_VERSION);
    put_string(&mut buf, db.name());

    write_varint(&mut buf, db.len() as u64);
    for table in db.tables() {
        put_string(&mut buf, table.name());

        let fields = table.schema().fields();
        write_varint(&mut buf, fields.len() as u64);
        for field in fields {
            put_string(&mut buf, &field.name);
            buf.put_u8(field_type_tag(field.field_type));
        }

        let rows = table.view_rows();
        write_varint(&mut buf, rows.len() as u64);
        for row in rows {
            encode_record(&mut buf, row);
        }
    }

    let checksum = crc32fast::hash(&buf);
    buf.put_u32(checksum);
    buf.freeze()
}

pub fn decode_database(data: &[u8]) -> Result<Database> {
    if data.len() < STORE_HEADER_SIZE + CHECKSUM_SIZE {
        return Err(StoreError::corrupt(format!("file too short: {} bytes", data.len())));
    }

    if &data[..4] != STORE_MAGIC {
        return Err(StoreError::corrupt(format!(
            "invalid magic: expected {:02x?}, got {:02x?}",
            STORE_MAGIC,
            &data[..4]
        )));
    }

    let version = u16::from_be_bytes([data[4], data[5]]);
    if version != STORE_VERSION {
        return Err(StoreError::corrupt(format!("unsupported version: {}", version)));
    }

    let body_end = data.len() - CHECKSUM_SIZE;
    let stored = u32::from_be_bytes([
        data[body_end],
        data[body_end + 1],
        data[body_end + 2],
        data[body_end + 3],
    ]);
    let computed = crc32fast::hash(&data[..body_end]);
    if stored != computed {
        return Err(StoreError::corrupt(format!(
            "checksum mismatch: expected {:08x}, got {:08x}",
            stored, computed
        )));
    }

    let mut reader = Reader {
        data: &data[..body_end],
        pos: STORE_HEADER_SIZE,
    };

    let mut db = Database::new(reader.string()?);
    let table_count = reader.count()?;
    for _ in 0..table_count {
        let table = reader.table()?;
        db.insert_table(table)
            .map_err(|e| StoreError::corrupt(e.to_string()))?;
    }

    if reader.pos != body_end {
        return Err(StoreError::corrupt(format!(
            "{} trailing bytes after last table",
            body_end - reader.pos
        )));
    }

    Ok(db)
}

fn put_string(buf: &mut BytesMut, s: &str) {
    write_varint(buf, s.len() as u64);
    buf.put_slice(s.as_bytes());
}

/// Checked cursor over the body of an encoded store.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn varint(&mut self) -> Result<u64> {
        let (value, bytes_read) = read_varint(self.data, self.pos)?;
        self.pos += bytes_read;
        Ok(value)
    }

    /// A count or length, which can never exceed the bytes left to read.
    fn count(&mut self) -> Result<usize> {
        let at = self.pos;
        let value = self.varint()?;
        let remaining = self.data.len() - self.pos;
        usize::try_from(value)
            .ok()
            .filter(|&n| n <= remaining)
            .ok_or_else(|| StoreError::corrupt(format!("implausible length {} at offset {}", value, at)))
    }

    fn u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| StoreError::corrupt("unexpected end of data"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn string(&mut self) -> Result<String> {
        let len = self.count()?;
        let bytes = &self.data[self.pos..self.pos + len];
        let s = std::str::from_utf8(bytes).map_err(|e| {
            StoreError::corrupt(format!("invalid UTF-8 at offset {}: {}", self.pos, e))
        })?;
        self.pos += len;
        Ok(s.to_string())
    }

    fn table(&mut self) -> Result<Table> {
        let name = self.string()?;
        if name.trim().is_empty() {
            return Err(StoreError::corrupt(format!("blank table name {:?}", name)));
        }

        let field_count = self.count()?;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let field_name = self.string()?;
            let field_type = field_type_from_tag(self.u8()?)?;
            fields.push((field_name, field_type));
        }
        let schema = Schema::new(fields)
            .map_err(|e| StoreError::corrupt(format!("table '{}': {}", name, e)))?;

        let mut table = Table::new(name, schema);
        let row_count = self.count()?;
        for _ in 0..row_count {
            let (row, bytes_read) = decode_record(self.data, self.pos)?;
            self.pos += bytes_read;
            table
                .add_row(row)
                .map_err(|e| StoreError::corrupt(format!("table '{}': {}", table.name(), e)))?;
        }

        Ok(table)
    }
}
