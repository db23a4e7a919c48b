use std::io::{Read, Seek};

use crate::reader::LittleEndianReader;

use super::decimal::Decimal;
use super::error::ParseError;
use super::wire::PrimitiveType;

/// Longest string the 2-byte length prefix can describe.
pub const MAX_STRING_LEN: usize = 16383;

/// A decoded primitive wire value. One variant per primitive type code;
/// Null (17) never appears as a concrete value and is rejected at decode
/// time.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Char(char),
    Decimal(Decimal),
    Double(f64),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    /// Raw tick count, 100ns units.
    TimeSpan(i64),
    /// Raw payload: 2 kind bits in the top of the word, 62 tick bits below.
    DateTime(u64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    String(String),
}

impl Primitive {
    /// Wrapping constructors: building a value from an out-of-range native
    /// integer masks it modulo the type's bit width with two's-complement
    /// sign handling, so programmatic edits never panic and in-range
    /// round trips stay exact.
    pub fn int8(value: i64) -> Self {
        Primitive::SByte(value as i8)
    }

    pub fn uint8(value: i64) -> Self {
        Primitive::Byte(value as u8)
    }

    pub fn int16(value: i64) -> Self {
        Primitive::Int16(value as i16)
    }

    pub fn uint16(value: i64) -> Self {
        Primitive::UInt16(value as u16)
    }

    pub fn int32(value: i64) -> Self {
        Primitive::Int32(value as i32)
    }

    pub fn uint32(value: i64) -> Self {
        Primitive::UInt32(value as u32)
    }

    pub fn int64(value: i64) -> Self {
        Primitive::Int64(value)
    }

    pub fn uint64(value: i64) -> Self {
        Primitive::UInt64(value as u64)
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Primitive::Boolean(_) => PrimitiveType::Boolean,
            Primitive::Byte(_) => PrimitiveType::Byte,
            Primitive::SByte(_) => PrimitiveType::SByte,
            Primitive::Char(_) => PrimitiveType::Char,
            Primitive::Decimal(_) => PrimitiveType::Decimal,
            Primitive::Double(_) => PrimitiveType::Double,
            Primitive::Int16(_) => PrimitiveType::Int16,
            Primitive::Int32(_) => PrimitiveType::Int32,
            Primitive::Int64(_) => PrimitiveType::Int64,
            Primitive::Single(_) => PrimitiveType::Single,
            Primitive::TimeSpan(_) => PrimitiveType::TimeSpan,
            Primitive::DateTime(_) => PrimitiveType::DateTime,
            Primitive::UInt16(_) => PrimitiveType::UInt16,
            Primitive::UInt32(_) => PrimitiveType::UInt32,
            Primitive::UInt64(_) => PrimitiveType::UInt64,
            Primitive::String(_) => PrimitiveType::String,
        }
    }

    /// Encodes the value to its exact wire form (without the type code).
    pub fn to_bytes(&self) -> Result<Vec<u8>, ParseError> {
        Ok(match self {
            Primitive::Boolean(v) => vec![u8::from(*v)],
            Primitive::Byte(v) => vec![*v],
            Primitive::SByte(v) => v.to_le_bytes().to_vec(),
            Primitive::Char(v) => {
                let mut buf = [0u8; 4];
                v.encode_utf8(&mut buf).as_bytes().to_vec()
            }
            Primitive::Decimal(v) => encode_length_prefixed_string(v.as_str())?,
            Primitive::Double(v) => v.to_le_bytes().to_vec(),
            Primitive::Int16(v) => v.to_le_bytes().to_vec(),
            Primitive::Int32(v) => v.to_le_bytes().to_vec(),
            Primitive::Int64(v) => v.to_le_bytes().to_vec(),
            Primitive::Single(v) => v.to_le_bytes().to_vec(),
            Primitive::TimeSpan(v) => v.to_le_bytes().to_vec(),
            Primitive::DateTime(v) => v.to_le_bytes().to_vec(),
            Primitive::UInt16(v) => v.to_le_bytes().to_vec(),
            Primitive::UInt32(v) => v.to_le_bytes().to_vec(),
            Primitive::UInt64(v) => v.to_le_bytes().to_vec(),
            Primitive::String(v) => encode_length_prefixed_string(v)?,
        })
    }
}

/// Decodes one primitive of the given type code from the stream.
pub fn decode_primitive<R: Read + Seek>(
    kind: PrimitiveType,
    r: &mut LittleEndianReader<R>,
) -> Result<Primitive, ParseError> {
    Ok(match kind {
        PrimitiveType::Boolean => Primitive::Boolean(r.read_u8()? != 0),
        PrimitiveType::Byte => Primitive::Byte(r.read_u8()?),
        PrimitiveType::SByte => Primitive::SByte(r.read_u8()? as i8),
        PrimitiveType::Char => Primitive::Char(read_char(r)?),
        PrimitiveType::Decimal => {
            let raw = read_length_prefixed_string(r)?;
            Primitive::Decimal(Decimal::new(&raw)?)
        }
        PrimitiveType::Double => Primitive::Double(r.read_f64()?),
        PrimitiveType::Int16 => Primitive::Int16(r.read_i16()?),
        PrimitiveType::Int32 => Primitive::Int32(r.read_i32()?),
        PrimitiveType::Int64 => Primitive::Int64(r.read_i64()?),
        PrimitiveType::Single => Primitive::Single(r.read_f32()?),
        PrimitiveType::TimeSpan => Primitive::TimeSpan(r.read_i64()?),
        PrimitiveType::DateTime => Primitive::DateTime(r.read_u64()?),
        PrimitiveType::UInt16 => Primitive::UInt16(r.read_u16()?),
        PrimitiveType::UInt32 => Primitive::UInt32(r.read_u32()?),
        PrimitiveType::UInt64 => Primitive::UInt64(r.read_u64()?),
        PrimitiveType::Null => {
            return Err(ParseError::Unsupported(
                "primitive type Null as a member value",
            ));
        }
        PrimitiveType::String => Primitive::String(read_length_prefixed_string(r)?),
    })
}

/// A UTF-8 scalar read by lead-byte width (1-4 bytes).
fn read_char<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> Result<char, ParseError> {
    let lead = r.read_u8()?;
    let width = if lead >= 0xF0 {
        4
    } else if lead >= 0xE0 {
        3
    } else if lead >= 0x80 {
        2
    } else {
        1
    };

    let mut bytes = vec![lead];
    bytes.extend(r.read_bytes(width - 1)?);
    let decoded = std::str::from_utf8(&bytes)
        .map_err(|_| ParseError::InvalidUtf8 { context: "char" })?;
    decoded
        .chars()
        .next()
        .ok_or(ParseError::InvalidUtf8 { context: "char" })
}

/// Reads the 7-bit continuation length prefix: bit 7 of the first byte
/// flags a second byte carrying bits 7-13. Capped at 2 bytes, so lengths
/// above 16383 are unrepresentable; the second byte must have bit 7 clear.
pub fn read_string_length<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
) -> Result<usize, ParseError> {
    let first = r.read_u8()?;
    if first & 0x80 == 0 {
        return Ok(first as usize);
    }

    let low = (first & 0x7F) as usize;
    let second = r.read_u8()?;
    if second & 0x80 != 0 {
        return Err(ParseError::BadLengthPrefix);
    }
    Ok(((second as usize) << 7) | low)
}

/// Encodes a length into 1 or 2 prefix bytes.
pub fn encode_string_length(len: usize) -> Result<Vec<u8>, ParseError> {
    if len <= 0x7F {
        Ok(vec![len as u8])
    } else if len <= MAX_STRING_LEN {
        Ok(vec![0x80 | (len & 0x7F) as u8, (len >> 7) as u8])
    } else {
        Err(ParseError::StringTooLong(len))
    }
}

pub fn read_length_prefixed_string<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
) -> Result<String, ParseError> {
    let length = read_string_length(r)?;
    let payload = r.read_bytes(length)?;
    String::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8 { context: "string" })
}

pub fn encode_length_prefixed_string(value: &str) -> Result<Vec<u8>, ParseError> {
    let payload = value.as_bytes();
    let mut out = encode_string_length(payload.len())?;
    out.extend_from_slice(payload);
    Ok(out)
}
