//! The self-describing binary encoding for payload objects. Every value
//! starts with a marker byte that identifies its shape, which lets a
//! reader skip over a payload it has no schema for. All integers are
//! little endian, strings are length prefixed UTF-8.

use std::io::{Read, Write};

use sable_object::{ObjectRef, ObjectView};

use crate::error::{CorruptKind, ModfileError, ModfileResult};

/// Marker byte for a natural number value.
const NAT_MARKER: u8 = 0x01;
/// Marker byte for a string value.
const STR_MARKER: u8 = 0x02;
/// Marker byte for a constructor value.
const CTOR_MARKER: u8 = 0x03;

/// The deepest value nesting that the codec accepts, on both the read and
/// the write side. Nothing legitimate comes anywhere near this, it bounds
/// the recursion when decoding hostile input.
pub const MAX_VALUE_DEPTH: usize = 4096;

/// Encode a payload object into the writer.
pub fn write_value<W: Write>(writer: &mut W, value: &ObjectRef) -> ModfileResult<()> {
    write_value_at(writer, value, 0)
}

fn write_value_at<W: Write>(
    writer: &mut W,
    value: &ObjectRef,
    depth: usize,
) -> ModfileResult<()> {
    if depth >= MAX_VALUE_DEPTH {
        return Err(ModfileError::Corrupt(CorruptKind::DepthLimitExceeded));
    }

    match value.view() {
        ObjectView::Nat(value) => {
            writer.write_all(&[NAT_MARKER])?;
            writer.write_all(&value.to_le_bytes())?;
        }
        ObjectView::Str(value) => {
            writer.write_all(&[STR_MARKER])?;
            write_str(writer, value.value())?;
        }
        ObjectView::Ctor { tag, fields } => {
            writer.write_all(&[CTOR_MARKER])?;
            writer.write_all(&tag.to_le_bytes())?;
            writer.write_all(&(fields.len() as u32).to_le_bytes())?;

            for field in fields {
                write_value_at(writer, field, depth + 1)?;
            }
        }
    }

    Ok(())
}

/// Decode a payload object from the reader.
pub fn read_value<R: Read>(reader: &mut R) -> ModfileResult<ObjectRef> {
    read_value_at(reader, 0)
}

fn read_value_at<R: Read>(reader: &mut R, depth: usize) -> ModfileResult<ObjectRef> {
    if depth >= MAX_VALUE_DEPTH {
        return Err(ModfileError::Corrupt(CorruptKind::DepthLimitExceeded));
    }

    match read_u8(reader)? {
        NAT_MARKER => Ok(ObjectRef::nat(read_u64(reader)?)),
        STR_MARKER => Ok(ObjectRef::string(read_str(reader)?)),
        CTOR_MARKER => {
            let tag = read_u32(reader)?;
            let count = read_u32(reader)?;

            let mut fields = vec![];
            for _ in 0..count {
                fields.push(read_value_at(reader, depth + 1)?);
            }

            Ok(ObjectRef::ctor(tag, fields))
        }
        marker => Err(ModfileError::Corrupt(CorruptKind::UnknownValueMarker(marker))),
    }
}

/// Advance the reader past one encoded value without materialising it.
/// Used when the reader encounters an attribute it has no schema for.
pub fn skip_value<R: Read>(reader: &mut R) -> ModfileResult<()> {
    skip_value_at(reader, 0)
}

fn skip_value_at<R: Read>(reader: &mut R, depth: usize) -> ModfileResult<()> {
    if depth >= MAX_VALUE_DEPTH {
        return Err(ModfileError::Corrupt(CorruptKind::DepthLimitExceeded));
    }

    match read_u8(reader)? {
        NAT_MARKER => {
            read_u64(reader)?;
        }
        STR_MARKER => {
            let len = read_u32(reader)? as u64;
            let copied = std::io::copy(&mut reader.by_ref().take(len), &mut std::io::sink())?;

            if copied < len {
                return Err(ModfileError::Corrupt(CorruptKind::Truncated));
            }
        }
        CTOR_MARKER => {
            read_u32(reader)?;
            let count = read_u32(reader)?;

            for _ in 0..count {
                skip_value_at(reader, depth + 1)?;
            }
        }
        marker => return Err(ModfileError::Corrupt(CorruptKind::UnknownValueMarker(marker))),
    }

    Ok(())
}

pub(crate) fn write_str<W: Write>(writer: &mut W, value: &str) -> ModfileResult<()> {
    writer.write_all(&(value.len() as u32).to_le_bytes())?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

pub(crate) fn read_str<R: Read>(reader: &mut R) -> ModfileResult<String> {
    let len = read_u32(reader)? as usize;

    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;

    String::from_utf8(buf).map_err(|_| ModfileError::Corrupt(CorruptKind::InvalidString))
}

pub(crate) fn read_u8<R: Read>(reader: &mut R) -> ModfileResult<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16<R: Read>(reader: &mut R) -> ModfileResult<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> ModfileResult<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64<R: Read>(reader: &mut R) -> ModfileResult<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;

    fn encode(value: &ObjectRef) -> Vec<u8> {
        let mut buf = vec![];
        write_value(&mut buf, value).unwrap();
        buf
    }

    #[test]
    fn test_value_round_trip() {
        let samples = [
            ObjectRef::nat(0),
            ObjectRef::nat(u64::MAX),
            ObjectRef::string(""),
            ObjectRef::string("lean_nat_add"),
            ObjectRef::unit(),
            ObjectRef::ctor(3, [
                ObjectRef::some(ObjectRef::nat(2)),
                ObjectRef::list([ObjectRef::string("a"), ObjectRef::string("b")]),
            ]),
        ];

        for value in samples {
            let bytes = encode(&value);
            let decoded = read_value(&mut bytes.as_slice()).unwrap();

            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_skip_value_consumes_exactly_one_value() {
        let mut bytes = encode(&ObjectRef::ctor(7, [
            ObjectRef::string("skipped"),
            ObjectRef::nat(9),
        ]));
        bytes.extend_from_slice(&encode(&ObjectRef::nat(42)));

        let mut reader = bytes.as_slice();
        skip_value(&mut reader).unwrap();

        assert_eq!(read_value(&mut reader).unwrap(), ObjectRef::nat(42));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_unknown_marker_is_corrupt() {
        let bytes = [0x7f, 0x00];

        assert!(matches!(
            read_value(&mut bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::UnknownValueMarker(0x7f)))
        ));
        assert!(matches!(
            skip_value(&mut bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::UnknownValueMarker(0x7f)))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        // A one byte string whose contents are not valid UTF-8.
        let bytes = [STR_MARKER, 1, 0, 0, 0, 0xff];

        assert!(matches!(
            read_value(&mut bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::InvalidString))
        ));
    }

    #[test]
    fn test_truncation_at_every_byte_is_corrupt() {
        let bytes = encode(&ObjectRef::ctor(1, [
            ObjectRef::nat(2),
            ObjectRef::string("vec_push"),
        ]));

        for len in 0..bytes.len() {
            assert!(
                matches!(
                    read_value(&mut &bytes[..len]),
                    Err(ModfileError::Corrupt(CorruptKind::Truncated))
                ),
                "prefix of {len} bytes should be corrupt"
            );
        }
    }

    #[test]
    fn test_read_depth_limit() {
        // A stream of nested single-field constructors deeper than the
        // codec accepts.
        let mut bytes = vec![];
        for _ in 0..=MAX_VALUE_DEPTH {
            bytes.push(CTOR_MARKER);
            bytes.extend_from_slice(&0u32.to_le_bytes());
            bytes.extend_from_slice(&1u32.to_le_bytes());
        }

        assert!(matches!(
            read_value(&mut bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::DepthLimitExceeded))
        ));
        assert!(matches!(
            skip_value(&mut bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::DepthLimitExceeded))
        ));
    }
}
