//! Framing for module files. A module file carries the persistent
//! attribute records of a compiled module:
//!
//! ```text
//! magic  version  digest  decl-count
//! (decl-name  decl-kind  record-count  (attr-name  value)*)*
//! ```
//!
//! The framing layer does not interpret declaration kinds or attribute
//! payloads, it only moves the self-describing values of [`crate::value`]
//! in and out of the stream.

use std::io::{Read, Write};

use sable_object::ObjectRef;

use crate::{
    error::{CorruptKind, ModfileError, ModfileResult},
    value::{read_str, read_u16, read_u32, read_u64, read_u8, skip_value, write_str, write_value},
};

/// The magic bytes that every module file starts with.
pub const MAGIC: [u8; 4] = *b"SBLM";

/// The version of the module file format. The format is rewritten by the
/// compiler that produced it, so a reader only ever accepts its own
/// version, unknown attribute names are the single point of tolerance.
pub const VERSION: u16 = 1;

/// The decoded header of a module file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleHeader {
    pub version: u16,
    /// Content digest over the persistent attribute records, used as an
    /// incremental build cache key.
    pub digest: u64,
}

/// Writes the module file framing around attribute records.
pub struct ModuleWriter<W> {
    inner: W,
}

impl<W: Write> ModuleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write the magic, format version and content digest.
    pub fn write_header(&mut self, digest: u64) -> ModfileResult<()> {
        self.inner.write_all(&MAGIC)?;
        self.inner.write_all(&VERSION.to_le_bytes())?;
        self.inner.write_all(&digest.to_le_bytes())?;
        Ok(())
    }

    /// Write the number of declaration records that follow.
    pub fn write_decl_count(&mut self, count: u32) -> ModfileResult<()> {
        self.inner.write_all(&count.to_le_bytes())?;
        Ok(())
    }

    /// Begin a declaration record, stating how many attribute records it
    /// carries.
    pub fn begin_decl(&mut self, name: &str, kind: u8, records: u32) -> ModfileResult<()> {
        write_str(&mut self.inner, name)?;
        self.inner.write_all(&[kind])?;
        self.inner.write_all(&records.to_le_bytes())?;
        Ok(())
    }

    /// Write a single attribute record.
    pub fn write_record(&mut self, name: &str, payload: &ObjectRef) -> ModfileResult<()> {
        write_str(&mut self.inner, name)?;
        write_value(&mut self.inner, payload)
    }

    /// Write the name of an attribute record, leaving the payload to the
    /// caller. Attribute schemas write their payloads directly.
    pub fn write_record_name(&mut self, name: &str) -> ModfileResult<()> {
        write_str(&mut self.inner, name)
    }

    /// Access the underlying stream, positioned at the payload of the
    /// current record.
    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads the module file framing, handing out attribute records.
pub struct ModuleReader<R> {
    inner: R,
    header: ModuleHeader,
}

impl<R: Read> ModuleReader<R> {
    /// Open a module stream, validating the magic and format version.
    pub fn open(mut inner: R) -> ModfileResult<Self> {
        let mut magic = [0u8; 4];
        inner.read_exact(&mut magic)?;

        if magic != MAGIC {
            return Err(ModfileError::Corrupt(CorruptKind::BadMagic(magic)));
        }

        let version = read_u16(&mut inner)?;
        if version != VERSION {
            return Err(ModfileError::Corrupt(CorruptKind::UnsupportedVersion(version)));
        }

        let digest = read_u64(&mut inner)?;

        Ok(Self { inner, header: ModuleHeader { version, digest } })
    }

    pub fn header(&self) -> ModuleHeader {
        self.header
    }

    /// Read the number of declaration records that follow.
    pub fn read_decl_count(&mut self) -> ModfileResult<u32> {
        read_u32(&mut self.inner)
    }

    /// Read the start of a declaration record, returning the declaration
    /// name, its raw kind tag and the number of attribute records that
    /// follow.
    pub fn begin_decl(&mut self) -> ModfileResult<(String, u8, u32)> {
        let name = read_str(&mut self.inner)?;
        let kind = read_u8(&mut self.inner)?;
        let records = read_u32(&mut self.inner)?;

        Ok((name, kind, records))
    }

    /// Read the name of the next attribute record.
    pub fn read_record_name(&mut self) -> ModfileResult<String> {
        read_str(&mut self.inner)
    }

    /// Read the payload of the current attribute record.
    pub fn read_record_value(&mut self) -> ModfileResult<ObjectRef> {
        crate::value::read_value(&mut self.inner)
    }

    /// Skip the payload of the current attribute record. Used when the
    /// record belongs to an attribute this compiler has no schema for.
    pub fn skip_record_value(&mut self) -> ModfileResult<()> {
        skip_value(&mut self.inner)
    }

    /// Access the underlying stream, positioned at the payload of the
    /// current record. Attribute schemas read their payloads directly.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_module() -> Vec<u8> {
        let mut writer = ModuleWriter::new(vec![]);

        writer.write_header(0xfeed_beef).unwrap();
        writer.write_decl_count(2).unwrap();

        writer.begin_decl("vec_push", 0, 2).unwrap();
        writer.write_record("extern", &ObjectRef::ctor(0, [ObjectRef::none()])).unwrap();
        writer.write_record("export", &ObjectRef::string("sable_vec_push")).unwrap();

        writer.begin_decl("vec_len", 1, 1).unwrap();
        writer.write_record("extern", &ObjectRef::nat(2)).unwrap();

        writer.into_inner()
    }

    /// Drive the reader over a whole module, mirroring what the loader
    /// does, and return the number of records read.
    fn read_module(bytes: &[u8]) -> ModfileResult<usize> {
        let mut reader = ModuleReader::open(bytes)?;
        let mut records = 0;

        for _ in 0..reader.read_decl_count()? {
            let (_, _, count) = reader.begin_decl()?;

            for _ in 0..count {
                reader.read_record_name()?;
                reader.read_record_value()?;
                records += 1;
            }
        }

        Ok(records)
    }

    #[test]
    fn test_module_round_trip() {
        let bytes = sample_module();
        let mut reader = ModuleReader::open(bytes.as_slice()).unwrap();

        assert_eq!(reader.header(), ModuleHeader { version: VERSION, digest: 0xfeed_beef });
        assert_eq!(reader.read_decl_count().unwrap(), 2);

        let (name, kind, records) = reader.begin_decl().unwrap();
        assert_eq!((name.as_str(), kind, records), ("vec_push", 0, 2));

        assert_eq!(reader.read_record_name().unwrap(), "extern");
        assert_eq!(
            reader.read_record_value().unwrap(),
            ObjectRef::ctor(0, [ObjectRef::none()])
        );

        assert_eq!(reader.read_record_name().unwrap(), "export");
        reader.skip_record_value().unwrap();

        let (name, kind, records) = reader.begin_decl().unwrap();
        assert_eq!((name.as_str(), kind, records), ("vec_len", 1, 1));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = sample_module();
        bytes[0] = b'X';

        assert!(matches!(
            ModuleReader::open(bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::BadMagic(_)))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample_module();
        bytes[4] = VERSION as u8 + 1;

        assert!(matches!(
            ModuleReader::open(bytes.as_slice()),
            Err(ModfileError::Corrupt(CorruptKind::UnsupportedVersion(_)))
        ));
    }

    #[test]
    fn test_truncation_at_every_byte_is_corrupt() {
        let bytes = sample_module();

        for len in 0..bytes.len() {
            assert!(
                matches!(
                    read_module(&bytes[..len]),
                    Err(ModfileError::Corrupt(CorruptKind::Truncated))
                ),
                "prefix of {len} bytes should be corrupt"
            );
        }

        assert_eq!(read_module(&bytes).unwrap(), 3);
    }
}
