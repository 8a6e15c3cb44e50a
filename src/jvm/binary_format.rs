use super::Error;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{self, Result};

/// Utility trait for serializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - tags are always `u8`
///   - when serializing a sequence, the length of the sequence is usually `u16`
///
pub trait Serialize: Sized {
    /// Serialize construct into a binary output stream
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()>;
}

/// Mirror image of [`Serialize`]: read a construct back out of a class file buffer
pub trait Deserialize: Sized {
    /// Deserialize construct from the cursor, advancing it past the consumed bytes
    fn deserialize(cursor: &mut ByteCursor<'_>) -> std::result::Result<Self, Error>;
}

/// Bounds-checked big-endian reader over a borrowed byte buffer
///
/// A failed read leaves the cursor where it was and reports the offset at which the read
/// started.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    prev_offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor {
            bytes,
            offset: 0,
            prev_offset: 0,
        }
    }

    /// Cursor which refuses to read past `max_length`, even if the buffer is longer
    pub fn with_limit(bytes: &'a [u8], max_length: usize) -> ByteCursor<'a> {
        let end = bytes.len().min(max_length);
        ByteCursor::new(&bytes[..end])
    }

    /// Offset of the next byte to be read
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset at which the last successful read started
    pub fn prev_offset(&self) -> usize {
        self.prev_offset
    }

    /// Number of bytes left in the readable window
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, needed: usize) -> std::result::Result<&'a [u8], Error> {
        let available = self.remaining();
        if needed > available {
            return Err(Error::NotEnoughBytes {
                offset: self.offset,
                needed,
                available,
            });
        }

        let start = self.offset;
        self.prev_offset = start;
        self.offset += needed;
        Ok(&self.bytes[start..self.offset])
    }

    pub fn read_u1(&mut self) -> std::result::Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u2(&mut self) -> std::result::Result<u16, Error> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u4(&mut self) -> std::result::Result<u32, Error> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    /// Read a run of `length` raw bytes
    pub fn read_bytes(&mut self, length: usize) -> std::result::Result<&'a [u8], Error> {
        self.take(length)
    }
}

impl Serialize for u8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)
    }
}

impl Serialize for u16 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<BigEndian>(*self)
    }
}

impl Serialize for u32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<BigEndian>(*self)
    }
}

/// Size in `u16` is the first thing serialized/deserialized
impl<A: Serialize> Serialize for Vec<A> {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        let length = u16::try_from(self.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("sequence of {} elements does not fit a u16 count", self.len()),
            )
        })?;
        length.serialize(writer)?;
        for elem in self {
            elem.serialize(writer)?;
        }
        Ok(())
    }
}

impl Deserialize for u8 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> std::result::Result<Self, Error> {
        cursor.read_u1()
    }
}

impl Deserialize for u16 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> std::result::Result<Self, Error> {
        cursor.read_u2()
    }
}

impl Deserialize for u32 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> std::result::Result<Self, Error> {
        cursor.read_u4()
    }
}

impl<A: Deserialize> Deserialize for Vec<A> {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> std::result::Result<Self, Error> {
        let length = cursor.read_u2()? as usize;
        let mut elems = Vec::with_capacity(length);
        for _ in 0..length {
            elems.push(A::deserialize(cursor)?);
        }
        Ok(elems)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_big_endian_scalars() {
        let mut cursor = ByteCursor::new(&[0x01, 0x02, 0x03, 0xCA, 0xFE, 0xBA, 0xBE]);
        assert_eq!(cursor.read_u1().unwrap(), 0x01);
        assert_eq!(cursor.read_u2().unwrap(), 0x0203);
        assert_eq!(cursor.prev_offset(), 1);
        assert_eq!(cursor.read_u4().unwrap(), 0xCAFEBABE);
        assert_eq!(cursor.offset(), 7);
        assert!(cursor.is_empty());
    }

    #[test]
    fn short_read_reports_start_offset() {
        let mut cursor = ByteCursor::new(&[0x00, 0x01, 0x02]);
        assert_eq!(cursor.read_u2().unwrap(), 1);
        match cursor.read_u4() {
            Err(Error::NotEnoughBytes {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 2);
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        // A failed read does not move the cursor
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.read_u1().unwrap(), 2);
    }

    #[test]
    fn limit_shrinks_readable_window() {
        let bytes = [0u8; 8];
        let mut cursor = ByteCursor::with_limit(&bytes, 3);
        assert_eq!(cursor.remaining(), 3);
        assert!(cursor.read_bytes(4).is_err());
        assert_eq!(cursor.read_bytes(3).unwrap().len(), 3);

        let cursor = ByteCursor::with_limit(&bytes, 100);
        assert_eq!(cursor.remaining(), 8);
    }

    #[test]
    fn vec_is_u16_length_prefixed() {
        let mut buffer = vec![];
        vec![7u16, 8u16].serialize(&mut buffer).unwrap();
        assert_eq!(buffer, vec![0, 2, 0, 7, 0, 8]);

        let mut cursor = ByteCursor::new(&buffer);
        assert_eq!(Vec::<u16>::deserialize(&mut cursor).unwrap(), vec![7, 8]);
    }

    #[test]
    fn oversized_vec_is_refused() {
        let mut buffer = vec![];
        vec![0u8; u16::MAX as usize].serialize(&mut buffer).unwrap();
        assert_eq!(&buffer[..2], &[0xFF, 0xFF]);

        let mut buffer = vec![];
        match vec![0u8; u16::MAX as usize + 1].serialize(&mut buffer) {
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
