/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::prelude::*;
use std::io::{Error, ErrorKind, Result, SeekFrom};

/// Reads binary values with a switchable byte order. Every read that would run
/// past the end of the stream fails with `UnexpectedEof` instead of panicking.
pub struct ByteOrderReader<R: Read + Seek> {
    is_le: bool,
    reader: R,
    pos: usize,
    len: usize,
}

impl<R: Read + Seek> ByteOrderReader<R> {
    pub fn new(mut reader: R, byte_order: Endianness) -> Result<ByteOrderReader<R>> {
        let len = reader.seek(SeekFrom::End(0))? as usize;
        reader.seek(SeekFrom::Start(0))?;
        Ok(ByteOrderReader {
            is_le: byte_order == Endianness::LittleEndian,
            reader,
            pos: 0usize,
            len,
        })
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn get_byte_order(&self) -> Endianness {
        if self.is_le {
            return Endianness::LittleEndian;
        }
        Endianness::BigEndian
    }

    pub fn seek(&mut self, position: usize) -> Result<()> {
        self.pos = position;
        self.reader.seek(SeekFrom::Start(self.pos as u64))?;
        Ok(())
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes between the cursor and the end of the stream.
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.pos)
    }

    fn ensure(&self, num_bytes: usize) -> Result<()> {
        if num_bytes > self.remaining() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "attempted to read {} bytes at offset {} of a {}-byte stream",
                    num_bytes, self.pos, self.len
                ),
            ));
        }
        Ok(())
    }

    pub fn read_utf8(&mut self, length: usize) -> Result<String> {
        let mut bytes = vec![0u8; length];
        self.read_exact(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len())?;
        self.pos += buf.len();
        self.reader.read_exact(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        self.pos += 1;
        self.reader.read_u8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        self.pos += 2;
        if self.is_le {
            return self.reader.read_u16::<LittleEndian>();
        }
        self.reader.read_u16::<BigEndian>()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        self.pos += 4;
        if self.is_le {
            return self.reader.read_u32::<LittleEndian>();
        }
        self.reader.read_u32::<BigEndian>()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        self.pos += 8;
        if self.is_le {
            return self.reader.read_f64::<LittleEndian>();
        }
        self.reader.read_f64::<BigEndian>()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

impl Default for Endianness {
    fn default() -> Endianness {
        Endianness::LittleEndian
    }
}

impl Endianness {
    /// Maps the byte-order flag that opens a WKB record (0 = XDR, 1 = NDR).
    pub fn from_wkb_flag(flag: u8) -> Option<Endianness> {
        match flag {
            0 => Some(Endianness::BigEndian),
            1 => Some(Endianness::LittleEndian),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ByteOrderReader, Endianness};
    use std::io::{Cursor, ErrorKind};

    #[test]
    fn test_switching_byte_order() {
        let bytes = vec![0u8, 0, 0, 1, 1, 0, 0, 0];
        let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::BigEndian).unwrap();
        assert_eq!(bor.len(), 8);
        assert_eq!(bor.read_u32().unwrap(), 1);
        bor.set_byte_order(Endianness::LittleEndian);
        assert_eq!(bor.read_u32().unwrap(), 1);
        assert_eq!(bor.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_is_an_error() {
        let mut bor =
            ByteOrderReader::new(Cursor::new(vec![0u8; 5]), Endianness::LittleEndian).unwrap();
        let err = bor.read_f64().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(bor.pos(), 0);
    }
}
