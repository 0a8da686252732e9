//! Small I/O helpers shared by the archive and chunked-file writers/readers.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Writes a length-prefixed byte string: a little-endian `u32` length
/// followed by the raw bytes. Used for names and other short strings that
/// appear inline in chunk payloads.
pub fn write_short_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    w.write_u32::<LittleEndian>(bytes.len() as u32)?;
    w.write_all(bytes)
}

/// Reads back a value written by [`write_short_bytes`].
pub fn read_short_bytes<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = r.read_u32::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Writes a UTF-8 string using [`write_short_bytes`].
pub fn write_short_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_short_bytes(w, s.as_bytes())
}

/// Reads back a string written by [`write_short_string`].
pub fn read_short_string<R: Read>(r: &mut R) -> io::Result<String> {
    let bytes = read_short_bytes(r)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn short_string_round_trips() {
        let mut buf = Vec::new();
        write_short_string(&mut buf, "hello world").unwrap();
        let mut cur = Cursor::new(buf);
        assert_eq!(read_short_string(&mut cur).unwrap(), "hello world");
    }

    #[test]
    fn short_bytes_round_trips_empty() {
        let mut buf = Vec::new();
        write_short_bytes(&mut buf, &[]).unwrap();
        let mut cur = Cursor::new(buf);
        assert_eq!(read_short_bytes(&mut cur).unwrap(), Vec::<u8>::new());
    }
}
