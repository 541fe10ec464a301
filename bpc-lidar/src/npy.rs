//! Minimal NumPy `.npy` (format 1.0) codec for little-endian f64 (N, 3) arrays.

use bpc_common::structures::PointArray;
use bpc_common::utils::{ByteOrderReader, ByteOrderWriter, Endianness};
use bpc_common::{BpcError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor};
use std::path::Path;

const MAGIC: &[u8] = b"\x93NUMPY";
const HEADER_ALIGNMENT: usize = 64;

fn header_dict(num_rows: usize) -> String {
    format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, {}), }}",
        num_rows,
        PointArray::NUM_COLUMNS
    )
}

/// Writes the array as `.npy`, overwriting any existing file.
pub fn write_npy(path: &Path, array: &PointArray) -> Result<()> {
    let (rows, _) = array.shape();
    let mut header = header_dict(rows);
    // magic (6) + version (2) + header length (2) + dict + '\n'
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    header.push_str(&" ".repeat(padding));
    header.push('\n');
    if header.len() > u16::MAX as usize {
        return Err(BpcError::Shape("npy header too long".to_string()));
    }

    let f = File::create(path)?;
    let mut writer = ByteOrderWriter::new(BufWriter::new(f), Endianness::LittleEndian);
    writer.write_bytes(MAGIC)?;
    writer.write_u8(1)?;
    writer.write_u8(0)?;
    writer.write_u16(header.len() as u16)?;
    writer.write_bytes(header.as_bytes())?;
    for v in array.as_slice() {
        writer.write_f64(*v)?;
    }
    writer.flush()?;
    Ok(())
}

fn dict_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("'{}':", key);
    let start = dict.find(&pattern)? + pattern.len();
    Some(dict[start..].trim_start())
}

fn parse_shape(dict: &str) -> Result<(usize, usize)> {
    let rest = dict_value(dict, "shape")
        .ok_or_else(|| BpcError::Decode("npy header has no shape".to_string()))?;
    let close = rest
        .find(')')
        .ok_or_else(|| BpcError::Decode("unterminated npy shape".to_string()))?;
    let dims: Vec<usize> = rest[1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| BpcError::Decode(format!("bad npy shape: {}", e)))?;
    match dims.as_slice() {
        [rows, cols] => Ok((*rows, *cols)),
        _ => Err(BpcError::Shape(format!(
            "expected a two-dimensional array, found {} dimensions",
            dims.len()
        ))),
    }
}

/// Reads an `.npy` file holding a C-ordered little-endian f64 (N, 3) array.
pub fn read_npy(path: &Path) -> Result<PointArray> {
    let bytes = fs::read(path)?;
    let truncated = |e: std::io::Error| BpcError::Decode(format!("truncated npy file ({})", e));
    let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::LittleEndian)?;
    let mut magic = [0u8; 6];
    bor.read_exact(&mut magic).map_err(truncated)?;
    if &magic[..] != MAGIC {
        return Err(BpcError::Decode(format!(
            "{} is not an npy file",
            path.display()
        )));
    }
    let major = bor.read_u8().map_err(truncated)?;
    bor.read_u8().map_err(truncated)?;
    let header_len = match major {
        1 => bor.read_u16().map_err(truncated)? as usize,
        2 | 3 => bor.read_u32().map_err(truncated)? as usize,
        v => {
            return Err(BpcError::Decode(format!(
                "unsupported npy format version {}",
                v
            )))
        }
    };
    let dict = bor.read_utf8(header_len).map_err(truncated)?;
    match dict_value(&dict, "descr") {
        Some(d) if d.starts_with("'<f8'") => {}
        _ => {
            return Err(BpcError::Decode(
                "only little-endian float64 arrays are supported".to_string(),
            ))
        }
    }
    match dict_value(&dict, "fortran_order") {
        Some(v) if v.starts_with("False") => {}
        _ => {
            return Err(BpcError::Shape(
                "Fortran-ordered arrays are not supported".to_string(),
            ))
        }
    }
    let (rows, cols) = parse_shape(&dict)?;
    if cols != PointArray::NUM_COLUMNS {
        return Err(BpcError::Shape(format!(
            "expected an array of shape (N, 3) but found ({}, {})",
            rows, cols
        )));
    }
    let num_values = rows
        .checked_mul(cols)
        .filter(|n| n.saturating_mul(8) <= bor.remaining())
        .ok_or_else(|| BpcError::Decode("npy data section is too short".to_string()))?;
    let mut data = Vec::with_capacity(num_values);
    for _ in 0..num_values {
        data.push(bor.read_f64().map_err(truncated)?);
    }
    PointArray::new(data, (rows, cols))
}

#[cfg(test)]
mod test {
    use super::{read_npy, write_npy};
    use bpc_common::structures::PointArray;
    use bpc_common::BpcError;
    use std::fs;

    #[test]
    fn test_header_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("5.0_5.0.npy");
        let arr = PointArray::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        write_npy(&path, &arr).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..6], b"\x93NUMPY");
        assert_eq!(bytes[6], 1);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        let header = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(header.starts_with("{'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }"));
        assert_eq!(bytes.len(), 10 + header_len + 6 * 8);
        assert_eq!(read_npy(&path).unwrap(), arr);
    }

    #[test]
    fn test_rejects_transposed_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.npy");
        let header = "{'descr': '<f8', 'fortran_order': False, 'shape': (3, 2), }";
        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        let mut padded = header.to_string();
        while (10 + padded.len() + 1) % 64 != 0 {
            padded.push(' ');
        }
        padded.push('\n');
        bytes.extend_from_slice(&(padded.len() as u16).to_le_bytes());
        bytes.extend_from_slice(padded.as_bytes());
        bytes.extend_from_slice(&[0u8; 48]);
        fs::write(&path, bytes).unwrap();
        match read_npy(&path) {
            Err(BpcError::Shape(_)) => {}
            other => panic!("expected a shape error, found {:?}", other),
        }
    }

    #[test]
    fn test_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.npy");
        fs::write(&path, b"hello world").unwrap();
        assert!(read_npy(&path).is_err());
    }
}
