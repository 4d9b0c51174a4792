//! Minimal NumPy `.npy` codec
//!
//! Reads and writes format version 1.0 with little-endian f64 payloads in C
//! order, which is exactly what `np.save` produces for the arrays this crate
//! exchanges. Layout: 6-byte magic, 2-byte version, u16 little-endian header
//! length, an ASCII dict describing dtype/order/shape padded with spaces to a
//! 64-byte boundary and terminated by a newline, then the raw payload.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::{Array1, Array2};

use crate::error::{Result, WagecastError};

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Write a 2-D array as `.npy`
pub fn write_matrix(path: impl AsRef<Path>, data: &Array2<f64>) -> Result<()> {
    let shape = format!("({}, {})", data.nrows(), data.ncols());
    write_raw(path.as_ref(), &shape, data.iter().copied())
}

/// Write a 1-D array as `.npy`
pub fn write_vector(path: impl AsRef<Path>, data: &Array1<f64>) -> Result<()> {
    let shape = format!("({},)", data.len());
    write_raw(path.as_ref(), &shape, data.iter().copied())
}

/// Read a 2-D f64 array from `.npy`
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    let (dims, values) = read_raw(path.as_ref())?;
    match dims.as_slice() {
        [rows, cols] => Ok(Array2::from_shape_vec((*rows, *cols), values)?),
        other => Err(WagecastError::DataError(format!(
            "expected a 2-D array in {}, found {}-D",
            path.as_ref().display(),
            other.len()
        ))),
    }
}

/// Read a 1-D f64 array from `.npy`
pub fn read_vector(path: impl AsRef<Path>) -> Result<Array1<f64>> {
    let (dims, values) = read_raw(path.as_ref())?;
    match dims.as_slice() {
        [_] => Ok(Array1::from_vec(values)),
        other => Err(WagecastError::DataError(format!(
            "expected a 1-D array in {}, found {}-D",
            path.as_ref().display(),
            other.len()
        ))),
    }
}

fn write_raw(path: &Path, shape: &str, values: impl Iterator<Item = f64>) -> Result<()> {
    let dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': {}, }}",
        shape
    );
    // Magic + version + length field + dict + padding + newline must land on
    // a 64-byte boundary.
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let header = format!("{}{}\n", dict, " ".repeat(padding));

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&(header.len() as u16).to_le_bytes())?;
    writer.write_all(header.as_bytes())?;
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn read_raw(path: &Path) -> Result<(Vec<usize>, Vec<f64>)> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(WagecastError::DataError(format!(
            "{} is not an npy file",
            path.display()
        )));
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    if version[0] != 1 {
        return Err(WagecastError::DataError(format!(
            "unsupported npy format version {}.{}",
            version[0], version[1]
        )));
    }

    let mut len_bytes = [0u8; 2];
    reader.read_exact(&mut len_bytes)?;
    let header_len = u16::from_le_bytes(len_bytes) as usize;

    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let header = String::from_utf8_lossy(&header_bytes).into_owned();

    if !header.contains("'descr': '<f8'") {
        return Err(WagecastError::DataError(format!(
            "unsupported npy dtype in {} (only little-endian f64 is read)",
            path.display()
        )));
    }
    if !header.contains("'fortran_order': False") {
        return Err(WagecastError::DataError(format!(
            "unsupported npy layout in {} (only C order is read)",
            path.display()
        )));
    }

    let dims = parse_shape(&header).ok_or_else(|| {
        WagecastError::DataError(format!("malformed npy header in {}", path.display()))
    })?;

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    let count: usize = dims.iter().product();
    if payload.len() != count * 8 {
        return Err(WagecastError::DataError(format!(
            "npy payload size mismatch in {}: expected {} bytes, found {}",
            path.display(),
            count * 8,
            payload.len()
        )));
    }

    let values = payload
        .chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect();
    Ok((dims, values))
}

fn parse_shape(header: &str) -> Option<Vec<usize>> {
    let start = header.find("'shape': (")? + "'shape': (".len();
    let end = start + header[start..].find(')')?;
    header[start..end]
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<usize>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matrix_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.npy");
        let data = array![[1.0, 2.5, -3.0], [4.0, 0.0, 1e-9]];

        write_matrix(&path, &data).unwrap();
        let restored = read_matrix(&path).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_vector_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("y.npy");
        let data = array![100000.0, 125000.0, 90000.0];

        write_vector(&path, &data).unwrap();
        let restored = read_vector(&path).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_header_is_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.npy");
        write_vector(&path, &array![1.0]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // Payload starts on a 64-byte boundary and the header ends in '\n'.
        assert_eq!(bytes.len(), 64 + 8);
        assert_eq!(bytes[63], b'\n');
        assert_eq!(&bytes[..6], MAGIC);
    }

    #[test]
    fn test_dimensionality_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.npy");
        write_vector(&path, &array![1.0, 2.0]).unwrap();

        let err = read_matrix(&path).unwrap_err();
        assert!(matches!(err, WagecastError::DataError(_)));
    }

    #[test]
    fn test_rejects_non_npy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.npy");
        std::fs::write(&path, b"definitely not numpy").unwrap();

        let err = read_vector(&path).unwrap_err();
        assert!(matches!(err, WagecastError::DataError(_)));
    }
}
