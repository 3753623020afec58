use std::io::Read;

use ndarray::{Array1, Array3};

use crate::{Error, Result};

// Magic numbers of the IDX files: two zero bytes, the element type (0x08 = u8),
// then the number of dimensions
const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

// Read an IDX image file: header of big-endian u32s (magic, count, rows, cols)
// followed by count * rows * cols row-major pixel bytes
pub fn read_idx_images(mut reader: impl Read) -> Result<Array3<u8>> {
    expect_magic(&mut reader, IMAGES_MAGIC, "image")?;
    let count = read_u32(&mut reader)? as usize;
    let rows = read_u32(&mut reader)? as usize;
    let cols = read_u32(&mut reader)? as usize;

    let len = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or_else(|| Error::Format(format!("{}x{}x{} images overflow", count, rows, cols)))?;
    let pixels = read_payload(reader, len, "image")?;

    Array3::from_shape_vec((count, rows, cols), pixels).map_err(|e| Error::Format(e.to_string()))
}

// Read an IDX label file: header (magic, count) followed by count label bytes
pub fn read_idx_labels(mut reader: impl Read) -> Result<Array1<u8>> {
    expect_magic(&mut reader, LABELS_MAGIC, "label")?;
    let count = read_u32(&mut reader)? as usize;
    Ok(Array1::from(read_payload(reader, count, "label")?))
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::Format("truncated IDX header".to_string()),
        _ => Error::Io(e),
    })?;
    Ok(u32::from_be_bytes(buf))
}

fn expect_magic(reader: &mut impl Read, expected: u32, what: &str) -> Result<()> {
    let magic = read_u32(reader)?;
    if magic != expected {
        return Err(Error::Format(format!(
            "bad {} file magic number {:#010x}, expected {:#010x}",
            what, magic, expected
        )));
    }
    Ok(())
}

// Read exactly `len` bytes without trusting the header for the allocation size
fn read_payload(reader: impl Read, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    reader.take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(Error::Format(format!(
            "truncated {} payload: expected {} bytes, got {}",
            what,
            len,
            payload.len()
        )));
    }
    Ok(payload)
}
