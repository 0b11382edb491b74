// Encoding-tolerant text loading

use std::io::Read;
use std::path::Path;

use crate::error::IoError;

/// Read a file and convert to UTF-8. Bulk reports come out of a mix of
/// export tools; BOMs and Windows-1252 are both common, so the decode
/// order is: BOM sniff, strict UTF-8, Windows-1252 fallback.
pub fn read_to_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        source: e.to_string(),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        source: e.to_string(),
    })?;

    Ok(decode_bytes(bytes))
}

/// Decode raw bytes to a UTF-8 string, never failing.
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    // UTF-16 BOMs first: a strict UTF-8 attempt would mangle them.
    if bytes.starts_with(&[0xFF, 0xFE]) {
        let (decoded, _, _) = encoding_rs::UTF_16LE.decode(&bytes);
        return decoded.into_owned();
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (decoded, _, _) = encoding_rs::UTF_16BE.decode(&bytes);
        return decoded.into_owned();
    }

    // Strip a UTF-8 BOM if present.
    let bytes = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes[3..].to_vec()
    } else {
        bytes
    };

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}
