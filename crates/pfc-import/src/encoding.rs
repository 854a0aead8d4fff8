//! PGN file decoding.
//!
//! The PGN specification assumes ISO-8859-1 but UTF-8 is tried first;
//! Latin-1 decoding succeeds bytewise on any input, possibly not
//! accurately representing the file content.

use std::path::Path;

/// Decode bytes as ISO-8859-1; every byte maps to the code point of the
/// same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// Read a PGN file as UTF-8, falling back to ISO-8859-1.
pub fn read_pgn_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => decode_latin1(error.as_bytes()),
    })
}

/// Read a PGN file as ISO-8859-1 without the UTF-8 trial. The counting
/// passes use this, so their game counts can differ from the importing
/// pass on files with multi-byte sequences.
pub fn read_pgn_file_latin1(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_latin1(&bytes))
}

/// True if the path has the `.pgn` extension, compared case-insensitively.
pub fn is_pgn_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case(pfc_core::PGN_EXT))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_maps_every_byte() {
        let bytes = [0x4Du8, 0xFC, 0x6C, 0x6C, 0x65, 0x72];
        assert_eq!(decode_latin1(&bytes), "Müller");
    }

    #[test]
    fn pgn_extension_is_case_insensitive() {
        assert!(is_pgn_file(Path::new("games/club.pgn")));
        assert!(is_pgn_file(Path::new("games/club.PGN")));
        assert!(!is_pgn_file(Path::new("games/club.txt")));
        assert!(!is_pgn_file(Path::new("games/club")));
    }
}
