//! Error types for C3D parsing and encoding.

use thiserror::Error;

/// Errors produced while reading, interpreting, or writing a C3D file.
///
/// Each variant corresponds to one of the failure modes a C3D file can
/// legitimately trigger: a malformed prologue, an encoding this library
/// doesn't support, or a metadata dictionary that disagrees with itself.
/// Frame-level short reads are not represented here — they are reported
/// through the warning sink (see [`crate::warn`]) and simply end frame
/// iteration, since a truncated file should still yield the frames it has.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure from the byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header's magic byte (offset 1) was not 80.
    #[error("invalid C3D magic byte: {found} (expected 80)")]
    InvalidMagic {
        /// The byte actually found at offset 1.
        found: u8,
    },

    /// An encoding this library cannot decode: DEC 64-bit floats, or an
    /// `ANALOG:BITS` value inconsistent with the detected analog word width.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Attempted to add or rename a key (group id, group name, or parameter
    /// name) that already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Attempted to rename a group or parameter that doesn't exist.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// A typed accessor was called on a `Param` whose shape or element width
    /// doesn't support it (e.g. an array accessor on a zero-dimension param,
    /// or a float accessor on an 8-bit element).
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// `Manager::check_metadata`'s strict header/parameter cross-checks
    /// failed (point count, scale factor, frame rate, or analog counts).
    #[error("inconsistent metadata: {0}")]
    InconsistentMetadata(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_magic_message_includes_found_byte() {
        let err = Error::InvalidMagic { found: 12 };
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
