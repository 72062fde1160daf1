//! Per-frame point and analog decoding.
//!
//! A frame is a fixed-size run of point records followed by a fixed-size
//! run of analog samples. Point records are 4 words each (x, y, z, and a
//! combined residual/camera-count word); the word width — 2-byte scaled
//! integer or 4-byte float — is picked by the sign of the header's
//! `scale_factor`, and the same choice governs analog sample width.

use std::io::Read;

use crate::dtypes::Dtypes;
use crate::error::Result;
use crate::manager::Manager;

/// One decoded 3D point: coordinates, a residual, and the camera count that
/// contributed to it. `None` when the point is flagged invalid for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X/Y/Z coordinates, already scaled.
    pub coords: [f32; 3],
    /// Residual error, in the same units as `coords`, or negative if invalid.
    pub residual: f32,
    /// Number of cameras that observed this point.
    pub cameras: u8,
}

/// One decoded frame: points and analog samples.
#[derive(Debug, Clone)]
pub struct Frame {
    /// One entry per point trajectory; `None` where the point is invalid this frame.
    pub points: Vec<Option<Point>>,
    /// Flat analog samples, channel-major within each sub-sample
    /// (`analog_per_frame` total values per frame).
    pub analog: Vec<f32>,
}

const INVALID_WORD_MASK: u32 = 0x8000_8000;

fn decode_point_word4(combined: u32, scale_magnitude: f32) -> Option<(f32, u8)> {
    if combined & INVALID_WORD_MASK != 0 {
        return None;
    }
    let low = (combined & 0xffff) as u16;
    let residual = (low & 0xff) as f32 * scale_magnitude;
    let cameras = ((low >> 8) & 0x7f).count_ones() as u8;
    Some((residual, cameras))
}

fn read_point<R: Read>(reader: &mut R, dtypes: &Dtypes, scale_factor: f32) -> Result<Option<Point>> {
    let magnitude = scale_factor.abs();
    if scale_factor < 0.0 {
        let x = dtypes.read_f32(reader)?;
        let y = dtypes.read_f32(reader)?;
        let z = dtypes.read_f32(reader)?;
        let combined = dtypes.read_u32(reader)?;
        Ok(decode_point_word4(combined, magnitude).map(|(residual, cameras)| Point {
            coords: [x, y, z],
            residual,
            cameras,
        }))
    } else {
        let x = dtypes.read_i16(reader)? as f32 * scale_factor;
        let y = dtypes.read_i16(reader)? as f32 * scale_factor;
        let z = dtypes.read_i16(reader)? as f32 * scale_factor;
        let word4 = dtypes.read_i16(reader)?;
        if word4 <= -1 {
            return Ok(None);
        }
        let low = word4 as u16;
        let residual = (low & 0xff) as f32 * magnitude;
        let cameras = ((low >> 8) & 0x7f).count_ones() as u8;
        Ok(Some(Point {
            coords: [x, y, z],
            residual,
            cameras,
        }))
    }
}

fn read_analog_sample<R: Read>(reader: &mut R, dtypes: &Dtypes, scale_factor: f32, unsigned: bool) -> Result<f32> {
    if scale_factor < 0.0 {
        Ok(dtypes.read_f32(reader)?)
    } else if unsigned {
        Ok(dtypes.read_u16(reader)? as f32)
    } else {
        Ok(dtypes.read_i16(reader)? as f32)
    }
}

/// Decode one frame's points and analog samples.
///
/// `point_count` comes from the manager's derived properties (which
/// already fall back to header values). `analog_per_frame` is the total
/// analog value count for this frame (channel count × samples-per-channel,
/// not the header's per-channel ratio alone). `scale_factor` selects float
/// vs. scaled-integer word width for both points and analog.
#[allow(clippy::too_many_arguments)]
pub fn read_frame<R: Read>(
    reader: &mut R,
    dtypes: &Dtypes,
    manager: &Manager,
    point_count: usize,
    analog_per_frame: usize,
    scale_factor: f32,
) -> Result<Frame> {
    let mut points = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        points.push(read_point(reader, dtypes, scale_factor)?);
    }

    let analog_format_unsigned = manager
        .param("ANALOG:FORMAT")
        .map(|p| p.string_array().first().map(|s| s == "UNSIGNED").unwrap_or(false))
        .unwrap_or(false);

    let mut analog = Vec::with_capacity(analog_per_frame);
    for _ in 0..analog_per_frame {
        analog.push(read_analog_sample(reader, dtypes, scale_factor, analog_format_unsigned)?);
    }

    let channel_count = manager
        .param("ANALOG:USED")
        .and_then(|p| p.as_integer_value(dtypes).ok())
        .unwrap_or(0)
        .max(0) as usize;
    if channel_count > 0 {
        let offsets: Vec<f32> = manager
            .param("ANALOG:OFFSET")
            .map(|p| (0..channel_count).map(|i| p.int16(i, dtypes).unwrap_or(0) as f32).collect())
            .unwrap_or_else(|| vec![0.0; channel_count]);
        let scales: Vec<f32> = manager
            .param("ANALOG:SCALE")
            .map(|p| (0..channel_count).map(|i| p.float32(i, dtypes).unwrap_or(1.0)).collect())
            .unwrap_or_else(|| vec![1.0; channel_count]);
        let gen_scale = manager
            .param("ANALOG:GEN_SCALE")
            .and_then(|p| p.float32(0, dtypes).ok())
            .unwrap_or(1.0);

        for (i, sample) in analog.iter_mut().enumerate() {
            let channel = i % channel_count;
            *sample = (*sample - offsets[channel]) * scales[channel] * gen_scale;
        }
    }

    Ok(Frame { points, analog })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtypes::Processor;
    use std::io::Cursor;

    #[test]
    fn decode_point_word4_detects_invalid_marker() {
        let combined = 0x8000_8000u32;
        assert_eq!(decode_point_word4(combined, 1.0), None);
    }

    #[test]
    fn decode_point_word4_invalid_is_a_bitmask_not_an_exact_match() {
        // Only the high halfword's sign bit is set; still invalid per the mask.
        let combined = 0x8001_0000u32;
        assert_eq!(decode_point_word4(combined, 1.0), None);
    }

    #[test]
    fn decode_point_word4_counts_cameras() {
        // low halfword: bits 8-14 set to 0b0000111 (3 cameras), residual byte 2.
        let low: u16 = 2 | (0b0000111 << 8);
        let combined = (low as u32) | 0;
        let (residual, cameras) = decode_point_word4(combined, 0.1).unwrap();
        assert_eq!(cameras, 3);
        assert!((residual - 0.2).abs() < 1e-6);
    }

    #[test]
    fn decode_point_word4_residual_byte_is_unsigned() {
        // Residual byte 200 must decode as +200, not as a sign-extended -56.
        let combined = 200u32;
        let (residual, _) = decode_point_word4(combined, 1.0).unwrap();
        assert!((residual - 200.0).abs() < 1e-6);
    }

    #[test]
    fn read_point_int_path_flags_invalid_on_negative_word4() {
        let dtypes = Dtypes::new(Processor::Intel);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&10i16.to_le_bytes());
        bytes.extend_from_slice(&20i16.to_le_bytes());
        bytes.extend_from_slice(&30i16.to_le_bytes());
        bytes.extend_from_slice(&(-1i16).to_le_bytes());
        let mut cursor = Cursor::new(bytes);
        let point = read_point(&mut cursor, &dtypes, 1.0).unwrap();
        assert!(point.is_none());
    }

    #[test]
    fn read_point_int_path_residual_byte_is_unsigned() {
        let dtypes = Dtypes::new(Processor::Intel);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&10i16.to_le_bytes());
        bytes.extend_from_slice(&20i16.to_le_bytes());
        bytes.extend_from_slice(&30i16.to_le_bytes());
        // low byte 200, high byte 0 -> word4 = 200, still > -1 so valid.
        bytes.extend_from_slice(&200i16.to_le_bytes());
        let mut cursor = Cursor::new(bytes);
        let point = read_point(&mut cursor, &dtypes, 1.0).unwrap().unwrap();
        assert!((point.residual - 200.0).abs() < 1e-6);
    }

    #[test]
    fn read_point_int_path_scales_coordinates() {
        let dtypes = Dtypes::new(Processor::Intel);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100i16.to_le_bytes());
        bytes.extend_from_slice(&200i16.to_le_bytes());
        bytes.extend_from_slice(&300i16.to_le_bytes());
        bytes.extend_from_slice(&0i16.to_le_bytes());
        let mut cursor = Cursor::new(bytes);
        let point = read_point(&mut cursor, &dtypes, 0.1).unwrap().unwrap();
        assert!((point.coords[0] - 10.0).abs() < 1e-5);
        assert!((point.coords[1] - 20.0).abs() < 1e-5);
        assert!((point.coords[2] - 30.0).abs() < 1e-5);
    }
}
