//! In-memory frame accumulation and whole-file serialization.
//!
//! The writer always emits Intel/IEEE files: integers little-endian,
//! floats native IEEE-754, no DEC or MIPS output support. Frames are
//! accumulated with [`Writer::add_frame`] and the whole file — header,
//! synthesized `POINT`/`ANALOG`/`TRIAL` groups, and frame data — is
//! produced in one pass by [`Writer::write`]. Each frame's analog block is
//! emitted exactly once.

use std::io::Write;

use byteorder::WriteBytesExt;

use crate::dtypes::Processor;
use crate::error::Result;
use crate::group::Group;
use crate::header::Header;
use crate::manager::Manager;
use crate::param::Param;

const BLOCK_SIZE: usize = 512;

/// One accumulated frame: per-point coordinates (`None` marks an invalid
/// point) and flat analog samples.
#[derive(Debug, Clone, Default)]
pub struct WriteFrame {
    /// Point coordinates; `None` entries are written as invalid points.
    pub points: Vec<Option<[f32; 3]>>,
    /// Flat analog samples: analog channel count × samples-per-channel long.
    pub analog: Vec<f32>,
}

/// Accumulates frames and serializes a complete C3D file.
pub struct Writer {
    point_rate: f32,
    analog_rate: f32,
    point_scale: f32,
    point_units: String,
    gen_scale: f32,
    point_labels: Vec<String>,
    analog_labels: Vec<String>,
    frames: Vec<WriteFrame>,
}

impl Writer {
    /// Start a new writer with the given point/analog sampling rates and
    /// point coordinate scale (negative selects float storage, positive
    /// selects scaled 16-bit integer storage).
    pub fn new(point_rate: f32, analog_rate: f32, point_scale: f32) -> Self {
        Self {
            point_rate,
            analog_rate,
            point_scale,
            point_units: "mm".to_string(),
            gen_scale: 1.0,
            point_labels: Vec::new(),
            analog_labels: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Set the point trajectory labels (`POINT:LABELS`). Determines the
    /// point count written to the header.
    pub fn with_point_labels(mut self, labels: Vec<String>) -> Self {
        self.point_labels = labels;
        self
    }

    /// Set the analog channel labels (`ANALOG:LABELS`). Determines the
    /// analog channel count written to the header.
    pub fn with_analog_labels(mut self, labels: Vec<String>) -> Self {
        self.analog_labels = labels;
        self
    }

    /// Set the point coordinate units string (`POINT:UNITS`), default `"mm"`.
    pub fn with_point_units(mut self, units: impl Into<String>) -> Self {
        self.point_units = units.into();
        self
    }

    /// Set the analog general scale factor (`ANALOG:GEN_SCALE`), default `1.0`.
    pub fn with_gen_scale(mut self, gen_scale: f32) -> Self {
        self.gen_scale = gen_scale;
        self
    }

    /// Append one frame. `points` should have one entry per label in
    /// `point_labels`; `analog` should have `analog_labels.len() *
    /// samples_per_channel()` entries.
    pub fn add_frame(&mut self, frame: WriteFrame) {
        self.frames.push(frame);
    }

    fn samples_per_channel(&self) -> u16 {
        if self.point_rate <= 0.0 {
            1
        } else {
            (self.analog_rate / self.point_rate).round().max(1.0) as u16
        }
    }

    fn build_manager(&self) -> Result<Manager> {
        let point_count = self.point_labels.len() as u16;
        let analog_count = self.analog_labels.len() as u16;

        let mut manager = Manager::new();

        let mut point = Group::new(1, "POINT");
        point.desc = "3D point parameters".to_string();
        point.add_param(scalar_i16("USED", point_count as i16))?;
        point.add_param(scalar_f32("RATE", self.point_rate))?;
        point.add_param(scalar_f32("SCALE", self.point_scale))?;
        point.add_param(string_scalar("UNITS", &self.point_units))?;
        point.add_param(label_array("LABELS", &self.point_labels))?;
        manager.add_group(point)?;

        let mut analog = Group::new(2, "ANALOG");
        analog.desc = "analog channel parameters".to_string();
        analog.add_param(scalar_i16("USED", analog_count as i16))?;
        analog.add_param(scalar_f32("RATE", self.analog_rate))?;
        analog.add_param(scalar_f32("GEN_SCALE", self.gen_scale))?;
        analog.add_param(label_array("LABELS", &self.analog_labels))?;
        analog.add_param(float_array("OFFSET", &vec![0.0; self.analog_labels.len()]))?;
        analog.add_param(float_array("SCALE", &vec![1.0; self.analog_labels.len()]))?;
        manager.add_group(analog)?;

        let mut trial = Group::new(3, "TRIAL");
        trial.desc = "trial frame range".to_string();
        trial.add_param(packed_frame_field("ACTUAL_START_FIELD", 1))?;
        trial.add_param(packed_frame_field("ACTUAL_END_FIELD", self.frames.len() as u32))?;
        manager.add_group(trial)?;

        Ok(manager)
    }

    /// Serialize the accumulated frames as a complete C3D file.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let manager = self.build_manager()?;

        let mut param_body = Vec::new();
        manager.write_parameters(&mut param_body)?;
        let param_block_total = 4 + param_body.len();
        let parameter_blocks = param_block_total.div_ceil(BLOCK_SIZE).max(1) as u16;

        // The header's analog_per_frame field is the analog/point rate
        // ratio (samples per channel per video frame), independent of how
        // many analog channels are actually in use.
        let analog_per_frame = self.samples_per_channel();

        let header = Header {
            parameter_block: 2,
            point_count: self.point_labels.len() as u16,
            analog_count: self.analog_labels.len() as u16,
            first_frame: 1,
            last_frame: self.frames.len().max(1) as u16,
            max_gap: 0,
            scale_factor: self.point_scale,
            data_block: 2 + parameter_blocks,
            analog_per_frame,
            frame_rate: self.point_rate,
            ..Header::default()
        };

        header.write(writer)?;

        writer.write_u8(1)?;
        writer.write_u8(0)?;
        writer.write_u8(parameter_blocks as u8)?;
        writer.write_u8(Processor::Intel.to_byte())?;
        writer.write_all(&param_body)?;
        let written = 4 + param_body.len();
        let padded = parameter_blocks as usize * BLOCK_SIZE;
        writer.write_all(&vec![0u8; padded - written])?;

        for frame in &self.frames {
            write_frame(writer, frame, self.point_scale)?;
        }

        let total_data_bytes: usize = self
            .frames
            .iter()
            .map(|f| frame_byte_len(f, self.point_scale))
            .sum();
        let remainder = total_data_bytes % BLOCK_SIZE;
        if remainder != 0 {
            writer.write_all(&vec![0u8; BLOCK_SIZE - remainder])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn frame_byte_len(frame: &WriteFrame, scale_factor: f32) -> usize {
    let point_word_width = if scale_factor < 0.0 { 4 } else { 2 };
    let analog_word_width = point_word_width;
    frame.points.len() * 4 * point_word_width + frame.analog.len() * analog_word_width
}

fn write_frame<W: Write>(writer: &mut W, frame: &WriteFrame, scale_factor: f32) -> Result<()> {
    use byteorder::LittleEndian;

    for point in &frame.points {
        match point {
            Some([x, y, z]) => {
                if scale_factor < 0.0 {
                    writer.write_f32::<LittleEndian>(*x)?;
                    writer.write_f32::<LittleEndian>(*y)?;
                    writer.write_f32::<LittleEndian>(*z)?;
                    writer.write_u32::<LittleEndian>(0)?;
                } else {
                    writer.write_i16::<LittleEndian>((*x / scale_factor) as i16)?;
                    writer.write_i16::<LittleEndian>((*y / scale_factor) as i16)?;
                    writer.write_i16::<LittleEndian>((*z / scale_factor) as i16)?;
                    writer.write_i16::<LittleEndian>(0)?;
                }
            }
            None => {
                if scale_factor < 0.0 {
                    writer.write_u32::<LittleEndian>(0)?;
                    writer.write_u32::<LittleEndian>(0)?;
                    writer.write_u32::<LittleEndian>(0)?;
                    writer.write_u32::<LittleEndian>(0x8000_8000)?;
                } else {
                    writer.write_i16::<LittleEndian>(0)?;
                    writer.write_i16::<LittleEndian>(0)?;
                    writer.write_i16::<LittleEndian>(0)?;
                    writer.write_i16::<LittleEndian>(-1)?;
                }
            }
        }
    }

    // Analog samples are emitted exactly once per frame here.
    for sample in &frame.analog {
        if scale_factor < 0.0 {
            writer.write_f32::<LittleEndian>(*sample)?;
        } else {
            writer.write_i16::<LittleEndian>(*sample as i16)?;
        }
    }

    Ok(())
}

fn scalar_i16(name: &str, value: i16) -> Param {
    let mut param = Param::new(name, 2);
    param.bytes = value.to_le_bytes().to_vec();
    param
}

/// A frame field stored as a pair of 2-byte elements whose combined 4 bytes
/// are the little-endian `u32` frame index — the original's packed
/// `TRIAL:ACTUAL_START_FIELD`/`ACTUAL_END_FIELD` layout.
fn packed_frame_field(name: &str, value: u32) -> Param {
    let mut param = Param::new(name, 2);
    param.dimensions = vec![2];
    param.bytes = value.to_le_bytes().to_vec();
    param
}

fn scalar_f32(name: &str, value: f32) -> Param {
    let mut param = Param::new(name, 4);
    param.bytes = value.to_le_bytes().to_vec();
    param
}

fn string_scalar(name: &str, value: &str) -> Param {
    let mut param = Param::new(name, -1);
    param.dimensions = vec![value.len() as u8];
    param.bytes = value.as_bytes().to_vec();
    param
}

fn label_array(name: &str, labels: &[String]) -> Param {
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0).max(1) as u8;
    let mut param = Param::new(name, -1);
    param.dimensions = vec![width, labels.len() as u8];
    let mut bytes = vec![0u8; width as usize * labels.len()];
    for (i, label) in labels.iter().enumerate() {
        let start = i * width as usize;
        let src = label.as_bytes();
        let n = src.len().min(width as usize);
        bytes[start..start + n].copy_from_slice(&src[..n]);
    }
    param.bytes = bytes;
    param
}

fn float_array(name: &str, values: &[f32]) -> Param {
    let mut param = Param::new(name, 4);
    param.dimensions = vec![values.len() as u8];
    param.bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    param
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn writes_header_with_correct_point_and_analog_counts() {
        let mut writer = Writer::new(100.0, 1000.0, 0.01)
            .with_point_labels(vec!["HIP".to_string(), "KNEE".to_string()])
            .with_analog_labels(vec!["EMG1".to_string()]);
        writer.add_frame(WriteFrame {
            points: vec![Some([1.0, 2.0, 3.0]), None],
            analog: vec![0.5; 10],
        });

        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf).unwrap();
        let bytes = buf.into_inner();
        assert_eq!(bytes.len() % BLOCK_SIZE, 0);

        let mut cursor = Cursor::new(&bytes[..Header::SIZE]);
        let header = Header::read(&mut cursor).unwrap();
        assert_eq!(header.point_count, 2);
        assert_eq!(header.analog_count, 1);
        assert_eq!(header.analog_per_frame, 10);
    }

    #[test]
    fn analog_samples_are_emitted_exactly_once_per_frame() {
        let frame = WriteFrame {
            points: vec![Some([0.0, 0.0, 0.0])],
            analog: vec![1.0, 2.0, 3.0],
        };
        let mut buf = Vec::new();
        write_frame(&mut buf, &frame, 0.1).unwrap();
        // 1 point * 4 words * 2 bytes + 3 analog samples * 2 bytes each
        assert_eq!(buf.len(), 8 + 6);
    }
}
