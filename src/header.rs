//! The fixed 512-byte C3D header.
//!
//! The header is always the first block of the file and its integer fields
//! are always little-endian regardless of the file's declared processor —
//! only the two float fields (`scale_factor`, `frame_rate`) are stored in
//! the processor's native float encoding. [`Header::read`] parses the
//! integers and reads the floats as raw little-endian bit patterns;
//! [`Header::processor_convert`] reinterprets those bit patterns once the
//! processor byte has been found in the parameter section.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::dtypes::{Dtypes, Processor};
use crate::error::{Error, Result};
use crate::float_codec::dec_to_ieee_f32;

/// Magic byte required at offset 1.
pub const MAGIC: u8 = 80;
/// Marker value at offset 298 when long (4-character) event labels are present.
pub const LONG_EVENT_LABELS_KEY: u16 = 0x3039;
/// Maximum number of events the header's fixed event block can hold.
pub const MAX_EVENTS: usize = 18;

const RESERVED_1_LEN: usize = 274;
const RESERVED_3_LEN: usize = 44;

/// The 512-byte C3D header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Block number of the first parameter-section block.
    pub parameter_block: u8,
    /// Number of 3D point trajectories per frame.
    pub point_count: u16,
    /// Number of analog channels per frame.
    pub analog_count: u16,
    /// First frame number in the data block (1-based, per the file).
    pub first_frame: u16,
    /// Last frame number in the data block.
    pub last_frame: u16,
    /// Maximum interpolation gap, in frames.
    pub max_gap: u16,
    /// Point coordinate scale factor. Negative means the data block stores
    /// floats directly; positive means scaled 16-bit integers.
    pub scale_factor: f32,
    /// Block number where the first frame of data begins.
    pub data_block: u16,
    /// Number of analog samples per 3D frame (channels × samples-per-channel).
    pub analog_per_frame: u16,
    /// Video capture frame rate, in Hz.
    pub frame_rate: f32,
    /// True if event labels are stored as 4-character strings (vs. legacy 2-character).
    pub long_event_labels: bool,
    /// Number of events actually populated in the event block (≤ [`MAX_EVENTS`]).
    pub event_count: u16,
    /// Event display times, in seconds, relative to frame 1.
    pub event_times: Vec<f32>,
    /// Event display flags (true = displayed in originating software).
    pub event_flags: Vec<bool>,
    /// Event labels.
    pub event_labels: Vec<String>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parameter_block: 2,
            point_count: 0,
            analog_count: 0,
            first_frame: 1,
            last_frame: 1,
            max_gap: 0,
            scale_factor: -1.0,
            data_block: 0,
            analog_per_frame: 0,
            frame_rate: 0.0,
            long_event_labels: false,
            event_count: 0,
            event_times: Vec::new(),
            event_flags: Vec::new(),
            event_labels: Vec::new(),
        }
    }
}

impl Header {
    /// Size of the header in bytes.
    pub const SIZE: usize = 512;

    /// Parse the header from the first 512 bytes of the file.
    ///
    /// Integer fields are always little-endian. `scale_factor` and
    /// `frame_rate` are read as raw little-endian bit patterns and must be
    /// passed through [`Header::processor_convert`] once the processor is
    /// known.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let parameter_block = reader.read_u8()?;
        let magic = reader.read_u8()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic { found: magic });
        }

        let point_count = reader.read_u16::<LittleEndian>()?;
        let analog_count = reader.read_u16::<LittleEndian>()?;
        let first_frame = reader.read_u16::<LittleEndian>()?;
        let last_frame = reader.read_u16::<LittleEndian>()?;
        let max_gap = reader.read_u16::<LittleEndian>()?;
        let scale_factor = reader.read_f32::<LittleEndian>()?;
        let data_block = reader.read_u16::<LittleEndian>()?;
        let analog_per_frame = reader.read_u16::<LittleEndian>()?;
        let frame_rate = reader.read_f32::<LittleEndian>()?;

        let mut reserved1 = [0u8; RESERVED_1_LEN];
        reader.read_exact(&mut reserved1)?;

        let long_event_labels_key = reader.read_u16::<LittleEndian>()?;
        let long_event_labels = long_event_labels_key == LONG_EVENT_LABELS_KEY;
        let event_count = reader.read_u16::<LittleEndian>()?;
        let _reserved2 = reader.read_u16::<LittleEndian>()?;

        let mut event_times = Vec::with_capacity(MAX_EVENTS);
        for _ in 0..MAX_EVENTS {
            event_times.push(reader.read_f32::<LittleEndian>()?);
        }
        let mut flag_bytes = [0u8; MAX_EVENTS];
        reader.read_exact(&mut flag_bytes)?;
        let event_flags: Vec<bool> = flag_bytes.iter().map(|&b| b != 0).collect();
        let mut event_reserved = [0u8; 2];
        reader.read_exact(&mut event_reserved)?;

        // Event labels are always stored in fixed 4-byte slots; `long_event_labels`
        // is a metadata flag carried alongside the block, not a stride switch.
        let mut event_labels = Vec::with_capacity(MAX_EVENTS);
        let mut label_bytes = [0u8; 4];
        for _ in 0..MAX_EVENTS {
            reader.read_exact(&mut label_bytes)?;
            event_labels.push(Dtypes::decode_string(&label_bytes).trim().to_string());
        }

        let event_times = event_times.into_iter().take(event_count as usize).collect();
        let event_flags = event_flags.into_iter().take(event_count as usize).collect();
        let event_labels = event_labels.into_iter().take(event_count as usize).collect();

        let mut reserved3 = [0u8; RESERVED_3_LEN];
        reader.read_exact(&mut reserved3)?;

        Ok(Self {
            parameter_block,
            point_count,
            analog_count,
            first_frame,
            last_frame,
            max_gap,
            scale_factor,
            data_block,
            analog_per_frame,
            frame_rate,
            long_event_labels,
            event_count,
            event_times,
            event_flags,
            event_labels,
        })
    }

    /// Reinterpret `scale_factor` and `frame_rate` as the processor's native
    /// float encoding. Must be called exactly once, after the processor byte
    /// has been read from the parameter section prologue.
    pub fn processor_convert(&mut self, dtypes: &Dtypes) {
        match dtypes.processor() {
            Processor::Intel => {}
            Processor::Mips => {
                self.scale_factor = f32::from_bits(self.scale_factor.to_bits().swap_bytes());
                self.frame_rate = f32::from_bits(self.frame_rate.to_bits().swap_bytes());
            }
            Processor::Dec => {
                self.scale_factor = dec_to_ieee_f32(self.scale_factor.to_bits());
                self.frame_rate = dec_to_ieee_f32(self.frame_rate.to_bits());
            }
        }
    }

    /// True if point coordinates are stored as floats rather than scaled
    /// 16-bit integers.
    pub fn scale_factor_is_float(&self) -> bool {
        self.scale_factor < 0.0
    }

    /// Write the header in Intel/IEEE layout (the only layout this library writes).
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.parameter_block)?;
        writer.write_u8(MAGIC)?;
        writer.write_u16::<LittleEndian>(self.point_count)?;
        writer.write_u16::<LittleEndian>(self.analog_count)?;
        writer.write_u16::<LittleEndian>(self.first_frame)?;
        writer.write_u16::<LittleEndian>(self.last_frame)?;
        writer.write_u16::<LittleEndian>(self.max_gap)?;
        writer.write_f32::<LittleEndian>(self.scale_factor)?;
        writer.write_u16::<LittleEndian>(self.data_block)?;
        writer.write_u16::<LittleEndian>(self.analog_per_frame)?;
        writer.write_f32::<LittleEndian>(self.frame_rate)?;
        writer.write_all(&[0u8; RESERVED_1_LEN])?;

        writer.write_u16::<LittleEndian>(if self.long_event_labels {
            LONG_EVENT_LABELS_KEY
        } else {
            0
        })?;
        writer.write_u16::<LittleEndian>(self.event_count)?;
        writer.write_u16::<LittleEndian>(0)?;

        for i in 0..MAX_EVENTS {
            let t = self.event_times.get(i).copied().unwrap_or(0.0);
            writer.write_f32::<LittleEndian>(t)?;
        }
        let mut flags = [0u8; MAX_EVENTS];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = self.event_flags.get(i).copied().unwrap_or(false) as u8;
        }
        writer.write_all(&flags)?;
        writer.write_all(&[0u8; 2])?;

        for i in 0..MAX_EVENTS {
            let label = self.event_labels.get(i).map(String::as_str).unwrap_or("");
            let mut bytes = [0u8; 4];
            let src = label.as_bytes();
            let n = src.len().min(4);
            bytes[..n].copy_from_slice(&src[..n]);
            writer.write_all(&bytes)?;
        }

        writer.write_all(&[0u8; RESERVED_3_LEN])?;
        Ok(())
    }

    /// Iterate over `(timing, label)` pairs for each populated event.
    ///
    /// Event timing is documented as relative to frame index 1, not
    /// [`Header::first_frame`] — a file that starts recording at frame 100
    /// still times its events from frame 1.
    pub fn events(&self) -> impl Iterator<Item = (f32, &str)> {
        self.event_times
            .iter()
            .copied()
            .zip(self.event_labels.iter().map(String::as_str))
    }
}
