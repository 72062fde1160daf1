//! Processor-typed scalar decoding and string fallback chain.
//!
//! C3D files declare one of three historical processor formats in the
//! parameter-section prologue (spec.md §4.7 step 2). Integers are
//! little-endian for Intel and DEC, big-endian for MIPS; floats are always
//! read IEEE-native once endianness is accounted for — DEC floats are read
//! as a raw bit pattern and converted separately by [`crate::float_codec`].

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::error::{Error, Result};

/// Processor byte value for Intel (little-endian IEEE-754).
pub const PROCESSOR_INTEL: u8 = 84;
/// Processor byte value for DEC PDP-11 (little-endian, DEC single precision floats).
pub const PROCESSOR_DEC: u8 = 85;
/// Processor byte value for SGI/MIPS (big-endian IEEE-754).
pub const PROCESSOR_MIPS: u8 = 86;

/// The three historical processor formats a C3D file can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    /// Little-endian integers, native IEEE-754 floats.
    Intel,
    /// Little-endian integers, DEC single-precision floats.
    Dec,
    /// Big-endian integers, native IEEE-754 floats.
    Mips,
}

impl Processor {
    /// Parse the processor byte found at offset 4 of the parameter section.
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            PROCESSOR_INTEL => Ok(Processor::Intel),
            PROCESSOR_DEC => Ok(Processor::Dec),
            PROCESSOR_MIPS => Ok(Processor::Mips),
            other => Err(Error::UnsupportedEncoding(format!(
                "unknown processor byte: {other}"
            ))),
        }
    }

    /// Byte value this processor is written back as (writer always emits Intel).
    pub fn to_byte(self) -> u8 {
        match self {
            Processor::Intel => PROCESSOR_INTEL,
            Processor::Dec => PROCESSOR_DEC,
            Processor::Mips => PROCESSOR_MIPS,
        }
    }
}

/// Container for processor-dependent scalar decoding.
#[derive(Debug, Clone, Copy)]
pub struct Dtypes {
    processor: Processor,
}

impl Dtypes {
    /// Build a `Dtypes` for the given processor.
    pub fn new(processor: Processor) -> Self {
        Self { processor }
    }

    /// The processor this instance decodes for.
    pub fn processor(&self) -> Processor {
        self.processor
    }

    /// True if the file is Intel-format (little-endian IEEE).
    pub fn is_ieee(&self) -> bool {
        matches!(self.processor, Processor::Intel)
    }

    /// True if the file is DEC-format.
    pub fn is_dec(&self) -> bool {
        matches!(self.processor, Processor::Dec)
    }

    /// True if the file is SGI/MIPS-format.
    pub fn is_mips(&self) -> bool {
        matches!(self.processor, Processor::Mips)
    }

    fn big_endian(&self) -> bool {
        matches!(self.processor, Processor::Mips)
    }

    /// Read an unsigned byte (endianness does not apply).
    pub fn read_u8<R: Read>(&self, reader: &mut R) -> io::Result<u8> {
        reader.read_u8()
    }

    /// Read a signed byte (endianness does not apply).
    pub fn read_i8<R: Read>(&self, reader: &mut R) -> io::Result<i8> {
        reader.read_i8()
    }

    /// Read a `u16` obeying processor endianness.
    pub fn read_u16<R: Read>(&self, reader: &mut R) -> io::Result<u16> {
        if self.big_endian() {
            reader.read_u16::<BigEndian>()
        } else {
            reader.read_u16::<LittleEndian>()
        }
    }

    /// Read an `i16` obeying processor endianness.
    pub fn read_i16<R: Read>(&self, reader: &mut R) -> io::Result<i16> {
        if self.big_endian() {
            reader.read_i16::<BigEndian>()
        } else {
            reader.read_i16::<LittleEndian>()
        }
    }

    /// Read a `u32` obeying processor endianness.
    pub fn read_u32<R: Read>(&self, reader: &mut R) -> io::Result<u32> {
        if self.big_endian() {
            reader.read_u32::<BigEndian>()
        } else {
            reader.read_u32::<LittleEndian>()
        }
    }

    /// Read an `i32` obeying processor endianness.
    pub fn read_i32<R: Read>(&self, reader: &mut R) -> io::Result<i32> {
        if self.big_endian() {
            reader.read_i32::<BigEndian>()
        } else {
            reader.read_i32::<LittleEndian>()
        }
    }

    /// Read a `u64` obeying processor endianness.
    pub fn read_u64<R: Read>(&self, reader: &mut R) -> io::Result<u64> {
        if self.big_endian() {
            reader.read_u64::<BigEndian>()
        } else {
            reader.read_u64::<LittleEndian>()
        }
    }

    /// Read an `i64` obeying processor endianness.
    pub fn read_i64<R: Read>(&self, reader: &mut R) -> io::Result<i64> {
        if self.big_endian() {
            reader.read_i64::<BigEndian>()
        } else {
            reader.read_i64::<LittleEndian>()
        }
    }

    /// Read a native IEEE-754 `f32`. For DEC files the bit pattern still
    /// needs [`crate::float_codec::dec_to_ieee_f32`] applied by the caller —
    /// this only applies endianness, not the DEC/IEEE bit-layout conversion.
    pub fn read_f32_ieee<R: Read>(&self, reader: &mut R) -> io::Result<f32> {
        if self.big_endian() {
            reader.read_f32::<BigEndian>()
        } else {
            reader.read_f32::<LittleEndian>()
        }
    }

    /// Read an `f32` sample, applying the DEC→IEEE conversion automatically
    /// when this is a DEC file. Used for point coordinates and analog
    /// samples, where the processor's float format always applies — unlike
    /// [`Dtypes::read_f32_ieee`], which assumes IEEE layout.
    pub fn read_f32<R: Read>(&self, reader: &mut R) -> io::Result<f32> {
        let bits = self.read_u32(reader)?;
        Ok(match self.processor {
            Processor::Intel | Processor::Mips => f32::from_bits(bits),
            Processor::Dec => crate::float_codec::dec_to_ieee_f32(bits),
        })
    }

    /// Read a native IEEE-754 `f64`. DEC 64-bit floats are not supported;
    /// callers must reject DEC before calling this for float payloads.
    pub fn read_f64_ieee<R: Read>(&self, reader: &mut R) -> io::Result<f64> {
        if self.big_endian() {
            reader.read_f64::<BigEndian>()
        } else {
            reader.read_f64::<LittleEndian>()
        }
    }

    /// Decode a byte slice to text, trying UTF-8, then Latin-1, and finally
    /// falling back to lossy UTF-8 (replacement characters for invalid
    /// sequences). Latin-1 is a total mapping over single bytes so in
    /// practice the third step is unreachable, but it's kept to match the
    /// documented fallback chain exactly.
    pub fn decode_string(bytes: &[u8]) -> String {
        if let Ok(s) = std::str::from_utf8(bytes) {
            return s.to_string();
        }
        if let Some(s) = decode_latin1(bytes) {
            return s;
        }
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    Some(bytes.iter().map(|&b| b as char).collect())
}
