//! Top-level C3D reader: header, parameter dictionary, and frame iteration.
//!
//! Opening a file walks the header, detects the processor format, parses
//! the parameter dictionary, and seeks to the first data block. From there
//! `Reader` is a lazy, forward-only iterator over frames — it never
//! rewinds, since nothing about C3D's single-pass layout requires it to.

use std::io::{Read, Seek, SeekFrom};

use byteorder::ReadBytesExt;

use crate::dtypes::{Dtypes, Processor};
use crate::error::{Error, Result};
use crate::frame::{self, Frame};
use crate::header::Header;
use crate::manager::Manager;
use crate::warn;

const BLOCK_SIZE: u64 = 512;

/// A C3D file opened for reading.
pub struct Reader<R> {
    header: Header,
    dtypes: Dtypes,
    manager: Manager,
    source: R,
    next_frame: u32,
    last_frame: u32,
    point_count: usize,
    analog_per_frame: usize,
    scale_factor: f32,
    frames_done: bool,
}

impl<R: Read + Seek> Reader<R> {
    /// Parse the header and parameter section and position the reader at
    /// the first data frame.
    pub fn open(mut source: R) -> Result<Self> {
        let mut header = Header::read(&mut source)?;

        let param_block_start = (header.parameter_block as u64).saturating_sub(1) * BLOCK_SIZE;
        source.seek(SeekFrom::Start(param_block_start))?;

        let _first_block = source.read_u8()?;
        let _reserved = source.read_u8()?;
        let _param_block_count = source.read_u8()?;
        let processor = Processor::from_byte(source.read_u8()?)?;
        log::debug!("detected processor: {processor:?}");
        let dtypes = Dtypes::new(processor);

        header.processor_convert(&dtypes);

        let manager = Manager::read_parameters(&mut source, &dtypes)?;
        manager.check_metadata(&header, &dtypes)?;

        let point_count = manager.point_used(&header, &dtypes) as usize;
        // Total analog values per frame is channels * samples-per-channel;
        // analog_per_frame alone is just the samples-per-channel ratio.
        let analog_per_frame =
            manager.analog_used(&header, &dtypes) as usize * manager.analog_per_frame(&header, &dtypes) as usize;
        let scale_factor = manager.point_scale(&header, &dtypes);
        let next_frame = manager.first_frame(&header, &dtypes) as u32;
        let last_frame = manager.last_frame(&header, &dtypes) as u32;
        log::debug!(
            "point_count={point_count} analog_per_frame={analog_per_frame} frames={next_frame}..={last_frame}"
        );

        let data_block_start = (header.data_block as u64).saturating_sub(1) * BLOCK_SIZE;
        source.seek(SeekFrom::Start(data_block_start))?;

        Ok(Self {
            header,
            dtypes,
            manager,
            source,
            next_frame,
            last_frame,
            point_count,
            analog_per_frame,
            scale_factor,
            frames_done: false,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The parsed parameter dictionary.
    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Which processor format this file was detected as.
    pub fn proc_type(&self) -> Processor {
        self.dtypes.processor()
    }

    /// Read and decode the next frame, or `Ok(None)` once frames are
    /// exhausted (including a short read, which is reported through the
    /// warning sink rather than as an error).
    pub fn read_next_frame(&mut self) -> Result<Option<Frame>> {
        if self.frames_done || self.next_frame > self.last_frame {
            return Ok(None);
        }
        let result = frame::read_frame(
            &mut self.source,
            &self.dtypes,
            &self.manager,
            self.point_count,
            self.analog_per_frame,
            self.scale_factor,
        );
        match result {
            Ok(frame) => {
                self.next_frame += 1;
                Ok(Some(frame))
            }
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                warn::warn(format!("short read at frame {}, stopping iteration", self.next_frame));
                self.frames_done = true;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl<R: Read + Seek> Iterator for Reader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use crate::param::Param;
    use std::io::Cursor;

    fn build_minimal_file() -> Vec<u8> {
        let mut header = Header {
            point_count: 1,
            analog_count: 0,
            first_frame: 1,
            last_frame: 2,
            scale_factor: 0.1,
            data_block: 3,
            parameter_block: 2,
            analog_per_frame: 0,
            frame_rate: 60.0,
            ..Header::default()
        };
        header.parameter_block = 2;

        let mut manager = Manager::new();
        let mut point_group = Group::new(1, "POINT");
        let mut used = Param::new("USED", 2);
        used.bytes = 1i16.to_le_bytes().to_vec();
        point_group.add_param(used).unwrap();
        manager.add_group(point_group).unwrap();

        let mut param_body = Vec::new();
        manager.write_parameters(&mut param_body).unwrap();

        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), 512);

        // parameter block prologue + body, padded to a 512-byte block.
        let mut param_block = vec![1u8, 0u8, 1u8, 84u8];
        param_block.extend_from_slice(&param_body);
        param_block.resize(512, 0);
        buf.extend_from_slice(&param_block);

        // Two frames of one point each (int format: x, y, z, word4), packed
        // tightly with no per-frame block alignment — only the data
        // section as a whole is block-aligned, not individual frames.
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend_from_slice(&100i16.to_le_bytes());
            data.extend_from_slice(&200i16.to_le_bytes());
            data.extend_from_slice(&300i16.to_le_bytes());
            data.extend_from_slice(&0i16.to_le_bytes());
        }
        data.resize(512, 0);
        buf.extend_from_slice(&data);

        buf
    }

    #[test]
    fn reads_header_and_iterates_frames() {
        let data = build_minimal_file();
        let mut reader = Reader::open(Cursor::new(data)).unwrap();
        assert_eq!(reader.proc_type(), Processor::Intel);
        assert_eq!(reader.header().point_count, 1);

        let frames: Vec<_> = (&mut reader).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(frames.len(), 2);
        let point = frames[0].points[0].unwrap();
        assert!((point.coords[0] - 10.0).abs() < 1e-5);
    }
}
