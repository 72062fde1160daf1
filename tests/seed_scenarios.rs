//! End-to-end scenarios covering each processor format and the writer/reader round trip.

use std::io::Cursor;

use c3d::dtypes::{Dtypes, Processor};
use c3d::float_codec::dec_to_ieee_f32;
use c3d::frame::read_frame;
use c3d::group::Group;
use c3d::manager::Manager;
use c3d::param::Param;
use c3d::writer::{WriteFrame, Writer};
use c3d::Reader;

fn point_manager() -> Manager {
    let mut manager = Manager::new();
    let mut point = Group::new(1, "POINT");
    let mut used = Param::new("USED", 2);
    used.bytes = 3i16.to_le_bytes().to_vec();
    point.add_param(used).unwrap();
    manager.add_group(point).unwrap();
    manager
}

#[test]
fn s1_intel_float_frame_decodes_residual_and_camera_count() {
    let dtypes = Dtypes::new(Processor::Intel);
    let manager = point_manager();

    let mut bytes = Vec::new();
    for coords in [[1.0f32, 2.0, 3.0]] {
        bytes.extend_from_slice(&coords[0].to_le_bytes());
        bytes.extend_from_slice(&coords[1].to_le_bytes());
        bytes.extend_from_slice(&coords[2].to_le_bytes());
        bytes.extend_from_slice(&0x0004_0000u32.to_le_bytes());
    }
    let mut cursor = Cursor::new(bytes);

    let frame = read_frame(&mut cursor, &dtypes, &manager, 1, 0, -1.0).unwrap();
    let point = frame.points[0].unwrap();
    assert_eq!(point.coords, [1.0, 2.0, 3.0]);
    assert_eq!(point.residual, 0.0);
    assert_eq!(point.cameras, 1);
}

#[test]
fn s2_intel_int_frame_flags_invalid_point_on_negative_word4() {
    let dtypes = Dtypes::new(Processor::Intel);
    let manager = point_manager();

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&10i16.to_le_bytes());
    bytes.extend_from_slice(&20i16.to_le_bytes());
    bytes.extend_from_slice(&30i16.to_le_bytes());
    bytes.extend_from_slice(&(-1i16).to_le_bytes());
    let mut cursor = Cursor::new(bytes);

    let frame = read_frame(&mut cursor, &dtypes, &manager, 1, 0, 1.0).unwrap();
    assert!(frame.points[0].is_none());
}

#[test]
fn s3_dec_scale_factor_bytes_convert_to_approximately_one() {
    // DEC encoding of 1.0, word-swapped with exponent biased +2 over IEEE.
    let dec_bytes = [0x00u8, 0x00, 0x80, 0x40];
    let bits = u32::from_le_bytes(dec_bytes);
    let value = dec_to_ieee_f32(bits);
    assert!((value - 1.0).abs() < 1e-6, "got {value}");
}

#[test]
fn s4_mips_big_endian_matches_intel_logical_content() {
    let intel = Dtypes::new(Processor::Intel);
    let mips = Dtypes::new(Processor::Mips);
    let manager = point_manager();

    let mut intel_bytes = Vec::new();
    intel_bytes.extend_from_slice(&10i16.to_le_bytes());
    intel_bytes.extend_from_slice(&20i16.to_le_bytes());
    intel_bytes.extend_from_slice(&30i16.to_le_bytes());
    intel_bytes.extend_from_slice(&0i16.to_le_bytes());

    let mut mips_bytes = Vec::new();
    mips_bytes.extend_from_slice(&10i16.to_be_bytes());
    mips_bytes.extend_from_slice(&20i16.to_be_bytes());
    mips_bytes.extend_from_slice(&30i16.to_be_bytes());
    mips_bytes.extend_from_slice(&0i16.to_be_bytes());

    let intel_frame = read_frame(&mut Cursor::new(intel_bytes), &intel, &manager, 1, 0, 1.0).unwrap();
    let mips_frame = read_frame(&mut Cursor::new(mips_bytes), &mips, &manager, 1, 0, 1.0).unwrap();

    assert_eq!(intel_frame.points[0], mips_frame.points[0]);
}

#[test]
fn s5_zero_offset_to_next_on_final_parameter_does_not_fail_the_walk() {
    let dtypes = Dtypes::new(Processor::Intel);
    let mut manager = Manager::new();
    let mut point = Group::new(1, "POINT");
    let mut rate = Param::new("RATE", 4);
    rate.bytes = 60.0f32.to_le_bytes().to_vec();
    point.add_param(rate).unwrap();
    manager.add_group(point).unwrap();

    let mut body = Vec::new();
    manager.write_parameters(&mut body).unwrap();
    // Append trailing garbage after the section to simulate unread padding
    // a zero offset_to_next should leave behind.
    body.extend_from_slice(&[0xAA; 16]);

    let mut cursor = Cursor::new(body);
    let parsed = Manager::read_parameters(&mut cursor, &dtypes).unwrap();
    assert!(parsed.group("POINT").is_some());
}

#[test]
fn s6_writer_round_trips_through_reader() {
    let mut writer = Writer::new(100.0, 100.0, 1.0).with_point_labels(vec![
        "A".to_string(),
        "B".to_string(),
        "C".to_string(),
    ]);
    for i in 0..2 {
        writer.add_frame(WriteFrame {
            points: vec![
                Some([1.0 + i as f32, 2.0, 3.0]),
                Some([4.0, 5.0, 6.0]),
                Some([7.0, 8.0, 9.0]),
            ],
            analog: vec![],
        });
    }

    let mut buf = Vec::new();
    writer.write(&mut buf).unwrap();
    assert_eq!(buf.len() % 512, 0);

    let mut reader = Reader::open(Cursor::new(buf)).unwrap();
    assert_eq!(reader.header().point_count, 3);

    let frames: Vec<_> = (&mut reader).collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].points[0].unwrap().coords, [1.0, 2.0, 3.0]);
    assert_eq!(frames[1].points[0].unwrap().coords, [2.0, 2.0, 3.0]);
}
