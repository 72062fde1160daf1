//! Reader and writer for C3D motion-capture files.
//!
//! C3D is a block-indexed binary container for synchronized 3D marker
//! trajectories ("point" data), auxiliary sampled channels ("analog"
//! data), and a hierarchical parameter dictionary, historically written by
//! three different processor families (Intel, DEC, and SGI/MIPS) with
//! incompatible integer endianness and float encodings.
//!
//! [`Reader::open`] parses the header and parameter section and returns a
//! lazy frame iterator; [`Writer`] accumulates frames in memory and
//! serializes an Intel/IEEE file. Non-fatal diagnostics (a truncated file,
//! metadata that merely disagrees rather than being unreadable) go through
//! [`warn`] rather than `Result`; see that module for how to intercept them.

pub mod dtypes;
pub mod error;
pub mod float_codec;
pub mod frame;
pub mod group;
pub mod header;
pub mod manager;
pub mod param;
pub mod reader;
pub mod warn;
pub mod writer;

pub use dtypes::{Dtypes, Processor};
pub use error::{Error, Result};
pub use frame::{Frame, Point};
pub use group::Group;
pub use header::Header;
pub use manager::{Entry, Manager};
pub use param::Param;
pub use reader::Reader;
pub use writer::{WriteFrame, Writer};
