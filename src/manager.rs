//! The parameter dictionary: parsing, serialization, and derived properties.
//!
//! C3D's parameter section is a singly-linked list of entries, each either
//! a group definition or a parameter belonging to a group, identified by a
//! signed one-byte id (negative for groups). [`Manager`] parses that list
//! into one canonical store of [`Group`]s plus two index maps (by name and
//! by id) so lookups by either key resolve to the same value — never two
//! copies that can drift apart.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::dtypes::{Dtypes, Processor};
use crate::error::{Error, Result};
use crate::group::Group;
use crate::header::Header;
use crate::param::Param;
use crate::warn;

/// A name or id lookup result: either an entire group or one of its parameters.
pub enum Entry<'a> {
    /// A group, addressed by bare name (e.g. `"POINT"`).
    Group(&'a Group),
    /// A parameter, addressed as `"GROUP:PARAM"` or `"GROUP.PARAM"`.
    Param(&'a Param),
}

/// The parsed parameter dictionary.
pub struct Manager {
    groups: Vec<Group>,
    name_index: HashMap<String, usize>,
    id_index: HashMap<i8, usize>,
}

impl Manager {
    /// An empty dictionary, ready for groups to be added (used by the writer).
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            name_index: HashMap::new(),
            id_index: HashMap::new(),
        }
    }

    fn fold(name: &str) -> String {
        name.to_ascii_uppercase()
    }

    /// Add a new group. Errors if its name or id collides with an existing group.
    pub fn add_group(&mut self, group: Group) -> Result<()> {
        let key = Self::fold(&group.name);
        if self.name_index.contains_key(&key) {
            return Err(Error::DuplicateKey(format!("group {}", group.name)));
        }
        if self.id_index.contains_key(&group.id) {
            return Err(Error::DuplicateKey(format!("group id {}", group.id)));
        }
        let position = self.groups.len();
        self.name_index.insert(key, position);
        self.id_index.insert(group.id, position);
        self.groups.push(group);
        Ok(())
    }

    /// Rename a group in place, keeping both index maps consistent.
    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<()> {
        let old_key = Self::fold(old);
        let position = *self
            .name_index
            .get(&old_key)
            .ok_or_else(|| Error::MissingKey(format!("group {old}")))?;
        let new_key = Self::fold(new);
        if new_key != old_key && self.name_index.contains_key(&new_key) {
            return Err(Error::DuplicateKey(format!("group {new}")));
        }
        self.name_index.remove(&old_key);
        self.name_index.insert(new_key, position);
        self.groups[position].name = new.to_string();
        Ok(())
    }

    /// Remove a group by name, along with both its index entries.
    pub fn remove_group(&mut self, name: &str) -> Result<()> {
        let key = Self::fold(name);
        let position = self
            .name_index
            .remove(&key)
            .ok_or_else(|| Error::MissingKey(format!("group {name}")))?;
        let id = self.groups[position].id;
        self.id_index.remove(&id);
        self.groups.remove(position);
        // Every index past the removed position shifted down by one.
        for idx in self.name_index.values_mut().chain(self.id_index.values_mut()) {
            if *idx > position {
                *idx -= 1;
            }
        }
        Ok(())
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.name_index
            .get(&Self::fold(name))
            .map(|&idx| &self.groups[idx])
    }

    /// Look up a group by its numeric id.
    pub fn group_by_id(&self, id: i8) -> Option<&Group> {
        self.id_index.get(&id).map(|&idx| &self.groups[idx])
    }

    /// Resolve a `"GROUP"`, `"GROUP:PARAM"`, or `"GROUP.PARAM"` path.
    pub fn get(&self, path: &str) -> Option<Entry<'_>> {
        let separator = path.find([':', '.']);
        match separator {
            None => self.group(path).map(Entry::Group),
            Some(idx) => {
                let (group_name, rest) = path.split_at(idx);
                let param_name = &rest[1..];
                self.group(group_name)
                    .and_then(|g| g.param(param_name))
                    .map(Entry::Param)
            }
        }
    }

    /// Narrow [`Manager::get`] to a parameter, returning `None` for bare
    /// group paths or missing entries.
    pub fn param(&self, path: &str) -> Option<&Param> {
        match self.get(path)? {
            Entry::Param(p) => Some(p),
            Entry::Group(_) => None,
        }
    }

    /// Look up `path` (see [`Manager::get`]) and read it as an `i8` at `index`.
    pub fn get_int8(&self, path: &str, index: usize) -> Result<i8> {
        self.param(path)
            .ok_or_else(|| Error::MissingKey(path.to_string()))?
            .int8(index)
    }

    /// Look up `path` and read it as a `u8` at `index`.
    pub fn get_uint8(&self, path: &str, index: usize) -> Result<u8> {
        self.param(path)
            .ok_or_else(|| Error::MissingKey(path.to_string()))?
            .uint8(index)
    }

    /// Look up `path` and read it as an `i16` at `index`.
    pub fn get_int16(&self, path: &str, index: usize, dtypes: &Dtypes) -> Result<i16> {
        self.param(path)
            .ok_or_else(|| Error::MissingKey(path.to_string()))?
            .int16(index, dtypes)
    }

    /// Look up `path` and read it as a `u16` at `index`.
    pub fn get_uint16(&self, path: &str, index: usize, dtypes: &Dtypes) -> Result<u16> {
        self.param(path)
            .ok_or_else(|| Error::MissingKey(path.to_string()))?
            .uint16(index, dtypes)
    }

    /// Look up `path` and read it as an `f32` at `index`.
    pub fn get_float(&self, path: &str, index: usize, dtypes: &Dtypes) -> Result<f32> {
        self.param(path)
            .ok_or_else(|| Error::MissingKey(path.to_string()))?
            .float32(index, dtypes)
    }

    /// Look up `path` and decode it as a single string (the whole byte
    /// blob for a zero-dimension char parameter, or its first element for
    /// a dimensioned one).
    pub fn get_string(&self, path: &str) -> Result<String> {
        let param = self.param(path).ok_or_else(|| Error::MissingKey(path.to_string()))?;
        param
            .string_array()
            .into_iter()
            .next()
            .ok_or_else(|| Error::TypeMismatch(format!("{path} has no string elements")))
    }

    /// Look up `path` and return its raw element chunks.
    pub fn get_bytes(&self, path: &str) -> Result<Vec<&[u8]>> {
        Ok(self
            .param(path)
            .ok_or_else(|| Error::MissingKey(path.to_string()))?
            .bytes_array())
    }

    /// Iterate over every group.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Iterate over every group, mutably — used by the writer to fill in
    /// synthesized groups before serialization.
    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut()
    }

    // ---- parsing ---------------------------------------------------------

    /// Walk the parameter section's linked list of group/param entries.
    ///
    /// `reader` must be positioned at the processor byte (offset 4 of the
    /// parameter section, i.e. immediately after the 4-byte prologue
    /// `first_block`, `ignore`, `parameter_block_count`, `processor`... in
    /// this crate the caller has already consumed the first 4 bytes and
    /// passes the resolved [`Dtypes`] in).
    pub fn read_parameters<R: Read>(reader: &mut R, dtypes: &Dtypes) -> Result<Self> {
        let mut manager = Self::new();

        loop {
            let name_len = match reader.read_i8() {
                Ok(v) => v,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            if name_len == 0 {
                break;
            }
            let group_id = reader.read_i8()?;
            if group_id == 0 {
                break;
            }
            let offset_to_next = dtypes.read_i16(reader)?;

            let mut name_bytes = vec![0u8; name_len.unsigned_abs() as usize];
            reader.read_exact(&mut name_bytes)?;
            let name = Dtypes::decode_string(&name_bytes);

            // A non-final entry's payload is bounded to exactly
            // `offset_to_next - 2` bytes (measured from right after this
            // field, so it covers the name we just read plus the body);
            // anything left unconsumed after parsing is padding and must be
            // discarded rather than bleeding into the next entry. The final
            // entry (offset_to_next == 0) has no such bound, so its fields
            // are parsed directly from the shared stream as before.
            if offset_to_next != 0 {
                let span = offset_to_next as i32 - 2;
                let payload_len = (span - name_bytes.len() as i32).max(0) as usize;
                let mut payload = vec![0u8; payload_len];
                reader.read_exact(&mut payload)?;
                Self::parse_entry(&mut Cursor::new(payload), group_id, name, &mut manager)?;
            } else {
                Self::parse_entry(reader, group_id, name, &mut manager)?;
                break;
            }
        }

        Ok(manager)
    }

    fn parse_entry<R: Read>(reader: &mut R, group_id: i8, name: String, manager: &mut Self) -> Result<()> {
        if group_id < 0 {
            let id = -group_id;
            let desc_len = reader.read_u8()?;
            let mut desc_bytes = vec![0u8; desc_len as usize];
            reader.read_exact(&mut desc_bytes)?;
            let mut group = Group::new(id, name);
            group.desc = Dtypes::decode_string(&desc_bytes);
            log::trace!("parsed group {} (id {id})", group.name);
            if manager.add_group(group).is_err() {
                warn::warn(format!("duplicate group id {id}, ignoring redefinition"));
            }
        } else {
            let param = Param::read_body(reader, name)?;
            match manager.groups_mut_by_id(group_id) {
                Some(group) => {
                    if group.add_param(param).is_err() {
                        warn::warn(format!("duplicate parameter in group id {group_id}, ignoring redefinition"));
                    }
                }
                None => warn::warn(format!("parameter references unknown group id {group_id}")),
            }
        }
        Ok(())
    }

    fn groups_mut_by_id(&mut self, id: i8) -> Option<&mut Group> {
        self.id_index.get(&id).copied().map(move |idx| &mut self.groups[idx])
    }

    /// Serialize every group and parameter, returning the raw parameter
    /// section bytes (not including the 4-byte prologue or block padding —
    /// the writer owns those).
    pub fn write_parameters<W: Write>(&self, writer: &mut W) -> Result<()> {
        // Collect (name, id, body) triples in a fixed order so offsets can
        // be computed as a single forward pass.
        let mut entries: Vec<(&str, i8, Vec<u8>)> = Vec::new();
        for group in &self.groups {
            let mut body = Vec::new();
            group.write_own_body(&mut body)?;
            entries.push((group.name.as_str(), -group.id, body));
            for param in group.params() {
                let mut body = Vec::new();
                param.write_body(&mut body)?;
                entries.push((param.name.as_str(), group.id, body));
            }
        }

        for (i, (name, id, body)) in entries.iter().enumerate() {
            let is_last = i + 1 == entries.len();
            let next_offset = if is_last {
                0i16
            } else {
                2 + name.len() as i16 + body.len() as i16
            };
            writer.write_i8(name.len() as i8)?;
            writer.write_i8(*id)?;
            writer.write_i16::<byteorder::LittleEndian>(next_offset)?;
            writer.write_all(name.as_bytes())?;
            writer.write_all(body)?;
        }
        Ok(())
    }

    /// Total byte size of the serialized parameter section (sum of every
    /// group's [`Group::binary_size`]).
    pub fn binary_size(&self) -> usize {
        self.groups.iter().map(Group::binary_size).sum()
    }

    // ---- derived properties ------------------------------------------------

    /// Point sample rate, falling back to the header's `frame_rate` when
    /// `POINT:RATE` is absent.
    pub fn point_rate(&self, header: &Header, dtypes: &Dtypes) -> f32 {
        self.param("POINT:RATE")
            .and_then(|p| p.float32(0, dtypes).ok())
            .unwrap_or(header.frame_rate)
    }

    /// Point coordinate scale factor, falling back to the header's
    /// `scale_factor` when `POINT:SCALE` is absent.
    pub fn point_scale(&self, header: &Header, dtypes: &Dtypes) -> f32 {
        self.param("POINT:SCALE")
            .and_then(|p| p.float32(0, dtypes).ok())
            .unwrap_or(header.scale_factor)
    }

    /// Number of point trajectories actually in use, falling back to the
    /// header's `point_count`.
    pub fn point_used(&self, header: &Header, dtypes: &Dtypes) -> u16 {
        self.param("POINT:USED")
            .and_then(|p| p.as_integer_value(dtypes).ok())
            .map(|v| v as u16)
            .unwrap_or(header.point_count)
    }

    /// Number of analog channels in use, falling back to the header's `analog_count`.
    pub fn analog_used(&self, header: &Header, dtypes: &Dtypes) -> u16 {
        self.param("ANALOG:USED")
            .and_then(|p| p.as_integer_value(dtypes).ok())
            .map(|v| v as u16)
            .unwrap_or(header.analog_count)
    }

    /// Analog sampling rate, derived from `ANALOG:RATE` or, lacking that,
    /// `point_rate * analog_per_frame`.
    pub fn analog_rate(&self, header: &Header, dtypes: &Dtypes) -> f32 {
        self.param("ANALOG:RATE")
            .and_then(|p| p.float32(0, dtypes).ok())
            .unwrap_or_else(|| self.point_rate(header, dtypes) * self.analog_per_frame(header, dtypes) as f32)
    }

    /// Analog samples per video frame. The header's `analog_per_frame` is
    /// authoritative — there is no per-frame-count parameter to cross-check
    /// it against, so this simply exposes the header field.
    pub fn analog_per_frame(&self, header: &Header, _dtypes: &Dtypes) -> u16 {
        header.analog_per_frame
    }

    /// First frame index, falling back to the header's `first_frame`.
    pub fn first_frame(&self, header: &Header, dtypes: &Dtypes) -> u16 {
        self.param("TRIAL:ACTUAL_START_FIELD")
            .and_then(|p| p.as_integer_value(dtypes).ok())
            .map(|v| v as u16)
            .unwrap_or(header.first_frame)
    }

    /// Last frame index. A header whose range is internally consistent (not
    /// the `65535` sentinel, and `first_frame < last_frame`) is trusted
    /// outright; otherwise the frame count can be encoded in any of several
    /// parameters, so this takes the maximum across all of them.
    pub fn last_frame(&self, header: &Header, dtypes: &Dtypes) -> u16 {
        if header.first_frame < header.last_frame && header.last_frame != 65535 {
            return header.last_frame;
        }

        let mut end_frame = [header.last_frame as u32, 0, 0, 0];
        if let Some(v) = self.param("TRIAL:ACTUAL_END_FIELD").and_then(|p| p.as_integer_value(dtypes).ok()) {
            end_frame[1] = v as u32;
        }
        if let Some(v) = self.param("POINT:LONG_FRAMES").and_then(|p| p.as_integer_value(dtypes).ok()) {
            end_frame[2] = v as u32;
        }
        if let Some(v) = self.param("POINT:FRAMES").and_then(|p| p.as_integer_value(dtypes).ok()) {
            end_frame[3] = v as u32;
        }
        end_frame.into_iter().max().unwrap_or(0) as u16
    }

    /// Total number of frames in the data block.
    pub fn frame_count(&self, header: &Header, dtypes: &Dtypes) -> u32 {
        let first = self.first_frame(header, dtypes) as u32;
        let last = self.last_frame(header, dtypes) as u32;
        last.saturating_sub(first) + 1
    }

    /// Convenience accessor mirroring the original library's `point_labels`
    /// property: the `POINT:LABELS` parameter decoded as strings.
    pub fn point_labels(&self) -> Vec<String> {
        self.param("POINT:LABELS").map(Param::string_array).unwrap_or_default()
    }

    /// Convenience accessor mirroring `analog_labels`: `ANALOG:LABELS`
    /// decoded as strings.
    pub fn analog_labels(&self) -> Vec<String> {
        self.param("ANALOG:LABELS").map(Param::string_array).unwrap_or_default()
    }

    /// Total analog sample count across the whole file
    /// (`frame_count * analog_per_frame`), 0 if no analog channels are used.
    pub fn analog_sample_count(&self, header: &Header, dtypes: &Dtypes) -> u32 {
        if self.analog_used(header, dtypes) == 0 {
            0
        } else {
            self.frame_count(header, dtypes) * self.analog_per_frame(header, dtypes) as u32
        }
    }

    /// Cross-check header and parameter metadata. Five hard invariants
    /// (point count, scale factor, frame rate, the analog/point rate ratio,
    /// and the analog channel count) must hold exactly between header and
    /// parameters; everything else that can merely be absent — labels,
    /// descriptions, the data-block pointer — is a warning, not an error.
    pub fn check_metadata(&self, header: &Header, dtypes: &Dtypes) -> Result<()> {
        let point_used = self.point_used(header, dtypes);
        if point_used != header.point_count {
            return Err(Error::InconsistentMetadata(format!(
                "inconsistent point count! {} header != {point_used} POINT:USED",
                header.point_count
            )));
        }

        let point_scale = self.point_scale(header, dtypes);
        if point_scale != header.scale_factor {
            return Err(Error::InconsistentMetadata(format!(
                "inconsistent scale factor! {} header != {point_scale} POINT:SCALE",
                header.scale_factor
            )));
        }

        let point_rate = self.point_rate(header, dtypes);
        if point_rate != header.frame_rate {
            return Err(Error::InconsistentMetadata(format!(
                "inconsistent frame rate! {} header != {point_rate} POINT:RATE",
                header.frame_rate
            )));
        }

        let analog_rate = self.analog_rate(header, dtypes);
        let ratio = if point_rate != 0.0 { analog_rate / point_rate } else { 0.0 };
        if header.analog_per_frame as f32 != ratio {
            return Err(Error::InconsistentMetadata(format!(
                "inconsistent analog rate! {} header != {analog_rate} analog-fps / {point_rate} point-fps",
                header.analog_per_frame
            )));
        }

        let analog_used = self.analog_used(header, dtypes);
        let expected_analog_count = analog_used as u32 * header.analog_per_frame as u32;
        if header.analog_count as u32 != expected_analog_count {
            return Err(Error::InconsistentMetadata(format!(
                "inconsistent analog count! {} header != {analog_used} analog used * {} per-frame",
                header.analog_count, header.analog_per_frame
            )));
        }

        match self.param("POINT:DATA_START").and_then(|p| p.uint16(0, dtypes).ok()) {
            Some(start) => {
                if start != header.data_block {
                    warn::warn(format!(
                        "inconsistent data block! {start} header != {} POINT:DATA_START",
                        header.data_block
                    ));
                }
            }
            None => warn::warn(
                "no pointer available in POINT:DATA_START indicating the start of the data block, \
                 using header pointer as fallback",
            ),
        }

        if point_used > 0 {
            if self.param("POINT:LABELS").is_none() {
                warn::warn("missing parameter POINT:LABELS");
            }
            if self.param("POINT:DESCRIPTIONS").is_none() {
                warn::warn("missing parameter POINT:DESCRIPTIONS");
            }
        } else {
            warn::warn("no point data found in file");
        }

        if analog_used > 0 {
            if self.param("ANALOG:LABELS").is_none() {
                warn::warn("missing parameter ANALOG:LABELS");
            }
            if self.param("ANALOG:DESCRIPTIONS").is_none() {
                warn::warn("missing parameter ANALOG:DESCRIPTIONS");
            }
        } else {
            warn::warn("no analog data found in file");
        }

        Ok(())
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_group_rejects_duplicate_name() {
        let mut manager = Manager::new();
        manager.add_group(Group::new(1, "POINT")).unwrap();
        let err = manager.add_group(Group::new(2, "point")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
    }

    #[test]
    fn add_group_rejects_duplicate_id() {
        let mut manager = Manager::new();
        manager.add_group(Group::new(1, "POINT")).unwrap();
        let err = manager.add_group(Group::new(1, "ANALOG")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
    }

    #[test]
    fn get_resolves_dotted_and_colon_paths() {
        let mut manager = Manager::new();
        let mut group = Group::new(1, "POINT");
        group.add_param(Param::new("RATE", 4)).unwrap();
        manager.add_group(group).unwrap();

        assert!(matches!(manager.get("POINT"), Some(Entry::Group(_))));
        assert!(matches!(manager.get("POINT:RATE"), Some(Entry::Param(_))));
        assert!(matches!(manager.get("POINT.RATE"), Some(Entry::Param(_))));
        assert!(manager.get("MISSING:RATE").is_none());
    }

    #[test]
    fn rename_group_keeps_both_indices_in_sync() {
        let mut manager = Manager::new();
        manager.add_group(Group::new(1, "POINT")).unwrap();
        manager.rename_group("POINT", "POINTS").unwrap();
        assert!(manager.group("POINT").is_none());
        assert!(manager.group("POINTS").is_some());
        assert_eq!(manager.group_by_id(1).unwrap().name, "POINTS");
    }

    #[test]
    fn path_addressed_typed_getters_read_through_to_param() {
        let mut manager = Manager::new();
        let mut group = Group::new(1, "POINT");
        let mut rate = Param::new("RATE", 4);
        rate.bytes = 60.0f32.to_le_bytes().to_vec();
        group.add_param(rate).unwrap();
        manager.add_group(group).unwrap();

        let dtypes = Dtypes::new(Processor::Intel);
        assert_eq!(manager.get_float("POINT:RATE", 0, &dtypes).unwrap(), 60.0);
        assert!(manager.get_float("POINT:MISSING", 0, &dtypes).is_err());
    }

    #[test]
    fn read_parameters_bounds_each_entry_to_offset_to_next_and_skips_padding() {
        // A non-final RATE parameter with 4 stray padding bytes appended
        // inside its entry, followed by a second parameter. Without bounding
        // the read to offset_to_next - 2, the padding bytes would be
        // consumed as part of RATE's body and desync USED's fields.
        let dtypes = Dtypes::new(Processor::Intel);
        let mut body = Vec::new();

        let mut rate_body = Vec::new();
        rate_body.write_i8(4).unwrap(); // bytes_per_element
        rate_body.write_u8(0).unwrap(); // no dimensions
        rate_body.extend_from_slice(&60.0f32.to_le_bytes());
        rate_body.write_u8(0).unwrap(); // desc length
        rate_body.extend_from_slice(&[0xAA, 0xAA, 0xAA, 0xAA]); // padding

        let name = "RATE";
        let offset_to_next = 2 + name.len() as i16 + rate_body.len() as i16;
        body.write_i8(name.len() as i8).unwrap();
        body.write_i8(1).unwrap(); // group id 1 (POINT)
        body.write_i16::<byteorder::LittleEndian>(offset_to_next).unwrap();
        body.extend_from_slice(name.as_bytes());
        body.extend_from_slice(&rate_body);

        let mut used_body = Vec::new();
        used_body.write_i8(2).unwrap();
        used_body.write_u8(0).unwrap();
        used_body.extend_from_slice(&3i16.to_le_bytes());
        used_body.write_u8(0).unwrap();

        let name = "USED";
        body.write_i8(name.len() as i8).unwrap();
        body.write_i8(1).unwrap();
        body.write_i16::<byteorder::LittleEndian>(0).unwrap(); // final entry
        body.extend_from_slice(name.as_bytes());
        body.extend_from_slice(&used_body);

        // POINT group definition must exist for id 1 to resolve; prepend it.
        let mut full = Vec::new();
        let group_name = "POINT";
        let mut group_body = Vec::new();
        group_body.write_u8(0).unwrap(); // desc length 0
        let group_offset = 2 + group_name.len() as i16 + group_body.len() as i16;
        full.write_i8(group_name.len() as i8).unwrap();
        full.write_i8(-1).unwrap();
        full.write_i16::<byteorder::LittleEndian>(group_offset).unwrap();
        full.extend_from_slice(group_name.as_bytes());
        full.extend_from_slice(&group_body);
        full.extend_from_slice(&body);

        let mut cursor = Cursor::new(full);
        let manager = Manager::read_parameters(&mut cursor, &dtypes).unwrap();

        assert_eq!(manager.param("POINT:RATE").unwrap().float32(0, &dtypes).unwrap(), 60.0);
        assert_eq!(manager.param("POINT:USED").unwrap().as_integer_value(&dtypes).unwrap(), 3);
    }

    #[test]
    fn derived_properties_fall_back_to_header() {
        let manager = Manager::new();
        let header = Header {
            frame_rate: 50.0,
            point_count: 12,
            ..Header::default()
        };
        let dtypes = Dtypes::new(Processor::Intel);
        assert_eq!(manager.point_rate(&header, &dtypes), 50.0);
        assert_eq!(manager.point_used(&header, &dtypes), 12);
    }
}
