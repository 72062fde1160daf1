//! A named collection of [`Param`]s.
//!
//! Parameter names are case-folded for lookup (`POINT:RATE` and
//! `point:rate` name the same entry) but the original case is preserved for
//! display and re-serialization. Insertion order is preserved so a group
//! round-trips through read/write without reshuffling its parameters.

use std::io::Write;

use crate::dtypes::Dtypes;
use crate::error::{Error, Result};
use crate::param::Param;

/// A group: a numeric id, a name, a description, and its parameters.
#[derive(Debug, Clone)]
pub struct Group {
    /// Positive group id (the wire format negates this for the group's own entry).
    pub id: i8,
    /// Group name, case-preserved.
    pub name: String,
    /// Free-text description.
    pub desc: String,
    params: Vec<Param>,
}

impl Group {
    /// Build an empty group.
    pub fn new(id: i8, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            desc: String::new(),
            params: Vec::new(),
        }
    }

    /// Find a parameter by name, case-insensitively.
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Find a parameter by name, case-insensitively, mutably.
    pub fn param_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.iter_mut().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Iterate over this group's parameters in insertion order.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Add a new parameter. Errors if a parameter with the same name
    /// (case-insensitive) already exists.
    pub fn add_param(&mut self, param: Param) -> Result<()> {
        if self.param(&param.name).is_some() {
            return Err(Error::DuplicateKey(format!(
                "{}:{} already exists",
                self.name, param.name
            )));
        }
        self.params.push(param);
        Ok(())
    }

    /// Rename a parameter in place. Errors if `old` doesn't exist or `new`
    /// collides with another existing parameter.
    pub fn rename_param(&mut self, old: &str, new: &str) -> Result<()> {
        if old.eq_ignore_ascii_case(new) {
            if let Some(p) = self.param_mut(old) {
                p.name = new.to_string();
                return Ok(());
            }
            return Err(Error::MissingKey(format!("{}:{old}", self.name)));
        }
        if self.param(new).is_some() {
            return Err(Error::DuplicateKey(format!("{}:{new}", self.name)));
        }
        match self.param_mut(old) {
            Some(p) => {
                p.name = new.to_string();
                Ok(())
            }
            None => Err(Error::MissingKey(format!("{}:{old}", self.name))),
        }
    }

    /// Find `name` and read it as an `i8` at `index`.
    pub fn get_int8(&self, name: &str, index: usize) -> Result<i8> {
        self.param(name)
            .ok_or_else(|| Error::MissingKey(format!("{}:{name}", self.name)))?
            .int8(index)
    }

    /// Find `name` and read it as a `u8` at `index`.
    pub fn get_uint8(&self, name: &str, index: usize) -> Result<u8> {
        self.param(name)
            .ok_or_else(|| Error::MissingKey(format!("{}:{name}", self.name)))?
            .uint8(index)
    }

    /// Find `name` and read it as an `f32` at `index`.
    pub fn get_float(&self, name: &str, index: usize, dtypes: &Dtypes) -> Result<f32> {
        self.param(name)
            .ok_or_else(|| Error::MissingKey(format!("{}:{name}", self.name)))?
            .float32(index, dtypes)
    }

    /// Find `name` and decode it as strings.
    pub fn get_string(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .param(name)
            .ok_or_else(|| Error::MissingKey(format!("{}:{name}", self.name)))?
            .string_array())
    }

    /// Total size in bytes this group occupies in the parameter section,
    /// including its own entry and every parameter entry under it.
    pub fn binary_size(&self) -> usize {
        let own_entry = 4 + self.name.len() + 1 + self.desc.len();
        own_entry + self.params.iter().map(Param::binary_size).sum::<usize>()
    }

    /// Write this group's own entry body (desc length + desc). The shared
    /// prologue (name length, negated id, offset) is written by the caller,
    /// which needs cross-group context to compute `offset_to_next`.
    pub fn write_own_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        use byteorder::WriteBytesExt;
        writer.write_u8(self.desc.len() as u8)?;
        writer.write_all(self.desc.as_bytes())?;
        Ok(())
    }
}
