//! Bounded cursor over the shard manager.

use std::borrow::Cow;

use crate::{
    file::{io::HprofIO, parser::Parser, ShardManager},
    Error, Result,
};

use super::types::{BasicType, ObjectId, Value};

/// An explicit read position over `[start, end)` of the file.
///
/// `start` is the first byte of the unit being decoded (a record payload or a sub-record) and
/// `end` the limit it must not cross: the end of the payload, or of the enclosing heap dump
/// segment. Crossing `end` fails with [`crate::Error::LengthMismatch`] reported against
/// `record`, the offset of the record's tag byte.
pub(crate) struct Cursor<'a> {
    shards: &'a ShardManager,
    id_size: usize,
    record: u64,
    start: u64,
    position: u64,
    end: u64,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(
        shards: &'a ShardManager,
        id_size: usize,
        record: u64,
        start: u64,
        end: u64,
    ) -> Self {
        Cursor {
            shards,
            id_size,
            record,
            start,
            position: start,
            end,
        }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// Bytes consumed since `start`.
    pub(crate) fn consumed(&self) -> u64 {
        self.position - self.start
    }

    fn claim(&mut self, len: u64) -> Result<u64> {
        let at = self.position;
        match at.checked_add(len) {
            Some(next) if next <= self.end => {
                self.position = next;
                Ok(at)
            }
            _ => Err(Error::LengthMismatch {
                offset: self.record,
                declared: self.end - self.start,
                consumed: (at - self.start).saturating_add(len),
            }),
        }
    }

    pub(crate) fn read<T: HprofIO>(&mut self) -> Result<T> {
        let at = self.claim(std::mem::size_of::<T>() as u64)?;
        self.shards.read_be(at)
    }

    pub(crate) fn read_id(&mut self) -> Result<ObjectId> {
        let at = self.claim(self.id_size as u64)?;
        self.shards.read_uint(at, self.id_size)
    }

    pub(crate) fn read_type(&mut self) -> Result<BasicType> {
        let offset = self.position;
        let type_code: u8 = self.read()?;
        BasicType::from_code(type_code).ok_or(Error::UnknownType { type_code, offset })
    }

    pub(crate) fn read_value(&mut self, ty: BasicType) -> Result<Value> {
        let base = self.position;
        let bytes = self.read_bytes(ty.size(self.id_size))?;
        Value::decode(&mut Parser::with_base(&bytes, base), ty, self.id_size)
    }

    /// `count` elements of `size` bytes each; the product is checked before any read.
    pub(crate) fn read_array(&mut self, count: u32, size: usize) -> Result<Cow<'a, [u8]>> {
        let total = u64::from(count) * size as u64;
        let len = usize::try_from(total).map_err(|_| {
            malformed_error!(self.record, "array of {} elements is too large", count)
        })?;
        self.read_bytes(len)
    }

    pub(crate) fn read_ids(&mut self, count: u32) -> Result<Vec<ObjectId>> {
        let base = self.position;
        let bytes = self.read_array(count, self.id_size)?;
        let mut parser = Parser::with_base(&bytes, base);
        let mut ids = Vec::with_capacity(count as usize);
        while parser.has_more_data() {
            ids.push(parser.read_id(self.id_size)?);
        }
        Ok(ids)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<Cow<'a, [u8]>> {
        let at = self.claim(len as u64)?;
        self.shards.read_bytes(at, len)
    }
}
