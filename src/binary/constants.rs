//! Constant pool decoding.
//!
//! The pool is a sequence of tagged constant records keyed by their byte
//! offset within the pool. Aggregate constants reference other pool entries by
//! that same offset; the format encodes every dependency before its dependents,
//! so a single forward pass with no backtracking suffices: each back-reference
//! resolves against the entries already materialized. A miss is producer-side
//! corruption and fatal ([`crate::Error::ConstantOffsetUnresolved`]), not a
//! recoverable condition.
//!
//! The pool is fully decoded before any node body is read, so ordering within
//! the pool is irrelevant to external consumers.

use std::{collections::HashMap, sync::Arc};

use crate::{
    binary::{reader::EntityReader, tags::ConstantTag},
    ir::{Constant, ConstantRc},
    Error, Result,
};

/// Offset-keyed map of decoded pool constants.
#[derive(Debug, Default)]
pub(crate) struct ConstantPool {
    entries: HashMap<u32, ConstantRc>,
}

impl ConstantPool {
    /// Resolve a pool-relative offset to its constant.
    pub(crate) fn get(&self, offset: u32) -> Result<ConstantRc> {
        self.entries
            .get(&offset)
            .cloned()
            .ok_or(Error::ConstantOffsetUnresolved { offset })
    }

    /// Number of constants in the pool.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'a> EntityReader<'a> {
    /// Decode the constant pool located at `offset` within the sub-file.
    pub(crate) fn read_constant_pool(&mut self, offset: usize) -> Result<ConstantPool> {
        self.seek(offset)?;
        let count = self.read_uint30()? as usize;
        let pool_start = self.pos();

        let mut pool = ConstantPool::default();
        for _ in 0..count {
            let key = u32::try_from(self.pos() - pool_start)
                .map_err(|_| self.structural_error("Constant pool exceeds offset space"))?;
            let constant = self.read_constant(&pool)?;
            pool.entries.insert(key, Arc::new(constant));
        }

        Ok(pool)
    }

    fn read_constant(&mut self, pool: &ConstantPool) -> Result<Constant> {
        let tag_offset = self.pos();
        let byte = self.read_byte()?;
        let Some(tag) = ConstantTag::from_repr(byte) else {
            return Err(self.unexpected_tag_at(byte, tag_offset));
        };

        Ok(match tag {
            ConstantTag::NullConstant => Constant::Null,
            ConstantTag::BoolConstant => Constant::Bool {
                value: self.read_byte()? != 0,
            },
            ConstantTag::IntConstant => {
                let bytes = self.read_bytes(8)?;
                Constant::Int {
                    value: i64::from_be_bytes([
                        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6],
                        bytes[7],
                    ]),
                }
            }
            ConstantTag::DoubleConstant => Constant::Double {
                value: self.read_double()?,
            },
            ConstantTag::StringConstant => Constant::String {
                value: self.read_string_index()?,
            },
            ConstantTag::SymbolConstant => Constant::Symbol {
                value: self.read_string_index()?,
            },
            ConstantTag::MapConstant => {
                let key_type = self.read_dart_type()?;
                let value_type = self.read_dart_type()?;
                let count = self.read_uint30()? as usize;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = pool.get(self.read_uint30()?)?;
                    let value = pool.get(self.read_uint30()?)?;
                    entries.push((key, value));
                }
                Constant::Map {
                    key_type,
                    value_type,
                    entries,
                }
            }
            ConstantTag::ListConstant => {
                let type_argument = self.read_dart_type()?;
                let count = self.read_uint30()? as usize;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    entries.push(pool.get(self.read_uint30()?)?);
                }
                Constant::List {
                    type_argument,
                    entries,
                }
            }
            ConstantTag::InstanceConstant => {
                let class_reference = self.read_required_reference()?;
                let type_count = self.read_uint30()? as usize;
                let mut type_arguments = Vec::with_capacity(type_count);
                for _ in 0..type_count {
                    type_arguments.push(self.read_dart_type()?);
                }
                let field_count = self.read_uint30()? as usize;
                let mut field_values = Vec::with_capacity(field_count);
                for _ in 0..field_count {
                    let field = self.read_required_reference()?;
                    let value = pool.get(self.read_uint30()?)?;
                    field_values.push((field, value));
                }
                Constant::Instance {
                    class_reference,
                    type_arguments,
                    field_values,
                }
            }
            ConstantTag::TearOffConstant => Constant::TearOff {
                procedure: self.read_required_reference()?,
            },
            ConstantTag::TypeLiteralConstant => Constant::TypeLiteral {
                literal_type: self.read_dart_type()?,
            },
        })
    }
}
