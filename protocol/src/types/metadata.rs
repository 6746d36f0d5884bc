// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::nbt;
use crate::protocol;
use crate::protocol::{Serializable, VarInt, VarLong, VarUInt};
use crate::shared::Position;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::marker::PhantomData;

pub struct MetadataKey<T: MetaValue> {
    index: u32,
    ty: PhantomData<T>,
}

impl<T: MetaValue> MetadataKey<T> {
    pub const fn new(index: u32) -> MetadataKey<T> {
        MetadataKey {
            index,
            ty: PhantomData,
        }
    }
}

/// The block runtime id a falling block entity renders as, among others.
pub const VARIANT: MetadataKey<i32> = MetadataKey::new(2);

#[derive(Clone, PartialEq)]
pub struct Metadata {
    map: BTreeMap<u32, Value>,
}

impl Metadata {
    pub fn new() -> Metadata {
        Metadata {
            map: BTreeMap::new(),
        }
    }

    /// Returns the value under the key, or `None` when it is missing or
    /// holds a different type.
    pub fn get<T: MetaValue>(&self, key: &MetadataKey<T>) -> Option<&T> {
        self.map.get(&key.index).and_then(T::unwrap)
    }

    pub fn put<T: MetaValue>(&mut self, key: &MetadataKey<T>, val: T) {
        self.map.insert(key.index, val.wrap());
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn put_raw<T: MetaValue>(&mut self, index: u32, val: T) {
        self.map.insert(index, val.wrap());
    }
}

impl Serializable for Metadata {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, protocol::Error> {
        let mut m = Metadata::new();
        let count = VarUInt::read_from(buf)?.0;
        for _ in 0..count {
            let index = VarUInt::read_from(buf)?.0;
            let ty = VarUInt::read_from(buf)?.0;
            match ty {
                0 => m.put_raw(index, i8::read_from(buf)?),
                1 => m.put_raw(index, i16::read_from(buf)?),
                2 => m.put_raw(index, VarInt::read_from(buf)?.0),
                3 => m.put_raw(index, f32::read_from(buf)?),
                4 => m.put_raw(index, String::read_from(buf)?),
                5 => m.put_raw(index, nbt::Tag::read_from(buf)?),
                6 => m.put_raw(
                    index,
                    Position::new(
                        VarInt::read_from(buf)?.0,
                        VarInt::read_from(buf)?.0,
                        VarInt::read_from(buf)?.0,
                    ),
                ),
                7 => m.put_raw(index, VarLong::read_from(buf)?.0),
                8 => m.put_raw(
                    index,
                    [
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                        f32::read_from(buf)?,
                    ],
                ),
                _ => {
                    return Err(protocol::Error::UnknownEnumOption {
                        what: "metadata type",
                        value: ty as i64,
                    })
                }
            }
        }
        Ok(m)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        VarUInt(self.map.len() as u32).write_to(buf)?;
        for (k, v) in &self.map {
            VarUInt(*k).write_to(buf)?;
            match *v {
                Value::Byte(ref val) => {
                    VarUInt(0).write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::Short(ref val) => {
                    VarUInt(1).write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::Int(ref val) => {
                    VarUInt(2).write_to(buf)?;
                    VarInt(*val).write_to(buf)?;
                }
                Value::Float(ref val) => {
                    VarUInt(3).write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::String(ref val) => {
                    VarUInt(4).write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::Compound(ref val) => {
                    VarUInt(5).write_to(buf)?;
                    val.write_to(buf)?;
                }
                Value::Position(ref val) => {
                    VarUInt(6).write_to(buf)?;
                    VarInt(val.x).write_to(buf)?;
                    VarInt(val.y).write_to(buf)?;
                    VarInt(val.z).write_to(buf)?;
                }
                Value::Long(ref val) => {
                    VarUInt(7).write_to(buf)?;
                    VarLong(*val).write_to(buf)?;
                }
                Value::Vector(ref val) => {
                    VarUInt(8).write_to(buf)?;
                    val[0].write_to(buf)?;
                    val[1].write_to(buf)?;
                    val[2].write_to(buf)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Metadata[ ")?;
        for (k, v) in &self.map {
            write!(f, "{:?}={:?}, ", k, v)?;
        }
        write!(f, "]")
    }
}

impl Default for Metadata {
    fn default() -> Metadata {
        Metadata::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    String(String),
    Compound(nbt::Tag),
    Position(Position),
    Long(i64),
    Vector([f32; 3]),
}

pub trait MetaValue {
    fn unwrap(_: &Value) -> Option<&Self>;
    fn wrap(self) -> Value;
}

macro_rules! meta_value {
    ($($ty:ty => $variant:ident,)*) => {
        $(
            impl MetaValue for $ty {
                fn unwrap(value: &Value) -> Option<&Self> {
                    match *value {
                        Value::$variant(ref val) => Some(val),
                        _ => None,
                    }
                }
                fn wrap(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*
    }
}

meta_value! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    f32 => Float,
    String => String,
    nbt::Tag => Compound,
    Position => Position,
    i64 => Long,
    [f32; 3] => Vector,
}
