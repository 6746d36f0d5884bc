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

use std::io;
use std::io::Read;

use super::protocol;
use super::protocol::{Serializable, VarInt, VarLong, VarUInt};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Nested compounds and lists deeper than this are rejected.
const MAX_DEPTH: usize = 512;

/// The two flavours of tagged binary data seen on the wire and in the
/// static tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Fixed width little endian integers, `u16` string lengths.
    LittleEndian,
    /// Like `LittleEndian` but ints, longs and all lengths are varints.
    NetworkLittleEndian,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(Vec<Tag>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// A compound that keeps its entries in insertion order. Block states are
/// compared structurally, order included, so a map that reorders on insert
/// won't do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound(Vec<(String, Tag)>);

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag(pub String, pub Tag);

impl Compound {
    pub fn new() -> Compound {
        Compound(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.0.iter_mut().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Replaces an existing entry in place, otherwise appends.
    pub fn put(&mut self, name: &str, tag: Tag) {
        match self.get_mut(name) {
            Some(v) => *v = tag,
            None => self.0.push((name.to_owned(), tag)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Tag> {
        self.0.iter_mut().map(|(_, v)| v)
    }
}

impl Default for Tag {
    fn default() -> Tag {
        Tag::new_compound()
    }
}

impl Tag {
    pub fn new_compound() -> Tag {
        Tag::Compound(Compound::new())
    }

    pub fn new_list() -> Tag {
        Tag::List(Vec::new())
    }

    /// Returns the tag with the given name from the compound.
    ///
    /// # Panics
    /// Panics when the tag isn't a compound.
    pub fn get(&self, name: &str) -> Option<&Tag> {
        match *self {
            Tag::Compound(ref val) => val.get(name),
            _ => panic!("not a compound tag"),
        }
    }

    /// Places the tag into the compound using the given name.
    ///
    /// # Panics
    /// Panics when the tag isn't a compound.
    pub fn put(&mut self, name: &str, tag: Tag) {
        match *self {
            Tag::Compound(ref mut val) => val.put(name, tag),
            _ => panic!("not a compound tag"),
        };
    }

    pub fn is_compound(&self) -> bool {
        matches!(*self, Tag::Compound(_))
    }

    pub fn as_byte(&self) -> Option<i8> {
        match *self {
            Tag::Byte(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match *self {
            Tag::Short(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Tag::Int(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Tag::Long(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Tag::Float(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Tag::String(ref val) => Some(&val[..]),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match *self {
            Tag::List(ref val) => Some(&val[..]),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match *self {
            Tag::Compound(ref val) => Some(val),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match *self {
            Tag::Compound(ref mut val) => Some(val),
            _ => None,
        }
    }

    fn internal_id(&self) -> u8 {
        match *self {
            Tag::End => 0,
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) => 3,
            Tag::Long(_) => 4,
            Tag::Float(_) => 5,
            Tag::Double(_) => 6,
            Tag::ByteArray(_) => 7,
            Tag::String(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
            Tag::IntArray(_) => 11,
            Tag::LongArray(_) => 12,
        }
    }

    fn read_type<R: io::Read>(
        id: u8,
        buf: &mut R,
        enc: Encoding,
        depth: usize,
    ) -> Result<Tag, protocol::Error> {
        if depth > MAX_DEPTH {
            return Err(protocol::Error::Err("nbt nested too deep".to_owned()));
        }
        match id {
            0 => Ok(Tag::End),
            1 => Ok(Tag::Byte(buf.read_i8()?)),
            2 => Ok(Tag::Short(buf.read_i16::<LittleEndian>()?)),
            3 => Ok(Tag::Int(read_int(buf, enc)?)),
            4 => Ok(Tag::Long(match enc {
                Encoding::LittleEndian => buf.read_i64::<LittleEndian>()?,
                Encoding::NetworkLittleEndian => VarLong::read_from(buf)?.0,
            })),
            5 => Ok(Tag::Float(buf.read_f32::<LittleEndian>()?)),
            6 => Ok(Tag::Double(buf.read_f64::<LittleEndian>()?)),
            7 => Ok(Tag::ByteArray({
                let len = read_len(buf, enc)?;
                let mut data = Vec::with_capacity(len.min(1 << 16));
                buf.take(len as u64).read_to_end(&mut data)?;
                data
            })),
            8 => Ok(Tag::String(read_string(buf, enc)?)),
            9 => {
                let ty = buf.read_u8()?;
                let len = read_len(buf, enc)?;
                let mut l = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    l.push(Tag::read_type(ty, buf, enc, depth + 1)?);
                }
                Ok(Tag::List(l))
            }
            10 => {
                let mut c = Compound::new();
                loop {
                    let ty = buf.read_u8()?;
                    if ty == 0 {
                        break;
                    }
                    let name: String = read_string(buf, enc)?;
                    c.put(&name[..], Tag::read_type(ty, buf, enc, depth + 1)?);
                }
                Ok(Tag::Compound(c))
            }
            11 => Ok(Tag::IntArray({
                let len = read_len(buf, enc)?;
                let mut data = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    data.push(read_int(buf, enc)?);
                }
                data
            })),
            12 => Ok(Tag::LongArray({
                let len = read_len(buf, enc)?;
                let mut data = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    data.push(buf.read_i64::<LittleEndian>()?);
                }
                data
            })),
            _ => Err(protocol::Error::Err(format!("invalid tag {}", id))),
        }
    }

    fn write_payload<W: io::Write>(
        &self,
        buf: &mut W,
        enc: Encoding,
    ) -> Result<(), protocol::Error> {
        match *self {
            Tag::End => {}
            Tag::Byte(val) => buf.write_i8(val)?,
            Tag::Short(val) => buf.write_i16::<LittleEndian>(val)?,
            Tag::Int(val) => write_int(buf, enc, val)?,
            Tag::Long(val) => match enc {
                Encoding::LittleEndian => buf.write_i64::<LittleEndian>(val)?,
                Encoding::NetworkLittleEndian => VarLong(val).write_to(buf)?,
            },
            Tag::Float(val) => buf.write_f32::<LittleEndian>(val)?,
            Tag::Double(val) => buf.write_f64::<LittleEndian>(val)?,
            Tag::ByteArray(ref val) => {
                write_len(buf, enc, val.len())?;
                buf.write_all(val)?;
            }
            Tag::String(ref val) => write_string(buf, enc, val)?,
            Tag::List(ref val) => {
                if val.is_empty() {
                    buf.write_u8(0)?;
                    write_len(buf, enc, 0)?;
                } else {
                    buf.write_u8(val[0].internal_id())?;
                    write_len(buf, enc, val.len())?;
                    for e in val {
                        e.write_payload(buf, enc)?;
                    }
                }
            }
            Tag::Compound(ref val) => {
                for (k, v) in val.iter() {
                    buf.write_u8(v.internal_id())?;
                    write_string(buf, enc, k)?;
                    v.write_payload(buf, enc)?;
                }
                buf.write_u8(0)?;
            }
            Tag::IntArray(ref val) => {
                write_len(buf, enc, val.len())?;
                for v in val {
                    write_int(buf, enc, *v)?;
                }
            }
            Tag::LongArray(ref val) => {
                write_len(buf, enc, val.len())?;
                for v in val {
                    buf.write_i64::<LittleEndian>(*v)?;
                }
            }
        }
        Result::Ok(())
    }
}

impl NamedTag {
    /// Reads a root tag: the type, the name and the payload.
    pub fn read<R: io::Read>(buf: &mut R, enc: Encoding) -> Result<NamedTag, protocol::Error> {
        let ty = buf.read_u8()?;
        if ty == 0 {
            return Ok(NamedTag(String::new(), Tag::End));
        }
        let name = read_string(buf, enc)?;
        let tag = Tag::read_type(ty, buf, enc, 0)?;
        Ok(NamedTag(name, tag))
    }

    pub fn write<W: io::Write>(&self, buf: &mut W, enc: Encoding) -> Result<(), protocol::Error> {
        buf.write_u8(self.1.internal_id())?;
        if let Tag::End = self.1 {
            return Ok(());
        }
        write_string(buf, enc, &self.0)?;
        self.1.write_payload(buf, enc)
    }
}

/// Reads an unnamed root compound.
pub fn read_compound<R: io::Read>(buf: &mut R, enc: Encoding) -> Result<Compound, protocol::Error> {
    match NamedTag::read(buf, enc)?.1 {
        Tag::Compound(c) => Ok(c),
        _ => Err(protocol::Error::Err("expected a root compound".to_owned())),
    }
}

pub fn write_compound<W: io::Write>(
    buf: &mut W,
    enc: Encoding,
    c: &Compound,
) -> Result<(), protocol::Error> {
    buf.write_u8(10)?;
    write_string(buf, enc, "")?;
    Tag::Compound(c.clone()).write_payload(buf, enc)
}

/// Packet fields carry their tags in the network encoding as unnamed roots.
impl Serializable for Tag {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Tag, protocol::Error> {
        Ok(NamedTag::read(buf, Encoding::NetworkLittleEndian)?.1)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        NamedTag(String::new(), self.clone()).write(buf, Encoding::NetworkLittleEndian)
    }
}

fn read_int<R: io::Read>(buf: &mut R, enc: Encoding) -> Result<i32, protocol::Error> {
    match enc {
        Encoding::LittleEndian => Ok(buf.read_i32::<LittleEndian>()?),
        Encoding::NetworkLittleEndian => Ok(VarInt::read_from(buf)?.0),
    }
}

fn write_int<W: io::Write>(buf: &mut W, enc: Encoding, val: i32) -> Result<(), protocol::Error> {
    match enc {
        Encoding::LittleEndian => buf.write_i32::<LittleEndian>(val)?,
        Encoding::NetworkLittleEndian => VarInt(val).write_to(buf)?,
    }
    Ok(())
}

fn read_len<R: io::Read>(buf: &mut R, enc: Encoding) -> Result<usize, protocol::Error> {
    let len = read_int(buf, enc)?;
    if len < 0 {
        return Err(protocol::Error::Err(format!("negative nbt length {}", len)));
    }
    Ok(len as usize)
}

fn write_len<W: io::Write>(buf: &mut W, enc: Encoding, len: usize) -> Result<(), protocol::Error> {
    write_int(buf, enc, len as i32)
}

pub fn write_string<W: io::Write>(
    buf: &mut W,
    enc: Encoding,
    s: &str,
) -> Result<(), protocol::Error> {
    let data = s.as_bytes();
    match enc {
        Encoding::LittleEndian => buf.write_u16::<LittleEndian>(data.len() as u16)?,
        Encoding::NetworkLittleEndian => VarUInt(data.len() as u32).write_to(buf)?,
    }
    buf.write_all(data).map_err(|v| v.into())
}

pub fn read_string<R: io::Read>(buf: &mut R, enc: Encoding) -> Result<String, protocol::Error> {
    let len = match enc {
        Encoding::LittleEndian => buf.read_u16::<LittleEndian>()? as u64,
        Encoding::NetworkLittleEndian => VarUInt::read_from(buf)?.0 as u64,
    };
    let mut bytes = Vec::<u8>::new();
    buf.take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(protocol::Error::Err("nbt string exceeds buffer".to_owned()));
    }
    String::from_utf8(bytes).map_err(|e| protocol::Error::Err(format!("invalid nbt string: {}", e)))
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Compound {
        let mut states = Compound::new();
        states.put("wood_type", Tag::String("oak".to_owned()));
        states.put("stripped_bit", Tag::Byte(0));
        let mut c = Compound::new();
        c.put("name", Tag::String("minecraft:wood".to_owned()));
        c.put("states", Tag::Compound(states));
        c.put("version", Tag::Int(18_100_737));
        c
    }

    #[test]
    fn test_compound_keeps_order() {
        let mut c = Compound::new();
        c.put("b", Tag::Int(1));
        c.put("a", Tag::Int(2));
        c.put("b", Tag::Int(3));
        let keys: Vec<&str> = c.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(c.get("b").and_then(Tag::as_int), Some(3));
    }

    #[test]
    fn test_network_ints_are_varints() {
        let mut c = Compound::new();
        c.put("v", Tag::Int(-1));
        let mut buf = Vec::new();
        write_compound(&mut buf, Encoding::NetworkLittleEndian, &c).unwrap();
        // type, empty name, type, name len, "v", zig-zag -1, end
        assert_eq!(buf, vec![10, 0, 3, 1, b'v', 1, 0]);
    }

    #[test]
    fn test_both_encodings_read_back() {
        for enc in &[Encoding::LittleEndian, Encoding::NetworkLittleEndian] {
            let mut buf = Vec::new();
            write_compound(&mut buf, *enc, &sample()).unwrap();
            let back = read_compound(&mut io::Cursor::new(&buf), *enc).unwrap();
            assert_eq!(back, sample());
        }
    }

    #[test]
    fn test_truncated_string() {
        let data = [10, 0, 8, 1, b'n', 9, b'a'];
        assert!(read_compound(&mut io::Cursor::new(&data[..]), Encoding::NetworkLittleEndian).is_err());
    }
}
