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

use std::convert;
use std::default;
use std::fmt;
use std::io;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::error;

pub mod batch;
pub mod packet;
pub mod versions;

use self::packet::{Kind, Packet};
use self::versions::Pool;

/// Packet ids live in the low ten bits of the packet header, the rest
/// carries sub-client routing which the gateway never uses.
pub const PACKET_ID_MASK: u32 = 0x3ff;

pub trait Serializable: Sized {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Self, Error>;
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error>;
}

impl Serializable for () {
    fn read_from<R: io::Read>(_: &mut R) -> Result<(), Error> {
        Result::Ok(())
    }
    fn write_to<W: io::Write>(&self, _: &mut W) -> Result<(), Error> {
        Result::Ok(())
    }
}

/// Optional values are prefixed by a presence flag.
impl<T> Serializable for Option<T>
where
    T: Serializable,
{
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Option<T>, Error> {
        if bool::read_from(buf)? {
            Result::Ok(Some(T::read_from(buf)?))
        } else {
            Result::Ok(None)
        }
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        match *self {
            Some(ref val) => {
                true.write_to(buf)?;
                val.write_to(buf)?;
            }
            None => false.write_to(buf)?,
        }
        Result::Ok(())
    }
}

impl Serializable for String {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<String, Error> {
        let len = VarUInt::read_from(buf)?.0;
        let mut bytes = Vec::<u8>::new();
        buf.take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len as usize {
            return Err(Error::Err("string length exceeds buffer".to_owned()));
        }
        let ret = String::from_utf8(bytes)
            .map_err(|e| Error::Err(format!("invalid utf-8 string: {}", e)))?;
        Result::Ok(ret)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let bytes = self.as_bytes();
        VarUInt(bytes.len() as u32).write_to(buf)?;
        buf.write_all(bytes)?;
        Result::Ok(())
    }
}

impl Serializable for bool {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<bool, Error> {
        Result::Ok(buf.read_u8()? != 0)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u8(if *self { 1 } else { 0 })?;
        Result::Ok(())
    }
}

impl Serializable for i8 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i8, Error> {
        Result::Ok(buf.read_i8()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i8(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u8 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u8, Error> {
        Result::Ok(buf.read_u8()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u8(*self)?;
        Result::Ok(())
    }
}

impl Serializable for i16 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i16, Error> {
        Result::Ok(buf.read_i16::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i16::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u16 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u16, Error> {
        Result::Ok(buf.read_u16::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u16::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for i32 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i32, Error> {
        Result::Ok(buf.read_i32::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i32::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u32 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u32, Error> {
        Result::Ok(buf.read_u32::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u32::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for i64 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<i64, Error> {
        Result::Ok(buf.read_i64::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_i64::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for u64 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<u64, Error> {
        Result::Ok(buf.read_u64::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u64::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for f32 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<f32, Error> {
        Result::Ok(buf.read_f32::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_f32::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

impl Serializable for f64 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<f64, Error> {
        Result::Ok(buf.read_f64::<LittleEndian>()?)
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_f64::<LittleEndian>(*self)?;
        Result::Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UUID(pub u64, pub u64);

impl Serializable for UUID {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<UUID, Error> {
        Result::Ok(UUID(
            buf.read_u64::<LittleEndian>()?,
            buf.read_u64::<LittleEndian>()?,
        ))
    }
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_u64::<LittleEndian>(self.0)?;
        buf.write_u64::<LittleEndian>(self.1)?;
        Result::Ok(())
    }
}

pub trait Lengthable: Serializable + Copy + Default {
    fn into_len(self) -> usize;
    fn from_len(_: usize) -> Self;
}

#[derive(Clone)]
pub struct LenPrefixed<L: Lengthable, V> {
    len: L,
    pub data: Vec<V>,
}

impl<L: Lengthable, V> LenPrefixed<L, V> {
    pub fn new(data: Vec<V>) -> LenPrefixed<L, V> {
        LenPrefixed {
            len: Default::default(),
            data,
        }
    }
}

impl<L: Lengthable, V: Serializable> Serializable for LenPrefixed<L, V> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<LenPrefixed<L, V>, Error> {
        let len_data: L = Serializable::read_from(buf)?;
        let len: usize = len_data.into_len();
        // Lengths come off the wire, never trust them for the allocation.
        let mut data: Vec<V> = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            data.push(Serializable::read_from(buf)?);
        }
        Result::Ok(LenPrefixed {
            len: len_data,
            data,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let len_data: L = L::from_len(self.data.len());
        len_data.write_to(buf)?;
        for val in &self.data {
            val.write_to(buf)?;
        }
        Result::Ok(())
    }
}

impl<L: Lengthable, V> Default for LenPrefixed<L, V> {
    fn default() -> Self {
        LenPrefixed {
            len: default::Default::default(),
            data: default::Default::default(),
        }
    }
}

// The cached length isn't part of the value.
impl<L: Lengthable, V: PartialEq> PartialEq for LenPrefixed<L, V> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<L: Lengthable, V: fmt::Debug> fmt::Debug for LenPrefixed<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.data.fmt(f)
    }
}

// Optimization
#[derive(Clone)]
pub struct LenPrefixedBytes<L: Lengthable> {
    len: L,
    pub data: Vec<u8>,
}

impl<L: Lengthable> LenPrefixedBytes<L> {
    pub fn new(data: Vec<u8>) -> LenPrefixedBytes<L> {
        LenPrefixedBytes {
            len: Default::default(),
            data,
        }
    }
}

impl<L: Lengthable> Serializable for LenPrefixedBytes<L> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<LenPrefixedBytes<L>, Error> {
        let len_data: L = Serializable::read_from(buf)?;
        let len: usize = len_data.into_len();
        let mut data: Vec<u8> = Vec::with_capacity(len.min(1 << 16));
        buf.take(len as u64).read_to_end(&mut data)?;
        if data.len() != len {
            return Err(Error::Err(format!(
                "byte array of length {} exceeds buffer ({} left)",
                len,
                data.len()
            )));
        }
        Result::Ok(LenPrefixedBytes {
            len: len_data,
            data,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let len_data: L = L::from_len(self.data.len());
        len_data.write_to(buf)?;
        buf.write_all(&self.data[..])?;
        Result::Ok(())
    }
}

impl<L: Lengthable> Default for LenPrefixedBytes<L> {
    fn default() -> Self {
        LenPrefixedBytes {
            len: default::Default::default(),
            data: default::Default::default(),
        }
    }
}

impl<L: Lengthable> PartialEq for LenPrefixedBytes<L> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<L: Lengthable> fmt::Debug for LenPrefixedBytes<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} bytes]", self.data.len())
    }
}

/// Everything left in the packet body, carried through untouched.
#[derive(Clone, Default, PartialEq)]
pub struct RemainingBytes(pub Vec<u8>);

impl Serializable for RemainingBytes {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<RemainingBytes, Error> {
        let mut data = Vec::new();
        buf.read_to_end(&mut data)?;
        Result::Ok(RemainingBytes(data))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        buf.write_all(&self.0)?;
        Result::Ok(())
    }
}

impl fmt::Debug for RemainingBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} bytes]", self.0.len())
    }
}

impl Lengthable for u8 {
    fn into_len(self) -> usize {
        self as usize
    }

    fn from_len(u: usize) -> u8 {
        u as u8
    }
}

impl Lengthable for u16 {
    fn into_len(self) -> usize {
        self as usize
    }

    fn from_len(u: usize) -> u16 {
        u as u16
    }
}

impl Lengthable for u32 {
    fn into_len(self) -> usize {
        self as usize
    }

    fn from_len(u: usize) -> u32 {
        u as u32
    }
}

/// `VarUInt` is an unsigned LEB128 encoded 32 bit integer, between
/// 1 and 5 bytes on the wire.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VarUInt(pub u32);

impl Lengthable for VarUInt {
    fn into_len(self) -> usize {
        self.0 as usize
    }

    fn from_len(u: usize) -> VarUInt {
        VarUInt(u as u32)
    }
}

impl Serializable for VarUInt {
    /// Decodes a `VarUInt` from the Reader
    fn read_from<R: io::Read>(buf: &mut R) -> Result<VarUInt, Error> {
        const PART: u32 = 0x7F;
        let mut size = 0;
        let mut val = 0u32;
        loop {
            if size >= 5 {
                return Result::Err(Error::Err("VarInt too big".to_owned()));
            }
            let b = buf.read_u8()? as u32;
            val |= (b & PART) << (size * 7);
            size += 1;
            if (b & 0x80) == 0 {
                break;
            }
        }

        Result::Ok(VarUInt(val))
    }

    /// Encodes a `VarUInt` into the Writer
    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        const PART: u32 = 0x7F;
        let mut val = self.0;
        loop {
            if (val & !PART) == 0 {
                buf.write_u8(val as u8)?;
                return Result::Ok(());
            }
            buf.write_u8(((val & PART) | 0x80) as u8)?;
            val >>= 7;
        }
    }
}

impl fmt::Debug for VarUInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `VarInt` is a zig-zag encoded signed 32 bit integer carried as a
/// `VarUInt`, so small negative numbers stay small on the wire.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VarInt(pub i32);

impl Serializable for VarInt {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<VarInt, Error> {
        let ux = VarUInt::read_from(buf)?.0;
        let mut x = (ux >> 1) as i32;
        if ux & 1 != 0 {
            x = !x;
        }
        Result::Ok(VarInt(x))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let ux = ((self.0 << 1) ^ (self.0 >> 31)) as u32;
        VarUInt(ux).write_to(buf)
    }
}

impl fmt::Debug for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `VarULong` is the 64 bit version of `VarUInt`, between 1 and 10 bytes
/// when encoded.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VarULong(pub u64);

impl Serializable for VarULong {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<VarULong, Error> {
        const PART: u64 = 0x7F;
        let mut size = 0;
        let mut val = 0u64;
        loop {
            if size >= 10 {
                return Result::Err(Error::Err("VarLong too big".to_owned()));
            }
            let b = buf.read_u8()? as u64;
            val |= (b & PART) << (size * 7);
            size += 1;
            if (b & 0x80) == 0 {
                break;
            }
        }

        Result::Ok(VarULong(val))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        const PART: u64 = 0x7F;
        let mut val = self.0;
        loop {
            if (val & !PART) == 0 {
                buf.write_u8(val as u8)?;
                return Result::Ok(());
            }
            buf.write_u8(((val & PART) | 0x80) as u8)?;
            val >>= 7;
        }
    }
}

impl fmt::Debug for VarULong {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `VarLong` is the zig-zag encoded signed companion of `VarULong`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VarLong(pub i64);

impl Serializable for VarLong {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<VarLong, Error> {
        let ux = VarULong::read_from(buf)?.0;
        let mut x = (ux >> 1) as i64;
        if ux & 1 != 0 {
            x = !x;
        }
        Result::Ok(VarLong(x))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), Error> {
        let ux = ((self.0 << 1) ^ (self.0 >> 63)) as u64;
        VarULong(ux).write_to(buf)
    }
}

impl fmt::Debug for VarLong {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction is used to define whether packets are going to the
/// server or the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the client, read by the gateway on the client side.
    Serverbound,
    /// Sent by the server, written by the gateway to the client.
    Clientbound,
}

/// Return for any protocol related error.
#[derive(Debug)]
pub enum Error {
    Err(String),
    IOError(io::Error),
    Json(serde_json::Error),
    /// A palette announced zero or a negative amount of entries.
    InvalidPaletteCount(i32),
    /// A block state that has no runtime id in the mapping in use.
    UnknownBlockState(String),
    UnknownSubChunkVersion(u8),
    /// A storage pointed back at the previous one, but there was none.
    MissingPreviousStorage,
    UnknownEnumOption {
        what: &'static str,
        value: i64,
    },
    /// Encoding a packet the target protocol has no id for.
    UnassignedPacket {
        protocol: i32,
        id: u32,
    },
    /// Static tables without `minecraft:air` can't back a translator.
    MissingAir,
    UnknownPacket {
        id: u32,
    },
    TrailingBytes {
        id: u32,
        remaining: usize,
    },
}

impl Error {
    /// Whether the error came from malformed input. These only cost the
    /// payload being decoded, everything else is a bug in the tables or the
    /// version chain.
    pub fn is_decode_error(&self) -> bool {
        !matches!(*self, Error::UnassignedPacket { .. } | Error::MissingAir)
    }
}

impl convert::From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::IOError(e)
    }
}

impl convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl ::std::error::Error for Error {}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::Err(ref val) => write!(f, "protocol error: {}", val),
            Error::IOError(ref e) => e.fmt(f),
            Error::Json(ref e) => e.fmt(f),
            Error::InvalidPaletteCount(count) => {
                write!(f, "invalid palette entry count {}", count)
            }
            Error::UnknownBlockState(ref state) => write!(f, "unknown block state {}", state),
            Error::UnknownSubChunkVersion(ver) => write!(f, "unknown sub chunk version {}", ver),
            Error::MissingPreviousStorage => {
                write!(f, "storage refers to a previous storage but none exists")
            }
            Error::UnknownEnumOption { what, value } => {
                write!(f, "unknown {} option {}", what, value)
            }
            Error::UnassignedPacket { protocol, id } => write!(
                f,
                "packet {:#x} has no id assigned in protocol {}",
                id, protocol
            ),
            Error::MissingAir => write!(f, "mapping has no minecraft:air entry"),
            Error::UnknownPacket { id } => write!(f, "unknown packet id {:#x}", id),
            Error::TrailingBytes { id, remaining } => write!(
                f,
                "failed to read all of packet {:#x}, had {} bytes left",
                id, remaining
            ),
        }
    }
}

/// Reads packets of a single protocol version out of already framed and
/// decompressed payloads.
pub struct Reader<'a> {
    protocol: i32,
    pool: &'a Pool<Kind>,
}

impl<'a> Reader<'a> {
    pub fn new(protocol: i32, pool: &'a Pool<Kind>) -> Reader<'a> {
        Reader { protocol, pool }
    }

    pub fn protocol(&self) -> i32 {
        self.protocol
    }

    pub fn read_packet(&self, data: &[u8]) -> Result<Packet, Error> {
        let mut buf = io::Cursor::new(data);
        let header = VarUInt::read_from(&mut buf)?.0;
        let id = header & PACKET_ID_MASK;
        let kind = self.pool.get(id).ok_or(Error::UnknownPacket { id })?;
        let packet = kind.read(&mut buf)?;

        let pos = buf.position() as usize;
        if pos != data.len() {
            return Err(Error::TrailingBytes {
                id,
                remaining: data.len() - pos,
            });
        }
        Result::Ok(packet)
    }
}

/// Writes packets of a single protocol version. Packets whose shape has no
/// id in the version's pool are refused: that means a version node let a
/// newer packet through and is a bug, not bad input.
pub struct Writer<'a> {
    protocol: i32,
    pool: &'a Pool<Kind>,
}

impl<'a> Writer<'a> {
    pub fn new(protocol: i32, pool: &'a Pool<Kind>) -> Writer<'a> {
        Writer { protocol, pool }
    }

    pub fn protocol(&self) -> i32 {
        self.protocol
    }

    pub fn write_packet(&self, packet: &Packet) -> Result<Vec<u8>, Error> {
        let id = packet.id();
        if self.pool.get(id) != Some(packet.kind()) {
            error!(
                "Protocol {} has no id for {} ({:#x})",
                self.protocol,
                packet.kind().name(),
                id
            );
            return Err(Error::UnassignedPacket {
                protocol: self.protocol,
                id,
            });
        }
        let mut buf = Vec::new();
        VarUInt(id).write_to(&mut buf)?;
        packet.write_to(&mut buf)?;
        Result::Ok(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode<T: Serializable>(val: &T) -> Vec<u8> {
        let mut buf = Vec::new();
        val.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_varint_zigzag() {
        assert_eq!(encode(&VarInt(0)), vec![0]);
        assert_eq!(encode(&VarInt(-1)), vec![1]);
        assert_eq!(encode(&VarInt(1)), vec![2]);
        assert_eq!(encode(&VarInt(-64)), vec![0x7f]);
        assert_eq!(encode(&VarInt(64)), vec![0x80, 0x01]);

        for v in &[i32::MIN, -300, -1, 0, 1, 300, i32::MAX] {
            let data = encode(&VarInt(*v));
            let back = VarInt::read_from(&mut io::Cursor::new(&data)).unwrap();
            assert_eq!(back.0, *v);
        }
    }

    #[test]
    fn test_varuint_too_big() {
        let data = [0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert!(VarUInt::read_from(&mut io::Cursor::new(&data[..])).is_err());
    }

    #[test]
    fn test_overlong_continuations() {
        let data = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(VarUInt::read_from(&mut io::Cursor::new(&data[..])).is_err());
        assert!(VarInt::read_from(&mut io::Cursor::new(&data[..])).is_err());
        let data = [0x80; 11];
        assert!(VarULong::read_from(&mut io::Cursor::new(&data[..])).is_err());
        assert!(VarLong::read_from(&mut io::Cursor::new(&data[..])).is_err());

        // The longest legal encodings still read.
        let data = [0xff, 0xff, 0xff, 0xff, 0x0f];
        assert_eq!(VarUInt::read_from(&mut io::Cursor::new(&data[..])).unwrap().0, u32::MAX);
    }

    #[test]
    fn test_overlong_packet_header() {
        let pool = Pool::new();
        let reader = Reader::new(748, &pool);
        match reader.read_packet(&[0x81, 0x80, 0x80, 0x80, 0x80, 0x01]) {
            Err(Error::Err(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_varlong_extremes() {
        for v in &[i64::MIN, -1, 0, i64::MAX] {
            let data = encode(&VarLong(*v));
            assert!(data.len() <= 10);
            let back = VarLong::read_from(&mut io::Cursor::new(&data)).unwrap();
            assert_eq!(back.0, *v);
        }
    }

    #[test]
    fn test_string_short_buffer() {
        let data = [5, b'a', b'b'];
        assert!(String::read_from(&mut io::Cursor::new(&data[..])).is_err());
    }

    #[test]
    fn test_option_flag() {
        assert_eq!(encode(&Some(7u8)), vec![1, 7]);
        assert_eq!(encode(&None::<u8>), vec![0]);
    }

    #[test]
    fn test_decode_error_kinds() {
        assert!(Error::InvalidPaletteCount(0).is_decode_error());
        assert!(Error::UnknownSubChunkVersion(3).is_decode_error());
        assert!(!Error::MissingAir.is_decode_error());
        assert!(!Error::UnassignedPacket {
            protocol: 712,
            id: 0x13e
        }
        .is_decode_error());
    }
}
