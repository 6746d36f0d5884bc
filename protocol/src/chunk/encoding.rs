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

//! The ways palettes and their entries are written.
//!
//! An `Encoding` decides how a palette as a whole is framed and which flag
//! the storage header carries, a `PaletteEncoding` decides how a single
//! value is written.

use super::palette::{Palette, PaletteSize};
use crate::mapping::{BlockMapping, BlockState};
use crate::nbt;
use crate::protocol::{self, Serializable, VarInt};
use crate::shared::Range;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io;
use std::sync::Arc;

pub type Reader<'a> = io::Cursor<&'a [u8]>;

const NAME_PREFIX: &str = "minecraft:";

pub trait Encoding {
    fn encode_palette(
        &self,
        buf: &mut Vec<u8>,
        p: &Palette,
        e: &dyn PaletteEncoding,
    ) -> Result<(), protocol::Error>;

    fn decode_palette(
        &self,
        buf: &mut Reader,
        size: PaletteSize,
        e: &dyn PaletteEncoding,
    ) -> Result<Palette, protocol::Error>;

    /// The low bit of the storage header for palettes in this encoding.
    fn network(&self) -> u8;
}

pub trait PaletteEncoding {
    fn encode(&self, buf: &mut Vec<u8>, v: u32) -> Result<(), protocol::Error>;
    fn decode(&self, buf: &mut Reader) -> Result<u32, protocol::Error>;
}

/// Runtime id palettes as sent to clients: a varint count, left out for
/// single value palettes, followed by each value as a varint. Values are
/// written as they are, so the palette encoding is never consulted.
pub struct NetworkEncoding;

impl Encoding for NetworkEncoding {
    fn encode_palette(
        &self,
        buf: &mut Vec<u8>,
        p: &Palette,
        _: &dyn PaletteEncoding,
    ) -> Result<(), protocol::Error> {
        if p.size() != PaletteSize::ZERO {
            VarInt(p.len() as i32).write_to(buf)?;
        }
        for v in p.values() {
            VarInt(*v as i32).write_to(buf)?;
        }
        Ok(())
    }

    fn decode_palette(
        &self,
        buf: &mut Reader,
        size: PaletteSize,
        _: &dyn PaletteEncoding,
    ) -> Result<Palette, protocol::Error> {
        let count = read_count(buf, size, |buf| Ok(VarInt::read_from(buf)?.0))?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(VarInt::read_from(buf)?.0 as u32);
        }
        Ok(Palette::new(size, values))
    }

    fn network(&self) -> u8 {
        1
    }
}

/// Runtime ids used directly as palette entries.
impl PaletteEncoding for NetworkEncoding {
    fn encode(&self, buf: &mut Vec<u8>, v: u32) -> Result<(), protocol::Error> {
        VarInt(v as i32).write_to(buf)
    }

    fn decode(&self, buf: &mut Reader) -> Result<u32, protocol::Error> {
        Ok(VarInt::read_from(buf)?.0 as u32)
    }
}

/// Palettes of block states rather than runtime ids, sent by servers that
/// want the client to resolve states itself. Names go out without the
/// `minecraft:` prefix, and every state is stamped with the mapping's
/// version.
pub struct NetworkPersistentEncoding {
    mapping: Arc<BlockMapping>,
}

impl NetworkPersistentEncoding {
    pub fn new(mapping: Arc<BlockMapping>) -> NetworkPersistentEncoding {
        NetworkPersistentEncoding { mapping }
    }
}

impl Encoding for NetworkPersistentEncoding {
    fn encode_palette(
        &self,
        buf: &mut Vec<u8>,
        p: &Palette,
        _: &dyn PaletteEncoding,
    ) -> Result<(), protocol::Error> {
        if p.size() != PaletteSize::ZERO {
            VarInt(p.len() as i32).write_to(buf)?;
        }
        for v in p.values() {
            let state = self
                .mapping
                .runtime_id_to_state(*v)
                .ok_or_else(|| protocol::Error::UnknownBlockState(format!("runtime id {}", v)))?;
            let mut c = nbt::Compound::new();
            let name = state.name.strip_prefix(NAME_PREFIX).unwrap_or(&state.name);
            c.put("name", nbt::Tag::String(name.to_owned()));
            c.put("states", nbt::Tag::Compound(state.properties));
            c.put("version", nbt::Tag::Int(self.mapping.version()));
            nbt::write_compound(buf, nbt::Encoding::NetworkLittleEndian, &c)?;
        }
        Ok(())
    }

    fn decode_palette(
        &self,
        buf: &mut Reader,
        size: PaletteSize,
        _: &dyn PaletteEncoding,
    ) -> Result<Palette, protocol::Error> {
        let count = read_count(buf, size, |buf| Ok(VarInt::read_from(buf)?.0))?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let c = nbt::read_compound(buf, nbt::Encoding::NetworkLittleEndian)?;
            let mut state = BlockState::from_compound(&c)?;
            if !state.name.starts_with(NAME_PREFIX) {
                state.name = format!("{}{}", NAME_PREFIX, state.name);
            }
            state.version = self.mapping.version();
            let id = self
                .mapping
                .state_to_runtime_id(&state)
                .ok_or_else(|| protocol::Error::UnknownBlockState(state.to_string()))?;
            values.push(id);
        }
        Ok(Palette::new(size, values))
    }

    fn network(&self) -> u8 {
        0
    }
}

/// The layout used in world saves: a fixed width count, left out for
/// single value palettes, followed by each value in the palette encoding.
pub struct DiskEncoding;

impl Encoding for DiskEncoding {
    fn encode_palette(
        &self,
        buf: &mut Vec<u8>,
        p: &Palette,
        e: &dyn PaletteEncoding,
    ) -> Result<(), protocol::Error> {
        if p.size() != PaletteSize::ZERO {
            buf.write_u32::<LittleEndian>(p.len() as u32)?;
        }
        for v in p.values() {
            e.encode(buf, *v)?;
        }
        Ok(())
    }

    fn decode_palette(
        &self,
        buf: &mut Reader,
        size: PaletteSize,
        e: &dyn PaletteEncoding,
    ) -> Result<Palette, protocol::Error> {
        let count = read_count(buf, size, |buf| Ok(buf.read_u32::<LittleEndian>()? as i32))?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(e.decode(buf)?);
        }
        Ok(Palette::new(size, values))
    }

    fn network(&self) -> u8 {
        0
    }
}

/// Biome ids as fixed width little endian values.
pub struct BiomePaletteEncoding;

impl PaletteEncoding for BiomePaletteEncoding {
    fn encode(&self, buf: &mut Vec<u8>, v: u32) -> Result<(), protocol::Error> {
        buf.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    fn decode(&self, buf: &mut Reader) -> Result<u32, protocol::Error> {
        Ok(buf.read_u32::<LittleEndian>()?)
    }
}

/// Block runtime ids written as the little endian block state compound
/// they stand for.
pub struct BlockPaletteEncoding {
    mapping: Arc<BlockMapping>,
}

impl BlockPaletteEncoding {
    pub fn new(mapping: Arc<BlockMapping>) -> BlockPaletteEncoding {
        BlockPaletteEncoding { mapping }
    }
}

impl PaletteEncoding for BlockPaletteEncoding {
    fn encode(&self, buf: &mut Vec<u8>, v: u32) -> Result<(), protocol::Error> {
        let state = self
            .mapping
            .runtime_id_to_state(v)
            .ok_or_else(|| protocol::Error::UnknownBlockState(format!("runtime id {}", v)))?;
        nbt::write_compound(buf, nbt::Encoding::LittleEndian, &state.to_compound())
    }

    fn decode(&self, buf: &mut Reader) -> Result<u32, protocol::Error> {
        let c = nbt::read_compound(buf, nbt::Encoding::LittleEndian)?;
        let state = BlockState::from_compound(&c)?;
        self.mapping
            .state_to_runtime_id(&state)
            .ok_or_else(|| protocol::Error::UnknownBlockState(state.to_string()))
    }
}

/// Single value palettes carry no count, anything else must announce at
/// least one entry.
fn read_count<F>(buf: &mut Reader, size: PaletteSize, read: F) -> Result<usize, protocol::Error>
where
    F: FnOnce(&mut Reader) -> Result<i32, protocol::Error>,
{
    if size == PaletteSize::ZERO {
        return Ok(1);
    }
    let count = read(buf)?;
    if count <= 0 {
        return Err(protocol::Error::InvalidPaletteCount(count));
    }
    Ok(count as usize)
}

/// Sub-chunk layouts. Version 8 is a layer count followed by the layers,
/// version 9 adds the sub-chunk's vertical index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubChunkVersion {
    V8,
    V9,
}

impl SubChunkVersion {
    pub(crate) fn encode_header(
        self,
        buf: &mut Vec<u8>,
        layers: usize,
        range: Range,
        index: usize,
    ) {
        match self {
            SubChunkVersion::V8 => buf.extend_from_slice(&[8, layers as u8]),
            SubChunkVersion::V9 => buf.extend_from_slice(&[
                9,
                layers as u8,
                (index as i32 + (range.min >> 4)) as u8,
            ]),
        }
    }
}
