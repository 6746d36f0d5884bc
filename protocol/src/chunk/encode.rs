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

use super::encoding::{
    BiomePaletteEncoding, DiskEncoding, Encoding, NetworkEncoding, PaletteEncoding,
    SubChunkVersion,
};
use super::pool;
use super::{Chunk, PalettedStorage, SubChunk};
use crate::protocol;
use crate::shared::Range;

use byteorder::{LittleEndian, WriteBytesExt};

/// Storage header size value meaning "same as the previous storage".
pub const SENTINEL_SIZE: u8 = 0x7f;

/// A chunk in its on-disk form: one record per sub-chunk plus the biomes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerialisedData {
    pub sub_chunks: Vec<Vec<u8>>,
    pub biomes: Vec<u8>,
}

/// Encodes a chunk the way the level chunk packet carries it: every
/// sub-chunk with runtime id palettes followed by the biomes. Sub-chunks
/// are in order, so they use version 8 which has no index byte. Clients on
/// the old format get a flat biome map.
pub fn network_encode(c: &Chunk, old_format: bool) -> Result<Vec<u8>, protocol::Error> {
    let mut buf = pool::get();
    for (i, sub) in c.sub().iter().enumerate() {
        write_sub_chunk(
            &mut buf,
            sub,
            &NetworkEncoding,
            &NetworkEncoding,
            SubChunkVersion::V8,
            c.range(),
            i,
        )?;
    }
    if old_format {
        let mut biomes = [0u8; 256];
        for x in 0..16u8 {
            for z in 0..16u8 {
                let y = c.highest_block(x, z);
                biomes[(x as usize) | ((z as usize) << 4)] = c.biome(x, y, z) as u8;
            }
        }
        buf.extend_from_slice(&biomes);
    } else {
        write_biomes(&mut buf, c, &NetworkEncoding, &BiomePaletteEncoding)?;
    }
    Ok(buf.to_vec())
}

/// Encodes a single sub-chunk, as carried by sub-chunk packets and blobs.
pub fn encode_sub_chunk(
    sub: &SubChunk,
    e: &dyn Encoding,
    pe: &dyn PaletteEncoding,
    ver: SubChunkVersion,
    range: Range,
    index: usize,
) -> Result<Vec<u8>, protocol::Error> {
    let mut buf = pool::get();
    write_sub_chunk(&mut buf, sub, e, pe, ver, range, index)?;
    Ok(buf.to_vec())
}

/// Encodes the biome storages of a chunk.
pub fn encode_biomes(
    c: &Chunk,
    e: &dyn Encoding,
    pe: &dyn PaletteEncoding,
) -> Result<Vec<u8>, protocol::Error> {
    let mut buf = pool::get();
    write_biomes(&mut buf, c, e, pe)?;
    Ok(buf.to_vec())
}

/// Encodes a chunk for storage, block palettes through `blocks`.
pub fn disk_encode(c: &Chunk, blocks: &dyn PaletteEncoding) -> Result<SerialisedData, protocol::Error> {
    let mut d = SerialisedData {
        sub_chunks: Vec::with_capacity(c.sub().len()),
        biomes: Vec::new(),
    };
    for (i, sub) in c.sub().iter().enumerate() {
        d.sub_chunks.push(encode_sub_chunk(
            sub,
            &DiskEncoding,
            blocks,
            SubChunkVersion::V9,
            c.range(),
            i,
        )?);
    }
    d.biomes = encode_biomes(c, &DiskEncoding, &BiomePaletteEncoding)?;
    Ok(d)
}

fn write_sub_chunk(
    buf: &mut Vec<u8>,
    sub: &SubChunk,
    e: &dyn Encoding,
    pe: &dyn PaletteEncoding,
    ver: SubChunkVersion,
    range: Range,
    index: usize,
) -> Result<(), protocol::Error> {
    let layers = sub.layers();
    ver.encode_header(buf, layers.len(), range, index);
    let mut previous = None;
    for layer in layers {
        encode_paletted_storage(buf, layer, previous, e, pe)?;
        previous = Some(layer);
    }
    Ok(())
}

fn write_biomes(
    buf: &mut Vec<u8>,
    c: &Chunk,
    e: &dyn Encoding,
    pe: &dyn PaletteEncoding,
) -> Result<(), protocol::Error> {
    let mut previous = None;
    for b in c.biomes() {
        encode_paletted_storage(buf, b, previous, e, pe)?;
        previous = Some(b);
    }
    Ok(())
}

/// Writes a storage, or just the sentinel header when it is equal to the
/// storage written right before it.
pub fn encode_paletted_storage(
    buf: &mut Vec<u8>,
    s: &PalettedStorage,
    previous: Option<&PalettedStorage>,
    e: &dyn Encoding,
    pe: &dyn PaletteEncoding,
) -> Result<(), protocol::Error> {
    if previous == Some(s) {
        buf.push((SENTINEL_SIZE << 1) | e.network());
        return Ok(());
    }
    buf.push((s.bits_per_index() << 1) | e.network());
    for w in s.words() {
        buf.write_u32::<LittleEndian>(*w)?;
    }
    e.encode_palette(buf, s.palette(), pe)
}
