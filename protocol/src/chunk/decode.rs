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

use super::encode::{SerialisedData, SENTINEL_SIZE};
use super::encoding::{
    BiomePaletteEncoding, DiskEncoding, Encoding, NetworkEncoding, PaletteEncoding, Reader,
};
use super::{Chunk, PaletteSize, PalettedStorage, SubChunk};
use crate::protocol;
use crate::shared::Range;

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

/// Decodes `count` sub-chunks and the biomes of a level chunk payload.
/// Palettes flagged as persistent are resolved through `persistent`. The
/// reader is left after the biomes, at the border blocks.
pub fn network_decode(
    air: u32,
    buf: &mut Reader,
    count: usize,
    old_format: bool,
    range: Range,
    persistent: &dyn Encoding,
) -> Result<Chunk, protocol::Error> {
    let mut c = Chunk::new(air, range);
    if count > c.sub().len() {
        return Err(protocol::Error::Err(format!(
            "{} sub-chunks don't fit range {:?}",
            count, range
        )));
    }
    for i in 0..count {
        let mut index = i as u8;
        let sub = decode_sub_chunk(
            buf,
            air,
            range,
            &mut index,
            &NetworkEncoding,
            Some(persistent),
            &NetworkEncoding,
        )?;
        let slot = c
            .sub_mut()
            .get_mut(index as usize)
            .ok_or_else(|| protocol::Error::Err(format!("sub-chunk index {} out of range", index)))?;
        *slot = sub;
    }
    if old_format {
        let mut biomes = [0u8; 256];
        buf.read_exact(&mut biomes)?;
        for x in 0..16u8 {
            for z in 0..16u8 {
                let b = biomes[(x as usize) | ((z as usize) << 4)] as u32;
                if b == 0 {
                    continue;
                }
                for y in range.min..=range.max {
                    c.set_biome(x, y as i16, z, b);
                }
            }
        }
        return Ok(c);
    }

    let mut biomes: Vec<PalettedStorage> = Vec::with_capacity(c.biomes().len());
    for _ in 0..c.biomes().len() {
        let b = match decode_paletted_storage(buf, &NetworkEncoding, None, &BiomePaletteEncoding)? {
            Some(b) => b,
            None => biomes
                .last()
                .cloned()
                .ok_or(protocol::Error::MissingPreviousStorage)?,
        };
        biomes.push(b);
    }
    c.biomes_mut().clone_from_slice(&biomes);
    Ok(c)
}

/// Decodes a single sub-chunk. For version 9 the index stored in the data
/// replaces `index`.
pub fn decode_sub_chunk(
    buf: &mut Reader,
    air: u32,
    range: Range,
    index: &mut u8,
    e: &dyn Encoding,
    alternative: Option<&dyn Encoding>,
    pe: &dyn PaletteEncoding,
) -> Result<SubChunk, protocol::Error> {
    let ver = buf.read_u8()?;
    let layers = match ver {
        1 => 1,
        8 => buf.read_u8()?,
        9 => {
            let layers = buf.read_u8()?;
            let stored = buf.read_u8()? as i8;
            *index = (stored as i32 - (range.min >> 4)) as u8;
            layers
        }
        _ => return Err(protocol::Error::UnknownSubChunkVersion(ver)),
    };
    let mut storages: Vec<PalettedStorage> = Vec::with_capacity(layers as usize);
    for _ in 0..layers {
        let s = match decode_paletted_storage(buf, e, alternative, pe)? {
            Some(s) => s,
            None => storages
                .last()
                .cloned()
                .ok_or(protocol::Error::MissingPreviousStorage)?,
        };
        storages.push(s);
    }
    if storages.is_empty() {
        storages.push(PalettedStorage::uniform(air));
    }
    Ok(SubChunk::with_layers(air, storages))
}

/// Decodes a chunk stored with `disk_encode`.
pub fn disk_decode(
    data: &SerialisedData,
    air: u32,
    range: Range,
    blocks: &dyn PaletteEncoding,
) -> Result<Chunk, protocol::Error> {
    let mut c = Chunk::new(air, range);
    for (i, sub) in data.sub_chunks.iter().enumerate() {
        if sub.is_empty() {
            continue;
        }
        let mut index = i as u8;
        let mut buf = io::Cursor::new(&sub[..]);
        let s = decode_sub_chunk(&mut buf, air, range, &mut index, &DiskEncoding, None, blocks)?;
        let slot = c
            .sub_mut()
            .get_mut(index as usize)
            .ok_or_else(|| protocol::Error::Err(format!("sub-chunk index {} out of range", index)))?;
        *slot = s;
    }
    if data.biomes.is_empty() {
        return Ok(c);
    }
    let mut buf = io::Cursor::new(&data.biomes[..]);
    let mut biomes: Vec<PalettedStorage> = Vec::with_capacity(c.biomes().len());
    for _ in 0..c.biomes().len() {
        let b = match decode_paletted_storage(&mut buf, &DiskEncoding, None, &BiomePaletteEncoding)? {
            Some(b) => b,
            None => biomes
                .last()
                .cloned()
                .ok_or(protocol::Error::MissingPreviousStorage)?,
        };
        biomes.push(b);
    }
    c.biomes_mut().clone_from_slice(&biomes);
    Ok(c)
}

/// Reads one storage. `None` means the header pointed back at the storage
/// decoded before it. The header flag picks between `e` and `alternative`
/// when their flags differ.
pub fn decode_paletted_storage(
    buf: &mut Reader,
    e: &dyn Encoding,
    alternative: Option<&dyn Encoding>,
    pe: &dyn PaletteEncoding,
) -> Result<Option<PalettedStorage>, protocol::Error> {
    let header = buf.read_u8()?;
    let bits = header >> 1;
    if bits == SENTINEL_SIZE {
        return Ok(None);
    }
    let size = PaletteSize::from_bits(bits)?;

    let mut words = Vec::with_capacity(size.words());
    for _ in 0..size.words() {
        words.push(buf.read_u32::<LittleEndian>()?);
    }

    let flag = header & 1;
    let e = match alternative {
        Some(alt) if flag != e.network() && flag == alt.network() => alt,
        _ => e,
    };
    let palette = e.decode_palette(buf, size, pe)?;
    PalettedStorage::from_raw(words, palette).map(Some)
}
