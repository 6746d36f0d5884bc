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

//! Paletted chunk storage and its binary encodings.
//!
//! A chunk is a column of 16x16x16 sub-chunks, each made of one or more
//! layers of `PalettedStorage`, plus one biome storage per sub-chunk. The
//! same storage layout is used for blocks (values are block runtime ids)
//! and biomes (values are biome ids).

mod palette;
pub use self::palette::*;

mod storage;
pub use self::storage::*;

mod sub_chunk;
pub use self::sub_chunk::*;

pub mod decode;
pub mod encode;
pub mod encoding;
pub mod pool;

use crate::shared::Range;

/// A vertical column of sub-chunks and their biomes.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    air: u32,
    range: Range,
    sub: Vec<SubChunk>,
    biomes: Vec<PalettedStorage>,
}

impl Chunk {
    /// An empty chunk: air everywhere and biome 0.
    pub fn new(air: u32, range: Range) -> Chunk {
        let n = range.sub_chunks();
        Chunk {
            air,
            range,
            sub: (0..n).map(|_| SubChunk::new(air)).collect(),
            biomes: (0..n).map(|_| PalettedStorage::uniform(0)).collect(),
        }
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn sub(&self) -> &[SubChunk] {
        &self.sub
    }

    pub fn sub_mut(&mut self) -> &mut [SubChunk] {
        &mut self.sub
    }

    pub fn biomes(&self) -> &[PalettedStorage] {
        &self.biomes
    }

    pub fn biomes_mut(&mut self) -> &mut [PalettedStorage] {
        &mut self.biomes
    }

    /// Swaps the sub-chunks and biomes for a new range. Both must cover the
    /// range exactly.
    pub fn replace_range(
        &mut self,
        range: Range,
        sub: Vec<SubChunk>,
        biomes: Vec<PalettedStorage>,
    ) {
        debug_assert_eq!(sub.len(), range.sub_chunks());
        debug_assert_eq!(biomes.len(), range.sub_chunks());
        self.range = range;
        self.sub = sub;
        self.biomes = biomes;
    }

    /// The index of the sub-chunk holding height `y`.
    pub fn sub_index(&self, y: i16) -> usize {
        ((y as i32 - self.range.min) >> 4) as usize
    }

    /// The lowest height of the sub-chunk at `index`.
    pub fn sub_y(&self, index: usize) -> i16 {
        ((index as i32) << 4) as i16 + self.range.min as i16
    }

    pub fn block(&self, x: u8, y: i16, z: u8, layer: usize) -> u32 {
        if !self.range.contains(y as i32) {
            return self.air;
        }
        self.sub[self.sub_index(y)].block(x, (y & 15) as u8, z, layer)
    }

    pub fn set_block(&mut self, x: u8, y: i16, z: u8, layer: usize, block: u32) {
        if !self.range.contains(y as i32) {
            return;
        }
        let index = self.sub_index(y);
        self.sub[index].set_block(x, (y & 15) as u8, z, layer, block);
    }

    pub fn biome(&self, x: u8, y: i16, z: u8) -> u32 {
        if !self.range.contains(y as i32) {
            return 0;
        }
        self.biomes[self.sub_index(y)].at(x, (y & 15) as u8, z)
    }

    pub fn set_biome(&mut self, x: u8, y: i16, z: u8, biome: u32) {
        if !self.range.contains(y as i32) {
            return;
        }
        let index = self.sub_index(y);
        self.biomes[index].set(x, (y & 15) as u8, z, biome);
    }

    /// The height of the highest non-air block in layer 0 of the column, or
    /// the bottom of the range when the column is empty.
    pub fn highest_block(&self, x: u8, z: u8) -> i16 {
        for (index, sub) in self.sub.iter().enumerate().rev() {
            if sub.is_empty() {
                continue;
            }
            for y in (0..16u8).rev() {
                if sub.block(x, y, z, 0) != self.air {
                    return self.sub_y(index) + y as i16;
                }
            }
        }
        self.range.min as i16
    }

    pub fn compact(&mut self) {
        for sub in &mut self.sub {
            sub.compact();
        }
        for b in &mut self.biomes {
            b.compact();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accessors() {
        let mut c = Chunk::new(0, Range::new(-64, 319));
        assert_eq!(c.sub().len(), 24);
        assert_eq!(c.sub_index(-64), 0);
        assert_eq!(c.sub_index(-1), 3);
        assert_eq!(c.sub_index(0), 4);
        assert_eq!(c.sub_y(4), 0);

        c.set_block(3, -50, 4, 0, 9);
        assert_eq!(c.block(3, -50, 4, 0), 9);
        assert_eq!(c.block(3, 400, 4, 0), 0);
        assert_eq!(c.highest_block(3, 4), -50);
        assert_eq!(c.highest_block(0, 0), -64);

        c.set_biome(1, 100, 1, 7);
        assert_eq!(c.biome(1, 100, 1), 7);
        assert_eq!(c.biome(1, 0, 1), 0);
    }
}
