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

use super::palette::{Palette, PaletteSize};
use crate::protocol;
use crate::types::bit;

/// Values in a 16x16x16 volume.
pub const STORAGE_SIZE: usize = 4096;

/// A 16x16x16 volume of palette indices plus the palette they index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PalettedStorage {
    indices: bit::Map,
    palette: Palette,
}

impl PalettedStorage {
    /// A storage filled with the first value of the palette.
    pub fn new(palette: Palette) -> PalettedStorage {
        PalettedStorage {
            indices: bit::Map::new(STORAGE_SIZE, palette.size().bits() as usize),
            palette,
        }
    }

    /// A storage holding a single value everywhere.
    pub fn uniform(v: u32) -> PalettedStorage {
        PalettedStorage::new(Palette::new(PaletteSize::ZERO, vec![v]))
    }

    /// Wraps packed words read off the wire.
    pub fn from_raw(words: Vec<u32>, palette: Palette) -> Result<PalettedStorage, protocol::Error> {
        let size = palette.size().bits() as usize;
        let indices = bit::Map::from_raw(words, size, STORAGE_SIZE)
            .ok_or_else(|| protocol::Error::Err("too few index words for storage".to_owned()))?;
        let storage = PalettedStorage { indices, palette };
        // Indices past the palette would resolve to nothing.
        if size != 0 {
            let len = storage.palette.len();
            if (0..STORAGE_SIZE).any(|i| storage.indices.get(i) >= len) {
                return Err(protocol::Error::Err(
                    "storage index out of palette bounds".to_owned(),
                ));
            }
        }
        Ok(storage)
    }

    pub fn bits_per_index(&self) -> u8 {
        self.palette.size().bits()
    }

    /// The packed index words in wire order.
    pub fn words(&self) -> &[u32] {
        self.indices.raw()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn at(&self, x: u8, y: u8, z: u8) -> u32 {
        let i = self.indices.get(index(x, y, z));
        self.palette.value(i).unwrap_or(0)
    }

    /// Sets the value at the position, replacing the index storage with a
    /// wider one when the palette outgrows the current width.
    pub fn set(&mut self, x: u8, y: u8, z: u8, v: u32) {
        let (i, resize) = self.palette.add(v);
        if resize {
            self.indices = self
                .indices
                .resize(self.palette.size().bits() as usize);
        }
        self.indices.set(index(x, y, z), i);
    }

    /// Drops palette values no index refers to any more and shrinks the
    /// width to the smallest that fits.
    pub fn compact(&mut self) {
        let mut used = vec![false; self.palette.len()];
        for i in 0..STORAGE_SIZE {
            used[self.indices.get(i)] = true;
        }
        if used.iter().all(|u| *u) && PaletteSize::for_len(self.palette.len()) == self.palette.size() {
            return;
        }
        let mut remap = vec![0usize; used.len()];
        let mut values = Vec::with_capacity(used.len());
        for (old, u) in used.iter().enumerate() {
            if *u {
                remap[old] = values.len();
                values.push(self.palette.values()[old]);
            }
        }
        let size = PaletteSize::for_len(values.len());
        let mut indices = bit::Map::new(STORAGE_SIZE, size.bits() as usize);
        for i in 0..STORAGE_SIZE {
            indices.set(i, remap[self.indices.get(i)]);
        }
        self.indices = indices;
        self.palette = Palette::new(size, values);
    }
}

/// Positions are laid out x major, then z, then y.
fn index(x: u8, y: u8, z: u8) -> usize {
    ((x as usize & 15) << 8) | ((z as usize & 15) << 4) | (y as usize & 15)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_resizes() {
        let mut s = PalettedStorage::uniform(0);
        assert_eq!(s.bits_per_index(), 0);
        assert!(s.words().is_empty());
        s.set(1, 2, 3, 7);
        assert_eq!(s.bits_per_index(), 1);
        assert_eq!(s.words().len(), 128);
        for v in 1..5 {
            s.set(v, 0, 0, 100 + v as u32);
        }
        assert_eq!(s.bits_per_index(), 3);
        assert_eq!(s.at(1, 2, 3), 7);
        assert_eq!(s.at(4, 0, 0), 104);
        assert_eq!(s.at(15, 15, 15), 0);
    }

    #[test]
    fn test_compact() {
        let mut s = PalettedStorage::uniform(0);
        s.set(0, 0, 0, 1);
        s.set(0, 0, 1, 2);
        s.set(0, 0, 0, 0);
        s.set(0, 0, 1, 0);
        s.compact();
        assert_eq!(s.palette().values(), &[0]);
        assert_eq!(s.bits_per_index(), 0);
        assert_eq!(s, PalettedStorage::uniform(0));
    }

    #[test]
    fn test_out_of_bounds_indices() {
        let mut words = vec![0u32; 128];
        words[0] = 0b10;
        let palette = Palette::new(PaletteSize::from_bits(1).unwrap(), vec![4]);
        assert!(PalettedStorage::from_raw(words, palette).is_err());
    }
}
