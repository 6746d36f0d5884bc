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

use crate::protocol;

/// The bits used per index of a paletted storage. Only a fixed set of
/// widths exist on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaletteSize(u8);

impl PaletteSize {
    pub const SIZES: [u8; 9] = [0, 1, 2, 3, 4, 5, 6, 8, 16];

    pub const ZERO: PaletteSize = PaletteSize(0);

    /// Validates a width read from a storage header.
    pub fn from_bits(bits: u8) -> Result<PaletteSize, protocol::Error> {
        if PaletteSize::SIZES.contains(&bits) {
            Ok(PaletteSize(bits))
        } else {
            Err(protocol::Error::Err(format!(
                "invalid bits per index {}",
                bits
            )))
        }
    }

    /// The smallest width able to index `len` palette entries.
    pub fn for_len(len: usize) -> PaletteSize {
        for size in PaletteSize::SIZES.iter() {
            if (1usize << size) >= len {
                return PaletteSize(*size);
            }
        }
        PaletteSize(16)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Words of packed indices a storage of this size carries.
    pub fn words(self) -> usize {
        crate::types::bit::Map::words_for(4096, self.0 as usize)
    }

    fn next(self) -> PaletteSize {
        for size in PaletteSize::SIZES.iter() {
            if *size > self.0 {
                return PaletteSize(*size);
            }
        }
        self
    }
}

/// A deduplicated list of values referenced by the indices of a
/// `PalettedStorage`. Insertion order is the order written to the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    size: PaletteSize,
    values: Vec<u32>,
}

impl Palette {
    pub fn new(size: PaletteSize, values: Vec<u32>) -> Palette {
        Palette { size, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn size(&self) -> PaletteSize {
        self.size
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Returns the position of `v`, inserting it when missing. The second
    /// value reports whether the palette had to grow its size to fit.
    pub fn add(&mut self, v: u32) -> (usize, bool) {
        if let Some(i) = self.index(v) {
            return (i, false);
        }
        self.values.push(v);
        let index = self.values.len() - 1;
        if (1usize << self.size.0) < self.values.len() {
            self.size = self.size.next();
            return (index, true);
        }
        (index, false)
    }

    pub fn index(&self, v: u32) -> Option<usize> {
        self.values.iter().position(|&val| val == v)
    }

    pub fn value(&self, i: usize) -> Option<u32> {
        self.values.get(i).copied()
    }

    /// Rewrites every value, keeping positions. Two values may end up equal,
    /// which is allowed: the storage still indexes the right one.
    pub fn replace<F: FnMut(u32) -> u32>(&mut self, mut f: F) {
        for v in &mut self.values {
            *v = f(*v);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_smallest_width() {
        assert_eq!(PaletteSize::for_len(1).bits(), 0);
        assert_eq!(PaletteSize::for_len(2).bits(), 1);
        assert_eq!(PaletteSize::for_len(3).bits(), 2);
        assert_eq!(PaletteSize::for_len(5).bits(), 3);
        assert_eq!(PaletteSize::for_len(33).bits(), 6);
        assert_eq!(PaletteSize::for_len(65).bits(), 8);
        assert_eq!(PaletteSize::for_len(257).bits(), 16);
        assert_eq!(PaletteSize::for_len(4096).bits(), 16);
    }

    #[test]
    fn test_invalid_width() {
        assert!(PaletteSize::from_bits(7).is_err());
        assert!(PaletteSize::from_bits(16).is_ok());
    }

    #[test]
    fn test_add_grows() {
        let mut p = Palette::new(PaletteSize::ZERO, vec![0]);
        assert_eq!(p.add(0), (0, false));
        assert_eq!(p.add(9), (1, true));
        assert_eq!(p.size().bits(), 1);
        assert_eq!(p.add(10), (2, true));
        assert_eq!(p.size().bits(), 2);
        assert_eq!(p.add(11), (3, false));
    }
}
