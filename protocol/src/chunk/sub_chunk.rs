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

use super::storage::PalettedStorage;

/// A 16x16x16 section of a chunk. Layer 0 holds the regular blocks, the
/// layers above hold blocks sharing a position, such as water in a
/// waterlogged block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubChunk {
    air: u32,
    storages: Vec<PalettedStorage>,
}

impl SubChunk {
    /// A sub-chunk with a single layer of air.
    pub fn new(air: u32) -> SubChunk {
        SubChunk {
            air,
            storages: vec![PalettedStorage::uniform(air)],
        }
    }

    pub(crate) fn with_layers(air: u32, storages: Vec<PalettedStorage>) -> SubChunk {
        SubChunk { air, storages }
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    /// Whether every layer holds nothing but air.
    pub fn is_empty(&self) -> bool {
        self.storages
            .iter()
            .all(|s| s.palette().values().iter().all(|v| *v == self.air))
    }

    /// The layer at `n`, creating it and any layers below it when missing.
    pub fn layer(&mut self, n: usize) -> &mut PalettedStorage {
        while self.storages.len() <= n {
            self.storages.push(PalettedStorage::uniform(self.air));
        }
        &mut self.storages[n]
    }

    pub fn layers(&self) -> &[PalettedStorage] {
        &self.storages
    }

    pub fn layers_mut(&mut self) -> &mut [PalettedStorage] {
        &mut self.storages
    }

    pub fn block(&self, x: u8, y: u8, z: u8, layer: usize) -> u32 {
        match self.storages.get(layer) {
            Some(s) => s.at(x, y, z),
            None => self.air,
        }
    }

    pub fn set_block(&mut self, x: u8, y: u8, z: u8, layer: usize, block: u32) {
        // Don't create a layer just to put air in it.
        if layer >= self.storages.len() && block == self.air {
            return;
        }
        self.layer(layer).set(x, y, z, block);
    }

    /// Compacts every layer and drops trailing layers holding only air.
    pub fn compact(&mut self) {
        for s in &mut self.storages {
            s.compact();
        }
        let air = self.air;
        while self.storages.len() > 1 {
            let last = &self.storages[self.storages.len() - 1];
            if last.palette().values() != [air] {
                break;
            }
            self.storages.pop();
        }
    }
}

#[test]
fn test_layers() {
    let mut sub = SubChunk::new(12);
    assert!(sub.is_empty());
    sub.set_block(0, 0, 0, 1, 12);
    assert_eq!(sub.layers().len(), 1);
    sub.set_block(0, 0, 0, 1, 40);
    assert_eq!(sub.layers().len(), 2);
    assert_eq!(sub.block(0, 0, 0, 1), 40);
    assert_eq!(sub.block(0, 0, 0, 3), 12);
    assert!(!sub.is_empty());

    sub.set_block(0, 0, 0, 1, 12);
    sub.compact();
    assert_eq!(sub.layers().len(), 1);
}
