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

/// Fixed width values packed into 32 bit words. Values never straddle two
/// words: each word holds `32 / bit_size` values starting at the least
/// significant bit and any left over high bits are padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    bits: Vec<u32>,
    pub bit_size: usize,
    length: usize,
}

#[test]
fn test_map() {
    let mut map = Map::new(4096, 4);
    for i in 0..4096 {
        for j in 0..16 {
            map.set(i, j);
            if map.get(i) != j {
                panic!("Fail");
            }
        }
    }
}

#[test]
fn test_map_odd() {
    for size in &[1, 2, 3, 5, 6, 8, 16] {
        let mut map = Map::new(4096, *size);
        let max = (1 << size) - 1;
        for i in 0..4096 {
            for j in &[0, max / 2, max] {
                map.set(i, *j);
                if map.get(i) != *j {
                    panic!("Index: {} wanted {} and got {}", i, j, map.get(i));
                }
            }
        }
    }
}

#[test]
fn test_map_neighbours_untouched() {
    let mut map = Map::new(4096, 3);
    map.set(9, 7);
    map.set(10, 5);
    map.set(11, 2);
    assert_eq!(map.get(9), 7);
    assert_eq!(map.get(10), 5);
    assert_eq!(map.get(11), 2);
    // 10 values of 3 bits per word: index 10 starts the second word.
    assert_eq!(map.raw()[1] & 0x7, 5);
}

#[test]
fn test_map_words() {
    assert_eq!(Map::words_for(4096, 0), 0);
    assert_eq!(Map::words_for(4096, 1), 128);
    assert_eq!(Map::words_for(4096, 3), 410);
    assert_eq!(Map::words_for(4096, 5), 683);
    assert_eq!(Map::words_for(4096, 6), 820);
    assert_eq!(Map::words_for(4096, 16), 2048);
}

#[test]
fn test_map_resize() {
    let mut map = Map::new(4096, 1);
    map.set(4095, 1);
    let map = map.resize(4);
    assert_eq!(map.bit_size, 4);
    assert_eq!(map.get(4095), 1);
    assert_eq!(map.get(0), 0);
}

impl Map {
    /// The number of words needed to hold `len` values of `size` bits.
    pub fn words_for(len: usize, size: usize) -> usize {
        if size == 0 {
            return 0;
        }
        let per_word = 32 / size;
        (len + per_word - 1) / per_word
    }

    pub fn new(len: usize, size: usize) -> Map {
        Map {
            bit_size: size,
            length: len,
            bits: vec![0; Map::words_for(len, size)],
        }
    }

    /// Wraps words read off the wire. Returns `None` when there are too few
    /// words to hold `len` values.
    pub fn from_raw(bits: Vec<u32>, size: usize, len: usize) -> Option<Map> {
        if bits.len() < Map::words_for(len, size) {
            return None;
        }
        Some(Map {
            length: len,
            bit_size: size,
            bits,
        })
    }

    pub fn raw(&self) -> &[u32] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn resize(&self, size: usize) -> Map {
        let mut n = Map::new(self.length, size);
        for i in 0..self.length {
            n.set(i, self.get(i));
        }
        n
    }

    pub fn set(&mut self, i: usize, val: usize) {
        if self.bit_size == 0 {
            return;
        }
        let per_word = 32 / self.bit_size;
        let pos = i / per_word;
        let shift = (i % per_word) * self.bit_size;
        let mask = ((1u64 << self.bit_size) - 1) as u32;
        self.bits[pos] = (self.bits[pos] & !(mask << shift)) | (((val as u32) & mask) << shift);
    }

    pub fn get(&self, i: usize) -> usize {
        if self.bit_size == 0 {
            return 0;
        }
        let per_word = 32 / self.bit_size;
        let pos = i / per_word;
        let shift = (i % per_word) * self.bit_size;
        let mask = ((1u64 << self.bit_size) - 1) as u32;
        ((self.bits[pos] >> shift) & mask) as usize
    }
}
