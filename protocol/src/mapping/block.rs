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

use super::{BlockState, AIR};
use crate::nbt;
use crate::protocol;
use crate::protocol::packet::BlockEntry;
use crate::types::hash::FNVHash;

use log::debug;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Tables {
    states: Vec<BlockState>,
    ids: HashMap<Vec<u8>, u32, BuildHasherDefault<FNVHash>>,
}

/// The block runtime ids of one protocol version. Built once from the
/// version's block table, after which only custom blocks announced by the
/// server are ever added.
pub struct BlockMapping {
    tables: RwLock<Tables>,
    air: u32,
    version: i32,
}

impl BlockMapping {
    /// Loads a block table: a run of network encoded `{name, states,
    /// version}` compounds whose position is their runtime id.
    pub fn new(data: &[u8]) -> Result<BlockMapping, protocol::Error> {
        let mut buf = io::Cursor::new(data);
        let mut states = Vec::new();
        while (buf.position() as usize) < data.len() {
            let c = nbt::read_compound(&mut buf, nbt::Encoding::NetworkLittleEndian)?;
            states.push(BlockState::from_compound(&c)?);
        }
        BlockMapping::from_states(states)
    }

    pub fn from_states(states: Vec<BlockState>) -> Result<BlockMapping, protocol::Error> {
        let air = states
            .iter()
            .position(|s| s.name == AIR)
            .ok_or(protocol::Error::MissingAir)?;
        let version = states[air].version;

        let mut ids = HashMap::with_hasher(BuildHasherDefault::default());
        for (i, s) in states.iter().enumerate() {
            ids.entry(s.key()).or_insert(i as u32);
        }
        Ok(BlockMapping {
            tables: RwLock::new(Tables { states, ids }),
            air: air as u32,
            version,
        })
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    /// The block version of the table, stamped on states written for it.
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.read().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn runtime_id_to_state(&self, id: u32) -> Option<BlockState> {
        self.read().states.get(id as usize).cloned()
    }

    pub fn state_to_runtime_id(&self, state: &BlockState) -> Option<u32> {
        self.read().ids.get(&state.key()).copied()
    }

    /// Adds custom blocks the server declared in its start game packet.
    /// Blocks already present keep their id.
    pub fn adjust(&self, entries: &[BlockEntry]) {
        let mut tables = self.write();
        for entry in entries {
            let state = BlockState::new(&entry.name, nbt::Compound::new(), self.version);
            let key = state.key();
            if tables.ids.contains_key(&key) {
                continue;
            }
            let id = tables.states.len() as u32;
            debug!("Registered custom block {} as {}", entry.name, id);
            tables.ids.insert(key, id);
            tables.states.push(state);
        }
    }

    /// Rewrites block states nested in block entity data to this table's
    /// version. States the table doesn't know are replaced with air.
    pub fn downgrade_block_actor_data(&self, tag: &mut nbt::Tag) {
        match *tag {
            nbt::Tag::Compound(ref mut c) => {
                if is_block_state(c) {
                    self.downgrade_state_compound(c);
                    return;
                }
                for v in c.values_mut() {
                    self.downgrade_block_actor_data(v);
                }
            }
            nbt::Tag::List(ref mut l) => {
                for v in l {
                    self.downgrade_block_actor_data(v);
                }
            }
            _ => {}
        }
    }

    fn downgrade_state_compound(&self, c: &mut nbt::Compound) {
        let mut state = match BlockState::from_compound(c) {
            Ok(state) => state,
            Err(_) => return,
        };
        state.version = self.version;
        if self.state_to_runtime_id(&state).is_none() {
            debug!("Block entity state {} replaced with air", state);
            state = BlockState::air(self.version);
        }
        c.put("name", nbt::Tag::String(state.name));
        c.put("states", nbt::Tag::Compound(state.properties));
        c.put("version", nbt::Tag::Int(state.version));
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn is_block_state(c: &nbt::Compound) -> bool {
    matches!(c.get("name"), Some(nbt::Tag::String(_)))
        && matches!(c.get("states"), Some(nbt::Tag::Compound(_)))
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A small table: air, stone, two wool colours and a log.
    pub fn states(version: i32) -> Vec<BlockState> {
        let mut wool_white = nbt::Compound::new();
        wool_white.put("color", nbt::Tag::String("white".to_owned()));
        let mut wool_red = nbt::Compound::new();
        wool_red.put("color", nbt::Tag::String("red".to_owned()));
        let mut log = nbt::Compound::new();
        log.put("pillar_axis", nbt::Tag::String("y".to_owned()));
        log.put("stripped_bit", nbt::Tag::Byte(0));
        vec![
            BlockState::air(version),
            BlockState::new("minecraft:stone", nbt::Compound::new(), version),
            BlockState::new("minecraft:wool", wool_white, version),
            BlockState::new("minecraft:wool", wool_red, version),
            BlockState::new("minecraft:oak_log", log, version),
        ]
    }

    pub fn table(states: &[BlockState]) -> Vec<u8> {
        let mut data = Vec::new();
        for s in states {
            nbt::write_compound(&mut data, nbt::Encoding::NetworkLittleEndian, &s.to_compound())
                .unwrap();
        }
        data
    }

    #[test]
    fn test_bijection() {
        let states = states(1);
        let mapping = BlockMapping::new(&table(&states)).unwrap();
        assert_eq!(mapping.len(), states.len());
        for (i, s) in states.iter().enumerate() {
            let state = mapping.runtime_id_to_state(i as u32).unwrap();
            assert_eq!(&state, s);
            assert_eq!(mapping.state_to_runtime_id(&state), Some(i as u32));
        }
        assert!(mapping.runtime_id_to_state(states.len() as u32).is_none());
    }

    #[test]
    fn test_exact_match() {
        let mapping = BlockMapping::from_states(states(1)).unwrap();
        let mut log = mapping.runtime_id_to_state(4).unwrap();
        log.version = 2;
        assert_eq!(mapping.state_to_runtime_id(&log), None);

        // Same properties in a different order are a different state.
        let mut swapped = nbt::Compound::new();
        swapped.put("stripped_bit", nbt::Tag::Byte(0));
        swapped.put("pillar_axis", nbt::Tag::String("y".to_owned()));
        let log = BlockState::new("minecraft:oak_log", swapped, 1);
        assert_eq!(mapping.state_to_runtime_id(&log), None);
    }

    #[test]
    fn test_missing_air() {
        let mut states = states(1);
        states.remove(0);
        match BlockMapping::from_states(states) {
            Err(protocol::Error::MissingAir) => {}
            _ => panic!("expected missing air"),
        }
    }

    #[test]
    fn test_adjust() {
        let mapping = BlockMapping::from_states(states(1)).unwrap();
        let entries = vec![
            BlockEntry {
                name: "custom:crate".to_owned(),
                properties: nbt::Tag::new_compound(),
            },
            BlockEntry {
                name: "minecraft:stone".to_owned(),
                properties: nbt::Tag::new_compound(),
            },
        ];
        mapping.adjust(&entries);
        mapping.adjust(&entries);
        assert_eq!(mapping.len(), 6);
        let custom = BlockState::new("custom:crate", nbt::Compound::new(), 1);
        assert_eq!(mapping.state_to_runtime_id(&custom), Some(5));
    }

    #[test]
    fn test_block_actor_data() {
        let mapping = BlockMapping::from_states(states(1)).unwrap();

        let mut stone = BlockState::new("minecraft:stone", nbt::Compound::new(), 7).to_compound();
        stone.put("extra", nbt::Tag::Int(1));
        let unknown = BlockState::new("minecraft:future", nbt::Compound::new(), 7);

        let mut tag = nbt::Tag::new_compound();
        tag.put("id", nbt::Tag::String("MovingBlock".to_owned()));
        tag.put("movingBlock", nbt::Tag::Compound(stone));
        tag.put(
            "list",
            nbt::Tag::List(vec![nbt::Tag::Compound(unknown.to_compound())]),
        );
        mapping.downgrade_block_actor_data(&mut tag);

        let moving = tag.get("movingBlock").unwrap();
        assert_eq!(moving.get("version").and_then(nbt::Tag::as_int), Some(1));
        assert_eq!(moving.get("extra").and_then(nbt::Tag::as_int), Some(1));
        let listed = &tag.get("list").unwrap().as_list().unwrap()[0];
        assert_eq!(listed.get("name").and_then(nbt::Tag::as_str), Some(AIR));
    }
}
