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

use super::AIR;
use crate::nbt;
use crate::protocol;
use crate::types::hash::FNVHash;

use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::io;
use std::sync::{Mutex, MutexGuard};

type FNVMap<K, V> = HashMap<K, V, BuildHasherDefault<FNVHash>>;

struct Tables {
    names: FNVMap<i32, String>,
    ids: FNVMap<String, i32>,
}

/// An entry of the older JSON item tables.
#[derive(Deserialize)]
struct LegacyEntry {
    runtime_id: i16,
}

/// The item network ids of one protocol version. Items can be added at
/// runtime when the server announces them, so every access takes the lock.
pub struct ItemMapping {
    tables: Mutex<Tables>,
    air: i32,
}

impl ItemMapping {
    /// Loads a network encoded compound mapping item names to their id.
    pub fn direct(data: &[u8]) -> Result<ItemMapping, protocol::Error> {
        let c = nbt::read_compound(&mut io::Cursor::new(data), nbt::Encoding::NetworkLittleEndian)?;
        let mut entries = Vec::with_capacity(c.len());
        for (name, v) in c.iter() {
            let id = match *v {
                nbt::Tag::Int(id) => id,
                nbt::Tag::Short(id) => id as i32,
                _ => {
                    return Err(protocol::Error::Err(format!(
                        "item {} has a non numeric id",
                        name
                    )))
                }
            };
            entries.push((name.to_owned(), id));
        }
        ItemMapping::from_entries(entries)
    }

    /// Loads a JSON object of `name: {"runtime_id": .., "component_based": ..}`.
    pub fn legacy(data: &[u8]) -> Result<ItemMapping, protocol::Error> {
        let table: HashMap<String, LegacyEntry> = serde_json::from_slice(data)?;
        ItemMapping::from_entries(
            table
                .into_iter()
                .map(|(name, e)| (name, e.runtime_id as i32)),
        )
    }

    pub fn from_entries<I>(entries: I) -> Result<ItemMapping, protocol::Error>
    where
        I: IntoIterator<Item = (String, i32)>,
    {
        let mut tables = Tables {
            names: HashMap::with_hasher(BuildHasherDefault::default()),
            ids: HashMap::with_hasher(BuildHasherDefault::default()),
        };
        for (name, id) in entries {
            tables.names.insert(id, name.clone());
            tables.ids.insert(name, id);
        }
        let air = *tables.ids.get(AIR).ok_or(protocol::Error::MissingAir)?;
        Ok(ItemMapping {
            tables: Mutex::new(tables),
            air,
        })
    }

    pub fn air(&self) -> i32 {
        self.air
    }

    pub fn len(&self) -> usize {
        self.lock().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn item_runtime_id_to_name(&self, id: i32) -> Option<String> {
        self.lock().names.get(&id).cloned()
    }

    pub fn item_name_to_runtime_id(&self, name: &str) -> Option<i32> {
        self.lock().ids.get(name).copied()
    }

    /// Returns the id of `name`, giving it the size of the table as id if
    /// it has none yet. Tables with gaps can already use that id, then the
    /// next unused one above it is taken.
    pub fn register_entry(&self, name: &str) -> i32 {
        let mut tables = self.lock();
        if let Some(id) = tables.ids.get(name) {
            return *id;
        }
        let mut id = tables.names.len() as i32;
        while tables.names.contains_key(&id) {
            id += 1;
        }
        debug!("Registered item {} as {}", name, id);
        tables.names.insert(id, name.to_owned());
        tables.ids.insert(name.to_owned(), id);
        id
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entries() -> Vec<(String, i32)> {
        vec![
            (AIR.to_owned(), 0),
            ("minecraft:stone".to_owned(), 1),
            ("minecraft:apple".to_owned(), 2),
        ]
    }

    #[test]
    fn test_direct() {
        let mut c = nbt::Compound::new();
        for (name, id) in entries() {
            c.put(&name, nbt::Tag::Int(id));
        }
        let mut data = Vec::new();
        nbt::write_compound(&mut data, nbt::Encoding::NetworkLittleEndian, &c).unwrap();

        let mapping = ItemMapping::direct(&data).unwrap();
        assert_eq!(mapping.air(), 0);
        assert_eq!(mapping.item_name_to_runtime_id("minecraft:apple"), Some(2));
        assert_eq!(
            mapping.item_runtime_id_to_name(1).as_deref(),
            Some("minecraft:stone")
        );
    }

    #[test]
    fn test_legacy() {
        let data = br#"{
            "minecraft:air": {"runtime_id": 0, "component_based": false},
            "minecraft:shield": {"runtime_id": 357, "component_based": true}
        }"#;
        let mapping = ItemMapping::legacy(data).unwrap();
        assert_eq!(mapping.item_name_to_runtime_id("minecraft:shield"), Some(357));
    }

    #[test]
    fn test_missing_air() {
        let data = br#"{"minecraft:shield": {"runtime_id": 357, "component_based": true}}"#;
        assert!(matches!(
            ItemMapping::legacy(data),
            Err(protocol::Error::MissingAir)
        ));
    }

    #[test]
    fn test_register_entry() {
        let mapping = ItemMapping::from_entries(entries()).unwrap();
        assert_eq!(mapping.register_entry("minecraft:stone"), 1);

        let id = mapping.register_entry("custom:gem");
        assert_eq!(id, 3);
        assert_eq!(mapping.register_entry("custom:gem"), 3);
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.item_runtime_id_to_name(3).as_deref(), Some("custom:gem"));
    }

    #[test]
    fn test_register_entry_sparse_table() {
        let mapping = ItemMapping::from_entries(vec![
            (AIR.to_owned(), 0),
            ("minecraft:apple".to_owned(), 2),
            ("minecraft:bread".to_owned(), 3),
        ])
        .unwrap();
        let id = mapping.register_entry("custom:gem");
        assert_eq!(id, 4);
        assert_eq!(mapping.item_runtime_id_to_name(3).as_deref(), Some("minecraft:bread"));
        assert_eq!(mapping.item_name_to_runtime_id("minecraft:bread"), Some(3));
        assert_eq!(mapping.item_runtime_id_to_name(4).as_deref(), Some("custom:gem"));
    }

    #[test]
    fn test_register_entry_concurrent() {
        use std::sync::Arc;
        use std::thread;

        let mapping = Arc::new(ItemMapping::from_entries(entries()).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mapping = mapping.clone();
                thread::spawn(move || mapping.register_entry("custom:racy"))
            })
            .collect();
        let ids: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == 3));
        assert_eq!(mapping.len(), 4);
    }
}
