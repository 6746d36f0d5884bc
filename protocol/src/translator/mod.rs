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

//! Rewrites the block and item runtime ids inside packets between the
//! latest protocol's numbering and an older protocol's.
//!
//! Translators only ever see packets in their latest shape: the version
//! chain downgrades after them and upgrades before them.

mod block;
pub use self::block::*;

mod item;
pub use self::item::*;

use crate::mapping::{BlockMapping, ItemMapping};

use log::debug;
use std::ptr;

/// Per connection state the translators consult.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// Whether the client negotiated the blob cache. Cached chunk data is
    /// referenced by hash and can't be rewritten.
    pub client_cache_enabled: bool,
}

/// Maps a block runtime id of `from` to the id of the same state in `to`.
/// Anything that doesn't resolve becomes `to`'s air.
pub fn translate_block_runtime_id(from: &BlockMapping, to: &BlockMapping, id: u32) -> u32 {
    if ptr::eq(from, to) {
        return id;
    }
    let mut state = match from.runtime_id_to_state(id) {
        Some(state) => state,
        None => {
            debug!("Block runtime id {} is unknown, using air", id);
            return to.air();
        }
    };
    state.version = to.version();
    match to.state_to_runtime_id(&state) {
        Some(id) => id,
        None => {
            debug!("Block {} has no counterpart, using air", state);
            to.air()
        }
    }
}

/// Maps an item network id of `from` to the id `to` uses for the same name.
pub fn translate_item_runtime_id(from: &ItemMapping, to: &ItemMapping, id: i32) -> i32 {
    if ptr::eq(from, to) {
        return id;
    }
    let name = match from.item_runtime_id_to_name(id) {
        Some(name) => name,
        None => {
            debug!("Item id {} is unknown, using air", id);
            return to.air();
        }
    };
    match to.item_name_to_runtime_id(&name) {
        Some(id) => id,
        None => {
            debug!("Item {} has no counterpart, using air", name);
            to.air()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mapping::{test_states, BlockState};
    use crate::nbt;

    #[test]
    fn test_block_ids_follow_states() {
        let latest = BlockMapping::from_states(test_states(2)).unwrap();
        let mut old_states = test_states(1);
        // The old table lists the wools the other way around and has no log.
        old_states.swap(2, 3);
        old_states.pop();
        let old = BlockMapping::from_states(old_states).unwrap();

        assert_eq!(translate_block_runtime_id(&latest, &old, 1), 1);
        assert_eq!(translate_block_runtime_id(&latest, &old, 2), 3);
        assert_eq!(translate_block_runtime_id(&old, &latest, 2), 3);
        // the log and an id past the table both fall back to air
        assert_eq!(translate_block_runtime_id(&latest, &old, 4), old.air());
        assert_eq!(translate_block_runtime_id(&latest, &old, 400), old.air());
    }

    #[test]
    fn test_block_identity() {
        let latest = BlockMapping::from_states(test_states(2)).unwrap();
        // Identity doesn't even look the id up.
        assert_eq!(translate_block_runtime_id(&latest, &latest, 400), 400);
    }

    #[test]
    fn test_block_custom_state_to_air() {
        let latest = BlockMapping::from_states(test_states(2)).unwrap();
        let mut states = test_states(2);
        states.push(BlockState::new("custom:thing", nbt::Compound::new(), 2));
        let server = BlockMapping::from_states(states).unwrap();
        assert_eq!(translate_block_runtime_id(&server, &latest, 5), latest.air());
    }

    #[test]
    fn test_item_ids_follow_names() {
        let latest = ItemMapping::from_entries(vec![
            ("minecraft:air".to_owned(), -158),
            ("minecraft:apple".to_owned(), 257),
            ("minecraft:mace".to_owned(), 300),
        ])
        .unwrap();
        let old = ItemMapping::from_entries(vec![
            ("minecraft:air".to_owned(), -150),
            ("minecraft:apple".to_owned(), 255),
        ])
        .unwrap();
        assert_eq!(translate_item_runtime_id(&latest, &old, 257), 255);
        assert_eq!(translate_item_runtime_id(&latest, &old, 300), -150);
        assert_eq!(translate_item_runtime_id(&old, &latest, 1), -158);
    }
}
