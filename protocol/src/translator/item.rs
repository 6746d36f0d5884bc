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

use super::{translate_block_runtime_id, translate_item_runtime_id, Context};
use crate::item::Stack;
use crate::mapping::{BlockMapping, ItemMapping};
use crate::protocol::packet::{InventoryTransaction, Packet, TransactionData};

use std::sync::Arc;

/// Translates item network ids, and the block runtime ids of block items,
/// between the latest protocol and one older protocol.
pub struct ItemTranslator {
    mapping: Arc<ItemMapping>,
    latest: Arc<ItemMapping>,
    blocks: Arc<BlockMapping>,
    latest_blocks: Arc<BlockMapping>,
}

/// Which way stacks are being moved.
#[derive(Clone, Copy)]
enum Way {
    Down,
    Up,
}

impl ItemTranslator {
    pub fn new(
        mapping: Arc<ItemMapping>,
        latest: Arc<ItemMapping>,
        blocks: Arc<BlockMapping>,
        latest_blocks: Arc<BlockMapping>,
    ) -> ItemTranslator {
        ItemTranslator {
            mapping,
            latest,
            blocks,
            latest_blocks,
        }
    }

    pub fn is_identity(&self) -> bool {
        Arc::ptr_eq(&self.mapping, &self.latest) && Arc::ptr_eq(&self.blocks, &self.latest_blocks)
    }

    pub fn downgrade_stack(&self, s: &mut Stack) {
        self.translate_stack(s, Way::Down);
    }

    pub fn upgrade_stack(&self, s: &mut Stack) {
        self.translate_stack(s, Way::Up);
    }

    fn translate_stack(&self, s: &mut Stack, way: Way) {
        if s.is_empty() || self.is_identity() {
            return;
        }
        let (items_from, items_to, blocks_from, blocks_to) = match way {
            Way::Down => (&self.latest, &self.mapping, &self.latest_blocks, &self.blocks),
            Way::Up => (&self.mapping, &self.latest, &self.blocks, &self.latest_blocks),
        };
        let id = translate_item_runtime_id(items_from, items_to, s.id);
        if id == items_to.air() {
            *s = Stack::default();
            return;
        }
        s.id = id;
        if s.block_runtime_id != 0 {
            s.block_runtime_id = translate_block_runtime_id(blocks_from, blocks_to, s.block_runtime_id as u32) as i32;
        }
    }

    /// Rewrites packets sent by the server.
    pub fn downgrade_packets(&self, mut pks: Vec<Packet>, _ctx: &Context) -> Vec<Packet> {
        for pk in &mut pks {
            if let Packet::StartGame(ref mut sg) = *pk {
                // The server's item table wins: every item it lists gets an
                // id on both sides, custom items included.
                for entry in &mut sg.items.data {
                    self.latest.register_entry(&entry.name);
                    entry.runtime_id = self.mapping.register_entry(&entry.name) as i16;
                }
                continue;
            }
            self.translate_packet(pk, Way::Down);
        }
        pks
    }

    /// Rewrites packets sent by the client.
    pub fn upgrade_packets(&self, mut pks: Vec<Packet>, _ctx: &Context) -> Vec<Packet> {
        for pk in &mut pks {
            self.translate_packet(pk, Way::Up);
        }
        pks
    }

    fn translate_packet(&self, pk: &mut Packet, way: Way) {
        match *pk {
            Packet::InventoryContent(ref mut pk) => {
                for s in &mut pk.content.data {
                    self.translate_stack(s, way);
                }
                self.translate_stack(&mut pk.storage_item, way);
            }
            Packet::InventorySlot(ref mut pk) => {
                self.translate_stack(&mut pk.storage_item, way);
                self.translate_stack(&mut pk.new_item, way);
            }
            Packet::MobEquipment(ref mut pk) => self.translate_stack(&mut pk.new_item, way),
            Packet::MobArmourEquipment(ref mut pk) => {
                for s in [
                    &mut pk.helmet,
                    &mut pk.chestplate,
                    &mut pk.leggings,
                    &mut pk.boots,
                    &mut pk.body,
                ] {
                    self.translate_stack(s, way);
                }
            }
            Packet::AddItemActor(ref mut pk) => self.translate_stack(&mut pk.item, way),
            Packet::InventoryTransaction(ref mut pk) => self.translate_transaction(pk, way),
            _ => {}
        }
    }

    fn translate_transaction(&self, pk: &mut InventoryTransaction, way: Way) {
        for action in &mut pk.actions.data {
            self.translate_stack(&mut action.old_item, way);
            self.translate_stack(&mut action.new_item, way);
        }
        match pk.data {
            TransactionData::UseItem(ref mut d) => self.translate_stack(&mut d.held_item, way),
            TransactionData::UseItemOnEntity(ref mut d) => self.translate_stack(&mut d.held_item, way),
            TransactionData::ReleaseItem(ref mut d) => self.translate_stack(&mut d.held_item, way),
            TransactionData::Normal | TransactionData::Mismatch => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mapping::test_states;
    use crate::protocol::packet::{InventoryAction, ItemEntry, MobEquipment, StartGame};
    use crate::protocol::LenPrefixed;

    fn translator() -> ItemTranslator {
        let latest = ItemMapping::from_entries(vec![
            ("minecraft:air".to_owned(), -158),
            ("minecraft:apple".to_owned(), 257),
            ("minecraft:stone".to_owned(), 1),
            ("minecraft:mace".to_owned(), 300),
        ])
        .unwrap();
        let old = ItemMapping::from_entries(vec![
            ("minecraft:air".to_owned(), -150),
            ("minecraft:apple".to_owned(), 255),
            ("minecraft:stone".to_owned(), 1),
        ])
        .unwrap();
        let latest_blocks = BlockMapping::from_states(test_states(2)).unwrap();
        let mut old_states = test_states(1);
        old_states.reverse();
        let old_blocks = BlockMapping::from_states(old_states).unwrap();
        ItemTranslator::new(
            Arc::new(old),
            Arc::new(latest),
            Arc::new(old_blocks),
            Arc::new(latest_blocks),
        )
    }

    fn stack(id: i32, block_runtime_id: i32) -> Stack {
        Stack {
            id,
            count: 1,
            block_runtime_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_stack_ids() {
        let t = translator();
        let mut s = stack(257, 0);
        t.downgrade_stack(&mut s);
        assert_eq!(s.id, 255);
        t.upgrade_stack(&mut s);
        assert_eq!(s.id, 257);
    }

    #[test]
    fn test_block_item() {
        let t = translator();
        // stone keeps its item id but the block id moves with the table
        let mut s = stack(1, 1);
        t.downgrade_stack(&mut s);
        assert_eq!(s.id, 1);
        assert_eq!(s.block_runtime_id, 3);
    }

    #[test]
    fn test_unknown_item_is_emptied() {
        let t = translator();
        let mut s = stack(300, 0);
        t.downgrade_stack(&mut s);
        assert!(s.is_empty());
        assert_eq!(s, Stack::default());
    }

    #[test]
    fn test_transaction_actions() {
        let t = translator();
        let pk = Packet::InventoryTransaction(InventoryTransaction {
            actions: LenPrefixed::new(vec![InventoryAction {
                old_item: stack(255, 0),
                new_item: Stack::default(),
                ..Default::default()
            }]),
            ..Default::default()
        });
        match &t.upgrade_packets(vec![pk], &Context::default())[..] {
            [Packet::InventoryTransaction(pk)] => {
                assert_eq!(pk.actions.data[0].old_item.id, 257);
                assert!(pk.actions.data[0].new_item.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_start_game_items_registered() {
        let t = translator();
        let pk = Packet::StartGame(StartGame {
            items: LenPrefixed::new(vec![
                ItemEntry {
                    name: "minecraft:apple".to_owned(),
                    runtime_id: 257,
                    ..Default::default()
                },
                ItemEntry {
                    name: "custom:gem".to_owned(),
                    runtime_id: 1000,
                    ..Default::default()
                },
            ]),
            ..Default::default()
        });
        let out = t.downgrade_packets(vec![pk], &Context::default());
        let items = match &out[..] {
            [Packet::StartGame(sg)] => &sg.items.data,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(items[0].runtime_id, 255);
        assert_eq!(items[1].runtime_id, 3);

        // Now known on both sides.
        let mut s = stack(t.latest.item_name_to_runtime_id("custom:gem").unwrap(), 0);
        t.downgrade_stack(&mut s);
        assert_eq!(s.id, 3);
    }

    #[test]
    fn test_equipment_upgrade() {
        let t = translator();
        let pk = Packet::MobEquipment(MobEquipment {
            new_item: stack(255, 0),
            ..Default::default()
        });
        match &t.upgrade_packets(vec![pk], &Context::default())[..] {
            [Packet::MobEquipment(pk)] => assert_eq!(pk.new_item.id, 257),
            other => panic!("unexpected {:?}", other),
        }
    }
}
