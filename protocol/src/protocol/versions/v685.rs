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

use super::{PoolEdit, Version};
use crate::protocol::packet::*;
use crate::protocol::{Direction, VarUInt};

/// 1.21.0
pub struct V685;

impl Version for V685 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        685
    }

    fn version(&self) -> &'static str {
        "1.21.0"
    }

    fn pool_diff(&self, _dir: Direction) -> Vec<PoolEdit<Kind>> {
        vec![PoolEdit::insert(Kind::InventoryTransaction_NoPrediction)]
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::InventoryTransaction_NoPrediction(pk) => {
                    Packet::InventoryTransaction(InventoryTransaction {
                        legacy_request_id: pk.legacy_request_id,
                        legacy_set_item_slots: pk.legacy_set_item_slots,
                        actions: pk.actions,
                        data: pk.data.map_use_item(|d| UseItemData {
                            action_type: d.action_type,
                            // Older clients only ever use items by interacting.
                            trigger_type: VarUInt(TRIGGER_PLAYER_INPUT),
                            block_position: d.block_position,
                            block_face: d.block_face,
                            hotbar_slot: d.hotbar_slot,
                            held_item: d.held_item,
                            position: d.position,
                            clicked_position: d.clicked_position,
                            block_runtime_id: d.block_runtime_id,
                            client_prediction: CLIENT_PREDICTION_SUCCESS,
                        }),
                    })
                }
                pk => pk,
            })
            .collect()
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::InventoryTransaction(pk) => {
                    Packet::InventoryTransaction_NoPrediction(InventoryTransaction_NoPrediction {
                        legacy_request_id: pk.legacy_request_id,
                        legacy_set_item_slots: pk.legacy_set_item_slots,
                        actions: pk.actions,
                        data: pk.data.map_use_item(|d| UseItemData_NoPrediction {
                            action_type: d.action_type,
                            block_position: d.block_position,
                            block_face: d.block_face,
                            hotbar_slot: d.hotbar_slot,
                            held_item: d.held_item,
                            position: d.position,
                            clicked_position: d.clicked_position,
                            block_runtime_id: d.block_runtime_id,
                        }),
                    })
                }
                pk => pk,
            })
            .collect()
    }
}

const TRIGGER_PLAYER_INPUT: u32 = 1;
const CLIENT_PREDICTION_SUCCESS: u8 = 1;
