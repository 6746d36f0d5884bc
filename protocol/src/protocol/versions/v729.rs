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

use super::{drop_kinds, PoolEdit, Version};
use crate::protocol::packet::*;
use crate::protocol::Direction;
use crate::types::Vec3;

/// 1.21.30
pub struct V729;

const PROTOCOL: i32 = 729;

impl Version for V729 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        PROTOCOL
    }

    fn version(&self) -> &'static str {
        "1.21.30"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        match dir {
            Direction::Clientbound => vec![
                PoolEdit::remove(Kind::MovementEffect),
                PoolEdit::remove(Kind::SetMovementAuthority),
                PoolEdit::insert(Kind::MobEffect_NoAmbient),
                PoolEdit::insert(Kind::InventoryContent_DynamicSize),
                PoolEdit::insert(Kind::InventorySlot_DynamicSize),
            ],
            Direction::Serverbound => vec![PoolEdit::insert(Kind::PlayerAuthInput_Gaze)],
        }
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                // The gaze direction was replaced by the interaction angles.
                Packet::PlayerAuthInput_Gaze(pk) => Packet::PlayerAuthInput(PlayerAuthInput {
                    pitch: pk.pitch,
                    yaw: pk.yaw,
                    position: pk.position,
                    move_vector: pk.move_vector,
                    head_yaw: pk.head_yaw,
                    input_data: pk.input_data,
                    input_mode: pk.input_mode,
                    play_mode: pk.play_mode,
                    interaction_model: pk.interaction_model,
                    interact_pitch: pk.gaze_direction.x,
                    interact_yaw: pk.gaze_direction.y,
                    tick: pk.tick,
                    delta: pk.delta,
                    rest: pk.rest,
                }),
                pk => pk,
            })
            .collect()
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        drop_kinds(pks, &[Kind::MovementEffect, Kind::SetMovementAuthority], PROTOCOL)
            .into_iter()
            .map(|pk| match pk {
                Packet::MobEffect(pk) => Packet::MobEffect_NoAmbient(MobEffect_NoAmbient {
                    entity_runtime_id: pk.entity_runtime_id,
                    operation: pk.operation,
                    effect_type: pk.effect_type,
                    amplifier: pk.amplifier,
                    particles: pk.particles,
                    duration: pk.duration,
                    tick: pk.tick,
                }),
                Packet::InventoryContent(pk) => {
                    Packet::InventoryContent_DynamicSize(InventoryContent_DynamicSize {
                        window_id: pk.window_id,
                        content: pk.content,
                        container: pk.container,
                        dynamic_container_size: Default::default(),
                    })
                }
                Packet::InventorySlot(pk) => Packet::InventorySlot_DynamicSize(InventorySlot_DynamicSize {
                    window_id: pk.window_id,
                    slot: pk.slot,
                    container: pk.container,
                    dynamic_container_size: Default::default(),
                    new_item: pk.new_item,
                }),
                // Only ever sent by the client, but keep the shape valid.
                Packet::PlayerAuthInput(pk) => Packet::PlayerAuthInput_Gaze(PlayerAuthInput_Gaze {
                    pitch: pk.pitch,
                    yaw: pk.yaw,
                    position: pk.position,
                    move_vector: pk.move_vector,
                    head_yaw: pk.head_yaw,
                    input_data: pk.input_data,
                    input_mode: pk.input_mode,
                    play_mode: pk.play_mode,
                    interaction_model: pk.interaction_model,
                    gaze_direction: Vec3 {
                        x: pk.interact_pitch,
                        y: pk.interact_yaw,
                        z: 0.0,
                    },
                    tick: pk.tick,
                    delta: pk.delta,
                    rest: pk.rest,
                }),
                pk => pk,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::item::Stack;
    use crate::protocol::VarULong;

    #[test]
    fn test_movement_packets_dropped() {
        let pks = V729.downgrade(vec![
            Packet::MovementEffect(Default::default()),
            Packet::SetMovementAuthority(Default::default()),
            Packet::ClientCacheMissResponse(Default::default()),
        ]);
        assert_eq!(pks.len(), 1);
        assert_eq!(pks[0].kind(), Kind::ClientCacheMissResponse);
    }

    #[test]
    fn test_inventory_slot_keeps_item() {
        let item = Stack {
            id: 5,
            count: 2,
            ..Default::default()
        };
        let pks = V729.downgrade(vec![Packet::InventorySlot(InventorySlot {
            new_item: item.clone(),
            storage_item: Stack {
                id: 9,
                count: 1,
                ..Default::default()
            },
            ..Default::default()
        })]);
        match &pks[..] {
            [Packet::InventorySlot_DynamicSize(pk)] => assert_eq!(pk.new_item, item),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mob_effect_ambient_dropped() {
        let pks = V729.downgrade(vec![Packet::MobEffect(MobEffect {
            tick: VarULong(40),
            ambient: true,
            ..Default::default()
        })]);
        match &pks[..] {
            [Packet::MobEffect_NoAmbient(pk)] => assert_eq!(pk.tick, VarULong(40)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_gaze_upgrade() {
        let pks = V729.upgrade(vec![Packet::PlayerAuthInput_Gaze(PlayerAuthInput_Gaze {
            gaze_direction: Vec3 {
                x: 10.0,
                y: -20.0,
                z: 1.0,
            },
            ..Default::default()
        })]);
        match &pks[..] {
            [Packet::PlayerAuthInput(pk)] => {
                assert_eq!(pk.interact_pitch, 10.0);
                assert_eq!(pk.interact_yaw, -20.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
