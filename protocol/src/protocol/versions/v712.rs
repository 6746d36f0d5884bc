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
use crate::protocol::{Direction, VarUInt};

/// 1.21.20
pub struct V712;

const PROTOCOL: i32 = 712;

/// Emote length given to emotes from clients that don't send one, in ticks.
const DEFAULT_EMOTE_LENGTH: u32 = 100;

impl Version for V712 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        PROTOCOL
    }

    fn version(&self) -> &'static str {
        "1.21.20"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        match dir {
            Direction::Clientbound => vec![
                PoolEdit::remove(Kind::CameraAimAssist),
                PoolEdit::remove(Kind::ContainerRegistryCleanup),
                PoolEdit::insert(Kind::Emote_NoLength),
                PoolEdit::insert(Kind::Transfer_NoReload),
                PoolEdit::insert(Kind::InventoryContent_WindowId),
                PoolEdit::insert(Kind::InventorySlot_WindowId),
            ],
            Direction::Serverbound => vec![PoolEdit::insert(Kind::Emote_NoLength)],
        }
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::Emote_NoLength(pk) => Packet::Emote(Emote {
                    entity_runtime_id: pk.entity_runtime_id,
                    emote_id: pk.emote_id,
                    emote_length: VarUInt(DEFAULT_EMOTE_LENGTH),
                    xuid: pk.xuid,
                    platform_id: pk.platform_id,
                    flags: pk.flags,
                }),
                pk => pk,
            })
            .collect()
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        drop_kinds(pks, &[Kind::CameraAimAssist, Kind::ContainerRegistryCleanup], PROTOCOL)
            .into_iter()
            .map(|pk| match pk {
                Packet::Emote(pk) => Packet::Emote_NoLength(Emote_NoLength {
                    entity_runtime_id: pk.entity_runtime_id,
                    emote_id: pk.emote_id,
                    xuid: pk.xuid,
                    platform_id: pk.platform_id,
                    flags: pk.flags,
                }),
                Packet::Transfer(pk) => Packet::Transfer_NoReload(Transfer_NoReload {
                    address: pk.address,
                    port: pk.port,
                }),
                Packet::InventoryContent_DynamicSize(pk) => {
                    Packet::InventoryContent_WindowId(InventoryContent_WindowId {
                        window_id: pk.window_id,
                        content: pk.content,
                        dynamic_window_id: VarUInt(pk.container.dynamic_id.unwrap_or(0)),
                    })
                }
                Packet::InventorySlot_DynamicSize(pk) => {
                    Packet::InventorySlot_WindowId(InventorySlot_WindowId {
                        window_id: pk.window_id,
                        slot: pk.slot,
                        dynamic_window_id: VarUInt(pk.container.dynamic_id.unwrap_or(0)),
                        new_item: pk.new_item,
                    })
                }
                pk => pk,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_emote_length() {
        let pks = V712.upgrade(vec![Packet::Emote_NoLength(Emote_NoLength {
            emote_id: "wave".to_owned(),
            ..Default::default()
        })]);
        match &pks[..] {
            [Packet::Emote(pk)] => {
                assert_eq!(pk.emote_id, "wave");
                assert_eq!(pk.emote_length, VarUInt(DEFAULT_EMOTE_LENGTH));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_window_id() {
        let pks = V712.downgrade(vec![Packet::InventoryContent_DynamicSize(
            InventoryContent_DynamicSize {
                window_id: VarUInt(3),
                container: FullContainerName {
                    container_id: 7,
                    dynamic_id: Some(12),
                },
                ..Default::default()
            },
        )]);
        match &pks[..] {
            [Packet::InventoryContent_WindowId(pk)] => {
                assert_eq!(pk.window_id, VarUInt(3));
                assert_eq!(pk.dynamic_window_id, VarUInt(12));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_transfer_and_removed() {
        let pks = V712.downgrade(vec![
            Packet::CameraAimAssist(Default::default()),
            Packet::Transfer(Transfer {
                address: "play.example.net".to_owned(),
                port: 19132,
                reload_world: true,
            }),
        ]);
        assert_eq!(
            pks,
            vec![Packet::Transfer_NoReload(Transfer_NoReload {
                address: "play.example.net".to_owned(),
                port: 19132,
            })]
        );
    }
}
