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
use crate::protocol::{Direction, VarLong};

/// 1.20.70
pub struct V662;

impl Version for V662 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        662
    }

    fn version(&self) -> &'static str {
        "1.20.71"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        match dir {
            Direction::Clientbound => vec![
                PoolEdit::insert(Kind::ResourcePackStack_NoEditorPacks),
                PoolEdit::insert(Kind::StartGame_NoHardcore),
                PoolEdit::insert(Kind::UpdateBlockSynced_SignedEntity),
                PoolEdit::insert(Kind::UpdatePlayerGameType_NoTick),
            ],
            Direction::Serverbound => vec![],
        }
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::ResourcePackStack(pk) => {
                    Packet::ResourcePackStack_NoEditorPacks(ResourcePackStack_NoEditorPacks {
                        texture_pack_required: pk.texture_pack_required,
                        behaviour_packs: pk.behaviour_packs,
                        texture_packs: pk.texture_packs,
                        base_game_version: pk.base_game_version,
                        experiments: pk.experiments,
                        experiments_previously_toggled: pk.experiments_previously_toggled,
                    })
                }
                Packet::StartGame_NoServerIds(pk) => Packet::StartGame_NoHardcore(StartGame_NoHardcore {
                    entity_unique_id: pk.entity_unique_id,
                    entity_runtime_id: pk.entity_runtime_id,
                    player_game_mode: pk.player_game_mode,
                    player_position: pk.player_position,
                    pitch: pk.pitch,
                    yaw: pk.yaw,
                    world_seed: pk.world_seed,
                    spawn_biome_type: pk.spawn_biome_type,
                    user_defined_biome_name: pk.user_defined_biome_name,
                    dimension: pk.dimension,
                    generator: pk.generator,
                    world_game_mode: pk.world_game_mode,
                    world: pk.world,
                    level: pk.level,
                    blocks: pk.blocks,
                    items: pk.items,
                    multiplayer_correlation_id: pk.multiplayer_correlation_id,
                    server_authoritative_inventory: pk.server_authoritative_inventory,
                    game_version: pk.game_version,
                    property_data: pk.property_data,
                    server_block_state_checksum: pk.server_block_state_checksum,
                    world_template_id: pk.world_template_id,
                    client_side_generation: pk.client_side_generation,
                    block_network_ids_are_hashes: pk.block_network_ids_are_hashes,
                    server_authoritative_sound: pk.server_authoritative_sound,
                }),
                // The entity id went unsigned later on, the bits are the same.
                Packet::UpdateBlockSynced(pk) => {
                    Packet::UpdateBlockSynced_SignedEntity(UpdateBlockSynced_SignedEntity {
                        position: pk.position,
                        new_block_runtime_id: pk.new_block_runtime_id,
                        flags: pk.flags,
                        layer: pk.layer,
                        entity_unique_id: VarLong(pk.entity_unique_id.0 as i64),
                        transition_type: pk.transition_type,
                    })
                }
                Packet::UpdatePlayerGameType(pk) => {
                    Packet::UpdatePlayerGameType_NoTick(UpdatePlayerGameType_NoTick {
                        game_type: pk.game_type,
                        player_unique_id: pk.player_unique_id,
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
    use crate::protocol::{VarInt, VarULong};
    use crate::protocol::versions::v671::V671;

    #[test]
    fn test_start_game_loses_hardcore() {
        let pks = V671.downgrade(vec![Packet::StartGame(StartGame {
            hardcore: true,
            world_game_mode: VarInt(1),
            ..Default::default()
        })]);
        let pks = V662.downgrade(pks);
        match &pks[..] {
            [Packet::StartGame_NoHardcore(pk)] => assert_eq!(pk.world_game_mode, VarInt(1)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_synced_entity_id_signed() {
        let pks = V662.downgrade(vec![Packet::UpdateBlockSynced(UpdateBlockSynced {
            entity_unique_id: VarULong(u64::MAX),
            transition_type: VarULong(1),
            ..Default::default()
        })]);
        match &pks[..] {
            [Packet::UpdateBlockSynced_SignedEntity(pk)] => {
                assert_eq!(pk.entity_unique_id, VarLong(-1));
                assert_eq!(pk.transition_type, VarULong(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_game_type_tick_dropped() {
        let pks = V662.downgrade(vec![
            Packet::UpdatePlayerGameType(UpdatePlayerGameType {
                game_type: VarInt(2),
                player_unique_id: VarLong(7),
                tick: VarULong(40),
            }),
            Packet::ResourcePackStack(ResourcePackStack {
                include_editor_packs: true,
                ..Default::default()
            }),
        ]);
        match &pks[..] {
            [Packet::UpdatePlayerGameType_NoTick(gt), Packet::ResourcePackStack_NoEditorPacks(_)] => {
                assert_eq!(gt.game_type, VarInt(2));
                assert_eq!(gt.player_unique_id, VarLong(7));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
