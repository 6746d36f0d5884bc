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
use crate::protocol::Direction;

/// 1.20.80
pub struct V671;

impl Version for V671 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        671
    }

    fn version(&self) -> &'static str {
        "1.20.80"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        match dir {
            Direction::Clientbound => vec![
                PoolEdit::insert(Kind::Disconnect_NoFilter),
                PoolEdit::insert(Kind::CorrectPlayerMovePrediction_NoType),
                PoolEdit::insert(Kind::StartGame_NoServerIds),
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
                Packet::Disconnect(pk) => Packet::Disconnect_NoFilter(Disconnect_NoFilter {
                    reason: pk.reason,
                    hide_disconnection_screen: pk.hide_disconnection_screen,
                    message: pk.message,
                }),
                Packet::CorrectPlayerMovePrediction(pk) => {
                    Packet::CorrectPlayerMovePrediction_NoType(CorrectPlayerMovePrediction_NoType {
                        position: pk.position,
                        delta: pk.delta,
                        on_ground: pk.on_ground,
                        tick: pk.tick,
                    })
                }
                Packet::StartGame(pk) => Packet::StartGame_NoServerIds(StartGame_NoServerIds {
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
                    hardcore: pk.hardcore,
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
                pk => pk,
            })
            .collect()
    }
}

#[test]
fn test_disconnect_filter_dropped() {
    let pks = V671.downgrade(vec![Packet::Disconnect(Disconnect {
        message: "bye".to_owned(),
        filtered_message: "b*e".to_owned(),
        ..Default::default()
    })]);
    match &pks[..] {
        [Packet::Disconnect_NoFilter(pk)] => assert_eq!(pk.message, "bye"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_start_game_server_ids_dropped() {
    let pks = V671.downgrade(vec![Packet::StartGame(StartGame {
        hardcore: true,
        server_id: "lobby".to_owned(),
        game_version: "1.21.40".to_owned(),
        ..Default::default()
    })]);
    match &pks[..] {
        [Packet::StartGame_NoServerIds(pk)] => {
            assert!(pk.hardcore);
            assert_eq!(pk.game_version, "1.21.40");
        }
        other => panic!("unexpected {:?}", other),
    }
}
