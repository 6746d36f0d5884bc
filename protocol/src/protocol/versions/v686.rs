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
use crate::item::Stack;
use crate::protocol::packet::*;
use crate::protocol::Direction;

/// 1.21.2
pub struct V686;

const PROTOCOL: i32 = 686;

impl Version for V686 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        PROTOCOL
    }

    fn version(&self) -> &'static str {
        "1.21.2"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        let mut edits = vec![
            PoolEdit::insert(Kind::MobArmourEquipment_NoBody),
            PoolEdit::insert(Kind::EditorNetwork_NoRoute),
        ];
        if dir == Direction::Serverbound {
            edits.push(PoolEdit::remove(Kind::ServerBoundDiagnostics));
            edits.push(PoolEdit::remove(Kind::ServerBoundLoadingScreen));
        }
        edits
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::MobArmourEquipment_NoBody(pk) => Packet::MobArmourEquipment(MobArmourEquipment {
                    entity_runtime_id: pk.entity_runtime_id,
                    helmet: pk.helmet,
                    chestplate: pk.chestplate,
                    leggings: pk.leggings,
                    boots: pk.boots,
                    body: Stack::default(),
                }),
                Packet::EditorNetwork_NoRoute(pk) => Packet::EditorNetwork(EditorNetwork {
                    route_to_manager: false,
                    payload: pk.payload,
                }),
                pk => pk,
            })
            .collect()
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        drop_kinds(
            pks,
            &[Kind::ServerBoundDiagnostics, Kind::ServerBoundLoadingScreen],
            PROTOCOL,
        )
        .into_iter()
        .map(|pk| match pk {
            Packet::MobArmourEquipment(pk) => Packet::MobArmourEquipment_NoBody(MobArmourEquipment_NoBody {
                entity_runtime_id: pk.entity_runtime_id,
                helmet: pk.helmet,
                chestplate: pk.chestplate,
                leggings: pk.leggings,
                boots: pk.boots,
            }),
            Packet::EditorNetwork(pk) => Packet::EditorNetwork_NoRoute(EditorNetwork_NoRoute { payload: pk.payload }),
            pk => pk,
        })
        .collect()
    }
}

#[test]
fn test_armour_body_slot() {
    let helmet = Stack {
        id: 340,
        count: 1,
        ..Default::default()
    };
    let pks = V686.upgrade(vec![Packet::MobArmourEquipment_NoBody(MobArmourEquipment_NoBody {
        helmet: helmet.clone(),
        ..Default::default()
    })]);
    match &pks[..] {
        [Packet::MobArmourEquipment(pk)] => {
            assert_eq!(pk.helmet, helmet);
            assert!(pk.body.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }
    let pks = V686.downgrade(pks);
    assert_eq!(pks[0].kind(), Kind::MobArmourEquipment_NoBody);
}
