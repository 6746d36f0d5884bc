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

/// 1.20.60, before effects and motion carried the server tick.
pub struct V649;

impl Version for V649 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        649
    }

    fn version(&self) -> &'static str {
        "1.20.60"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        match dir {
            Direction::Clientbound => vec![
                PoolEdit::insert(Kind::MobEffect_NoTick),
                PoolEdit::insert(Kind::SetActorMotion_NoTick),
            ],
            Direction::Serverbound => vec![PoolEdit::insert(Kind::LecternUpdate_DropBook)],
        }
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::LecternUpdate_DropBook(pk) => Packet::LecternUpdate(LecternUpdate {
                    page: pk.page,
                    page_count: pk.page_count,
                    position: pk.position,
                }),
                pk => pk,
            })
            .collect()
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks.into_iter()
            .map(|pk| match pk {
                Packet::MobEffect_NoAmbient(pk) => Packet::MobEffect_NoTick(MobEffect_NoTick {
                    entity_runtime_id: pk.entity_runtime_id,
                    operation: pk.operation,
                    effect_type: pk.effect_type,
                    amplifier: pk.amplifier,
                    particles: pk.particles,
                    duration: pk.duration,
                }),
                Packet::SetActorMotion(pk) => Packet::SetActorMotion_NoTick(SetActorMotion_NoTick {
                    entity_runtime_id: pk.entity_runtime_id,
                    velocity: pk.velocity,
                }),
                pk => pk,
            })
            .collect()
    }
}
