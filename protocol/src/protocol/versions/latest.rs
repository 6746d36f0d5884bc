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
use crate::protocol::packet::{Kind, Packet};
use crate::protocol::Direction;

pub const LATEST_PROTOCOL: i32 = 748;

const CLIENTBOUND: &[Kind] = &[
    Kind::Disconnect,
    Kind::ResourcePackStack,
    Kind::StartGame,
    Kind::AddActor,
    Kind::AddItemActor,
    Kind::UpdateBlock,
    Kind::LevelEvent,
    Kind::MobEffect,
    Kind::InventoryTransaction,
    Kind::MobEquipment,
    Kind::MobArmourEquipment,
    Kind::SetActorData,
    Kind::SetActorMotion,
    Kind::InventoryContent,
    Kind::InventorySlot,
    Kind::LevelChunk,
    Kind::Transfer,
    Kind::UpdateBlockSynced,
    Kind::LevelSoundEvent,
    Kind::ClientCacheMissResponse,
    Kind::Emote,
    Kind::UpdatePlayerGameType,
    Kind::CorrectPlayerMovePrediction,
    Kind::UpdateSubChunkBlocks,
    Kind::SubChunk,
    Kind::EditorNetwork,
    Kind::SetHud,
    Kind::CameraAimAssist,
    Kind::ContainerRegistryCleanup,
    Kind::MovementEffect,
    Kind::SetMovementAuthority,
];

const SERVERBOUND: &[Kind] = &[
    Kind::InventoryTransaction,
    Kind::MobEquipment,
    Kind::MobArmourEquipment,
    Kind::LevelSoundEvent,
    Kind::LecternUpdate,
    Kind::ClientCacheStatus,
    Kind::Emote,
    Kind::PlayerAuthInput,
    Kind::EditorNetwork,
    Kind::ServerBoundLoadingScreen,
    Kind::ServerBoundDiagnostics,
];

/// 1.21.40, the protocol the server speaks.
pub struct Latest;

impl Version for Latest {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        LATEST_PROTOCOL
    }

    fn version(&self) -> &'static str {
        "1.21.40"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        let kinds = match dir {
            Direction::Serverbound => SERVERBOUND,
            Direction::Clientbound => CLIENTBOUND,
        };
        kinds.iter().map(|k| PoolEdit::insert(*k)).collect()
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks
    }
}
