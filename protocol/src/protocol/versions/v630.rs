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

/// 1.20.50, the oldest protocol supported.
pub struct V630;

const PROTOCOL: i32 = 630;

impl Version for V630 {
    type Packet = Packet;
    type Kind = Kind;

    fn protocol_id(&self) -> i32 {
        PROTOCOL
    }

    fn version(&self) -> &'static str {
        "1.20.50"
    }

    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Kind>> {
        match dir {
            Direction::Clientbound => vec![
                PoolEdit::insert(Kind::LevelChunk_NoDimension),
                PoolEdit::remove(Kind::SetHud),
            ],
            Direction::Serverbound => vec![],
        }
    }

    fn upgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        pks
    }

    fn downgrade(&self, pks: Vec<Packet>) -> Vec<Packet> {
        drop_kinds(pks, &[Kind::SetHud], PROTOCOL)
            .into_iter()
            .map(|pk| match pk {
                // The client places the chunk in its current dimension.
                Packet::LevelChunk(pk) => Packet::LevelChunk_NoDimension(LevelChunk_NoDimension {
                    position: pk.position,
                    sub_chunk_count: pk.sub_chunk_count,
                    blob_hashes: pk.blob_hashes,
                    raw_payload: pk.raw_payload,
                }),
                pk => pk,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::{LenPrefixedBytes, RemainingBytes, VarInt};
    use crate::types::ChunkPos;

    #[test]
    fn test_chunk_dimension_dropped() {
        let pks = V630.downgrade(vec![
            Packet::SetHud(SetHud {
                data: RemainingBytes(vec![1, 0, 0]),
            }),
            Packet::LevelChunk(LevelChunk {
                position: ChunkPos { x: 3, z: -2 },
                dimension: VarInt(1),
                sub_chunk_count: SubChunkCount::Limitless,
                blob_hashes: None,
                raw_payload: LenPrefixedBytes::new(vec![0]),
            }),
        ]);
        match &pks[..] {
            [Packet::LevelChunk_NoDimension(pk)] => {
                assert_eq!(pk.position, ChunkPos { x: 3, z: -2 });
                assert_eq!(pk.sub_chunk_count, SubChunkCount::Limitless);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_level_chunk_wire() {
        let pk = Packet::LevelChunk_NoDimension(LevelChunk_NoDimension {
            position: ChunkPos { x: 1, z: -1 },
            sub_chunk_count: SubChunkCount::Count(2),
            blob_hashes: None,
            raw_payload: LenPrefixedBytes::new(vec![1, 2, 3]),
        });
        let mut data = Vec::new();
        pk.write_to(&mut data).unwrap();
        // x, z, count, cache flag, payload
        assert_eq!(data, vec![2, 1, 2, 0, 3, 1, 2, 3]);
    }
}
