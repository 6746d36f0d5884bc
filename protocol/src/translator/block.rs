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

use super::{translate_block_runtime_id, Context};
use crate::chunk::encoding::{NetworkEncoding, NetworkPersistentEncoding, Reader, SubChunkVersion};
use crate::chunk::{decode, encode, Chunk, PalettedStorage, SubChunk};
use crate::mapping::BlockMapping;
use crate::nbt;
use crate::protocol::packet::{
    level_event, sound_event, LevelChunk, Packet, SubChunkCount, TransactionData,
    SUB_CHUNK_RESULT_SUCCESS,
};
use crate::protocol::{self, packet, LenPrefixedBytes, VarInt, VarUInt};
use crate::shared::Range;
use crate::types::{self, Dimension};

use byteorder::ReadBytesExt;
use log::{debug, warn};
use std::io::{self, Read};
use std::sync::Arc;

/// Range of the chunks sent to clients on the old chunk format.
const OLD_FORMAT_RANGE: Range = Range::new(0, 255);

const FALLING_BLOCK: &str = "minecraft:falling_block";

/// Translates block runtime ids between the latest protocol and one older
/// protocol.
pub struct BlockTranslator {
    mapping: Arc<BlockMapping>,
    latest: Arc<BlockMapping>,
    /// Resolves persistent palettes in chunks coming from the server.
    persistent: NetworkPersistentEncoding,
    old_format: bool,
}

impl BlockTranslator {
    pub fn new(mapping: Arc<BlockMapping>, latest: Arc<BlockMapping>, old_format: bool) -> BlockTranslator {
        BlockTranslator {
            persistent: NetworkPersistentEncoding::new(latest.clone()),
            mapping,
            latest,
            old_format,
        }
    }

    /// Whether both sides share the same table, in which case ids never
    /// need rewriting.
    pub fn is_identity(&self) -> bool {
        Arc::ptr_eq(&self.mapping, &self.latest)
    }

    pub fn downgrade_block_runtime_id(&self, id: u32) -> u32 {
        translate_block_runtime_id(&self.latest, &self.mapping, id)
    }

    pub fn upgrade_block_runtime_id(&self, id: u32) -> u32 {
        translate_block_runtime_id(&self.mapping, &self.latest, id)
    }

    /// Rewrites packets sent by the server. Packets whose payload fails to
    /// decode are dropped.
    pub fn downgrade_packets(&self, pks: Vec<Packet>, ctx: &Context) -> Vec<Packet> {
        let mut out = Vec::with_capacity(pks.len());
        for pk in pks {
            let kind = pk.kind();
            match self.downgrade_packet(pk, ctx) {
                Ok(pk) => out.push(pk),
                Err(err) => warn!("Dropped {} the client can't be sent: {}", kind.name(), err),
            }
        }
        out
    }

    fn downgrade_packet(&self, pk: Packet, ctx: &Context) -> Result<Packet, protocol::Error> {
        if let Packet::StartGame(ref sg) = pk {
            self.latest.adjust(&sg.blocks.data);
            if !self.is_identity() {
                self.mapping.adjust(&sg.blocks.data);
            }
        }
        if self.is_identity() {
            return Ok(pk);
        }
        Ok(match pk {
            Packet::LevelChunk(pk) => Packet::LevelChunk(self.downgrade_level_chunk(pk, ctx)?),
            Packet::SubChunk(pk) => Packet::SubChunk(self.downgrade_sub_chunk_packet(pk, ctx)?),
            Packet::UpdateSubChunkBlocks(mut pk) => {
                for b in pk.blocks.data.iter_mut().chain(pk.extra.data.iter_mut()) {
                    b.block_runtime_id = VarUInt(self.downgrade_block_runtime_id(b.block_runtime_id.0));
                }
                Packet::UpdateSubChunkBlocks(pk)
            }
            Packet::UpdateBlock(mut pk) => {
                pk.new_block_runtime_id = VarUInt(self.downgrade_block_runtime_id(pk.new_block_runtime_id.0));
                Packet::UpdateBlock(pk)
            }
            Packet::UpdateBlockSynced(mut pk) => {
                pk.new_block_runtime_id = VarUInt(self.downgrade_block_runtime_id(pk.new_block_runtime_id.0));
                Packet::UpdateBlockSynced(pk)
            }
            Packet::InventoryTransaction(mut pk) => {
                if let TransactionData::UseItem(ref mut d) = pk.data {
                    d.block_runtime_id = VarUInt(self.downgrade_block_runtime_id(d.block_runtime_id.0));
                }
                Packet::InventoryTransaction(pk)
            }
            Packet::LevelEvent(mut pk) => {
                pk.event_data = VarInt(self.downgrade_event_data(pk.event_type.0, pk.event_data.0));
                Packet::LevelEvent(pk)
            }
            Packet::LevelSoundEvent(mut pk) => {
                if carries_block(pk.sound_type.0) {
                    pk.extra_data = VarInt(self.downgrade_block_runtime_id(pk.extra_data.0 as u32) as i32);
                }
                Packet::LevelSoundEvent(pk)
            }
            Packet::AddActor(mut pk) => {
                if pk.entity_type == FALLING_BLOCK {
                    self.translate_variant(&mut pk.metadata, &self.latest, &self.mapping);
                }
                Packet::AddActor(pk)
            }
            Packet::SetActorData(mut pk) => {
                self.translate_variant(&mut pk.metadata, &self.latest, &self.mapping);
                Packet::SetActorData(pk)
            }
            pk => pk,
        })
    }

    /// Rewrites packets sent by the client.
    pub fn upgrade_packets(&self, pks: Vec<Packet>, _ctx: &Context) -> Vec<Packet> {
        if self.is_identity() {
            return pks;
        }
        pks.into_iter()
            .map(|pk| match pk {
                Packet::InventoryTransaction(mut pk) => {
                    if let TransactionData::UseItem(ref mut d) = pk.data {
                        d.block_runtime_id = VarUInt(self.upgrade_block_runtime_id(d.block_runtime_id.0));
                    }
                    Packet::InventoryTransaction(pk)
                }
                Packet::LevelSoundEvent(mut pk) => {
                    if carries_block(pk.sound_type.0) {
                        pk.extra_data = VarInt(self.upgrade_block_runtime_id(pk.extra_data.0 as u32) as i32);
                    }
                    Packet::LevelSoundEvent(pk)
                }
                Packet::SetActorData(mut pk) => {
                    self.translate_variant(&mut pk.metadata, &self.mapping, &self.latest);
                    Packet::SetActorData(pk)
                }
                // Cached chunk blobs can't be rewritten, so the server
                // must never start using them.
                Packet::ClientCacheStatus(pk) if pk.enabled => {
                    debug!("Turning off the blob cache for a translated client");
                    Packet::ClientCacheStatus(packet::ClientCacheStatus { enabled: false })
                }
                pk => pk,
            })
            .collect()
    }

    fn downgrade_event_data(&self, event_type: i32, data: i32) -> i32 {
        match event_type {
            level_event::PARTICLE_TERRAIN
            | level_event::PARTICLES_DESTROY_BLOCK
            | level_event::PARTICLES_DESTROY_BLOCK_NO_SOUND => {
                self.downgrade_block_runtime_id(data as u32) as i32
            }
            level_event::PARTICLES_CRACK_BLOCK => {
                let face = data >> 24;
                let id = self.downgrade_block_runtime_id((data & 0xffff) as u32);
                id as i32 | (face << 24)
            }
            _ => data,
        }
    }

    fn translate_variant(&self, metadata: &mut types::Metadata, from: &BlockMapping, to: &BlockMapping) {
        if let Some(id) = metadata.get(&types::VARIANT).copied() {
            metadata.put(&types::VARIANT, translate_block_runtime_id(from, to, id as u32) as i32);
        }
    }

    fn downgrade_level_chunk(&self, mut pk: LevelChunk, ctx: &Context) -> Result<LevelChunk, protocol::Error> {
        let count = match pk.sub_chunk_count {
            SubChunkCount::Count(count) => count as usize,
            // Sub-chunks are requested separately, nothing to rewrite here.
            _ => return Ok(pk),
        };
        if pk.blob_hashes.is_some() || ctx.client_cache_enabled {
            return Ok(pk);
        }
        let range = Dimension::from_int(pk.dimension.0).range();
        let data = &pk.raw_payload.data[..];
        let mut buf = io::Cursor::new(data);
        let c = decode::network_decode(self.latest.air(), &mut buf, count, false, range, &self.persistent)?;
        let c = self.downgrade_chunk(c);

        let mut out = encode::network_encode(&c, self.old_format)?;
        self.rewrite_trailer(&mut buf, &mut out, true);
        pk.sub_chunk_count = SubChunkCount::Count(c.sub().len() as u32);
        pk.raw_payload = LenPrefixedBytes::new(out);
        Ok(pk)
    }

    fn downgrade_sub_chunk_packet(&self, mut pk: packet::SubChunk, ctx: &Context) -> Result<packet::SubChunk, protocol::Error> {
        if pk.cache_enabled || ctx.client_cache_enabled {
            return Ok(pk);
        }
        let range = Dimension::from_int(pk.dimension.0).range();
        let target = if self.old_format { OLD_FORMAT_RANGE } else { range };
        for (i, entry) in pk.entries.iter_mut().enumerate() {
            if entry.result != SUB_CHUNK_RESULT_SUCCESS {
                continue;
            }
            let mut buf = io::Cursor::new(&entry.raw_payload[..]);
            let mut index = i as u8;
            let mut sub = decode::decode_sub_chunk(
                &mut buf,
                self.latest.air(),
                range,
                &mut index,
                &NetworkEncoding,
                Some(&self.persistent),
                &NetworkEncoding,
            )?;
            self.downgrade_sub_chunk(&mut sub);
            // The stored index is absolute, re-base it on the target range.
            let abs = index as i32 + (range.min >> 4);
            let target_index = (abs - (target.min >> 4)) as usize;
            let mut out = encode::encode_sub_chunk(
                &sub,
                &NetworkEncoding,
                &NetworkEncoding,
                SubChunkVersion::V9,
                target,
                target_index,
            )?;
            self.rewrite_trailer(&mut buf, &mut out, false);
            entry.raw_payload = out;
        }
        Ok(pk)
    }

    /// Moves a chunk to this translator's ids, cutting it down to the old
    /// range for clients on the old format. Biome ids are kept as they are.
    pub fn downgrade_chunk(&self, mut c: Chunk) -> Chunk {
        for sub in c.sub_mut() {
            self.downgrade_sub_chunk(sub);
        }
        if !self.old_format || c.range() == OLD_FORMAT_RANGE {
            return rebase_air(c, self.mapping.air());
        }

        let range = c.range();
        let air = self.mapping.air();
        let mut sub = Vec::with_capacity(OLD_FORMAT_RANGE.sub_chunks());
        let mut biomes = Vec::with_capacity(OLD_FORMAT_RANGE.sub_chunks());
        let offset = (OLD_FORMAT_RANGE.min - range.min) >> 4;
        for i in 0..OLD_FORMAT_RANGE.sub_chunks() as i32 {
            let source = i + offset;
            if source >= 0 && (source as usize) < c.sub().len() {
                sub.push(c.sub()[source as usize].clone());
                biomes.push(c.biomes()[source as usize].clone());
            } else {
                sub.push(SubChunk::new(air));
                biomes.push(PalettedStorage::uniform(0));
            }
        }
        c.replace_range(OLD_FORMAT_RANGE, sub, biomes);
        rebase_air(c, air)
    }

    pub fn downgrade_sub_chunk(&self, sub: &mut SubChunk) {
        if self.is_identity() {
            return;
        }
        for s in sub.layers_mut() {
            s.palette_mut()
                .replace(|v| translate_block_runtime_id(&self.latest, &self.mapping, v));
        }
    }

    /// Copies what follows the block data: the border blocks of a level
    /// chunk and the block entities. Block entities are rewritten one by one,
    /// anything that doesn't parse is copied as it is.
    fn rewrite_trailer(&self, buf: &mut Reader, out: &mut Vec<u8>, border_blocks: bool) {
        let data = *buf.get_ref();
        if border_blocks {
            let start = buf.position() as usize;
            let border = buf.read_u8().map_err(protocol::Error::from).and_then(|count| {
                let mut blocks = vec![0; count as usize];
                buf.read_exact(&mut blocks)?;
                Ok((count, blocks))
            });
            match border {
                Ok((count, blocks)) => {
                    out.push(count);
                    out.extend_from_slice(&blocks);
                }
                Err(_) => {
                    out.extend_from_slice(&data[start..]);
                    return;
                }
            }
        }
        loop {
            let start = buf.position() as usize;
            if start >= data.len() {
                return;
            }
            let mut tag = match nbt::NamedTag::read(buf, nbt::Encoding::NetworkLittleEndian) {
                Ok(tag) => tag,
                Err(err) => {
                    debug!("Copying {} bytes of block entity data as is: {}", data.len() - start, err);
                    out.extend_from_slice(&data[start..]);
                    return;
                }
            };
            self.mapping.downgrade_block_actor_data(&mut tag.1);
            let mut tmp = Vec::new();
            match tag.write(&mut tmp, nbt::Encoding::NetworkLittleEndian) {
                Ok(()) => out.extend_from_slice(&tmp),
                Err(_) => out.extend_from_slice(&data[start..buf.position() as usize]),
            }
        }
    }
}

/// Chunks built for the other side need that side's air for sub-chunks
/// created afterwards.
fn rebase_air(c: Chunk, air: u32) -> Chunk {
    if c.air() == air {
        return c;
    }
    let range = c.range();
    let sub = c
        .sub()
        .iter()
        .map(|s| SubChunk::with_layers(air, s.layers().to_vec()))
        .collect();
    let mut out = Chunk::new(air, range);
    out.replace_range(range, sub, c.biomes().to_vec());
    out
}

fn carries_block(sound: u32) -> bool {
    matches!(
        sound,
        sound_event::ITEM_USE_ON | sound_event::HIT | sound_event::BREAK | sound_event::PLACE | sound_event::LAND
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mapping::test_states;
    use crate::protocol::packet::{AddActor, ClientCacheStatus, LevelEvent, UpdateBlock};
    use crate::shared::Position;
    use crate::types::ChunkPos;

    /// The latest table, and an older one with the wools swapped and an
    /// extra block in front so every id differs.
    fn mappings() -> (Arc<BlockMapping>, Arc<BlockMapping>) {
        let latest = Arc::new(BlockMapping::from_states(test_states(2)).unwrap());
        let mut old = test_states(1);
        old.swap(2, 3);
        old.insert(0, crate::mapping::BlockState::new("minecraft:dirt", nbt::Compound::new(), 1));
        (latest, Arc::new(BlockMapping::from_states(old).unwrap()))
    }

    fn translator(old_format: bool) -> BlockTranslator {
        let (latest, old) = mappings();
        BlockTranslator::new(old, latest, old_format)
    }

    fn level_chunk(c: &Chunk, trailer: &[u8]) -> Packet {
        let mut payload = encode::network_encode(c, false).unwrap();
        payload.extend_from_slice(trailer);
        Packet::LevelChunk(LevelChunk {
            position: ChunkPos { x: 0, z: 0 },
            dimension: VarInt(0),
            sub_chunk_count: SubChunkCount::Count(c.sub().len() as u32),
            blob_hashes: None,
            raw_payload: LenPrefixedBytes::new(payload),
        })
    }

    #[test]
    fn test_identity_untouched() {
        let (latest, _) = mappings();
        let t = BlockTranslator::new(latest.clone(), latest, false);
        assert!(t.is_identity());
        let pk = Packet::UpdateBlock(UpdateBlock {
            new_block_runtime_id: VarUInt(3),
            ..Default::default()
        });
        assert_eq!(t.downgrade_packets(vec![pk.clone()], &Context::default()), vec![pk]);
    }

    #[test]
    fn test_update_block() {
        let t = translator(false);
        let pk = Packet::UpdateBlock(UpdateBlock {
            position: Position::new(1, 2, 3),
            new_block_runtime_id: VarUInt(2),
            ..Default::default()
        });
        match &t.downgrade_packets(vec![pk], &Context::default())[..] {
            [Packet::UpdateBlock(pk)] => assert_eq!(pk.new_block_runtime_id.0, 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_id_becomes_air() {
        let t = translator(false);
        assert_eq!(t.downgrade_block_runtime_id(999), 1);
        assert_eq!(t.upgrade_block_runtime_id(999), 0);
    }

    #[test]
    fn test_crack_keeps_face() {
        let t = translator(false);
        let pk = Packet::LevelEvent(LevelEvent {
            event_type: VarInt(level_event::PARTICLES_CRACK_BLOCK),
            event_data: VarInt(3 << 24 | 1),
            ..Default::default()
        });
        match &t.downgrade_packets(vec![pk], &Context::default())[..] {
            [Packet::LevelEvent(pk)] => assert_eq!(pk.event_data.0, 3 << 24 | 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_falling_block_variant() {
        let t = translator(false);
        let mut metadata = types::Metadata::new();
        metadata.put(&types::VARIANT, 4);
        let pk = Packet::AddActor(AddActor {
            entity_type: FALLING_BLOCK.to_owned(),
            metadata,
            ..Default::default()
        });
        match &t.downgrade_packets(vec![pk], &Context::default())[..] {
            [Packet::AddActor(pk)] => assert_eq!(pk.metadata.get(&types::VARIANT), Some(&5)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cache_forced_off() {
        let t = translator(false);
        let pk = Packet::ClientCacheStatus(ClientCacheStatus { enabled: true });
        assert_eq!(
            t.upgrade_packets(vec![pk], &Context::default()),
            vec![Packet::ClientCacheStatus(ClientCacheStatus { enabled: false })]
        );
    }

    #[test]
    fn test_level_chunk_downgrade() {
        let t = translator(false);
        let mut c = Chunk::new(0, Range::new(-64, 319));
        c.set_block(0, -64, 0, 0, 1);
        c.set_block(1, 10, 1, 0, 2);

        let mut trailer = vec![0];
        let mut actor = nbt::Compound::new();
        actor.put("id", nbt::Tag::String("Chest".to_owned()));
        nbt::write_compound(&mut trailer, nbt::Encoding::NetworkLittleEndian, &actor).unwrap();

        let out = t.downgrade_packets(vec![level_chunk(&c, &trailer)], &Context::default());
        let pk = match &out[..] {
            [Packet::LevelChunk(pk)] => pk,
            other => panic!("unexpected {:?}", other),
        };
        let data = &pk.raw_payload.data[..];
        let mut buf = io::Cursor::new(data);
        let old = NetworkPersistentEncoding::new(t.mapping.clone());
        let back = decode::network_decode(1, &mut buf, 24, false, Range::new(-64, 319), &old).unwrap();
        assert_eq!(back.block(0, -64, 0, 0), 2);
        assert_eq!(back.block(1, 10, 1, 0), 4);
        assert_eq!(back.block(5, 5, 5, 0), 1);
        assert_eq!(&data[buf.position() as usize..], &trailer[..]);
    }

    #[test]
    fn test_level_chunk_old_format() {
        let t = translator(true);
        let mut c = Chunk::new(0, Range::new(-64, 319));
        c.set_block(0, -64, 0, 0, 1);
        c.set_block(0, 0, 0, 0, 1);
        c.set_block(0, 255, 0, 0, 1);
        c.set_block(0, 256, 0, 0, 1);

        let out = t.downgrade_packets(vec![level_chunk(&c, &[0])], &Context::default());
        let pk = match &out[..] {
            [Packet::LevelChunk(pk)] => pk,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(pk.sub_chunk_count, SubChunkCount::Count(16));
        let data = &pk.raw_payload.data[..];
        let old = NetworkPersistentEncoding::new(t.mapping.clone());
        let mut buf = io::Cursor::new(data);
        let back = decode::network_decode(1, &mut buf, 16, true, OLD_FORMAT_RANGE, &old).unwrap();
        assert_eq!(back.block(0, 0, 0, 0), 2);
        assert_eq!(back.block(0, 255, 0, 0), 2);
        assert_eq!(back.block(0, 254, 0, 0), 1);
        assert_eq!(&data[buf.position() as usize..], &[0]);
    }

    #[test]
    fn test_border_blocks_copied() {
        let t = translator(false);
        let mut c = Chunk::new(0, Range::new(-64, 319));
        c.set_block(3, 3, 3, 0, 3);
        let out = t.downgrade_packets(vec![level_chunk(&c, &[2, 7, 8])], &Context::default());
        let pk = match &out[..] {
            [Packet::LevelChunk(pk)] => pk,
            other => panic!("unexpected {:?}", other),
        };
        let data = &pk.raw_payload.data[..];
        assert_eq!(&data[data.len() - 3..], &[2, 7, 8]);
    }

    #[test]
    fn test_requested_sub_chunks_untouched() {
        let t = translator(false);
        let pk = Packet::LevelChunk(LevelChunk {
            sub_chunk_count: SubChunkCount::Limited { highest: 4 },
            raw_payload: LenPrefixedBytes::new(vec![0]),
            ..Default::default()
        });
        assert_eq!(t.downgrade_packets(vec![pk.clone()], &Context::default()), vec![pk]);
    }

    #[test]
    fn test_cached_chunk_untouched() {
        let t = translator(false);
        let c = Chunk::new(0, Range::new(-64, 319));
        let pk = level_chunk(&c, &[0]);
        let ctx = Context {
            client_cache_enabled: true,
        };
        assert_eq!(t.downgrade_packets(vec![pk.clone()], &ctx), vec![pk]);
    }

    #[test]
    fn test_bad_chunk_dropped() {
        let t = translator(false);
        let pk = Packet::LevelChunk(LevelChunk {
            sub_chunk_count: SubChunkCount::Count(1),
            raw_payload: LenPrefixedBytes::new(vec![3, 1]),
            ..Default::default()
        });
        assert!(t.downgrade_packets(vec![pk], &Context::default()).is_empty());
    }

    #[test]
    fn test_block_actor_states() {
        let t = translator(false);
        let mut buf = io::Cursor::new(&[][..]);
        let mut out = Vec::new();
        t.rewrite_trailer(&mut buf, &mut out, false);
        assert!(out.is_empty());

        let mut actor = nbt::Compound::new();
        let mut state = nbt::Compound::new();
        state.put("name", nbt::Tag::String("minecraft:oak_log".to_owned()));
        state.put("states", nbt::Tag::new_compound());
        state.put("version", nbt::Tag::Int(2));
        actor.put("block", nbt::Tag::Compound(state));
        let mut data = Vec::new();
        nbt::write_compound(&mut data, nbt::Encoding::NetworkLittleEndian, &actor).unwrap();
        // trailing garbage is copied as is
        data.extend_from_slice(&[0xff, 0xff]);

        let mut buf = io::Cursor::new(&data[..]);
        t.rewrite_trailer(&mut buf, &mut out, false);
        let mut cur = io::Cursor::new(&out[..]);
        let c = nbt::read_compound(&mut cur, nbt::Encoding::NetworkLittleEndian).unwrap();
        let block = c.get("block").and_then(nbt::Tag::as_compound).unwrap();
        // the log without its properties isn't in the old table
        assert_eq!(block.get("name").and_then(nbt::Tag::as_str), Some("minecraft:air"));
        assert_eq!(block.get("version").and_then(nbt::Tag::as_int), Some(1));
        assert_eq!(&out[cur.position() as usize..], &[0xff, 0xff]);
    }
}
