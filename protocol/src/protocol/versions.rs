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

//! The supported protocol versions, as a chain of nodes ordered from the
//! oldest to the latest. Each node knows how its packets differ from the
//! next newer node's and nothing more.

use crate::protocol::packet::{Kind, Packet};
use crate::protocol::{Direction, Reader, Writer};
use crate::translator::{BlockTranslator, Context, ItemTranslator};

use log::debug;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

mod latest;
mod v630;
mod v649;
mod v662;
mod v671;
mod v685;
mod v686;
mod v712;
mod v729;

pub use self::latest::LATEST_PROTOCOL;

/// The packet shapes a protocol reads and writes, by packet id.
#[derive(Clone, Debug)]
pub struct Pool<K> {
    packets: HashMap<u32, K>,
}

impl<K: Copy> Pool<K> {
    pub fn new() -> Pool<K> {
        Pool {
            packets: HashMap::new(),
        }
    }

    pub fn get(&self, id: u32) -> Option<K> {
        self.packets.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.packets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn apply(&mut self, edits: &[PoolEdit<K>]) {
        for edit in edits {
            match *edit {
                PoolEdit::Remove(id) => {
                    self.packets.remove(&id);
                }
                PoolEdit::Insert(id, kind) => {
                    self.packets.insert(id, kind);
                }
            }
        }
    }
}

impl<K: Copy> Default for Pool<K> {
    fn default() -> Self {
        Pool::new()
    }
}

/// One change a node makes to the pool of the next newer node. Inserting
/// over an existing id replaces the shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolEdit<K> {
    Remove(u32),
    Insert(u32, K),
}

impl PoolEdit<Kind> {
    pub fn remove(kind: Kind) -> PoolEdit<Kind> {
        PoolEdit::Remove(kind.id())
    }

    pub fn insert(kind: Kind) -> PoolEdit<Kind> {
        PoolEdit::Insert(kind.id(), kind)
    }
}

/// A node of the version chain.
pub trait Version: Send + Sync {
    type Packet;
    type Kind;

    fn protocol_id(&self) -> i32;
    fn version(&self) -> &'static str;

    /// How this version's pool differs from the next newer version's. The
    /// latest version lists its whole pool.
    fn pool_diff(&self, dir: Direction) -> Vec<PoolEdit<Self::Kind>>;

    /// Converts packets of this version's shapes to the next newer
    /// version's.
    fn upgrade(&self, pks: Vec<Self::Packet>) -> Vec<Self::Packet>;

    /// Converts packets of the next newer version's shapes to this
    /// version's. Packets this version doesn't have are dropped.
    fn downgrade(&self, pks: Vec<Self::Packet>) -> Vec<Self::Packet>;
}

type Node<P, K> = Box<dyn Version<Packet = P, Kind = K>>;

struct Pools<K> {
    serverbound: Pool<K>,
    clientbound: Pool<K>,
}

/// An ordered list of version nodes, oldest first, the latest last.
pub struct Chain<P, K> {
    nodes: Vec<Node<P, K>>,
    pools: Vec<Pools<K>>,
}

impl<P, K: Copy + Eq + Hash> Chain<P, K> {
    /// Builds the chain and computes every node's pools by applying the
    /// diffs from the latest node downwards.
    pub fn new(nodes: Vec<Node<P, K>>) -> Chain<P, K> {
        let mut pools = Vec::with_capacity(nodes.len());
        let mut serverbound = Pool::new();
        let mut clientbound = Pool::new();
        for node in nodes.iter().rev() {
            serverbound.apply(&node.pool_diff(Direction::Serverbound));
            clientbound.apply(&node.pool_diff(Direction::Clientbound));
            pools.push(Pools {
                serverbound: serverbound.clone(),
                clientbound: clientbound.clone(),
            });
        }
        pools.reverse();
        Chain { nodes, pools }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The index of the latest node.
    pub fn latest(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn index_of(&self, protocol: i32) -> Option<usize> {
        self.nodes.iter().position(|n| n.protocol_id() == protocol)
    }

    pub fn node(&self, index: usize) -> &dyn Version<Packet = P, Kind = K> {
        &*self.nodes[index]
    }

    pub fn pool(&self, index: usize, dir: Direction) -> &Pool<K> {
        match dir {
            Direction::Serverbound => &self.pools[index].serverbound,
            Direction::Clientbound => &self.pools[index].clientbound,
        }
    }

    /// Brings packets of the node at `index` up to the latest shapes.
    pub fn upgrade(&self, index: usize, pks: Vec<P>) -> Vec<P> {
        self.nodes[index..]
            .iter()
            .fold(pks, |pks, node| node.upgrade(pks))
    }

    /// Brings packets of the latest shapes down to the node at `index`.
    pub fn downgrade(&self, index: usize, pks: Vec<P>) -> Vec<P> {
        self.nodes[index..]
            .iter()
            .rev()
            .fold(pks, |pks, node| node.downgrade(pks))
    }
}

/// Builds the chain of every supported version.
pub fn chain() -> Chain<Packet, Kind> {
    Chain::new(vec![
        Box::new(v630::V630),
        Box::new(v649::V649),
        Box::new(v662::V662),
        Box::new(v671::V671),
        Box::new(v685::V685),
        Box::new(v686::V686),
        Box::new(v712::V712),
        Box::new(v729::V729),
        Box::new(latest::Latest),
    ])
}

/// Drops the packets of `kinds`, for versions that don't have them.
pub(crate) fn drop_kinds(pks: Vec<Packet>, kinds: &[Kind], protocol: i32) -> Vec<Packet> {
    pks.into_iter()
        .filter(|pk| {
            let keep = !kinds.contains(&pk.kind());
            if !keep {
                debug!("Protocol {} has no {}, dropped", protocol, pk.kind().name());
            }
            keep
        })
        .collect()
}

/// One supported protocol: its place in the chain and the translators
/// between its tables and the latest ones.
pub struct Protocol {
    chain: Arc<Chain<Packet, Kind>>,
    index: usize,
    blocks: BlockTranslator,
    items: ItemTranslator,
    /// A resource pack uuid hidden from clients of older protocols.
    filter_pack: Option<String>,
}

impl Protocol {
    pub fn new(
        chain: Arc<Chain<Packet, Kind>>,
        index: usize,
        blocks: BlockTranslator,
        items: ItemTranslator,
        filter_pack: Option<String>,
    ) -> Protocol {
        Protocol {
            chain,
            index,
            blocks,
            items,
            filter_pack,
        }
    }

    pub fn protocol_id(&self) -> i32 {
        self.chain.node(self.index).protocol_id()
    }

    pub fn version(&self) -> &'static str {
        self.chain.node(self.index).version()
    }

    pub fn is_latest(&self) -> bool {
        self.index == self.chain.latest()
    }

    pub fn pool(&self, dir: Direction) -> &Pool<Kind> {
        self.chain.pool(self.index, dir)
    }

    pub fn new_reader(&self, dir: Direction) -> Reader<'_> {
        Reader::new(self.protocol_id(), self.pool(dir))
    }

    pub fn new_writer(&self, dir: Direction) -> Writer<'_> {
        Writer::new(self.protocol_id(), self.pool(dir))
    }

    pub fn blocks(&self) -> &BlockTranslator {
        &self.blocks
    }

    pub fn items(&self) -> &ItemTranslator {
        &self.items
    }

    /// Turns a packet sent by a client of this protocol into packets of
    /// the latest protocol.
    pub fn convert_to_latest(&self, pk: Packet, ctx: &Context) -> Vec<Packet> {
        let pks = self.chain.upgrade(self.index, vec![pk]);
        let pks = self.items.upgrade_packets(pks, ctx);
        self.blocks.upgrade_packets(pks, ctx)
    }

    /// Turns a packet of the latest protocol into packets a client of this
    /// protocol understands.
    pub fn convert_from_latest(&self, pk: Packet, ctx: &Context) -> Vec<Packet> {
        let pks = self.items.downgrade_packets(vec![pk], ctx);
        let mut pks = self.blocks.downgrade_packets(pks, ctx);
        if !self.is_latest() {
            if let Some(ref uuid) = self.filter_pack {
                for pk in &mut pks {
                    if let Packet::ResourcePackStack(ref mut stack) = *pk {
                        stack.texture_packs.data.retain(|p| &p.uuid != uuid);
                        stack.behaviour_packs.data.retain(|p| &p.uuid != uuid);
                    }
                }
            }
        }
        self.chain.downgrade(self.index, pks)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestKind {
        X,
        Y,
        Z,
    }

    #[derive(Debug, PartialEq)]
    enum TestPacket {
        X,
        Y(u32),
        Z(u32),
    }

    struct Node {
        protocol: i32,
        diff: Vec<PoolEdit<TestKind>>,
        upgrade: fn(TestPacket) -> Vec<TestPacket>,
        downgrade: fn(TestPacket) -> Vec<TestPacket>,
    }

    impl Version for Node {
        type Packet = TestPacket;
        type Kind = TestKind;

        fn protocol_id(&self) -> i32 {
            self.protocol
        }

        fn version(&self) -> &'static str {
            "test"
        }

        fn pool_diff(&self, _dir: Direction) -> Vec<PoolEdit<TestKind>> {
            self.diff.clone()
        }

        fn upgrade(&self, pks: Vec<TestPacket>) -> Vec<TestPacket> {
            pks.into_iter().flat_map(self.upgrade).collect()
        }

        fn downgrade(&self, pks: Vec<TestPacket>) -> Vec<TestPacket> {
            pks.into_iter().flat_map(self.downgrade).collect()
        }
    }

    fn same(pk: TestPacket) -> Vec<TestPacket> {
        vec![pk]
    }

    // v1 has no X and sends every Y twice, v2 calls Z Y.
    fn test_chain() -> Chain<TestPacket, TestKind> {
        Chain::new(vec![
            Box::new(Node {
                protocol: 1,
                diff: vec![PoolEdit::Remove(1)],
                upgrade: same,
                downgrade: |pk| match pk {
                    TestPacket::X => vec![],
                    TestPacket::Y(n) => vec![TestPacket::Y(n), TestPacket::Y(n + 1)],
                    pk => vec![pk],
                },
            }),
            Box::new(Node {
                protocol: 2,
                diff: vec![PoolEdit::Insert(2, TestKind::Y)],
                upgrade: |pk| match pk {
                    TestPacket::Y(n) => vec![TestPacket::Z(n)],
                    pk => vec![pk],
                },
                downgrade: |pk| match pk {
                    TestPacket::Z(n) => vec![TestPacket::Y(n)],
                    pk => vec![pk],
                },
            }),
            Box::new(Node {
                protocol: 3,
                diff: vec![
                    PoolEdit::Insert(1, TestKind::X),
                    PoolEdit::Insert(2, TestKind::Z),
                ],
                upgrade: same,
                downgrade: same,
            }),
        ])
    }

    #[test]
    fn test_chain_pools() {
        let chain = test_chain();
        assert_eq!(chain.latest(), 2);
        assert_eq!(chain.index_of(2), Some(1));
        assert_eq!(chain.index_of(9), None);

        let latest = chain.pool(2, Direction::Clientbound);
        assert_eq!(latest.get(1), Some(TestKind::X));
        assert_eq!(latest.get(2), Some(TestKind::Z));
        let v2 = chain.pool(1, Direction::Clientbound);
        assert_eq!(v2.get(1), Some(TestKind::X));
        assert_eq!(v2.get(2), Some(TestKind::Y));
        let v1 = chain.pool(0, Direction::Clientbound);
        assert_eq!(v1.get(1), None);
        assert_eq!(v1.ids(), vec![2]);
    }

    #[test]
    fn test_chain_order() {
        let chain = test_chain();
        assert_eq!(
            chain.downgrade(0, vec![TestPacket::X, TestPacket::Z(5)]),
            vec![TestPacket::Y(5), TestPacket::Y(6)]
        );
        assert_eq!(chain.upgrade(0, vec![TestPacket::Y(5)]), vec![TestPacket::Z(5)]);
        assert_eq!(
            chain.downgrade(1, vec![TestPacket::X, TestPacket::Z(5)]),
            vec![TestPacket::X, TestPacket::Y(5)]
        );
        assert_eq!(chain.upgrade(2, vec![TestPacket::Z(1)]), vec![TestPacket::Z(1)]);
    }

    #[test]
    fn test_supported_versions() {
        let chain = chain();
        let ids: Vec<i32> = (0..chain.len())
            .map(|i| chain.node(i).protocol_id())
            .collect();
        assert_eq!(ids, vec![630, 649, 662, 671, 685, 686, 712, 729, LATEST_PROTOCOL]);
    }

    #[test]
    fn test_pool_shapes() {
        let chain = chain();
        let latest = chain.latest();
        let c = |i, id| chain.pool(i, Direction::Clientbound).get(id);
        let s = |i, id| chain.pool(i, Direction::Serverbound).get(id);

        assert_eq!(c(latest, 0x1c), Some(Kind::MobEffect));
        assert_eq!(c(latest, 0x0b), Some(Kind::StartGame));
        assert_eq!(s(latest, 0x7d), Some(Kind::LecternUpdate));
        assert_eq!(c(latest - 1, 0x1c), Some(Kind::MobEffect_NoAmbient));
        assert_eq!(c(latest - 1, 0x13e), None);
        assert_eq!(c(latest, 0x13e), Some(Kind::MovementEffect));

        let v712 = chain.index_of(712).unwrap();
        assert_eq!(c(v712, 0x31), Some(Kind::InventoryContent_WindowId));
        assert_eq!(c(v712, 0x8a), Some(Kind::Emote_NoLength));
        assert_eq!(s(v712, 0x8a), Some(Kind::Emote_NoLength));
        assert_eq!(s(v712, 0x90), Some(Kind::PlayerAuthInput_Gaze));

        let v686 = chain.index_of(686).unwrap();
        assert_eq!(s(v686, 0x13b), None);
        assert_eq!(s(v686 + 1, 0x13b), Some(Kind::ServerBoundDiagnostics));
        assert_eq!(c(v686, 0x20), Some(Kind::MobArmourEquipment_NoBody));

        let v671 = chain.index_of(671).unwrap();
        assert_eq!(c(v671, 0x05), Some(Kind::Disconnect_NoFilter));
        assert_eq!(c(v671, 0xa1), Some(Kind::CorrectPlayerMovePrediction_NoType));
        assert_eq!(c(v671, 0x0b), Some(Kind::StartGame_NoServerIds));
        assert_eq!(s(v671, 0x1e), Some(Kind::InventoryTransaction_NoPrediction));
        assert_eq!(c(v671 + 1, 0x05), Some(Kind::Disconnect));
        assert_eq!(c(v671 + 1, 0x0b), Some(Kind::StartGame));

        let v662 = chain.index_of(662).unwrap();
        assert_eq!(c(v662, 0x0b), Some(Kind::StartGame_NoHardcore));
        assert_eq!(c(v662, 0x07), Some(Kind::ResourcePackStack_NoEditorPacks));
        assert_eq!(c(v662, 0x6e), Some(Kind::UpdateBlockSynced_SignedEntity));
        assert_eq!(c(v662, 0x97), Some(Kind::UpdatePlayerGameType_NoTick));
        assert_eq!(c(v662, 0x1c), Some(Kind::MobEffect_NoAmbient));
        assert_eq!(c(v662, 0x05), Some(Kind::Disconnect_NoFilter));

        let v649 = chain.index_of(649).unwrap();
        assert_eq!(c(v649, 0x1c), Some(Kind::MobEffect_NoTick));
        assert_eq!(c(v649, 0x28), Some(Kind::SetActorMotion_NoTick));
        assert_eq!(s(v649, 0x7d), Some(Kind::LecternUpdate_DropBook));
        assert_eq!(c(v649, 0x134), Some(Kind::SetHud));
        assert_eq!(c(v649, 0x3a), Some(Kind::LevelChunk));

        assert_eq!(c(0, 0x3a), Some(Kind::LevelChunk_NoDimension));
        assert_eq!(c(0, 0x134), None);
        assert_eq!(c(0, 0x1c), Some(Kind::MobEffect_NoTick));
        assert_eq!(c(0, 0x0b), Some(Kind::StartGame_NoHardcore));
        assert_eq!(s(0, 0x90), Some(Kind::PlayerAuthInput_Gaze));
    }

    #[test]
    fn test_pools_match_kind_ids() {
        let chain = chain();
        for i in 0..chain.len() {
            for dir in [Direction::Serverbound, Direction::Clientbound] {
                let pool = chain.pool(i, dir);
                for id in pool.ids() {
                    assert_eq!(pool.get(id).map(Kind::id), Some(id));
                }
            }
        }
    }
}
