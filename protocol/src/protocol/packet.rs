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

//! The packets the gateway looks into. Shapes are those of the latest
//! protocol, shapes only older protocols use carry a suffix naming what
//! they lack.

use crate::item::Stack;
use crate::nbt;
use crate::protocol::{
    self, LenPrefixed, LenPrefixedBytes, RemainingBytes, Serializable, VarInt, VarLong, VarUInt,
    VarULong, UUID,
};
use crate::shared::Position;
use crate::types::{ChunkPos, Metadata, SubChunkPos, Vec2, Vec3};

use std::io;

/// Event types of `LevelEvent` carrying a block runtime id.
pub mod level_event {
    /// Legacy particle event for the terrain particle.
    pub const PARTICLE_TERRAIN: i32 = 0x4000 | 20;
    pub const PARTICLES_DESTROY_BLOCK: i32 = 2001;
    pub const PARTICLES_CRACK_BLOCK: i32 = 2014;
    pub const PARTICLES_DESTROY_BLOCK_NO_SOUND: i32 = 2011;
}

/// Sound types of `LevelSoundEvent` whose extra data is a block runtime id.
pub mod sound_event {
    pub const ITEM_USE_ON: u32 = 0;
    pub const HIT: u32 = 1;
    pub const BREAK: u32 = 5;
    pub const PLACE: u32 = 6;
    pub const LAND: u32 = 21;
}

serializable! {
    pub struct StackResourcePack {
        pub uuid: String,
        pub version: String,
        pub sub_pack_name: String,
    }

    pub struct Experiment {
        pub name: String,
        pub enabled: bool,
    }

    // A custom block declared by the server at the start of the game.
    pub struct BlockEntry {
        pub name: String,
        pub properties: nbt::Tag,
    }

    // An item of the server's item table.
    pub struct ItemEntry {
        pub name: String,
        pub runtime_id: i16,
        pub component_based: bool,
    }

    pub struct EducationSharedResourceUri {
        pub button_name: String,
        pub link_uri: String,
    }

    pub struct PlayerMovementSettings {
        pub movement_type: VarInt,
        pub rewind_history_size: VarInt,
        pub server_authoritative_block_breaking: bool,
    }

    // The world options of StartGame, from the difficulty to the player
    // interaction toggle.
    pub struct WorldSettings {
        pub difficulty: VarInt,
        pub world_spawn: Position,
        pub achievements_disabled: bool,
        pub editor_world_type: VarInt,
        pub created_in_editor: bool,
        pub exported_from_editor: bool,
        pub day_cycle_lock_time: VarInt,
        pub education_edition_offer: VarInt,
        pub education_features_enabled: bool,
        pub education_product_id: String,
        pub rain_level: f32,
        pub lightning_level: f32,
        pub confirmed_platform_locked_content: bool,
        pub multi_player_game: bool,
        pub lan_broadcast_enabled: bool,
        pub xbl_broadcast_mode: VarInt,
        pub platform_broadcast_mode: VarInt,
        pub commands_enabled: bool,
        pub texture_pack_required: bool,
        pub game_rules: LenPrefixed<VarUInt, GameRule>,
        pub experiments: LenPrefixed<u32, Experiment>,
        pub experiments_previously_toggled: bool,
        pub bonus_chest_enabled: bool,
        pub start_with_map_enabled: bool,
        pub player_permissions: VarInt,
        pub server_chunk_tick_radius: i32,
        pub has_locked_behaviour_pack: bool,
        pub has_locked_texture_pack: bool,
        pub from_locked_world_template: bool,
        pub msa_gamer_tags_only: bool,
        pub from_world_template: bool,
        pub world_template_settings_locked: bool,
        pub only_spawn_v1_villagers: bool,
        pub persona_disabled: bool,
        pub custom_skins_disabled: bool,
        pub emote_chat_muted: bool,
        pub base_game_version: String,
        pub limited_world_width: i32,
        pub limited_world_depth: i32,
        pub new_nether: bool,
        pub education_shared_resource_uri: EducationSharedResourceUri,
        pub force_experimental_gameplay: Option<bool>,
        pub chat_restriction_level: u8,
        pub disable_player_interactions: bool,
    }

    pub struct LevelSettings {
        pub level_id: String,
        pub world_name: String,
        pub template_content_identity: String,
        pub trial: bool,
        pub player_movement_settings: PlayerMovementSettings,
        pub time: i64,
        pub enchantment_seed: VarInt,
    }

    pub struct ActorAttribute {
        pub name: String,
        pub min: f32,
        pub value: f32,
        pub max: f32,
    }

    pub struct IntProperty {
        pub index: VarUInt,
        pub value: VarInt,
    }

    pub struct FloatProperty {
        pub index: VarUInt,
        pub value: f32,
    }

    pub struct EntityLink {
        pub ridden_unique_id: VarLong,
        pub rider_unique_id: VarLong,
        pub link_type: u8,
        pub immediate: bool,
        pub rider_initiated: bool,
        pub vehicle_angular_velocity: f32,
    }

    pub struct FullContainerName {
        pub container_id: u8,
        pub dynamic_id: Option<u32>,
    }

    pub struct BlockChangeEntry {
        pub position: Position,
        pub block_runtime_id: VarUInt,
        pub flags: VarUInt,
        pub synced_update_entity_unique_id: VarULong,
        pub synced_update_type: VarUInt,
    }

    pub struct CacheBlob {
        pub hash: u64,
        pub payload: LenPrefixedBytes<VarUInt>,
    }

    pub struct LegacySetItemSlot {
        pub container_id: u8,
        pub slots: LenPrefixedBytes<VarUInt>,
    }

    pub struct UseItemData {
        pub action_type: VarUInt,
        pub trigger_type: VarUInt,
        pub block_position: Position,
        pub block_face: VarInt,
        pub hotbar_slot: VarInt,
        pub held_item: Stack,
        pub position: Vec3,
        pub clicked_position: Vec3,
        pub block_runtime_id: VarUInt,
        pub client_prediction: u8,
    }

    // Use-item data before the trigger type and client prediction.
    pub struct UseItemData_NoPrediction {
        pub action_type: VarUInt,
        pub block_position: Position,
        pub block_face: VarInt,
        pub hotbar_slot: VarInt,
        pub held_item: Stack,
        pub position: Vec3,
        pub clicked_position: Vec3,
        pub block_runtime_id: VarUInt,
    }

    pub struct UseItemOnEntityData {
        pub entity_runtime_id: VarULong,
        pub action_type: VarUInt,
        pub hotbar_slot: VarInt,
        pub held_item: Stack,
        pub position: Vec3,
        pub clicked_position: Vec3,
    }

    pub struct ReleaseItemData {
        pub action_type: VarUInt,
        pub hotbar_slot: VarInt,
        pub held_item: Stack,
        pub head_position: Vec3,
    }
}

packets! {
    // ResourcePackStack tells the client which packs to apply, in order.
    ResourcePackStack => 0x07 {
        texture_pack_required: bool,
        behaviour_packs: LenPrefixed<VarUInt, StackResourcePack>,
        texture_packs: LenPrefixed<VarUInt, StackResourcePack>,
        base_game_version: String,
        experiments: LenPrefixed<u32, Experiment>,
        experiments_previously_toggled: bool,
        include_editor_packs: bool,
    }
    ResourcePackStack_NoEditorPacks => 0x07 {
        texture_pack_required: bool,
        behaviour_packs: LenPrefixed<VarUInt, StackResourcePack>,
        texture_packs: LenPrefixed<VarUInt, StackResourcePack>,
        base_game_version: String,
        experiments: LenPrefixed<u32, Experiment>,
        experiments_previously_toggled: bool,
    }
    // StartGame carries the world settings along with the custom block and
    // item tables the rest of the session is numbered against.
    StartGame => 0x0b {
        entity_unique_id: VarLong,
        entity_runtime_id: VarULong,
        player_game_mode: VarInt,
        player_position: Vec3,
        pitch: f32,
        yaw: f32,
        world_seed: i64,
        spawn_biome_type: i16,
        user_defined_biome_name: String,
        dimension: VarInt,
        generator: VarInt,
        world_game_mode: VarInt,
        hardcore: bool,
        world: WorldSettings,
        server_id: String,
        world_id: String,
        scenario_id: String,
        level: LevelSettings,
        blocks: LenPrefixed<VarUInt, BlockEntry>,
        items: LenPrefixed<VarUInt, ItemEntry>,
        multiplayer_correlation_id: String,
        server_authoritative_inventory: bool,
        game_version: String,
        property_data: nbt::Tag,
        server_block_state_checksum: u64,
        world_template_id: UUID,
        client_side_generation: bool,
        block_network_ids_are_hashes: bool,
        server_authoritative_sound: bool,
    }
    StartGame_NoServerIds => 0x0b {
        entity_unique_id: VarLong,
        entity_runtime_id: VarULong,
        player_game_mode: VarInt,
        player_position: Vec3,
        pitch: f32,
        yaw: f32,
        world_seed: i64,
        spawn_biome_type: i16,
        user_defined_biome_name: String,
        dimension: VarInt,
        generator: VarInt,
        world_game_mode: VarInt,
        hardcore: bool,
        world: WorldSettings,
        level: LevelSettings,
        blocks: LenPrefixed<VarUInt, BlockEntry>,
        items: LenPrefixed<VarUInt, ItemEntry>,
        multiplayer_correlation_id: String,
        server_authoritative_inventory: bool,
        game_version: String,
        property_data: nbt::Tag,
        server_block_state_checksum: u64,
        world_template_id: UUID,
        client_side_generation: bool,
        block_network_ids_are_hashes: bool,
        server_authoritative_sound: bool,
    }
    StartGame_NoHardcore => 0x0b {
        entity_unique_id: VarLong,
        entity_runtime_id: VarULong,
        player_game_mode: VarInt,
        player_position: Vec3,
        pitch: f32,
        yaw: f32,
        world_seed: i64,
        spawn_biome_type: i16,
        user_defined_biome_name: String,
        dimension: VarInt,
        generator: VarInt,
        world_game_mode: VarInt,
        world: WorldSettings,
        level: LevelSettings,
        blocks: LenPrefixed<VarUInt, BlockEntry>,
        items: LenPrefixed<VarUInt, ItemEntry>,
        multiplayer_correlation_id: String,
        server_authoritative_inventory: bool,
        game_version: String,
        property_data: nbt::Tag,
        server_block_state_checksum: u64,
        world_template_id: UUID,
        client_side_generation: bool,
        block_network_ids_are_hashes: bool,
        server_authoritative_sound: bool,
    }
    AddActor => 0x0d {
        entity_unique_id: VarLong,
        entity_runtime_id: VarULong,
        entity_type: String,
        position: Vec3,
        velocity: Vec3,
        pitch: f32,
        yaw: f32,
        head_yaw: f32,
        body_yaw: f32,
        attributes: LenPrefixed<VarUInt, ActorAttribute>,
        metadata: Metadata,
        int_properties: LenPrefixed<VarUInt, IntProperty>,
        float_properties: LenPrefixed<VarUInt, FloatProperty>,
        links: LenPrefixed<VarUInt, EntityLink>,
    }
    AddItemActor => 0x0f {
        entity_unique_id: VarLong,
        entity_runtime_id: VarULong,
        item: Stack,
        position: Vec3,
        velocity: Vec3,
        metadata: Metadata,
        from_fishing: bool,
    }
    UpdateBlock => 0x15 {
        position: Position,
        new_block_runtime_id: VarUInt,
        flags: VarUInt,
        layer: VarUInt,
    }
    // LevelEvent plays particles and effects. Some event types carry a
    // block runtime id in the event data.
    LevelEvent => 0x19 {
        event_type: VarInt,
        position: Vec3,
        event_data: VarInt,
    }
    MobEffect => 0x1c {
        entity_runtime_id: VarULong,
        operation: u8,
        effect_type: VarInt,
        amplifier: VarInt,
        particles: bool,
        duration: VarInt,
        tick: VarULong,
        ambient: bool,
    }
    MobEffect_NoAmbient => 0x1c {
        entity_runtime_id: VarULong,
        operation: u8,
        effect_type: VarInt,
        amplifier: VarInt,
        particles: bool,
        duration: VarInt,
        tick: VarULong,
    }
    MobEffect_NoTick => 0x1c {
        entity_runtime_id: VarULong,
        operation: u8,
        effect_type: VarInt,
        amplifier: VarInt,
        particles: bool,
        duration: VarInt,
    }
    MobEquipment => 0x1f {
        entity_runtime_id: VarULong,
        new_item: Stack,
        inventory_slot: u8,
        hotbar_slot: u8,
        window_id: u8,
    }
    MobArmourEquipment => 0x20 {
        entity_runtime_id: VarULong,
        helmet: Stack,
        chestplate: Stack,
        leggings: Stack,
        boots: Stack,
        body: Stack,
    }
    MobArmourEquipment_NoBody => 0x20 {
        entity_runtime_id: VarULong,
        helmet: Stack,
        chestplate: Stack,
        leggings: Stack,
        boots: Stack,
    }
    SetActorData => 0x27 {
        entity_runtime_id: VarULong,
        metadata: Metadata,
        int_properties: LenPrefixed<VarUInt, IntProperty>,
        float_properties: LenPrefixed<VarUInt, FloatProperty>,
        tick: VarULong,
    }
    SetActorMotion => 0x28 {
        entity_runtime_id: VarULong,
        velocity: Vec3,
        tick: VarULong,
    }
    SetActorMotion_NoTick => 0x28 {
        entity_runtime_id: VarULong,
        velocity: Vec3,
    }
    InventoryContent => 0x31 {
        window_id: VarUInt,
        content: LenPrefixed<VarUInt, Stack>,
        container: FullContainerName,
        storage_item: Stack,
    }
    InventoryContent_DynamicSize => 0x31 {
        window_id: VarUInt,
        content: LenPrefixed<VarUInt, Stack>,
        container: FullContainerName,
        dynamic_container_size: VarUInt,
    }
    InventoryContent_WindowId => 0x31 {
        window_id: VarUInt,
        content: LenPrefixed<VarUInt, Stack>,
        dynamic_window_id: VarUInt,
    }
    InventorySlot => 0x32 {
        window_id: VarUInt,
        slot: VarUInt,
        container: FullContainerName,
        storage_item: Stack,
        new_item: Stack,
    }
    InventorySlot_DynamicSize => 0x32 {
        window_id: VarUInt,
        slot: VarUInt,
        container: FullContainerName,
        dynamic_container_size: VarUInt,
        new_item: Stack,
    }
    InventorySlot_WindowId => 0x32 {
        window_id: VarUInt,
        slot: VarUInt,
        dynamic_window_id: VarUInt,
        new_item: Stack,
    }
    // LevelChunk sends a column of sub-chunks. With the blob cache in use
    // the sub-chunks travel as blobs and the payload only holds what
    // follows them.
    LevelChunk => 0x3a {
        position: ChunkPos,
        dimension: VarInt,
        sub_chunk_count: SubChunkCount,
        blob_hashes: Option<LenPrefixed<VarUInt, u64>>,
        raw_payload: LenPrefixedBytes<VarUInt>,
    }
    LevelChunk_NoDimension => 0x3a {
        position: ChunkPos,
        sub_chunk_count: SubChunkCount,
        blob_hashes: Option<LenPrefixed<VarUInt, u64>>,
        raw_payload: LenPrefixedBytes<VarUInt>,
    }
    Transfer => 0x55 {
        address: String,
        port: u16,
        reload_world: bool,
    }
    Transfer_NoReload => 0x55 {
        address: String,
        port: u16,
    }
    UpdateBlockSynced => 0x6e {
        position: Position,
        new_block_runtime_id: VarUInt,
        flags: VarUInt,
        layer: VarUInt,
        entity_unique_id: VarULong,
        transition_type: VarULong,
    }
    UpdateBlockSynced_SignedEntity => 0x6e {
        position: Position,
        new_block_runtime_id: VarUInt,
        flags: VarUInt,
        layer: VarUInt,
        entity_unique_id: VarLong,
        transition_type: VarULong,
    }
    LevelSoundEvent => 0x7b {
        sound_type: VarUInt,
        position: Vec3,
        extra_data: VarInt,
        entity_type: String,
        baby_mob: bool,
        disable_relative_volume: bool,
    }
    LecternUpdate => 0x7d {
        page: u8,
        page_count: u8,
        position: Position,
    }
    LecternUpdate_DropBook => 0x7d {
        page: u8,
        page_count: u8,
        position: Position,
        drop_book: bool,
    }
    // ClientCacheStatus is sent by the client to say whether it supports
    // the blob cache.
    ClientCacheStatus => 0x81 {
        enabled: bool,
    }
    ClientCacheMissResponse => 0x88 {
        blobs: LenPrefixed<VarUInt, CacheBlob>,
    }
    Emote => 0x8a {
        entity_runtime_id: VarULong,
        emote_id: String,
        emote_length: VarUInt,
        xuid: String,
        platform_id: String,
        flags: u8,
    }
    Emote_NoLength => 0x8a {
        entity_runtime_id: VarULong,
        emote_id: String,
        xuid: String,
        platform_id: String,
        flags: u8,
    }
    // PlayerAuthInput is sent every tick. The conditional parts that
    // follow the movement delta are carried opaquely.
    PlayerAuthInput => 0x90 {
        pitch: f32,
        yaw: f32,
        position: Vec3,
        move_vector: Vec2,
        head_yaw: f32,
        input_data: VarULong,
        input_mode: VarUInt,
        play_mode: VarUInt,
        interaction_model: VarUInt,
        interact_pitch: f32,
        interact_yaw: f32,
        tick: VarULong,
        delta: Vec3,
        rest: RemainingBytes,
    }
    PlayerAuthInput_Gaze => 0x90 {
        pitch: f32,
        yaw: f32,
        position: Vec3,
        move_vector: Vec2,
        head_yaw: f32,
        input_data: VarULong,
        input_mode: VarUInt,
        play_mode: VarUInt,
        interaction_model: VarUInt,
        gaze_direction: Vec3,
        tick: VarULong,
        delta: Vec3,
        rest: RemainingBytes,
    }
    UpdatePlayerGameType => 0x97 {
        game_type: VarInt,
        player_unique_id: VarLong,
        tick: VarULong,
    }
    UpdatePlayerGameType_NoTick => 0x97 {
        game_type: VarInt,
        player_unique_id: VarLong,
    }
    CorrectPlayerMovePrediction => 0xa1 {
        prediction_type: u8,
        position: Vec3,
        delta: Vec3,
        on_ground: bool,
        tick: VarULong,
    }
    CorrectPlayerMovePrediction_NoType => 0xa1 {
        position: Vec3,
        delta: Vec3,
        on_ground: bool,
        tick: VarULong,
    }
    UpdateSubChunkBlocks => 0xac {
        position: Position,
        blocks: LenPrefixed<VarUInt, BlockChangeEntry>,
        extra: LenPrefixed<VarUInt, BlockChangeEntry>,
    }
    EditorNetwork => 0xbe {
        route_to_manager: bool,
        payload: nbt::Tag,
    }
    EditorNetwork_NoRoute => 0xbe {
        payload: nbt::Tag,
    }
    // SetHud shows or hides HUD elements. Only its presence matters here.
    SetHud => 0x134 {
        data: RemainingBytes,
    }
    ServerBoundLoadingScreen => 0x138 {
        screen_type: VarInt,
        loading_screen_id: Option<u32>,
    }
    ServerBoundDiagnostics => 0x13b {
        average_frames_per_second: f32,
        average_server_sim_tick_time: f32,
        average_client_sim_tick_time: f32,
        average_begin_frame_time: f32,
        average_input_time: f32,
        average_render_time: f32,
        average_end_frame_time: f32,
        average_remainder_time_percent: f32,
        average_unaccounted_time_percent: f32,
    }
    CameraAimAssist => 0x13c {
        view_angle: Vec2,
        distance: f32,
        target_mode: u8,
        action: u8,
    }
    ContainerRegistryCleanup => 0x13d {
        removed: LenPrefixed<VarUInt, FullContainerName>,
    }
    MovementEffect => 0x13e {
        entity_runtime_id: VarULong,
        effect_type: VarUInt,
        duration: VarUInt,
        tick: VarULong,
    }
    SetMovementAuthority => 0x13f {
        movement_type: u8,
    }
    @custom {
        Disconnect => 0x05,
        Disconnect_NoFilter => 0x05,
        InventoryTransaction => 0x1e,
        InventoryTransaction_NoPrediction => 0x1e,
        SubChunk => 0xae,
    }
}

const SUB_CHUNK_COUNT_LIMITLESS: u32 = 0xffff_ffff;
const SUB_CHUNK_COUNT_LIMITED: u32 = 0xffff_fffe;

/// How many sub-chunks a level chunk carries. The two request modes mean
/// the client asks for sub-chunks separately and the payload holds none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubChunkCount {
    Count(u32),
    Limitless,
    Limited { highest: u16 },
}

impl Default for SubChunkCount {
    fn default() -> Self {
        SubChunkCount::Count(0)
    }
}

impl Serializable for SubChunkCount {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<SubChunkCount, protocol::Error> {
        Ok(match VarUInt::read_from(buf)?.0 {
            SUB_CHUNK_COUNT_LIMITLESS => SubChunkCount::Limitless,
            SUB_CHUNK_COUNT_LIMITED => SubChunkCount::Limited {
                highest: u16::read_from(buf)?,
            },
            count => SubChunkCount::Count(count),
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        match *self {
            SubChunkCount::Count(count) => VarUInt(count).write_to(buf),
            SubChunkCount::Limitless => VarUInt(SUB_CHUNK_COUNT_LIMITLESS).write_to(buf),
            SubChunkCount::Limited { highest } => {
                VarUInt(SUB_CHUNK_COUNT_LIMITED).write_to(buf)?;
                highest.write_to(buf)
            }
        }
    }
}

const GAME_RULE_BOOL: u32 = 1;
const GAME_RULE_UINT: u32 = 2;
const GAME_RULE_FLOAT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameRuleValue {
    Bool(bool),
    UInt(VarUInt),
    Float(f32),
}

impl Default for GameRuleValue {
    fn default() -> Self {
        GameRuleValue::Bool(false)
    }
}

/// A world game rule. The value's type is written ahead of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameRule {
    pub name: String,
    pub can_be_modified_by_player: bool,
    pub value: GameRuleValue,
}

impl Serializable for GameRule {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<GameRule, protocol::Error> {
        let name = String::read_from(buf)?;
        let can_be_modified_by_player = bool::read_from(buf)?;
        let value = match VarUInt::read_from(buf)?.0 {
            GAME_RULE_BOOL => GameRuleValue::Bool(Serializable::read_from(buf)?),
            GAME_RULE_UINT => GameRuleValue::UInt(Serializable::read_from(buf)?),
            GAME_RULE_FLOAT => GameRuleValue::Float(Serializable::read_from(buf)?),
            other => {
                return Err(protocol::Error::UnknownEnumOption {
                    what: "game rule type",
                    value: other as i64,
                })
            }
        };
        Ok(GameRule {
            name,
            can_be_modified_by_player,
            value,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.name.write_to(buf)?;
        self.can_be_modified_by_player.write_to(buf)?;
        match self.value {
            GameRuleValue::Bool(v) => {
                VarUInt(GAME_RULE_BOOL).write_to(buf)?;
                v.write_to(buf)
            }
            GameRuleValue::UInt(v) => {
                VarUInt(GAME_RULE_UINT).write_to(buf)?;
                v.write_to(buf)
            }
            GameRuleValue::Float(v) => {
                VarUInt(GAME_RULE_FLOAT).write_to(buf)?;
                v.write_to(buf)
            }
        }
    }
}

/// Disconnect shows the client a message, unless the screen is hidden in
/// which case no message is sent at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Disconnect {
    pub reason: VarInt,
    pub hide_disconnection_screen: bool,
    pub message: String,
    pub filtered_message: String,
}

impl Serializable for Disconnect {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Disconnect, protocol::Error> {
        let mut pk = Disconnect {
            reason: Serializable::read_from(buf)?,
            hide_disconnection_screen: Serializable::read_from(buf)?,
            ..Default::default()
        };
        if !pk.hide_disconnection_screen {
            pk.message = Serializable::read_from(buf)?;
            pk.filtered_message = Serializable::read_from(buf)?;
        }
        Ok(pk)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.reason.write_to(buf)?;
        self.hide_disconnection_screen.write_to(buf)?;
        if !self.hide_disconnection_screen {
            self.message.write_to(buf)?;
            self.filtered_message.write_to(buf)?;
        }
        Ok(())
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Disconnect_NoFilter {
    pub reason: VarInt,
    pub hide_disconnection_screen: bool,
    pub message: String,
}

impl Serializable for Disconnect_NoFilter {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Disconnect_NoFilter, protocol::Error> {
        let mut pk = Disconnect_NoFilter {
            reason: Serializable::read_from(buf)?,
            hide_disconnection_screen: Serializable::read_from(buf)?,
            ..Default::default()
        };
        if !pk.hide_disconnection_screen {
            pk.message = Serializable::read_from(buf)?;
        }
        Ok(pk)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.reason.write_to(buf)?;
        self.hide_disconnection_screen.write_to(buf)?;
        if !self.hide_disconnection_screen {
            self.message.write_to(buf)?;
        }
        Ok(())
    }
}

/// Where the items of an inventory action come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Container { window_id: VarInt },
    Global,
    World { flags: VarUInt },
    Creative,
    Todo { window_id: VarInt },
}

const SOURCE_CONTAINER: u32 = 0;
const SOURCE_GLOBAL: u32 = 1;
const SOURCE_WORLD: u32 = 2;
const SOURCE_CREATIVE: u32 = 3;
const SOURCE_TODO: u32 = 99999;

impl Serializable for ActionSource {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<ActionSource, protocol::Error> {
        Ok(match VarUInt::read_from(buf)?.0 {
            SOURCE_CONTAINER => ActionSource::Container {
                window_id: Serializable::read_from(buf)?,
            },
            SOURCE_GLOBAL => ActionSource::Global,
            SOURCE_WORLD => ActionSource::World {
                flags: Serializable::read_from(buf)?,
            },
            SOURCE_CREATIVE => ActionSource::Creative,
            SOURCE_TODO => ActionSource::Todo {
                window_id: Serializable::read_from(buf)?,
            },
            other => {
                return Err(protocol::Error::UnknownEnumOption {
                    what: "inventory action source",
                    value: other as i64,
                })
            }
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        match *self {
            ActionSource::Container { window_id } => {
                VarUInt(SOURCE_CONTAINER).write_to(buf)?;
                window_id.write_to(buf)
            }
            ActionSource::Global => VarUInt(SOURCE_GLOBAL).write_to(buf),
            ActionSource::World { flags } => {
                VarUInt(SOURCE_WORLD).write_to(buf)?;
                flags.write_to(buf)
            }
            ActionSource::Creative => VarUInt(SOURCE_CREATIVE).write_to(buf),
            ActionSource::Todo { window_id } => {
                VarUInt(SOURCE_TODO).write_to(buf)?;
                window_id.write_to(buf)
            }
        }
    }
}

impl Default for ActionSource {
    fn default() -> Self {
        ActionSource::Global
    }
}

serializable! {
    pub struct InventoryAction {
        pub source: ActionSource,
        pub inventory_slot: VarUInt,
        pub old_item: Stack,
        pub new_item: Stack,
    }
}

/// The typed part of an inventory transaction. `U` is the shape of the
/// use-item data, which changed between protocols.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionData<U> {
    Normal,
    Mismatch,
    UseItem(U),
    UseItemOnEntity(UseItemOnEntityData),
    ReleaseItem(ReleaseItemData),
}

impl<U> Default for TransactionData<U> {
    fn default() -> Self {
        TransactionData::Normal
    }
}

impl<U> TransactionData<U> {
    fn type_id(&self) -> u32 {
        match *self {
            TransactionData::Normal => 0,
            TransactionData::Mismatch => 1,
            TransactionData::UseItem(_) => 2,
            TransactionData::UseItemOnEntity(_) => 3,
            TransactionData::ReleaseItem(_) => 4,
        }
    }

    /// Converts the use-item data, leaving the other kinds as they are.
    pub fn map_use_item<V, F>(self, f: F) -> TransactionData<V>
    where
        F: FnOnce(U) -> V,
    {
        match self {
            TransactionData::Normal => TransactionData::Normal,
            TransactionData::Mismatch => TransactionData::Mismatch,
            TransactionData::UseItem(u) => TransactionData::UseItem(f(u)),
            TransactionData::UseItemOnEntity(d) => TransactionData::UseItemOnEntity(d),
            TransactionData::ReleaseItem(d) => TransactionData::ReleaseItem(d),
        }
    }
}

/// An inventory transaction. The two packet shapes only differ in their
/// use-item data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction<U> {
    pub legacy_request_id: VarInt,
    /// Only on the wire when `legacy_request_id` is set.
    pub legacy_set_item_slots: LenPrefixed<VarUInt, LegacySetItemSlot>,
    pub actions: LenPrefixed<VarUInt, InventoryAction>,
    pub data: TransactionData<U>,
}

pub type InventoryTransaction = Transaction<UseItemData>;
#[allow(non_camel_case_types)]
pub type InventoryTransaction_NoPrediction = Transaction<UseItemData_NoPrediction>;

impl<U: Serializable> Serializable for Transaction<U> {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Transaction<U>, protocol::Error> {
        let legacy_request_id = VarInt::read_from(buf)?;
        let legacy_set_item_slots = if legacy_request_id.0 != 0 {
            Serializable::read_from(buf)?
        } else {
            LenPrefixed::default()
        };
        let ty = VarUInt::read_from(buf)?.0;
        let actions = Serializable::read_from(buf)?;
        let data = match ty {
            0 => TransactionData::Normal,
            1 => TransactionData::Mismatch,
            2 => TransactionData::UseItem(U::read_from(buf)?),
            3 => TransactionData::UseItemOnEntity(Serializable::read_from(buf)?),
            4 => TransactionData::ReleaseItem(Serializable::read_from(buf)?),
            other => {
                return Err(protocol::Error::UnknownEnumOption {
                    what: "inventory transaction type",
                    value: other as i64,
                })
            }
        };
        Ok(Transaction {
            legacy_request_id,
            legacy_set_item_slots,
            actions,
            data,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.legacy_request_id.write_to(buf)?;
        if self.legacy_request_id.0 != 0 {
            self.legacy_set_item_slots.write_to(buf)?;
        }
        VarUInt(self.data.type_id()).write_to(buf)?;
        self.actions.write_to(buf)?;
        match self.data {
            TransactionData::Normal | TransactionData::Mismatch => Ok(()),
            TransactionData::UseItem(ref d) => d.write_to(buf),
            TransactionData::UseItemOnEntity(ref d) => d.write_to(buf),
            TransactionData::ReleaseItem(ref d) => d.write_to(buf),
        }
    }
}

pub const SUB_CHUNK_RESULT_SUCCESS: u8 = 1;
pub const SUB_CHUNK_RESULT_SUCCESS_ALL_AIR: u8 = 6;
const HEIGHT_MAP_HAS_DATA: u8 = 1;

/// One requested sub-chunk, placed relative to the packet's position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubChunkEntry {
    pub offset_x: i8,
    pub offset_y: i8,
    pub offset_z: i8,
    pub result: u8,
    pub raw_payload: Vec<u8>,
    pub height_map_type: u8,
    pub height_map: Vec<u8>,
    pub blob_hash: u64,
}

impl SubChunkEntry {
    fn read_from<R: io::Read>(buf: &mut R, cache_enabled: bool) -> Result<SubChunkEntry, protocol::Error> {
        let mut e = SubChunkEntry {
            offset_x: Serializable::read_from(buf)?,
            offset_y: Serializable::read_from(buf)?,
            offset_z: Serializable::read_from(buf)?,
            result: Serializable::read_from(buf)?,
            ..Default::default()
        };
        if !cache_enabled || e.result != SUB_CHUNK_RESULT_SUCCESS_ALL_AIR {
            e.raw_payload = LenPrefixedBytes::<VarUInt>::read_from(buf)?.data;
        }
        e.height_map_type = Serializable::read_from(buf)?;
        if e.height_map_type == HEIGHT_MAP_HAS_DATA {
            let mut height_map = vec![0; 256];
            buf.read_exact(&mut height_map)?;
            e.height_map = height_map;
        }
        if cache_enabled {
            e.blob_hash = Serializable::read_from(buf)?;
        }
        Ok(e)
    }

    fn write_to<W: io::Write>(&self, buf: &mut W, cache_enabled: bool) -> Result<(), protocol::Error> {
        self.offset_x.write_to(buf)?;
        self.offset_y.write_to(buf)?;
        self.offset_z.write_to(buf)?;
        self.result.write_to(buf)?;
        if !cache_enabled || self.result != SUB_CHUNK_RESULT_SUCCESS_ALL_AIR {
            LenPrefixedBytes::<VarUInt>::new(self.raw_payload.clone()).write_to(buf)?;
        }
        self.height_map_type.write_to(buf)?;
        if self.height_map_type == HEIGHT_MAP_HAS_DATA {
            if self.height_map.len() != 256 {
                return Err(protocol::Error::Err(format!(
                    "height map of {} bytes",
                    self.height_map.len()
                )));
            }
            buf.write_all(&self.height_map)?;
        }
        if cache_enabled {
            self.blob_hash.write_to(buf)?;
        }
        Ok(())
    }
}

/// SubChunk answers a client's request for sub-chunks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubChunk {
    pub cache_enabled: bool,
    pub dimension: VarInt,
    pub position: SubChunkPos,
    pub entries: Vec<SubChunkEntry>,
}

impl Serializable for SubChunk {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<SubChunk, protocol::Error> {
        let cache_enabled = bool::read_from(buf)?;
        let dimension = VarInt::read_from(buf)?;
        let position = SubChunkPos::read_from(buf)?;
        let count = u32::read_from(buf)?;
        let mut entries = Vec::with_capacity((count as usize).min(64));
        for _ in 0..count {
            entries.push(SubChunkEntry::read_from(buf, cache_enabled)?);
        }
        Ok(SubChunk {
            cache_enabled,
            dimension,
            position,
            entries,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.cache_enabled.write_to(buf)?;
        self.dimension.write_to(buf)?;
        self.position.write_to(buf)?;
        (self.entries.len() as u32).write_to(buf)?;
        for e in &self.entries {
            e.write_to(buf, self.cache_enabled)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode(pk: &Packet) -> Vec<u8> {
        let mut buf = Vec::new();
        pk.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_sub_chunk_count_modes() {
        for count in &[
            SubChunkCount::Count(24),
            SubChunkCount::Limitless,
            SubChunkCount::Limited { highest: 7 },
        ] {
            let mut buf = Vec::new();
            count.write_to(&mut buf).unwrap();
            let back = SubChunkCount::read_from(&mut io::Cursor::new(&buf)).unwrap();
            assert_eq!(back, *count);
        }
    }

    #[test]
    fn test_level_chunk_cache_flag() {
        let pk = Packet::LevelChunk(LevelChunk {
            position: ChunkPos { x: 1, z: -1 },
            dimension: VarInt(0),
            sub_chunk_count: SubChunkCount::Count(2),
            blob_hashes: None,
            raw_payload: LenPrefixedBytes::new(vec![1, 2, 3]),
        });
        let data = encode(&pk);
        // x, z, dimension, count, cache flag, payload
        assert_eq!(data, vec![2, 1, 0, 2, 0, 3, 1, 2, 3]);
        let back = Kind::LevelChunk.read(&mut io::Cursor::new(&data)).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_hidden_disconnect_has_no_message() {
        let pk = Packet::Disconnect(Disconnect {
            reason: VarInt(0),
            hide_disconnection_screen: true,
            message: String::new(),
            filtered_message: String::new(),
        });
        assert_eq!(encode(&pk), vec![0, 1]);
    }

    #[test]
    fn test_transaction_use_item() {
        let pk = InventoryTransaction {
            data: TransactionData::UseItem(UseItemData {
                block_position: Position::new(4, -2, 9),
                block_runtime_id: VarUInt(300),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut buf = Vec::new();
        pk.write_to(&mut buf).unwrap();
        let back = InventoryTransaction::read_from(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_transaction_unknown_source() {
        // no legacy request, normal transaction, one action of source 7
        let data = [0, 0, 1, 7];
        match InventoryTransaction::read_from(&mut io::Cursor::new(&data[..])) {
            Err(protocol::Error::UnknownEnumOption { value: 7, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sub_chunk_entries() {
        let pk = SubChunk {
            cache_enabled: true,
            dimension: VarInt(0),
            position: SubChunkPos { x: 0, y: 4, z: 0 },
            entries: vec![
                SubChunkEntry {
                    result: SUB_CHUNK_RESULT_SUCCESS_ALL_AIR,
                    blob_hash: 99,
                    ..Default::default()
                },
                SubChunkEntry {
                    offset_y: -1,
                    result: SUB_CHUNK_RESULT_SUCCESS,
                    raw_payload: vec![9, 1, 0],
                    height_map_type: HEIGHT_MAP_HAS_DATA,
                    height_map: vec![3; 256],
                    blob_hash: 100,
                    ..Default::default()
                },
            ],
        };
        let mut buf = Vec::new();
        pk.write_to(&mut buf).unwrap();
        let back = SubChunk::read_from(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_start_game_full() {
        let pk = Packet::StartGame(StartGame {
            entity_unique_id: VarLong(-3),
            hardcore: true,
            world: WorldSettings {
                world_spawn: Position::new(0, 64, 0),
                game_rules: LenPrefixed::new(vec![
                    GameRule {
                        name: "dodaylightcycle".to_owned(),
                        can_be_modified_by_player: true,
                        value: GameRuleValue::Bool(false),
                    },
                    GameRule {
                        name: "spawnradius".to_owned(),
                        can_be_modified_by_player: false,
                        value: GameRuleValue::UInt(VarUInt(5)),
                    },
                ]),
                force_experimental_gameplay: Some(true),
                ..Default::default()
            },
            server_id: "server".to_owned(),
            level: LevelSettings {
                level_id: "level".to_owned(),
                time: 6000,
                ..Default::default()
            },
            blocks: LenPrefixed::new(vec![BlockEntry {
                name: "custom:block".to_owned(),
                properties: nbt::Tag::new_compound(),
            }]),
            items: LenPrefixed::new(vec![ItemEntry {
                name: "custom:item".to_owned(),
                runtime_id: 900,
                component_based: true,
            }]),
            world_template_id: UUID(1, 2),
            server_authoritative_sound: true,
            ..Default::default()
        });
        let data = encode(&pk);
        let mut cur = io::Cursor::new(&data);
        let back = Kind::StartGame.read(&mut cur).unwrap();
        assert_eq!(back, pk);
        assert_eq!(cur.position() as usize, data.len());
    }

    #[test]
    fn test_start_game_shapes() {
        // the server ids are three empty strings and hardcore one bool
        let latest = encode(&Packet::StartGame(StartGame::default()));
        let no_ids = encode(&Packet::StartGame_NoServerIds(StartGame_NoServerIds::default()));
        let no_hardcore = encode(&Packet::StartGame_NoHardcore(StartGame_NoHardcore::default()));
        assert_eq!(latest.len(), no_ids.len() + 3);
        assert_eq!(no_ids.len(), no_hardcore.len() + 1);
    }

    #[test]
    fn test_game_rule_unknown_type() {
        // empty name, not modifiable, type 9
        let data = [0, 0, 9];
        match GameRule::read_from(&mut io::Cursor::new(&data[..])) {
            Err(protocol::Error::UnknownEnumOption { value: 9, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_kind_ids() {
        assert_eq!(Kind::MobEffect.id(), Kind::MobEffect_NoAmbient.id());
        assert_eq!(Kind::SetMovementAuthority.id(), 0x13f);
        assert_eq!(Kind::InventoryTransaction_NoPrediction.name(), "InventoryTransaction_NoPrediction");
    }
}
