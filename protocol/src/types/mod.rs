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

mod metadata;
pub use self::metadata::*;

pub mod bit;
pub mod hash;

use crate::protocol::{self, Serializable, VarInt, VarUInt};
use crate::shared::Position;
use std::io;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Serializable for Vec3 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Vec3, protocol::Error> {
        Ok(Vec3 {
            x: f32::read_from(buf)?,
            y: f32::read_from(buf)?,
            z: f32::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.x.write_to(buf)?;
        self.y.write_to(buf)?;
        self.z.write_to(buf)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Serializable for Vec2 {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Vec2, protocol::Error> {
        Ok(Vec2 {
            x: f32::read_from(buf)?,
            y: f32::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        self.x.write_to(buf)?;
        self.y.write_to(buf)
    }
}

/// Block positions in packets: the height travels as an unsigned varint
/// holding the two's complement of `y`.
impl Serializable for Position {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Position, protocol::Error> {
        Ok(Position::new(
            VarInt::read_from(buf)?.0,
            VarUInt::read_from(buf)?.0 as i32,
            VarInt::read_from(buf)?.0,
        ))
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        VarInt(self.x).write_to(buf)?;
        VarUInt(self.y as u32).write_to(buf)?;
        VarInt(self.z).write_to(buf)
    }
}

/// A chunk column coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl Serializable for ChunkPos {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<ChunkPos, protocol::Error> {
        Ok(ChunkPos {
            x: VarInt::read_from(buf)?.0,
            z: VarInt::read_from(buf)?.0,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        VarInt(self.x).write_to(buf)?;
        VarInt(self.z).write_to(buf)
    }
}

/// A sub-chunk coordinate, `y` counts sub-chunks rather than blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Serializable for SubChunkPos {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<SubChunkPos, protocol::Error> {
        Ok(SubChunkPos {
            x: VarInt::read_from(buf)?.0,
            y: VarInt::read_from(buf)?.0,
            z: VarInt::read_from(buf)?.0,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        VarInt(self.x).write_to(buf)?;
        VarInt(self.y).write_to(buf)?;
        VarInt(self.z).write_to(buf)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Overworld = 0,
    Nether = 1,
    End = 2,
}

impl Dimension {
    pub fn from_int(val: i32) -> Dimension {
        match val {
            2 => Dimension::End,
            1 => Dimension::Nether,
            _ => Dimension::Overworld,
        }
    }

    /// The vertical span of blocks the dimension sends to clients.
    pub fn range(self) -> crate::shared::Range {
        use crate::shared::Range;
        match self {
            Dimension::Overworld => Range::new(-64, 319),
            Dimension::Nether => Range::new(0, 127),
            Dimension::End => Range::new(0, 255),
        }
    }
}

#[test]
fn test_position_negative_y() {
    let pos = Position::new(-3, -60, 12);
    let mut buf = Vec::new();
    pos.write_to(&mut buf).unwrap();
    let back = Position::read_from(&mut io::Cursor::new(&buf)).unwrap();
    assert_eq!(back, pos);
}
