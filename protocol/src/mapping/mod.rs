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

//! Runtime id tables of a single protocol version.

mod block;
pub use self::block::*;

mod item;
pub use self::item::*;

use crate::nbt;
use crate::protocol;
use std::fmt;

pub const AIR: &str = "minecraft:air";

/// A block as the server describes it: a name, its properties in the order
/// the table lists them, and the block version the description belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockState {
    pub name: String,
    pub properties: nbt::Compound,
    pub version: i32,
}

impl BlockState {
    pub fn new(name: &str, properties: nbt::Compound, version: i32) -> BlockState {
        BlockState {
            name: name.to_owned(),
            properties,
            version,
        }
    }

    pub fn air(version: i32) -> BlockState {
        BlockState::new(AIR, nbt::Compound::new(), version)
    }

    /// Reads the `{name, states, version}` compound used by block tables,
    /// chunk palettes and block entities.
    pub fn from_compound(c: &nbt::Compound) -> Result<BlockState, protocol::Error> {
        let name = c
            .get("name")
            .and_then(nbt::Tag::as_str)
            .ok_or_else(|| protocol::Error::Err("block state without a name".to_owned()))?;
        let properties = match c.get("states") {
            Some(nbt::Tag::Compound(states)) => states.clone(),
            Some(_) => {
                return Err(protocol::Error::Err(format!(
                    "block state {} has malformed states",
                    name
                )))
            }
            None => nbt::Compound::new(),
        };
        let version = c.get("version").and_then(nbt::Tag::as_int).unwrap_or(0);
        Ok(BlockState::new(name, properties, version))
    }

    pub fn to_compound(&self) -> nbt::Compound {
        let mut c = nbt::Compound::new();
        c.put("name", nbt::Tag::String(self.name.clone()));
        c.put("states", nbt::Tag::Compound(self.properties.clone()));
        c.put("version", nbt::Tag::Int(self.version));
        c
    }

    /// The bytes identifying the state. Two states have the same key exactly
    /// when they are equal.
    fn key(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        // Writing into a Vec can't fail.
        let _ = nbt::write_compound(&mut buf, nbt::Encoding::LittleEndian, &self.to_compound());
        buf
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[", self.name)?;
        for (i, (k, v)) in self.properties.iter().enumerate() {
            if i != 0 {
                write!(f, ",")?;
            }
            match *v {
                nbt::Tag::String(ref s) => write!(f, "{}={}", k, s)?,
                nbt::Tag::Byte(b) => write!(f, "{}={}", k, b != 0)?,
                nbt::Tag::Int(i) => write!(f, "{}={}", k, i)?,
                ref other => write!(f, "{}={:?}", k, other)?,
            }
        }
        write!(f, "]@{}", self.version)
    }
}

#[cfg(test)]
pub(crate) use self::block::test::{states as test_states, table as test_table};
