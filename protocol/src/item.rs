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

use crate::protocol::{self, LenPrefixedBytes, Serializable, VarInt, VarUInt};
use std::io;

/// An item stack as carried by inventory and entity packets. A network id
/// of zero is the empty stack and has no further fields on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    pub id: i32,
    pub count: u16,
    pub metadata: u32,
    pub stack_network_id: Option<VarInt>,
    pub block_runtime_id: i32,
    /// User data, can lore and such. Opaque to the gateway.
    pub extra_data: LenPrefixedBytes<VarUInt>,
}

impl Stack {
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

impl Serializable for Stack {
    fn read_from<R: io::Read>(buf: &mut R) -> Result<Stack, protocol::Error> {
        let id = VarInt::read_from(buf)?.0;
        if id == 0 {
            return Ok(Stack::default());
        }
        Ok(Stack {
            id,
            count: Serializable::read_from(buf)?,
            metadata: VarUInt::read_from(buf)?.0,
            stack_network_id: Serializable::read_from(buf)?,
            block_runtime_id: VarInt::read_from(buf)?.0,
            extra_data: Serializable::read_from(buf)?,
        })
    }

    fn write_to<W: io::Write>(&self, buf: &mut W) -> Result<(), protocol::Error> {
        VarInt(self.id).write_to(buf)?;
        if self.is_empty() {
            return Ok(());
        }
        self.count.write_to(buf)?;
        VarUInt(self.metadata).write_to(buf)?;
        self.stack_network_id.write_to(buf)?;
        VarInt(self.block_runtime_id).write_to(buf)?;
        self.extra_data.write_to(buf)
    }
}

#[test]
fn test_empty_stack_is_one_byte() {
    let mut buf = Vec::new();
    Stack::default().write_to(&mut buf).unwrap();
    assert_eq!(buf, vec![0]);
}
