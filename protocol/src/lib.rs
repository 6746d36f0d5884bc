#![recursion_limit = "300"]
#[macro_use]
pub mod macros;

pub mod chunk;
pub mod item;
pub mod mapping;
pub mod nbt;
pub mod protocol;
pub mod translator;
pub mod types;

use mv_shared as shared;
