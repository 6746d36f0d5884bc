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

//! Batches group several packet payloads into one frame, each payload
//! prefixed by its length.

use crate::protocol::{Error, LenPrefixedBytes, Serializable, VarUInt};

use flate2::read::{DeflateDecoder, DeflateEncoder};
use std::io::{self, Read};

/// Batches bigger than this after decompression are refused.
const MAX_BATCH_SIZE: u64 = 1 << 24;

/// Compression negotiated for the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    /// Raw deflate, without zlib header.
    Flate,
}

impl Compression {
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Flate => {
                let mut out = Vec::new();
                DeflateEncoder::new(data, flate2::Compression::default()).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Flate => {
                let mut out = Vec::new();
                DeflateDecoder::new(data)
                    .take(MAX_BATCH_SIZE + 1)
                    .read_to_end(&mut out)?;
                if out.len() as u64 > MAX_BATCH_SIZE {
                    return Err(Error::Err(format!(
                        "batch exceeds {} bytes when decompressed",
                        MAX_BATCH_SIZE
                    )));
                }
                Ok(out)
            }
        }
    }
}

/// Splits a batch into its packet payloads.
pub fn decode(data: &[u8], compression: Compression) -> Result<Vec<Vec<u8>>, Error> {
    let data = compression.decompress(data)?;
    let mut buf = io::Cursor::new(&data[..]);
    let mut payloads = Vec::new();
    while (buf.position() as usize) < data.len() {
        let payload: LenPrefixedBytes<VarUInt> = Serializable::read_from(&mut buf)?;
        payloads.push(payload.data);
    }
    Ok(payloads)
}

/// Joins packet payloads into a batch.
pub fn encode<P: AsRef<[u8]>>(payloads: &[P], compression: Compression) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    for payload in payloads {
        let payload = payload.as_ref();
        VarUInt(payload.len() as u32).write_to(&mut data)?;
        data.extend_from_slice(payload);
    }
    compression.compress(&data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_uncompressed_layout() {
        let data = encode(&[vec![0x81, 0x01, 0x01], vec![0x05]], Compression::None).unwrap();
        assert_eq!(data, vec![3, 0x81, 0x01, 0x01, 1, 0x05]);
        assert_eq!(
            decode(&data, Compression::None).unwrap(),
            vec![vec![0x81, 0x01, 0x01], vec![0x05]]
        );
    }

    #[test]
    fn test_flate() {
        let payloads = vec![vec![7u8; 300], vec![1, 2, 3]];
        let data = encode(&payloads, Compression::Flate).unwrap();
        assert!(data.len() < 300);
        assert_eq!(decode(&data, Compression::Flate).unwrap(), payloads);
    }

    #[test]
    fn test_truncated_batch() {
        assert!(decode(&[5, 1, 2], Compression::None).is_err());
    }

    #[test]
    fn test_empty_batch() {
        assert!(decode(&[], Compression::None).unwrap().is_empty());
    }
}
