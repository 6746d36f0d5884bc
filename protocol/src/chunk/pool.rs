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

//! Reusable scratch buffers for chunk encoding.

use lazy_static::lazy_static;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Buffers kept around at most. Extra buffers are freed on return.
const MAX_POOLED: usize = 64;
/// Buffers that grew past this are freed rather than pooled.
const MAX_CAPACITY: usize = 1 << 20;

lazy_static! {
    static ref POOL: Mutex<Vec<Vec<u8>>> = Mutex::new(Vec::new());
}

/// A buffer checked out of the pool. It goes back, emptied, when dropped.
pub struct Buffer {
    buf: Vec<u8>,
}

/// Checks an empty buffer out of the pool.
pub fn get() -> Buffer {
    let buf = POOL
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop()
        .unwrap_or_else(|| Vec::with_capacity(1024));
    Buffer { buf }
}

impl Buffer {
    /// Copies the contents out, the pooled memory is never handed out.
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

impl Deref for Buffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.buf.capacity() > MAX_CAPACITY {
            return;
        }
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        let mut pool = POOL.lock().unwrap_or_else(|e| e.into_inner());
        if pool.len() < MAX_POOLED {
            pool.push(buf);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_returned_empty() {
        {
            let mut b = get();
            b.extend_from_slice(b"chunk data");
            let out = b.to_vec();
            assert_eq!(out, b"chunk data");
        }
        // Whichever buffer comes back next, it must be empty.
        let b = get();
        assert!(b.is_empty());
    }

    #[test]
    fn test_concurrent_checkout() {
        use std::thread;
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                thread::spawn(move || {
                    let mut b = get();
                    b.push(i);
                    b.to_vec()
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), vec![i as u8]);
        }
    }
}
