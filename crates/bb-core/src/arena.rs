//! Chunked bump allocator.
//!
//! Chunks are allocated once and never resized, so a block handed out stays at
//! the same address until the arena is cleared or dropped. Every allocation is
//! rounded up to [`ARENA_ALIGN`] bytes and every chunk base is aligned to it.

use thiserror::Error;

use crate::error::DialogueError;

pub const ARENA_ALIGN: usize = 16;
pub const DEFAULT_CHUNK_CAPACITY: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("arena could not reserve {requested} bytes")]
    OutOfMemory { requested: usize },
}

impl From<ArenaError> for DialogueError {
    fn from(error: ArenaError) -> Self {
        DialogueError::new("ARENA_OUT_OF_MEMORY", error.to_string())
    }
}

/// Handle to bytes inside an [`Arena`]. Handles from before the last
/// [`Arena::clear_and_coalesce`] no longer resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaBlock {
    chunk: usize,
    offset: usize,
    len: usize,
    generation: u32,
}

impl ArenaBlock {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug)]
struct Chunk {
    buffer: Vec<u8>,
    base: usize,
    capacity: usize,
    used: usize,
}

impl Chunk {
    fn allocate(capacity: usize) -> Result<Self, ArenaError> {
        let requested = capacity
            .checked_add(ARENA_ALIGN - 1)
            .ok_or(ArenaError::OutOfMemory {
                requested: capacity,
            })?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(requested)
            .map_err(|_| ArenaError::OutOfMemory { requested })?;
        buffer.resize(requested, 0);
        let base = buffer.as_ptr().align_offset(ARENA_ALIGN);
        if base >= ARENA_ALIGN {
            return Err(ArenaError::OutOfMemory { requested });
        }
        Ok(Self {
            buffer,
            base,
            capacity,
            used: 0,
        })
    }

    fn remaining(&self) -> usize {
        self.capacity - self.used
    }
}

#[derive(Debug)]
pub struct Arena {
    chunks: Vec<Chunk>,
    next_capacity: usize,
    generation: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CAPACITY)
    }
}

impl Arena {
    /// No memory is reserved until the first allocation.
    pub fn new(first_chunk_capacity: usize) -> Self {
        Self {
            chunks: Vec::new(),
            next_capacity: round_up(first_chunk_capacity.max(ARENA_ALIGN)),
            generation: 0,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_capacity(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.capacity).sum()
    }

    pub fn allocate(&mut self, size: usize) -> Result<ArenaBlock, ArenaError> {
        let rounded = round_up(size.max(1));
        let chunk_index = match self
            .chunks
            .iter()
            .position(|chunk| chunk.remaining() >= rounded)
        {
            Some(index) => index,
            None => {
                let capacity = self.next_capacity.max(rounded);
                self.chunks.push(Chunk::allocate(capacity)?);
                self.next_capacity = self.next_capacity.saturating_mul(2);
                self.chunks.len() - 1
            }
        };

        let chunk = &mut self.chunks[chunk_index];
        let offset = chunk.used;
        chunk.used += rounded;
        Ok(ArenaBlock {
            chunk: chunk_index,
            offset,
            len: size,
            generation: self.generation,
        })
    }

    pub fn alloc_bytes(&mut self, data: &[u8]) -> Result<ArenaBlock, ArenaError> {
        let block = self.allocate(data.len())?;
        if let Some(target) = self.bytes_mut(block) {
            target.copy_from_slice(data);
        }
        Ok(block)
    }

    pub fn alloc_str(&mut self, text: &str) -> Result<ArenaBlock, ArenaError> {
        self.alloc_bytes(text.as_bytes())
    }

    pub fn bytes(&self, block: ArenaBlock) -> Option<&[u8]> {
        let (chunk, start) = self.resolve(block)?;
        chunk.buffer.get(start..start + block.len)
    }

    pub fn bytes_mut(&mut self, block: ArenaBlock) -> Option<&mut [u8]> {
        if block.generation != self.generation {
            return None;
        }
        let chunk = self.chunks.get_mut(block.chunk)?;
        let start = chunk.base + block.offset;
        chunk.buffer.get_mut(start..start + block.len)
    }

    pub fn str(&self, block: ArenaBlock) -> Option<&str> {
        std::str::from_utf8(self.bytes(block)?).ok()
    }

    /// Frees every chunk and replaces them with a single chunk as large as
    /// all of them together.
    pub fn clear_and_coalesce(&mut self) -> Result<(), ArenaError> {
        let total = self.total_capacity();
        self.chunks.clear();
        self.generation = self.generation.wrapping_add(1);
        if total > 0 {
            self.chunks.push(Chunk::allocate(total)?);
        }
        Ok(())
    }

    fn resolve(&self, block: ArenaBlock) -> Option<(&Chunk, usize)> {
        if block.generation != self.generation {
            return None;
        }
        let chunk = self.chunks.get(block.chunk)?;
        Some((chunk, chunk.base + block.offset))
    }
}

fn round_up(size: usize) -> usize {
    size.saturating_add(ARENA_ALIGN - 1) & !(ARENA_ALIGN - 1)
}
