use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use bitvec::prelude::*;
use log::debug;
use spin::Mutex;

use crate::fs::{
    error::{Error, Result},
    node::file::File,
};

/// Default number of descriptor slots.
pub const MAX_DESC_COUNT: usize = 1024;

/// A handle to an open file: the index of a slot in a [DescriptorPool], tagged with the
/// generation the slot had when it was handed out.
///
/// A handle kept after its slot is released no longer matches the slot and is rejected, even
/// once the slot has been handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fd {
    index: usize,
    generation: u32,
}

impl Fd {
    pub fn index(self) -> usize {
        self.index
    }
}

/// The state bound to a held descriptor: the open file and its cursor.
///
/// Shared between every caller using the same [Fd]. The cursor only moves under the file lock.
pub struct FileDescription {
    file: Arc<File>,
    offset: AtomicU64,
}

impl FileDescription {
    pub fn new(file: Arc<File>, offset: u64) -> Self {
        Self {
            file,
            offset: AtomicU64::new(offset),
        }
    }

    pub fn file(&self) -> &Arc<File> {
        &self.file
    }

    pub fn offset(&self) -> u64 {
        self.offset.load(Ordering::Relaxed)
    }

    pub fn seek(&self, offset: u64) {
        self.offset.store(offset, Ordering::Relaxed);
    }

    /// Reads at the cursor, advancing it.
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.file.read(&self.offset, buf)
    }

    /// Writes at the cursor, advancing it.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.file.write(&self.offset, buf)
    }
}

/// A description bound to a slot, with the generation of the [Fd] that bound it.
struct Binding {
    generation: u32,
    description: Arc<FileDescription>,
}

/// Free slot indices in release order, a bitmap of held slots, and the current generation of
/// each slot.
struct FreeList {
    queue: VecDeque<usize>,
    held: BitBox,
    generations: Box<[u32]>,
}

/// A fixed set of recyclable descriptor slots.
///
/// Slots are created once and never reallocated. [DescriptorPool::acquire] hands out a free
/// slot, [DescriptorPool::release] puts it back. Each slot is held by at most one caller
/// between a matching acquire/release pair.
pub struct DescriptorPool {
    slots: Box<[Mutex<Option<Binding>>]>,
    free: Mutex<FreeList>,
}

impl DescriptorPool {
    /// Constructs a pool of `count` free slots.
    pub fn new(count: usize) -> Self {
        let slots = (0..count).map(|_| Mutex::new(None)).collect();
        let free = FreeList {
            queue: (0..count).collect(),
            held: bitbox![0; count],
            generations: vec![0; count].into_boxed_slice(),
        };
        Self {
            slots,
            free: Mutex::new(free),
        }
    }

    /// Takes a slot off the free list.
    pub fn acquire(&self) -> Result<Fd> {
        let mut free = self.free.lock();
        let index = free.queue.pop_front().ok_or(Error::NoDescriptors)?;
        free.held.set(index, true);
        let generation = free.generations[index];
        debug!("acquired descriptor {index}");
        Ok(Fd { index, generation })
    }

    /// Returns a held slot to the free list and retires `fd`.
    /// Releasing a slot that is not held, or through a retired handle, is reported instead of
    /// corrupting the free list.
    pub fn release(&self, fd: Fd) -> Result<()> {
        let mut free = self.free.lock();
        let held = free.held.get(fd.index).is_some_and(|held| *held);
        if !held || free.generations[fd.index] != fd.generation {
            return Err(Error::BadDescriptor);
        }
        free.held.set(fd.index, false);
        free.generations[fd.index] = fd.generation.wrapping_add(1);
        free.queue.push_back(fd.index);
        debug!("released descriptor {}", fd.index);
        Ok(())
    }

    /// Binds a held slot to an open file.
    pub fn bind(&self, fd: Fd, description: FileDescription) -> Result<()> {
        *self.slot(fd)?.lock() = Some(Binding {
            generation: fd.generation,
            description: Arc::new(description),
        });
        Ok(())
    }

    /// Detaches the open file from a slot, returning what was bound.
    pub fn unbind(&self, fd: Fd) -> Result<Arc<FileDescription>> {
        let mut slot = self.slot(fd)?.lock();
        match slot.take() {
            Some(binding) if binding.generation == fd.generation => Ok(binding.description),
            other => {
                *slot = other;
                Err(Error::BadDescriptor)
            }
        }
    }

    /// Returns the description bound to `fd`.
    pub fn get(&self, fd: Fd) -> Result<Arc<FileDescription>> {
        self.slot(fd)?
            .lock()
            .as_ref()
            .filter(|binding| binding.generation == fd.generation)
            .map(|binding| binding.description.clone())
            .ok_or(Error::BadDescriptor)
    }

    /// Returns the number of slots available for acquisition.
    pub fn available(&self) -> usize {
        self.free.lock().queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, fd: Fd) -> Result<&Mutex<Option<Binding>>> {
        self.slots.get(fd.index).ok_or(Error::BadDescriptor)
    }
}
