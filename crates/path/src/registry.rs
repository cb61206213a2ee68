//! Iterators addressed by integer handles.
//!
//! This is the contract the binding layer exposes to the host runtime: iterators are
//! created and destroyed explicitly and every other operation takes a handle. Handles
//! carry a generation so that a destroyed handle is detected even after its slot has
//! been reused.

use crate::extract::PathHandle;
use crate::iterator::{ConicEvaluation, IteratorOptions, PathIterator};
use crate::layout::{LayoutDescriptor, LayoutResolver, VersionSource};
use crate::memory::HostMemory;
use crate::verb::Verb;
use crate::{Error, Result};

/// Refers to an iterator of an [`IteratorRegistry`](struct.IteratorRegistry.html).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IteratorHandle {
    index: u32,
    generation: u32,
}

impl IteratorHandle {
    /// Packs the handle into an integer, generation in the high bits.
    #[inline]
    pub fn to_bits(self) -> u64 {
        (self.generation as u64) << 32 | self.index as u64
    }

    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        IteratorHandle {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

struct Slot<'l> {
    generation: u32,
    iterator: Option<PathIterator<'l>>,
}

/// Owns the iterators created over the paths of a host memory.
pub struct IteratorRegistry<'l, M: HostMemory + ?Sized> {
    memory: &'l M,
    layout: Result<&'static LayoutDescriptor>,
    slots: Vec<Slot<'l>>,
    available_slots: Vec<usize>,
}

impl<'l, M: HostMemory + ?Sized> IteratorRegistry<'l, M> {
    pub fn new(memory: &'l M, layout: &'static LayoutDescriptor) -> Self {
        IteratorRegistry::with_layout(memory, Ok(layout))
    }

    /// Uses the layout selected by `resolver`. If the layout can't be resolved, every
    /// call to `create` fails with the resolution error.
    pub fn with_resolver<V: VersionSource>(memory: &'l M, resolver: &LayoutResolver<V>) -> Self {
        IteratorRegistry::with_layout(memory, resolver.resolve())
    }

    fn with_layout(memory: &'l M, layout: Result<&'static LayoutDescriptor>) -> Self {
        IteratorRegistry {
            memory,
            layout,
            slots: Vec::new(),
            available_slots: Vec::new(),
        }
    }

    /// Creates an iterator over the path at `path`.
    pub fn create(
        &mut self,
        path: PathHandle,
        conic_evaluation: ConicEvaluation,
        tolerance: f32,
    ) -> Result<IteratorHandle> {
        let layout = self.layout.clone()?;
        let options = IteratorOptions {
            conic_evaluation,
            tolerance,
        };
        let iterator = PathIterator::from_handle(self.memory, path, layout, options)?;

        let index = match self.available_slots.pop() {
            Some(index) => {
                self.slots[index].iterator = Some(iterator);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 1,
                    iterator: Some(iterator),
                });
                self.slots.len() - 1
            }
        };

        Ok(IteratorHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        })
    }

    /// Releases an iterator. The handle can't be used afterwards.
    pub fn destroy(&mut self, handle: IteratorHandle) -> Result<()> {
        self.get(handle)?;

        let index = handle.index as usize;
        let slot = &mut self.slots[index];
        slot.iterator = None;
        slot.generation = match slot.generation.wrapping_add(1) {
            0 => 1,
            generation => generation,
        };
        self.available_slots.push(index);

        Ok(())
    }

    pub fn get(&self, handle: IteratorHandle) -> Result<&PathIterator<'l>> {
        match self.slots.get(handle.index as usize) {
            Some(Slot {
                generation,
                iterator: Some(iterator),
            }) if *generation == handle.generation => Ok(iterator),
            _ => Err(Error::UseAfterFree),
        }
    }

    pub fn get_mut(&mut self, handle: IteratorHandle) -> Result<&mut PathIterator<'l>> {
        match self.slots.get_mut(handle.index as usize) {
            Some(Slot {
                generation,
                iterator: Some(iterator),
            }) if *generation == handle.generation => Ok(iterator),
            _ => Err(Error::UseAfterFree),
        }
    }

    pub fn has_next(&self, handle: IteratorHandle) -> Result<bool> {
        Ok(self.get(handle)?.has_next())
    }

    /// Produces the next verb, writing its points into `buffer` at `offset`.
    ///
    /// See [`PathIterator::next_into`](../iterator/struct.PathIterator.html#method.next_into).
    pub fn next(
        &mut self,
        handle: IteratorHandle,
        buffer: &mut [f32],
        offset: usize,
    ) -> Result<Verb> {
        self.get_mut(handle)?.next_into(buffer, offset)
    }

    pub fn peek(&self, handle: IteratorHandle) -> Result<Verb> {
        Ok(self.get(handle)?.peek())
    }

    pub fn raw_count(&self, handle: IteratorHandle) -> Result<usize> {
        Ok(self.get(handle)?.raw_count())
    }

    pub fn count(&self, handle: IteratorHandle) -> Result<usize> {
        Ok(self.get(handle)?.count())
    }

    /// Number of live iterators.
    pub fn len(&self) -> usize {
        self.slots.len() - self.available_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
