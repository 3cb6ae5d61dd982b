//! Generation-checked container handles.
//!
//! A handle is the address a caller holds for a native container: the
//! upper 32 bits pick an entry, the lower 32 bits must match that entry's
//! current generation. Destroying a container bumps the generation, so any
//! copy of the old handle (a wrap that outlived its owner, a double
//! destroy) resolves to nothing instead of reaching freed storage.
//! Generations start at 1; the all-zero handle is the null address.

const FIRST_GENERATION: u32 = 1;

fn pack(index: u32, generation: u32) -> u64 {
    (u64::from(index) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (u32, u32) {
    ((handle >> 32) as u32, handle as u32)
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Maps handles to live values, recycling vacated entries.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and issue its handle. The result is never 0.
    pub fn insert(&mut self, value: T) -> u64 {
        self.live += 1;
        match self.vacant.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.value = Some(value);
                pack(index, entry.generation)
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry {
                    generation: FIRST_GENERATION,
                    value: Some(value),
                });
                pack(index, FIRST_GENERATION)
            }
        }
    }

    /// The value behind `handle`, if it is still live.
    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, generation) = unpack(handle);
        self.entries
            .get(index as usize)
            .filter(|entry| entry.generation == generation)?
            .value
            .as_ref()
    }

    /// Take the value behind `handle`, invalidating every copy of it.
    ///
    /// An entry whose generation would wrap to 0 is never recycled.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = unpack(handle);
        let entry = self
            .entries
            .get_mut(index as usize)
            .filter(|entry| entry.generation == generation)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(index);
        }
        self.live -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.live
    }
}
