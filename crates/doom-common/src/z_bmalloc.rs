// z_bmalloc.rs — fixed-size block pool allocator
//
// Items of one type are carved out of blocks of `perpool` slots. Released
// slots go back on this pool's free list and are handed out again before
// the pool grows; storage is never returned to the general heap until the
// whole pool is cleared at level teardown.

use crate::common::{com_dprintf, com_error};
use crate::doomdef::ERR_FATAL;

pub struct BlockPool<T> {
    name: &'static str,
    slots: Vec<Option<T>>,
    free: Vec<u32>,
    perpool: usize,
    max_items: usize,
    live: usize,
}

impl<T> BlockPool<T> {
    /// `max_items` of 0 means unbounded.
    pub fn new(name: &'static str, perpool: usize, max_items: usize) -> Self {
        Self {
            name,
            slots: Vec::new(),
            free: Vec::new(),
            perpool: perpool.max(1),
            max_items,
            live: 0,
        }
    }

    /// Store `item` in a free slot, growing by one block if none is free.
    pub fn acquire(&mut self, item: T) -> u32 {
        if self.free.is_empty() {
            self.grow();
        }
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                com_error(ERR_FATAL, &format!("Z_BMalloc: {} has no free slot", self.name));
                return u32::MAX;
            }
        };
        self.slots[idx as usize] = Some(item);
        self.live += 1;
        idx
    }

    /// Return a slot to the free list, handing back its contents.
    pub fn release(&mut self, idx: u32) -> Option<T> {
        let item = self.slots.get_mut(idx as usize)?.take()?;
        self.free.push(idx);
        self.live -= 1;
        Some(item)
    }

    fn grow(&mut self) {
        let old = self.slots.len();
        if self.max_items != 0 && old + self.perpool > self.max_items {
            com_error(
                ERR_FATAL,
                &format!("Z_BMalloc: {} exhausted ({} items)", self.name, old),
            );
            return;
        }
        self.slots.resize_with(old + self.perpool, || None);
        // reversed so the lowest new slot is handed out first
        self.free.extend((old..old + self.perpool).rev().map(|i| i as u32));
        com_dprintf(&format!("Z_BMalloc: {} grown to {} slots\n", self.name, self.slots.len()));
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.slots.get(idx as usize).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.slots.get_mut(idx as usize).and_then(|s| s.as_mut())
    }

    pub fn is_live(&self, idx: u32) -> bool {
        self.get(idx).is_some()
    }

    /// Number of slots currently in use.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of slots allocated across all blocks.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every block. Outstanding indices become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<T> std::ops::Index<u32> for BlockPool<T> {
    type Output = T;

    fn index(&self, idx: u32) -> &T {
        match self.get(idx) {
            Some(item) => item,
            None => panic!("{}: slot {} is not allocated", self.name, idx),
        }
    }
}

impl<T> std::ops::IndexMut<u32> for BlockPool<T> {
    fn index_mut(&mut self, idx: u32) -> &mut T {
        let name = self.name;
        match self.get_mut(idx) {
            Some(item) => item,
            None => panic!("{}: slot {} is not allocated", name, idx),
        }
    }
}
