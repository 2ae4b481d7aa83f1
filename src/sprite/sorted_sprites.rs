//! Draw order of all live sprites.
//!
//! Sprites are grouped into layers, one per distinct `SortKey`, kept sorted by key.
//! Inside a layer sprites form a doubly linked list (threaded through `links`) in insertion order,
//! so removing a sprite never has to search for it.

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use crate::shared_constants::MAX_SPRITE_ITEMS;

/// Position of a sprite in the draw order.
///
/// The background priority is the primary key, the z order the secondary one.
/// Lower keys end up at lower OAM indices, which the hardware draws on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pub bg_priority: u8,
    pub z_order: i16,
}

impl SortKey {
    pub fn new(bg_priority: u8, z_order: i16) -> SortKey {
        return SortKey {
            bg_priority,
            z_order,
        };
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: Option<u16>,
    next: Option<u16>,
    linked: bool,
}

impl Link {
    const UNLINKED: Link = Link {
        prev: None,
        next: None,
        linked: false,
    };
}

#[derive(Debug, Clone, Copy)]
struct Layer {
    key: SortKey,
    head: u16,
    tail: u16,
}

#[derive(Debug)]
pub(crate) struct SortedSprites {
    layers: ArrayVec<Layer, MAX_SPRITE_ITEMS>,
    links: Vec<Link>,
    keys: Vec<SortKey>,
    len: usize,
}

impl SortedSprites {
    /// Create an index for items `0..capacity`.
    pub fn new(capacity: usize) -> SortedSprites {
        assert!(
            capacity <= MAX_SPRITE_ITEMS,
            "Sorted sprites capacity too large: {}",
            capacity
        );
        return SortedSprites {
            layers: ArrayVec::new(),
            links: vec![Link::UNLINKED; capacity],
            keys: vec![SortKey::new(0, 0); capacity],
            len: 0,
        };
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn contains(&self, index: usize) -> bool {
        return self.links[index].linked;
    }

    pub fn key(&self, index: usize) -> SortKey {
        return self.keys[index];
    }

    /// Number of distinct keys in use.
    pub fn layers_count(&self) -> usize {
        return self.layers.len();
    }

    /// Add the item behind every item with the same key.
    pub fn insert(&mut self, index: usize, key: SortKey) {
        assert!(
            !self.links[index].linked,
            "Sprite item {} is already sorted",
            index
        );

        let node = index as u16;
        match self.layers.binary_search_by(|layer| layer.key.cmp(&key)) {
            Ok(layer_index) => {
                let layer = &mut self.layers[layer_index];
                let tail = layer.tail;
                layer.tail = node;
                self.links[tail as usize].next = Some(node);
                self.links[index] = Link {
                    prev: Some(tail),
                    next: None,
                    linked: true,
                };
            }
            Err(layer_index) => {
                self.layers.insert(
                    layer_index,
                    Layer {
                        key,
                        head: node,
                        tail: node,
                    },
                );
                self.links[index] = Link {
                    prev: None,
                    next: None,
                    linked: true,
                };
            }
        }

        self.keys[index] = key;
        self.len += 1;
    }

    pub fn erase(&mut self, index: usize) {
        let link = self.links[index];
        assert!(link.linked, "Sprite item {} isn't sorted", index);

        let key = self.keys[index];
        let layer_index = match self.layers.binary_search_by(|layer| layer.key.cmp(&key)) {
            Ok(layer_index) => layer_index,
            Err(_) => panic!("No layer for sort key {:?}", key),
        };

        match (link.prev, link.next) {
            (None, None) => {
                self.layers.remove(layer_index);
            }
            (prev, next) => {
                let layer = &mut self.layers[layer_index];
                match prev {
                    Some(prev) => self.links[prev as usize].next = next,
                    None => layer.head = next.unwrap_or(layer.head),
                }
                match next {
                    Some(next) => self.links[next as usize].prev = prev,
                    None => layer.tail = prev.unwrap_or(layer.tail),
                }
            }
        }

        self.links[index] = Link::UNLINKED;
        self.len -= 1;
    }

    /// Move the item to a new key. Does nothing if the key doesn't change.
    pub fn reorder(&mut self, index: usize, key: SortKey) {
        if self.keys[index] == key && self.links[index].linked {
            return;
        }
        self.erase(index);
        self.insert(index, key);
    }

    /// Items in draw order.
    pub fn iter(&self) -> Iter<'_> {
        return Iter {
            sorted: self,
            next_layer: 0,
            node: None,
        };
    }
}

pub(crate) struct Iter<'a> {
    sorted: &'a SortedSprites,
    next_layer: usize,
    node: Option<u16>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(node) = self.node {
                self.node = self.sorted.links[node as usize].next;
                return Some(node as usize);
            }
            let layer = self.sorted.layers.get(self.next_layer)?;
            self.next_layer += 1;
            self.node = Some(layer.head);
        }
    }
}
