// Copyright (C) 2020-2026 Andy Kurnia.

// Builds the kwg: a minimized dawg of the words, plus a gaddag of every
// rotation whose post-delimiter suffixes point back into the dawg.

use super::{error, fash, kwg};
use std::collections::hash_map::Entry;

// An arc whose children are still being added.
struct PendingArc {
    tile: u8,
    accepts: bool,
    target: u32,
}

// A finished arc. Children of one parent are chained through sibling, the
// last one has sibling 0. Equal chains are stored once, so chains can
// share tails. Id 0 is the sink.
#[derive(Clone, Eq, Hash, PartialEq)]
struct SharedArc {
    tile: u8,
    accepts: bool,
    target: u32,
    sibling: u32,
}

struct Builder {
    arcs: Vec<SharedArc>,
    arc_ids: fash::TileHashMap<SharedArc, u32>,
    pending: Vec<PendingArc>,
    // pending[starts[i]..] are the children of pending[starts[i] - 1].
    starts: Vec<usize>,
}

impl Builder {
    fn new() -> Self {
        let sink = SharedArc {
            tile: 0,
            accepts: false,
            target: 0,
            sibling: 0,
        };
        let mut arc_ids = fash::TileHashMap::default();
        arc_ids.insert(sink.clone(), 0);
        Self {
            arcs: vec![sink],
            arc_ids,
            pending: Vec::new(),
            starts: Vec::new(),
        }
    }

    // stores pending[from..] as a chain, returns the id of its head.
    fn intern(&mut self, from: usize) -> u32 {
        let mut sibling = 0;
        for pending in self.pending[from..].iter().rev() {
            let arc = SharedArc {
                tile: pending.tile,
                accepts: pending.accepts,
                target: pending.target,
                sibling,
            };
            sibling = match self.arc_ids.entry(arc) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let id = self.arcs.len() as u32;
                    self.arcs.push(entry.key().clone());
                    entry.insert(id);
                    id
                }
            };
        }
        sibling
    }

    fn open(&mut self, tile: u8) {
        self.pending.push(PendingArc {
            tile,
            accepts: false,
            target: 0,
        });
        self.starts.push(self.pending.len());
    }

    fn close(&mut self) {
        if let Some(start) = self.starts.pop() {
            let target = self.intern(start);
            self.pending[start - 1].target = target;
            self.pending.truncate(start);
        }
    }

    // where a word already added from head ends.
    fn follow(&self, head: u32, tiles: impl Iterator<Item = u8>) -> u32 {
        let mut p = head;
        for tile in tiles {
            while self.arcs[p as usize].tile != tile {
                p = self.arcs[p as usize].sibling;
            }
            p = self.arcs[p as usize].target;
        }
        p
    }

    // Adds sorted entries as one trie and returns the head of its root
    // chain. With a dawg given, an entry ending in the delimiter does not
    // accept, its last arc continues in the dawg instead.
    fn add_sorted(&mut self, sorted_entries: &[Box<[u8]>], dawg_head: Option<u32>) -> u32 {
        let mut prev: &[u8] = &[];
        for entry in sorted_entries {
            // after a delimiter the depth is one less than prev.len().
            let depth = self.starts.len();
            let common = prev[..depth]
                .iter()
                .zip(entry.iter())
                .take_while(|(a, b)| a == b)
                .count();
            for _ in common..depth {
                self.close();
            }
            for &tile in &entry[common..] {
                self.open(tile);
            }
            let last = self.pending.len() - 1;
            match dawg_head {
                Some(dawg_head) if entry.last() == Some(&kwg::DELIMITER) => {
                    self.starts.pop();
                    // "AC@" continues where "CA" ends.
                    self.pending[last].target = self.follow(
                        dawg_head,
                        entry[..entry.len() - 1].iter().rev().copied(),
                    );
                }
                _ => self.pending[last].accepts = true,
            }
            prev = entry;
        }
        while !self.starts.is_empty() {
            self.close();
        }
        let head = self.intern(0);
        self.pending.clear();
        head
    }
}

// CARE gives ERAC, RAC@, AC@ and C@. The @ arcs continue in the dawg
// with E, RE and ARE.
fn gaddag_entries(words: &[Box<[u8]>]) -> Vec<Box<[u8]>> {
    let mut entries = fash::TileHashSet::<Box<[u8]>>::default();
    for word in words {
        let reversed = word.iter().rev().copied().collect::<Vec<_>>();
        for split in 1..word.len() {
            let mut entry = reversed[split..].to_vec();
            entry.push(kwg::DELIMITER);
            entries.insert(entry.into_boxed_slice());
        }
        entries.insert(reversed.into_boxed_slice());
    }
    let mut entries = entries.into_iter().collect::<Vec<_>>();
    entries.sort_unstable();
    entries
}

// Assigns node positions. A chain is laid out from its furthest head so
// that chains sharing its tail reuse the same nodes.
struct Layout<'a> {
    arcs: &'a [SharedArc],
    // an arc whose sibling is this one, 0 if none.
    before: Vec<u32>,
    position: Vec<u32>,
    len: u32,
}

impl<'a> Layout<'a> {
    fn new(arcs: &'a [SharedArc]) -> Self {
        let mut before = vec![0u32; arcs.len()];
        for (id, arc) in arcs.iter().enumerate().skip(1).rev() {
            before[arc.sibling as usize] = id as u32;
        }
        // before[0] is meaningless.
        before[0] = 0;
        Self {
            arcs,
            before,
            position: vec![0u32; arcs.len()],
            // [0] and [1] are the roots.
            len: 2,
        }
    }

    fn place(&mut self, mut head: u32) {
        while self.before[head as usize] != 0 {
            head = self.before[head as usize];
        }
        if self.position[head as usize] != 0 {
            return;
        }
        // in progress, for chains that lead back to themselves.
        self.position[head as usize] = !0;
        let arcs = self.arcs;
        let chain = std::iter::successors(Some(head), |&p| {
            Some(arcs[p as usize].sibling).filter(|&sibling| sibling != 0)
        })
        .collect::<Vec<_>>();
        for &p in &chain {
            let target = arcs[p as usize].target;
            if target != 0 {
                self.place(target);
            }
        }
        for (offset, &p) in chain.iter().enumerate() {
            self.position[p as usize] = self.len + offset as u32;
        }
        self.len += chain.len() as u32;
    }

    // bits 0-21 target, bit 22 end of siblings, bit 23 accepts, bits 24-31 tile.
    fn encode(&self, tile: u8, accepts: bool, is_end: bool, target: u32) -> u32 {
        ((tile as u32) << 24)
            | if accepts { 0x800000 } else { 0 }
            | if is_end { 0x400000 } else { 0 }
            | (self.position[target as usize] & 0x3fffff)
    }

    fn to_bytes(&self, dawg_head: u32, gaddag_head: u32) -> Vec<u8> {
        let mut nodes = vec![0u32; self.len as usize];
        nodes[0] = self.encode(0, false, true, dawg_head);
        nodes[1] = self.encode(0, false, true, gaddag_head);
        for head in 1..self.arcs.len() {
            if self.before[head] != 0 || self.position[head] == 0 {
                continue;
            }
            let mut at = self.position[head] as usize;
            let mut p = head;
            loop {
                let arc = &self.arcs[p];
                nodes[at] = self.encode(arc.tile, arc.accepts, arc.sibling == 0, arc.target);
                if arc.sibling == 0 {
                    break;
                }
                p = arc.sibling as usize;
                at += 1;
            }
        }
        nodes.iter().flat_map(|node| node.to_le_bytes()).collect()
    }
}

// machine_words must be sorted, deduplicated, and free of empty words.
pub fn build(machine_words: &[Box<[u8]>]) -> error::Returns<Vec<u8>> {
    if machine_words.iter().any(|word| word.is_empty()) {
        return_error!("cannot build with an empty word".into());
    }
    if machine_words.windows(2).any(|pair| pair[0] >= pair[1]) {
        return_error!("input is not sorted and deduplicated".into());
    }

    let mut builder = Builder::new();
    let dawg_head = builder.add_sorted(machine_words, None);
    let gaddag_head = builder.add_sorted(&gaddag_entries(machine_words), Some(dawg_head));

    let mut layout = Layout::new(&builder.arcs);
    // keeps the sink out of the layout when the lexicon is empty.
    layout.position[0] = !0;
    layout.place(dawg_head);
    layout.place(gaddag_head);
    layout.position[0] = 0;

    if layout.len > 0x400000 {
        return_error!(format!("this format cannot have {} nodes", layout.len));
    }
    Ok(layout.to_bytes(dawg_head, gaddag_head))
}
