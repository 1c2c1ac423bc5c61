// Copyright (C) 2020-2026 Andy Kurnia.

// [0] points to the dawg, [1] points to the gaddag.
pub const DAWG_ROOT: i32 = 0;
pub const GADDAG_ROOT: i32 = 1;

// the direction-change marker, "@" in comments.
pub const DELIMITER: u8 = 0;

#[inline(always)]
pub fn is_delimiter(tile: u8) -> bool {
    tile == DELIMITER
}

#[derive(Clone, Copy)]
pub struct Node(u32);

impl Node {
    #[inline(always)]
    pub fn tile(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline(always)]
    pub fn accepts(&self) -> bool {
        self.0 & 0x800000 != 0
    }

    #[inline(always)]
    pub fn is_end(&self) -> bool {
        self.0 & 0x400000 != 0
    }

    #[inline(always)]
    pub fn arc_index(&self) -> i32 {
        (self.0 & 0x3fffff) as i32
    }
}

pub struct Kwg(Box<[Node]>);

impl std::ops::Index<i32> for Kwg {
    type Output = Node;

    #[inline(always)]
    fn index(&self, i: i32) -> &Node {
        &self.0[i as usize]
    }
}

impl Kwg {
    pub fn from_bytes_alloc(buf: &[u8]) -> Kwg {
        Kwg(buf
            .chunks_exact(4)
            .map(|b| Node(u32::from_le_bytes([b[0], b[1], b[2], b[3]])))
            .collect())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|node| node.0.to_le_bytes()).collect()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // arc indexes must stay in range, the two roots must exist.
    pub fn is_well_formed(&self) -> bool {
        let len = self.0.len();
        len >= 2
            && self.0.iter().all(|node| (node.arc_index() as usize) < len)
            && self.0[len - 1].is_end()
    }

    // child of p labelled tile, or -1. p < 0 stays -1.
    #[inline(always)]
    pub fn seek(&self, mut p: i32, tile: u8) -> i32 {
        if p >= 0 {
            p = self[p].arc_index();
            if p > 0 {
                loop {
                    let node = self[p];
                    if node.tile() == tile {
                        return p;
                    }
                    if node.is_end() {
                        return -1;
                    }
                    p += 1;
                }
            }
        }
        -1 // intentionally return 0 as -1
    }

    // follows tiles from p, blank bits ignored.
    #[inline(always)]
    pub fn seek_all<I: IntoIterator<Item = u8>>(&self, mut p: i32, tiles: I) -> i32 {
        for tile in tiles {
            p = self.seek(p, tile & 0x7f);
            if p <= 0 {
                return -1;
            }
        }
        p
    }

    #[inline(always)]
    pub fn accepts_at(&self, p: i32) -> bool {
        p > 0 && self[p].accepts()
    }

    // the dawg half answers whole-word lookups.
    #[inline(always)]
    pub fn accepts_word(&self, word: &[u8]) -> bool {
        !word.is_empty() && self.accepts_at(self.seek_all(DAWG_ROOT, word.iter().copied()))
    }

    // starting from word[idx]: reversed prefix, then @, then the suffix.
    pub fn has_split(&self, word: &[u8], idx: usize) -> bool {
        if idx >= word.len() {
            return false;
        }
        let p = self.seek_all(GADDAG_ROOT, word[..=idx].iter().rev().copied());
        if idx + 1 == word.len() {
            return self.accepts_at(p);
        }
        if p <= 0 {
            return false;
        }
        let p = self.seek(p, DELIMITER);
        if p <= 0 {
            return false;
        }
        self.accepts_at(self.seek_all(p, word[idx + 1..].iter().copied()))
    }

    // calls back with every word in the dawg, in order.
    pub fn for_each_word<F: FnMut(&[u8])>(&self, mut callback: F) {
        fn iter<F: FnMut(&[u8])>(kwg: &Kwg, callback: &mut F, word: &mut Vec<u8>, mut p: i32) {
            if p <= 0 {
                return;
            }
            loop {
                let node = kwg[p];
                word.push(node.tile());
                if node.accepts() {
                    callback(word);
                }
                iter(kwg, callback, word, node.arc_index());
                word.pop();
                if node.is_end() {
                    break;
                }
                p += 1;
            }
        }
        if self.0.is_empty() {
            return;
        }
        iter(
            self,
            &mut callback,
            &mut Vec::new(),
            self[DAWG_ROOT].arc_index(),
        );
    }
}
