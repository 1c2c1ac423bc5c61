// Copyright (C) 2020-2026 Andy Kurnia.

use super::error;

// tile numbering: 0 is the blank, 1 to 26 are A to Z.
// on the board (and in plays), a blank designated as A is 0x81.
pub const BLANK: u8 = 0;
pub const BLANK_BIT: u8 = 0x80;

#[derive(Clone)]
pub struct Tile {
    label: &'static str,
    blank_label: &'static str,
    freq: u8,
    score: i8,
}

#[derive(Clone)]
pub struct Alphabet {
    tiles: Box<[Tile]>,
}

static ENGLISH_LABELS: [(&str, &str, u8, i8); 27] = [
    ("?", "?", 2, 0),
    ("A", "a", 9, 1),
    ("B", "b", 2, 3),
    ("C", "c", 2, 3),
    ("D", "d", 4, 2),
    ("E", "e", 12, 1),
    ("F", "f", 2, 4),
    ("G", "g", 3, 2),
    ("H", "h", 2, 4),
    ("I", "i", 9, 1),
    ("J", "j", 1, 8),
    ("K", "k", 1, 5),
    ("L", "l", 4, 1),
    ("M", "m", 2, 3),
    ("N", "n", 6, 1),
    ("O", "o", 8, 1),
    ("P", "p", 2, 3),
    ("Q", "q", 1, 10),
    ("R", "r", 6, 1),
    ("S", "s", 4, 1),
    ("T", "t", 6, 1),
    ("U", "u", 4, 1),
    ("V", "v", 2, 4),
    ("W", "w", 2, 4),
    ("X", "x", 1, 8),
    ("Y", "y", 2, 4),
    ("Z", "z", 1, 10),
];

pub fn make_english_alphabet() -> Alphabet {
    Alphabet {
        tiles: ENGLISH_LABELS
            .iter()
            .map(|&(label, blank_label, freq, score)| Tile {
                label,
                blank_label,
                freq,
                score,
            })
            .collect(),
    }
}

impl Alphabet {
    #[inline(always)]
    pub fn len(&self) -> u8 {
        self.tiles.len() as u8
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline(always)]
    fn get(&self, idx: u8) -> &Tile {
        &self.tiles[idx as usize]
    }

    #[inline(always)]
    pub fn from_board(&self, idx: u8) -> Option<&'static str> {
        let c = idx & !BLANK_BIT;
        if c == 0 || c >= self.len() {
            None
        } else if idx & BLANK_BIT == 0 {
            Some(self.get(c).label)
        } else {
            Some(self.get(c).blank_label)
        }
    }

    #[inline(always)]
    pub fn from_rack(&self, idx: u8) -> Option<&'static str> {
        if idx >= self.len() {
            None
        } else {
            Some(self.get(idx).label)
        }
    }

    // blank-as-letter scores as the blank.
    #[inline(always)]
    pub fn score(&self, idx: u8) -> i8 {
        if idx & BLANK_BIT != 0 {
            self.get(BLANK).score
        } else {
            self.get(idx).score
        }
    }

    #[inline(always)]
    pub fn freq(&self, idx: u8) -> u8 {
        self.get(idx).freq
    }

    pub fn fmt_rack(&self, rack: &[u8]) -> String {
        rack.iter()
            .filter_map(|&tile| self.from_rack(tile))
            .collect()
    }

    // letters of a word as stored on a board, blanks in lowercase.
    pub fn fmt_word(&self, word: &[u8]) -> String {
        word.iter()
            .map(|&tile| self.from_board(tile).unwrap_or("."))
            .collect()
    }

    #[inline(always)]
    pub fn letter_of_char(&self, c: char) -> Option<u8> {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_uppercase() {
            let tile = (c as u8) - b'A' + 1;
            if tile < self.len() {
                return Some(tile);
            }
        }
        None
    }

    // case-normalized, letters only.
    pub fn parse_word(&self, s: &str) -> Option<Vec<u8>> {
        s.chars().map(|c| self.letter_of_char(c)).collect()
    }

    // '?' and '*' are blanks.
    pub fn parse_rack(&self, s: &str) -> Option<Vec<u8>> {
        s.chars()
            .map(|c| match c {
                '?' | '*' => Some(BLANK),
                _ => self.letter_of_char(c),
            })
            .collect()
    }

    // uppercase is a real tile, lowercase is a designated blank.
    #[inline(always)]
    pub fn parse_board_char(&self, c: char) -> Option<u8> {
        let tile = self.letter_of_char(c)?;
        Some(if c.is_ascii_lowercase() {
            tile | BLANK_BIT
        } else {
            tile
        })
    }

    // rows of label,score,freq. unknown labels are errors.
    pub fn with_values_from_csv<R: std::io::Read>(mut self, reader: R) -> error::Returns<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        for result in csv_reader.records() {
            let record = result?;
            if record.len() < 2 {
                return_error!(format!("need label,score[,freq], found {:?}", record));
            }
            let idx = match self.tiles.iter().position(|tile| tile.label == &record[0]) {
                Some(idx) => idx,
                None => {
                    return_error!(format!("invalid tile label {:?}", &record[0]));
                }
            };
            self.tiles[idx].score = record[1].parse()?;
            if let Some(freq) = record.get(2) {
                self.tiles[idx].freq = freq.parse()?;
            }
        }
        Ok(self)
    }
}
