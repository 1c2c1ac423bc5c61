// Copyright (C) 2020-2026 Andy Kurnia.

//! The board as handed over by the game: a grid of cells, each either empty
//! or holding a tile, plus whatever special content the game attaches. The
//! engine only ever looks at the occupancy.

use super::{alphabet, error::EngineError, matrix, movegen};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedTile {
    pub letter: u8, // 1 for A
    pub value: i8,
    pub is_blank: bool,
}

impl PlacedTile {
    // the packed form used everywhere else, 0x81 for blank-as-A.
    #[inline(always)]
    pub fn board_tile(&self) -> u8 {
        self.letter | if self.is_blank { alphabet::BLANK_BIT } else { 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Square {
    Empty,
    Occupied(PlacedTile),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell<X = ()> {
    pub square: Square,
    pub special: Option<X>,
}

impl<X> Cell<X> {
    pub fn empty() -> Self {
        Self {
            square: Square::Empty,
            special: None,
        }
    }

    pub fn occupied(tile: PlacedTile) -> Self {
        Self {
            square: Square::Occupied(tile),
            special: None,
        }
    }
}

/// Tiles are 0 for empty, 1 for A, 0x81 for blank-as-A. Values are the
/// points each tile scores, which the game may have changed.
#[derive(Clone)]
pub struct Board {
    dim: matrix::Dim,
    tiles: Box<[u8]>,
    values: Box<[i8]>,
}

impl Board {
    pub fn new(dim: matrix::Dim) -> Self {
        Self {
            dim,
            tiles: vec![0u8; dim.num_cells()].into_boxed_slice(),
            values: vec![0i8; dim.num_cells()].into_boxed_slice(),
        }
    }

    pub fn from_cells<X>(
        alphabet: &alphabet::Alphabet,
        dim: matrix::Dim,
        cells: &[Cell<X>],
    ) -> Result<Self, EngineError> {
        if cells.len() != dim.num_cells() {
            return Err(EngineError::MalformedInput(format!(
                "board: need {}x{} = {} cells, found {}",
                dim.rows,
                dim.cols,
                dim.num_cells(),
                cells.len()
            )));
        }
        let mut board = Self::new(dim);
        for (at, cell) in cells.iter().enumerate() {
            if let Square::Occupied(tile) = cell.square {
                if tile.letter == 0 || tile.letter >= alphabet.len() {
                    return Err(EngineError::MalformedInput(format!(
                        "board: invalid letter {} at {:?}",
                        tile.letter,
                        dim.row_col(at)
                    )));
                }
                board.tiles[at] = tile.board_tile();
                board.values[at] = tile.value;
            }
        }
        Ok(board)
    }

    // '.' or ' ' is empty, uppercase is a tile, lowercase is a blank.
    pub fn from_rows<S: AsRef<str>>(
        alphabet: &alphabet::Alphabet,
        dim: matrix::Dim,
        rows: &[S],
    ) -> Result<Self, EngineError> {
        if rows.len() != dim.rows as usize {
            return Err(EngineError::MalformedInput(format!(
                "board: need {} rows, found {} rows",
                dim.rows,
                rows.len()
            )));
        }
        let mut board = Self::new(dim);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != dim.cols as usize {
                return Err(EngineError::MalformedInput(format!(
                    "board: row {} needs {} columns, found {:?}",
                    r + 1,
                    dim.cols,
                    row
                )));
            }
            for (c, ch) in row.chars().enumerate() {
                if ch == '.' || ch == ' ' {
                    continue;
                }
                let tile = alphabet.parse_board_char(ch).ok_or_else(|| {
                    EngineError::MalformedInput(format!(
                        "board: invalid tile {:?} in row {}",
                        ch,
                        r + 1
                    ))
                })?;
                let at = dim.at_row_col(r as i8, c as i8);
                board.tiles[at] = tile;
                board.values[at] = alphabet.score(tile);
            }
        }
        Ok(board)
    }

    pub fn to_rows(&self, alphabet: &alphabet::Alphabet) -> Vec<String> {
        (0..self.dim.rows)
            .map(|r| {
                let strider = self.dim.across(r);
                (0..strider.len())
                    .map(|c| alphabet.from_board(self.tiles[strider.at(c)]).unwrap_or("."))
                    .collect()
            })
            .collect()
    }

    #[inline(always)]
    pub fn dim(&self) -> matrix::Dim {
        self.dim
    }

    #[inline(always)]
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    #[inline(always)]
    pub fn value_at(&self, at: usize) -> i8 {
        self.values[at]
    }

    pub fn square_at(&self, row: i8, col: i8) -> Square {
        let at = self.dim.at_row_col(row, col);
        match self.tiles[at] {
            0 => Square::Empty,
            tile => Square::Occupied(PlacedTile {
                letter: tile & !alphabet::BLANK_BIT,
                value: self.values[at],
                is_blank: tile & alphabet::BLANK_BIT != 0,
            }),
        }
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.iter().filter(|&&t| t != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(|&t| t == 0)
    }

    /// Puts the new tiles of a move on the board. Play-through cells must
    /// already be occupied and new tiles must land on empty cells.
    pub fn place(
        &mut self,
        alphabet: &alphabet::Alphabet,
        play: &movegen::Candidate,
    ) -> Result<(), EngineError> {
        let strider = self.dim.lane(play.down, play.lane);
        if play.lane < 0
            || play.lane >= self.dim.num_lanes(play.down)
            || play.idx < 0
            || play.idx as usize + play.word.len() > strider.len() as usize
        {
            return Err(EngineError::MalformedInput(
                "play does not fit the board".into(),
            ));
        }
        for (i, &tile) in (play.idx..).zip(play.word.iter()) {
            let occupied = self.tiles[strider.at(i)] != 0;
            if occupied == (tile != 0) {
                return Err(EngineError::MalformedInput(format!(
                    "play does not match the board at index {}",
                    i
                )));
            }
        }
        for (i, &tile) in (play.idx..).zip(play.word.iter()) {
            if tile != 0 {
                let at = strider.at(i);
                self.tiles[at] = tile;
                self.values[at] = alphabet.score(tile);
            }
        }
        Ok(())
    }
}
