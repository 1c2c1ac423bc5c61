// Copyright (C) 2020-2026 Andy Kurnia.

use super::{error, matrix};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Premium {
    pub word_multiplier: i8,
    pub tile_multiplier: i8,
}

const TWS: Premium = Premium {
    word_multiplier: 3,
    tile_multiplier: 1,
};
const DWS: Premium = Premium {
    word_multiplier: 2,
    tile_multiplier: 1,
};
const TLS: Premium = Premium {
    word_multiplier: 1,
    tile_multiplier: 3,
};
const DLS: Premium = Premium {
    word_multiplier: 1,
    tile_multiplier: 2,
};
const FVS: Premium = Premium {
    word_multiplier: 1,
    tile_multiplier: 1,
};

#[derive(Clone)]
pub struct BoardLayout {
    premiums: Box<[Premium]>,
    dim: matrix::Dim,
    star_row: i8,
    star_col: i8,
}

impl BoardLayout {
    #[inline(always)]
    pub fn dim(&self) -> matrix::Dim {
        self.dim
    }

    #[inline(always)]
    pub fn star_row(&self) -> i8 {
        self.star_row
    }

    #[inline(always)]
    pub fn star_col(&self) -> i8 {
        self.star_col
    }

    #[inline(always)]
    pub fn premiums(&self) -> &[Premium] {
        &self.premiums
    }

    #[inline(always)]
    pub fn star_at(&self) -> usize {
        self.dim.at_row_col(self.star_row, self.star_col)
    }

    // '=' 3W, '-' 2W, '"' 3L, '\'' 2L, '.' or ' ' plain, '*' star (2W).
    // the star is the center if not marked.
    pub fn from_rows(rows: &[&str]) -> error::Returns<BoardLayout> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, |row| row.chars().count());
        if num_rows == 0 || num_cols == 0 || num_rows > 64 || num_cols > 64 {
            return_error!(format!("invalid board size {}x{}", num_rows, num_cols));
        }
        let dim = matrix::Dim {
            rows: num_rows as i8,
            cols: num_cols as i8,
        };
        let mut premiums = Vec::with_capacity(dim.num_cells());
        let mut star = None;
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != num_cols {
                return_error!(format!(
                    "row {} has {} squares, expected {}",
                    r + 1,
                    row.chars().count(),
                    num_cols
                ));
            }
            for (c, ch) in row.chars().enumerate() {
                premiums.push(match ch {
                    '=' => TWS,
                    '-' => DWS,
                    '"' => TLS,
                    '\'' => DLS,
                    '.' | ' ' => FVS,
                    '*' => {
                        star = Some((r as i8, c as i8));
                        DWS
                    }
                    _ => {
                        return_error!(format!("invalid premium {:?} in row {}", ch, r + 1));
                    }
                });
            }
        }
        let (star_row, star_col) = star.unwrap_or((dim.rows / 2, dim.cols / 2));
        Ok(BoardLayout {
            premiums: premiums.into_boxed_slice(),
            dim,
            star_row,
            star_col,
        })
    }
}

pub fn make_standard_board_layout() -> BoardLayout {
    BoardLayout {
        premiums: Box::new([
            TWS, FVS, FVS, DLS, FVS, FVS, FVS, TWS, FVS, FVS, FVS, DLS, FVS, FVS, TWS, //
            FVS, DWS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, DWS, FVS, //
            FVS, FVS, DWS, FVS, FVS, FVS, DLS, FVS, DLS, FVS, FVS, FVS, DWS, FVS, FVS, //
            DLS, FVS, FVS, DWS, FVS, FVS, FVS, DLS, FVS, FVS, FVS, DWS, FVS, FVS, DLS, //
            FVS, FVS, FVS, FVS, DWS, FVS, FVS, FVS, FVS, FVS, DWS, FVS, FVS, FVS, FVS, //
            FVS, TLS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, TLS, FVS, //
            FVS, FVS, DLS, FVS, FVS, FVS, DLS, FVS, DLS, FVS, FVS, FVS, DLS, FVS, FVS, //
            TWS, FVS, FVS, DLS, FVS, FVS, FVS, DWS, FVS, FVS, FVS, DLS, FVS, FVS, TWS, //
            FVS, FVS, DLS, FVS, FVS, FVS, DLS, FVS, DLS, FVS, FVS, FVS, DLS, FVS, FVS, //
            FVS, TLS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, TLS, FVS, //
            FVS, FVS, FVS, FVS, DWS, FVS, FVS, FVS, FVS, FVS, DWS, FVS, FVS, FVS, FVS, //
            DLS, FVS, FVS, DWS, FVS, FVS, FVS, DLS, FVS, FVS, FVS, DWS, FVS, FVS, DLS, //
            FVS, FVS, DWS, FVS, FVS, FVS, DLS, FVS, DLS, FVS, FVS, FVS, DWS, FVS, FVS, //
            FVS, DWS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, TLS, FVS, FVS, FVS, DWS, FVS, //
            TWS, FVS, FVS, DLS, FVS, FVS, FVS, TWS, FVS, FVS, FVS, DLS, FVS, FVS, TWS, //
        ]),
        dim: matrix::Dim { rows: 15, cols: 15 },
        star_row: 7,
        star_col: 7,
    }
}

// no premiums except a double-word star in the middle.
pub fn make_plain_board_layout(rows: i8, cols: i8) -> BoardLayout {
    let dim = matrix::Dim { rows, cols };
    let mut premiums = vec![FVS; dim.num_cells()].into_boxed_slice();
    let (star_row, star_col) = (rows / 2, cols / 2);
    premiums[dim.at_row_col(star_row, star_col)] = DWS;
    BoardLayout {
        premiums,
        dim,
        star_row,
        star_col,
    }
}
