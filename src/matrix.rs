// Copyright (C) 2020-2026 Andy Kurnia.

// A lane is one row (across) or one column (down) of the board,
// addressed by an index along it.
#[derive(Clone, Copy)]
pub struct Strider {
    base: i16,
    step: i8,
    len: i8,
}

impl Strider {
    #[inline(always)]
    pub fn len(&self) -> i8 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn at(&self, idx: i8) -> usize {
        ((self.base as isize) + (idx as isize) * (self.step as isize)) as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dim {
    pub rows: i8,
    pub cols: i8,
}

impl Dim {
    #[inline(always)]
    pub fn across(&self, row: i8) -> Strider {
        Strider {
            base: (row as i16) * (self.cols as i16),
            step: 1,
            len: self.cols,
        }
    }

    #[inline(always)]
    pub fn down(&self, col: i8) -> Strider {
        Strider {
            base: col as i16,
            step: self.cols,
            len: self.rows,
        }
    }

    #[inline(always)]
    pub fn lane(&self, down: bool, lane: i8) -> Strider {
        if down {
            self.down(lane)
        } else {
            self.across(lane)
        }
    }

    // number of lanes in the given direction.
    #[inline(always)]
    pub fn num_lanes(&self, down: bool) -> i8 {
        if down { self.cols } else { self.rows }
    }

    #[inline(always)]
    pub fn at_row_col(&self, row: i8, col: i8) -> usize {
        (((row as isize) * (self.cols as isize)) + (col as isize)) as usize
    }

    #[inline(always)]
    pub fn row_col(&self, at: usize) -> (i8, i8) {
        (
            (at / self.cols as usize) as i8,
            (at % self.cols as usize) as i8,
        )
    }

    #[inline(always)]
    pub fn contains(&self, row: i8, col: i8) -> bool {
        (0..self.rows).contains(&row) && (0..self.cols).contains(&col)
    }

    #[inline(always)]
    pub fn num_cells(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }
}
