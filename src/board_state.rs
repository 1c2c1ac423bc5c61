// Copyright (C) 2020-2026 Andy Kurnia.

//! Per-request analysis of a board: which letters each empty cell accepts
//! without breaking the perpendicular word through it, and which cells can
//! anchor a move. Computed once and reused for the whole search.

use super::{board, error::EngineError, game_config, kwg, lexicon, matrix};

// bits: bit 0 set means constrained, other bits are the letters allowed.
// 0 means unconstrained (no perpendicular tiles). 1 means nothing fits.
// score: face value of the perpendicular tiles.
#[derive(Clone, Copy, Default)]
pub struct CrossSet {
    pub bits: u64,
    pub score: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrossCheck {
    Occupied,
    Unconstrained,
    Letters(Vec<u8>),
}

pub struct BoardState<'a> {
    pub game_config: &'a game_config::GameConfig,
    pub lexicon: &'a lexicon::Lexicon,
    board: board::Board,
    cross_set_for_across_plays: Box<[CrossSet]>, // r*c
    cross_set_for_down_plays: Box<[CrossSet]>,   // c*r
    anchors: Vec<(i8, i8)>,
    num_tiles_on_board: usize,
}

fn gen_cross_set(
    kwg: &kwg::Kwg,
    board: &board::Board,
    strider: matrix::Strider,
    cross_sets: &mut [CrossSet],
    output_strider: matrix::Strider,
) {
    let len = strider.len();
    for i in 0..output_strider.len() {
        cross_sets[output_strider.at(i)] = CrossSet::default();
    }

    let board_tiles = board.tiles();
    let mut p = kwg::GADDAG_ROOT;
    let mut score = 0i32;
    let mut k = len;
    for j in (0..len).rev() {
        let b = board_tiles[strider.at(j)];
        if b != 0 {
            // board has tile
            if p >= 0 {
                // include current tile
                p = kwg.seek(p, b & 0x7f);
            }
            score += board.value_at(strider.at(j)) as i32;
            if j == 0 || board_tiles[strider.at(j - 1)] == 0 {
                // there is a sequence of tiles from j inclusive to k exclusive
                if k < len && !(k + 1 < len && board_tiles[strider.at(k + 1)] != 0) {
                    // board[k + 1] is empty, compute cross_set[k].
                    let mut bits = 1u64;
                    if p > 0 {
                        // p = DCBA
                        let q = kwg.seek(p, kwg::DELIMITER);
                        if q > 0 {
                            // q = DCBA@
                            let mut q = kwg[q].arc_index();
                            if q > 0 {
                                loop {
                                    if kwg[q].accepts() {
                                        bits |= 1 << kwg[q].tile();
                                    }
                                    if kwg[q].is_end() {
                                        break;
                                    }
                                    q += 1;
                                }
                            }
                        }
                    }
                    cross_sets[output_strider.at(k)] = CrossSet { bits, score };
                }
                if j > 0 {
                    // board[j - 1] is known to be empty
                    let mut bits = 1u64;
                    if p > 0 {
                        // p = DCBA
                        let mut q = kwg[p].arc_index(); // q = after DCBA
                        if q > 0 {
                            loop {
                                let tile = kwg[q].tile();
                                if !kwg::is_delimiter(tile) {
                                    // board[j - 2] may or may not be empty.
                                    let mut r = q;
                                    for m in (0..j - 1).rev() {
                                        let b = board_tiles[strider.at(m)];
                                        if b == 0 {
                                            break;
                                        }
                                        r = kwg.seek(r, b & 0x7f);
                                        if r <= 0 {
                                            break;
                                        }
                                    }
                                    if kwg.accepts_at(r) {
                                        bits |= 1 << tile;
                                    }
                                }
                                if kwg[q].is_end() {
                                    break;
                                }
                                q += 1;
                            }
                        }
                    }
                    // score hasn't included the next batch.
                    let mut cross_score = score;
                    for m in (0..j - 1).rev() {
                        let b = board_tiles[strider.at(m)];
                        if b == 0 {
                            break;
                        }
                        cross_score += board.value_at(strider.at(m)) as i32;
                    }
                    cross_sets[output_strider.at(j - 1)] = CrossSet {
                        bits,
                        score: cross_score,
                    };
                }
            }
        } else {
            // empty square, reset
            p = kwg::GADDAG_ROOT; // cumulative gaddag traversal results
            score = 0; // cumulative face-value score
            k = j; // last seen empty square
        }
    }
}

fn gen_anchors(board: &board::Board) -> Vec<(i8, i8)> {
    let dim = board.dim();
    let board_tiles = board.tiles();
    let mut anchors = Vec::new();
    for row in 0..dim.rows {
        for col in 0..dim.cols {
            if board_tiles[dim.at_row_col(row, col)] != 0 {
                continue;
            }
            let touches = [(-1, 0), (1, 0), (0, -1), (0, 1)]
                .iter()
                .any(|&(dr, dc)| {
                    dim.contains(row + dr, col + dc)
                        && board_tiles[dim.at_row_col(row + dr, col + dc)] != 0
                });
            if touches {
                anchors.push((row, col));
            }
        }
    }
    anchors
}

impl<'a> BoardState<'a> {
    pub fn new(
        game_config: &'a game_config::GameConfig,
        lexicon: &'a lexicon::Lexicon,
        board: &board::Board,
    ) -> Result<Self, EngineError> {
        let board_layout = game_config.board_layout();
        let dim = board_layout.dim();
        if board.dim() != dim {
            return Err(EngineError::MalformedInput(format!(
                "board is {}x{}, layout is {}x{}",
                board.dim().rows,
                board.dim().cols,
                dim.rows,
                dim.cols
            )));
        }
        let kwg = lexicon.kwg();
        let mut cross_set_for_across_plays = vec![CrossSet::default(); dim.num_cells()];
        let mut cross_set_for_down_plays = vec![CrossSet::default(); dim.num_cells()];

        // across plays are checked against the column through each cell.
        for col in 0..dim.cols {
            gen_cross_set(
                kwg,
                board,
                dim.down(col),
                &mut cross_set_for_across_plays,
                dim.down(col),
            );
        }
        // stored column by column, so each down lane is contiguous.
        let transposed = matrix::Dim {
            rows: dim.cols,
            cols: dim.rows,
        };
        for row in 0..dim.rows {
            gen_cross_set(
                kwg,
                board,
                dim.across(row),
                &mut cross_set_for_down_plays,
                transposed.down(row),
            );
        }

        let num_tiles_on_board = board.num_tiles();
        let anchors = if num_tiles_on_board == 0 {
            // empty board activates star, across only since down would mirror it.
            cross_set_for_across_plays[board_layout.star_at()] = CrossSet {
                bits: !1,
                score: 0,
            };
            vec![(board_layout.star_row(), board_layout.star_col())]
        } else {
            gen_anchors(board)
        };

        log::debug!(
            "board state: {} tiles, {} anchors",
            num_tiles_on_board,
            anchors.len()
        );
        Ok(Self {
            game_config,
            lexicon,
            board: board.clone(),
            cross_set_for_across_plays: cross_set_for_across_plays.into_boxed_slice(),
            cross_set_for_down_plays: cross_set_for_down_plays.into_boxed_slice(),
            anchors,
            num_tiles_on_board,
        })
    }

    pub fn from_grid<X>(
        game_config: &'a game_config::GameConfig,
        lexicon: &'a lexicon::Lexicon,
        cells: &[board::Cell<X>],
    ) -> Result<Self, EngineError> {
        let board = board::Board::from_cells(
            game_config.alphabet(),
            game_config.board_layout().dim(),
            cells,
        )?;
        Self::new(game_config, lexicon, &board)
    }

    #[inline(always)]
    pub fn board(&self) -> &board::Board {
        &self.board
    }

    #[inline(always)]
    pub fn board_tiles(&self) -> &[u8] {
        self.board.tiles()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.num_tiles_on_board == 0
    }

    #[inline(always)]
    pub fn num_tiles_on_board(&self) -> usize {
        self.num_tiles_on_board
    }

    /// Empty squares a play must cover or touch, as (row, col), for
    /// callers that show where plays can go. Only the star on an empty board.
    pub fn anchors(&self) -> &[(i8, i8)] {
        &self.anchors
    }

    // cross sets along one lane, indexed by position in the lane.
    #[inline(always)]
    pub fn lane_cross_sets(&self, down: bool, lane: i8) -> &[CrossSet] {
        let dim = self.game_config.board_layout().dim();
        let (cross_sets, lane_len) = if down {
            (&self.cross_set_for_down_plays, dim.rows as usize)
        } else {
            (&self.cross_set_for_across_plays, dim.cols as usize)
        };
        let start = (lane as usize) * lane_len;
        &cross_sets[start..start + lane_len]
    }

    pub fn cross_check(&self, down: bool, row: i8, col: i8) -> CrossCheck {
        let dim = self.game_config.board_layout().dim();
        if self.board_tiles()[dim.at_row_col(row, col)] != 0 {
            return CrossCheck::Occupied;
        }
        let cross_set = if down {
            self.lane_cross_sets(true, col)[row as usize]
        } else {
            self.lane_cross_sets(false, row)[col as usize]
        };
        if cross_set.bits == 0 {
            CrossCheck::Unconstrained
        } else {
            CrossCheck::Letters(
                (1..self.game_config.alphabet().len())
                    .filter(|&tile| cross_set.bits & (1 << tile) != 0)
                    .collect(),
            )
        }
    }
}
