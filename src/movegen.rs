// Copyright (C) 2020-2026 Andy Kurnia.

use super::{alphabet, board, board_state, error::EngineError, fash, kwg, matrix};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::ControlFlow;

/// One placement found by the search.
///
/// `word` is the primary word along the lane starting at `idx`. Each entry
/// is 0 for a tile already on the board, a letter for a new tile, or
/// `0x80 | letter` for a blank played as that letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub down: bool,
    pub lane: i8,
    pub idx: i8,
    pub word: Box<[u8]>,
    pub score: i32,
}

impl Candidate {
    pub fn new(down: bool, lane: i8, idx: i8, word: &[u8], score: i32) -> Self {
        Self {
            down,
            lane,
            idx,
            word: word.into(),
            score,
        }
    }

    // row and col of the i-th cell of the word.
    #[inline(always)]
    pub fn cell(&self, i: i8) -> (i8, i8) {
        if self.down {
            (self.idx + i, self.lane)
        } else {
            (self.lane, self.idx + i)
        }
    }

    #[inline(always)]
    pub fn row_col(&self) -> (i8, i8) {
        self.cell(0)
    }

    pub fn num_played(&self) -> usize {
        self.word.iter().filter(|&&t| t != 0).count()
    }

    /// (row, col, tile) of every newly placed tile.
    pub fn placements(&self) -> impl Iterator<Item = (i8, i8, u8)> + '_ {
        (0..)
            .zip(self.word.iter())
            .filter(|&(_, &tile)| tile != 0)
            .map(|(i, &tile)| {
                let (row, col) = self.cell(i);
                (row, col, tile)
            })
    }

    // the primary word with play-through tiles filled in from the board.
    pub fn letters(&self, board: &board::Board) -> Vec<u8> {
        let strider = board.dim().lane(self.down, self.lane);
        (self.idx..)
            .zip(self.word.iter())
            .map(|(i, &tile)| {
                if tile == 0 {
                    board.tiles()[strider.at(i)]
                } else {
                    tile
                }
            })
            .collect()
    }

    // the rack tiles this play uses, blanks as 0.
    pub fn rack_tiles(&self) -> impl Iterator<Item = u8> + '_ {
        self.word.iter().filter(|&&t| t != 0).map(|&t| {
            if t & alphabet::BLANK_BIT != 0 {
                alphabet::BLANK
            } else {
                t
            }
        })
    }
}

// word_buffer must have at least strider.len() length.
fn gen_place_moves<'a, CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>>(
    board_state: &'a board_state::BoardState<'a>,
    cross_set_slice: &'a [board_state::CrossSet],
    rack_tally: &'a mut [u8],
    strider: matrix::Strider,
    word_buffer: &'a mut [u8],
    single_tile_plays: bool,
    callback: CallbackType,
) -> ControlFlow<()> {
    let len = strider.len();
    word_buffer
        .iter_mut()
        .take(len as usize)
        .for_each(|m| *m = 0);

    struct Env<'a, CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>> {
        board_state: &'a board_state::BoardState<'a>,
        kwg: &'a kwg::Kwg,
        cross_set_slice: &'a [board_state::CrossSet],
        rack_tally: &'a mut [u8],
        strider: matrix::Strider,
        callback: CallbackType,
        word_buffer: &'a mut [u8],
        anchor: i8,
        leftmost: i8,
        rightmost: i8,
        num_played: i8,
        idx_left: i8,
    }

    let mut env = Env {
        board_state,
        kwg: board_state.lexicon.kwg(),
        cross_set_slice,
        rack_tally,
        strider,
        callback,
        word_buffer,
        anchor: 0,
        leftmost: 0,
        rightmost: 0,
        num_played: 0,
        idx_left: 0,
    };

    fn record<CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>>(
        env: &mut Env<CallbackType>,
        idx_left: i8,
        idx_right: i8,
        main_score: i32,
        perpendicular_score: i32,
        word_multiplier: i32,
    ) -> ControlFlow<()> {
        let score = main_score * word_multiplier
            + perpendicular_score
            + env.board_state.game_config.num_played_bonus(env.num_played);
        (env.callback)(
            idx_left,
            &env.word_buffer[(idx_left as usize)..(idx_right as usize)],
            score,
        )
    }

    // takes one tile off the rack for the duration of f, puts it back even on break.
    #[inline(always)]
    fn with_tile_taken<
        CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>,
        F: FnOnce(&mut Env<CallbackType>) -> ControlFlow<()>,
    >(
        env: &mut Env<CallbackType>,
        rack_tile: u8,
        f: F,
    ) -> ControlFlow<()> {
        env.rack_tally[rack_tile as usize] -= 1;
        env.num_played += 1;
        let ret = f(env);
        env.num_played -= 1;
        env.rack_tally[rack_tile as usize] += 1;
        ret
    }

    // the board tile itself, or a blank designated as it.
    #[inline(always)]
    fn rack_choices(tile: u8) -> [(u8, u8); 2] {
        [
            (tile, tile),
            (alphabet::BLANK, tile | alphabet::BLANK_BIT),
        ]
    }

    #[inline(always)]
    fn add_perpendicular(
        perpendicular_score: i32,
        this_cross_set: board_state::CrossSet,
        this_premium: &super::board_layout::Premium,
        tile_value: i32,
    ) -> i32 {
        // bit 0 is only set when there are perpendicular tiles.
        if this_cross_set.bits & 1 != 0 {
            perpendicular_score
                + (this_cross_set.score + tile_value) * (this_premium.word_multiplier as i32)
        } else {
            perpendicular_score
        }
    }

    fn play_right<CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>>(
        env: &mut Env<CallbackType>,
        mut idx: i8,
        mut p: i32,
        mut main_score: i32,
        perpendicular_score: i32,
        word_multiplier: i32,
        is_unique: bool,
    ) -> ControlFlow<()> {
        // tail-recurse placing current sequence of tiles
        while idx < env.rightmost {
            let at = env.strider.at(idx);
            let b = env.board_state.board_tiles()[at];
            if b == 0 {
                break;
            }
            p = env.kwg.seek(p, b & 0x7f);
            if p <= 0 {
                return ControlFlow::Continue(());
            }
            main_score += env.board_state.board().value_at(at) as i32;
            idx += 1;
        }
        if idx > env.anchor + 1
            && (env.num_played + is_unique as i8) >= 2
            && idx - env.idx_left >= 2
            && env.kwg[p].accepts()
        {
            record(
                env,
                env.idx_left,
                idx,
                main_score,
                perpendicular_score,
                word_multiplier,
            )?;
        }
        if idx >= env.rightmost {
            return ControlFlow::Continue(());
        }

        p = env.kwg[p].arc_index();
        if p <= 0 {
            return ControlFlow::Continue(());
        }
        let this_premium =
            env.board_state.game_config.board_layout().premiums()[env.strider.at(idx)];
        let this_cross_set = env.cross_set_slice[idx as usize];
        if this_cross_set.bits == 1 {
            // nothing fits here
            return ControlFlow::Continue(());
        }
        let new_word_multiplier = word_multiplier * this_premium.word_multiplier as i32;
        // a lone tile with no perpendicular neighbors is only found in this lane.
        let placed_is_unique = is_unique || this_cross_set.bits == 0;
        let this_cross_bits = if this_cross_set.bits != 0 {
            this_cross_set.bits
        } else {
            !1
        };
        let game_config = env.board_state.game_config;
        let alphabet = game_config.alphabet();
        loop {
            let tile = env.kwg[p].tile();
            if !kwg::is_delimiter(tile) && this_cross_bits & (1 << tile) != 0 {
                for (rack_tile, placed_tile) in rack_choices(tile) {
                    if env.rack_tally[rack_tile as usize] == 0 {
                        continue;
                    }
                    let tile_value =
                        (alphabet.score(placed_tile) as i32) * (this_premium.tile_multiplier as i32);
                    env.word_buffer[idx as usize] = placed_tile;
                    with_tile_taken(env, rack_tile, |env| {
                        play_right(
                            env,
                            idx + 1,
                            p,
                            main_score + tile_value,
                            add_perpendicular(
                                perpendicular_score,
                                this_cross_set,
                                &this_premium,
                                tile_value,
                            ),
                            new_word_multiplier,
                            placed_is_unique,
                        )
                    })?;
                }
            }
            if env.kwg[p].is_end() {
                break;
            }
            p += 1;
        }
        ControlFlow::Continue(())
    }

    fn play_left<CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>>(
        env: &mut Env<CallbackType>,
        mut idx: i8,
        mut p: i32,
        mut main_score: i32,
        perpendicular_score: i32,
        word_multiplier: i32,
        is_unique: bool,
    ) -> ControlFlow<()> {
        // tail-recurse placing current sequence of tiles
        while idx >= env.leftmost {
            let at = env.strider.at(idx);
            let b = env.board_state.board_tiles()[at];
            if b == 0 {
                break;
            }
            p = env.kwg.seek(p, b & 0x7f);
            if p <= 0 {
                return ControlFlow::Continue(());
            }
            main_score += env.board_state.board().value_at(at) as i32;
            idx -= 1;
        }
        if (env.num_played + is_unique as i8) >= 2
            && env.anchor - idx >= 2
            && env.kwg[p].accepts()
        {
            record(
                env,
                idx + 1,
                env.anchor + 1,
                main_score,
                perpendicular_score,
                word_multiplier,
            )?;
        }

        p = env.kwg[p].arc_index();
        if p <= 0 {
            return ControlFlow::Continue(());
        }
        let mut this_premium = super::board_layout::Premium {
            word_multiplier: 0,
            tile_multiplier: 0,
        };
        let mut this_cross_set = board_state::CrossSet { bits: 0, score: 0 };
        if idx >= env.leftmost {
            this_premium =
                env.board_state.game_config.board_layout().premiums()[env.strider.at(idx)];
            this_cross_set = env.cross_set_slice[idx as usize];
        }
        let new_word_multiplier = word_multiplier * this_premium.word_multiplier as i32;
        let placed_is_unique = is_unique || this_cross_set.bits == 0;
        let this_cross_bits = if this_cross_set.bits != 0 {
            this_cross_set.bits
        } else {
            !1
        };
        let game_config = env.board_state.game_config;
        let alphabet = game_config.alphabet();
        loop {
            let tile = env.kwg[p].tile();
            if kwg::is_delimiter(tile) {
                // turn around at the anchor
                env.idx_left = idx + 1;
                play_right(
                    env,
                    env.anchor + 1,
                    p,
                    main_score,
                    perpendicular_score,
                    word_multiplier,
                    is_unique,
                )?;
            } else if idx >= env.leftmost && this_cross_bits & (1 << tile) != 0 {
                for (rack_tile, placed_tile) in rack_choices(tile) {
                    if env.rack_tally[rack_tile as usize] == 0 {
                        continue;
                    }
                    let tile_value =
                        (alphabet.score(placed_tile) as i32) * (this_premium.tile_multiplier as i32);
                    env.word_buffer[idx as usize] = placed_tile;
                    with_tile_taken(env, rack_tile, |env| {
                        play_left(
                            env,
                            idx - 1,
                            p,
                            main_score + tile_value,
                            add_perpendicular(
                                perpendicular_score,
                                this_cross_set,
                                &this_premium,
                                tile_value,
                            ),
                            new_word_multiplier,
                            placed_is_unique,
                        )
                    })?;
                }
            }
            if env.kwg[p].is_end() {
                break;
            }
            p += 1;
        }
        ControlFlow::Continue(())
    }

    fn gen_moves_from<CallbackType: FnMut(i8, &[u8], i32) -> ControlFlow<()>>(
        env: &mut Env<CallbackType>,
        single_tile_plays: bool,
    ) -> ControlFlow<()> {
        play_left(
            env,
            env.anchor,
            kwg::GADDAG_ROOT,
            0,
            0,
            1,
            single_tile_plays,
        )
    }

    let board_tiles = board_state.board_tiles();
    let mut rightmost = len; // processed up to here
    let mut leftmost = len;
    loop {
        while leftmost > 0 && board_tiles[strider.at(leftmost - 1)] == 0 {
            leftmost -= 1;
        }
        if leftmost > 0 {
            // board[leftmost - 1] is a tile.
            env.anchor = leftmost - 1;
            env.leftmost = 0;
            env.rightmost = rightmost;
            gen_moves_from(&mut env, single_tile_plays)?;
        }
        {
            // only relevant if rack has at least two tiles, but checking that costs more.
            let mut leftmost = leftmost; // shadowing
            if leftmost > 0 {
                leftmost += 1;
            }
            for anchor in (leftmost..rightmost).rev() {
                let cross_set_bits = cross_set_slice[anchor as usize].bits;
                if cross_set_bits != 0 {
                    if rightmost - leftmost < 2 {
                        // not enough room for 2-tile words
                        break;
                    }
                    if cross_set_bits != 1 {
                        env.anchor = anchor;
                        env.leftmost = leftmost;
                        env.rightmost = rightmost;
                        gen_moves_from(&mut env, single_tile_plays)?;
                    }
                    rightmost = anchor; // prevent duplicates
                }
            }
        }
        while leftmost > 0 && board_tiles[strider.at(leftmost - 1)] != 0 {
            leftmost -= 1;
        }
        if leftmost <= 1 {
            break;
        }
        rightmost = leftmost - 1; // prevent touching leftmost tile
    }
    ControlFlow::Continue(())
}

/// Reports every legal placement of tiles from the rack as
/// `(down, lane, idx, word, score)`. The callback may break to stop early.
///
/// Each placement is reported once. A single tile is reported across when
/// it forms an across word of at least two letters, otherwise down.
/// Racks longer than the configured rack size are rejected.
pub fn gen_moves<FoundPlaceMove: FnMut(bool, i8, i8, &[u8], i32) -> ControlFlow<()>>(
    board_state: &board_state::BoardState,
    rack: &[u8],
    mut found_place_move: FoundPlaceMove,
) -> Result<ControlFlow<()>, EngineError> {
    let alphabet = board_state.game_config.alphabet();
    let dim = board_state.game_config.board_layout().dim();

    if rack.len() > board_state.game_config.rack_size() as usize {
        return Err(EngineError::MalformedInput(format!(
            "rack: {} tiles, at most {} allowed",
            rack.len(),
            board_state.game_config.rack_size()
        )));
    }
    let mut rack_tally = vec![0u8; alphabet.len() as usize];
    for &tile in rack {
        if tile >= alphabet.len() {
            return Err(EngineError::MalformedInput(format!(
                "rack: invalid tile {}",
                tile
            )));
        }
        rack_tally[tile as usize] += 1;
    }
    let mut word_buffer = vec![0u8; std::cmp::max(dim.rows, dim.cols) as usize];

    let mut gen_all = || -> ControlFlow<()> {
        for row in 0..dim.rows {
            gen_place_moves(
                board_state,
                board_state.lane_cross_sets(false, row),
                &mut rack_tally,
                dim.across(row),
                &mut word_buffer,
                true,
                |idx: i8, word: &[u8], score: i32| found_place_move(false, row, idx, word, score),
            )?;
        }
        for col in 0..dim.cols {
            gen_place_moves(
                board_state,
                board_state.lane_cross_sets(true, col),
                &mut rack_tally,
                dim.down(col),
                &mut word_buffer,
                false,
                |idx: i8, word: &[u8], score: i32| found_place_move(true, col, idx, word, score),
            )?;
        }
        ControlFlow::Continue(())
    };
    Ok(gen_all())
}

struct Found {
    seq: u32,
    candidate: Candidate,
}

// higher score first, then earlier found.
impl Ord for Found {
    fn cmp(&self, other: &Self) -> Ordering {
        self.candidate
            .score
            .cmp(&other.candidate.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Found {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Found {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Found {}

// the newly placed tiles, so a lone tile is the same play either way.
type PlacementKey = Box<[(i8, i8, u8)]>;

/// Keeps the best `max_gen` candidates of a search, best first.
#[derive(Default)]
pub struct MoveGenerator {
    pub plays: Vec<Candidate>,
    found: BinaryHeap<std::cmp::Reverse<Found>>,
    seen: fash::TileHashSet<PlacementKey>,
}

impl MoveGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gen_moves(
        &mut self,
        board_state: &board_state::BoardState,
        rack: &[u8],
        max_gen: usize,
    ) -> Result<(), EngineError> {
        self.gen_moves_until(board_state, rack, max_gen, || false)
            .map(|_| ())
    }

    /// Like gen_moves, but polls `should_stop` after each find. Returns
    /// Break if it stopped early; plays then holds the best found so far.
    pub fn gen_moves_until<ShouldStop: FnMut() -> bool>(
        &mut self,
        board_state: &board_state::BoardState,
        rack: &[u8],
        max_gen: usize,
        mut should_stop: ShouldStop,
    ) -> Result<ControlFlow<()>, EngineError> {
        self.plays.clear();
        self.found.clear();
        self.seen.clear();
        if max_gen == 0 {
            return Ok(ControlFlow::Continue(()));
        }
        let found = &mut self.found;
        let seen = &mut self.seen;
        let mut seq = 0u32;
        let flow = gen_moves(
            board_state,
            rack,
            |down: bool, lane: i8, idx: i8, word: &[u8], score: i32| {
                let candidate = Candidate::new(down, lane, idx, word, score);
                if !seen.insert(candidate.placements().collect()) {
                    log::warn!("dropped repeated placement {} {} {}", down, lane, idx);
                    return ControlFlow::Continue(());
                }
                let this = Found { seq, candidate };
                seq += 1;
                if found.len() < max_gen {
                    found.push(std::cmp::Reverse(this));
                } else if let Some(mut worst) = found.peek_mut() {
                    if this > worst.0 {
                        *worst = std::cmp::Reverse(this);
                    }
                }
                if should_stop() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )?;
        self.plays.extend(
            std::mem::take(&mut self.found)
                .into_sorted_vec()
                .into_iter()
                .map(|std::cmp::Reverse(found)| found.candidate),
        );
        log::debug!("kept {} plays", self.plays.len());
        Ok(flow)
    }
}
