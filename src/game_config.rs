// Copyright (C) 2020-2026 Andy Kurnia.

use super::{alphabet, board_layout};

pub struct GameConfig {
    alphabet: alphabet::Alphabet,
    board_layout: board_layout::BoardLayout,
    rack_size: i8,
    full_rack_bonus: i32,
}

impl GameConfig {
    pub fn new(
        alphabet: alphabet::Alphabet,
        board_layout: board_layout::BoardLayout,
        rack_size: i8,
        full_rack_bonus: i32,
    ) -> Self {
        Self {
            alphabet,
            board_layout,
            rack_size,
            full_rack_bonus,
        }
    }

    #[inline(always)]
    pub fn alphabet(&self) -> &alphabet::Alphabet {
        &self.alphabet
    }

    #[inline(always)]
    pub fn board_layout(&self) -> &board_layout::BoardLayout {
        &self.board_layout
    }

    #[inline(always)]
    pub fn rack_size(&self) -> i8 {
        self.rack_size
    }

    // only a move that empties a full rack earns the bonus.
    #[inline(always)]
    pub fn num_played_bonus(&self, num_played: i8) -> i32 {
        // branchless
        self.full_rack_bonus & -((num_played >= self.rack_size) as i32)
    }

    pub fn with_alphabet(self, alphabet: alphabet::Alphabet) -> Self {
        Self { alphabet, ..self }
    }
}

pub fn make_english_game_config() -> GameConfig {
    GameConfig::new(
        alphabet::make_english_alphabet(),
        board_layout::make_standard_board_layout(),
        7,
        50,
    )
}

pub fn make_plain_game_config(rows: i8, cols: i8) -> GameConfig {
    GameConfig::new(
        alphabet::make_english_alphabet(),
        board_layout::make_plain_board_layout(rows, cols),
        7,
        50,
    )
}
