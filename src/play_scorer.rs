// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board_state, movegen};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct WordScore {
    pub word: String,
    pub score: i32,
}

/// The score of a play with the words that make it up. The first word is
/// the main word, the rest are formed perpendicular to it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ScoredPlay {
    pub total: i32,
    pub words: Vec<WordScore>,
    pub full_rack_bonus: i32,
}

#[derive(Default)]
pub struct PlayScorer {
    word_buf: Vec<u8>,
}

impl PlayScorer {
    pub fn new() -> Self {
        Self::default()
    }

    // Calls back with each word formed and its score, main word first.
    // Returns the number of tiles played.
    // Assume play fits the board and only places on empty squares.
    fn for_each_formed_word<FoundWord: FnMut(&[u8], i32)>(
        &mut self,
        board_state: &board_state::BoardState,
        play: &movegen::Candidate,
        mut found_word: FoundWord,
    ) -> i8 {
        let game_config = board_state.game_config;
        let alphabet = game_config.alphabet();
        let board_layout = game_config.board_layout();
        let premiums = board_layout.premiums();
        let dim = board_layout.dim();
        let board = board_state.board();
        let board_tiles = board.tiles();
        let strider = dim.lane(play.down, play.lane);
        let mut num_played = 0;

        {
            self.word_buf.clear();
            let mut word_multiplier = 1i32;
            let mut word_score = 0i32;
            for (i, &tile) in (play.idx..).zip(play.word.iter()) {
                let strider_at_i = strider.at(i);
                let tile_score = if tile != 0 {
                    num_played += 1;
                    let premium = premiums[strider_at_i];
                    word_multiplier *= premium.word_multiplier as i32;
                    self.word_buf.push(tile);
                    alphabet.score(tile) as i32 * premium.tile_multiplier as i32
                } else {
                    self.word_buf.push(board_tiles[strider_at_i]);
                    board.value_at(strider_at_i) as i32
                };
                word_score += tile_score;
            }
            found_word(&self.word_buf, word_score * word_multiplier);
        }

        for (i, &tile) in (play.idx..).zip(play.word.iter()) {
            if tile == 0 {
                continue;
            }
            let perpendicular_strider = dim.lane(!play.down, i);
            let mut j = play.lane;
            while j > 0 && board_tiles[perpendicular_strider.at(j - 1)] != 0 {
                j -= 1;
            }
            let perpendicular_strider_len = perpendicular_strider.len();
            if j == play.lane
                && (j + 1 >= perpendicular_strider_len
                    || board_tiles[perpendicular_strider.at(j + 1)] == 0)
            {
                // no perpendicular tile
                continue;
            }
            self.word_buf.clear();
            let mut word_multiplier = 1i32;
            let mut word_score = 0i32;
            for j in j..perpendicular_strider_len {
                let perpendicular_strider_at_j = perpendicular_strider.at(j);
                let tile_score = if j == play.lane {
                    let premium = premiums[perpendicular_strider_at_j];
                    word_multiplier *= premium.word_multiplier as i32;
                    self.word_buf.push(tile);
                    alphabet.score(tile) as i32 * premium.tile_multiplier as i32
                } else {
                    let b = board_tiles[perpendicular_strider_at_j];
                    if b == 0 {
                        break;
                    }
                    self.word_buf.push(b);
                    board.value_at(perpendicular_strider_at_j) as i32
                };
                word_score += tile_score;
            }
            found_word(&self.word_buf, word_score * word_multiplier);
        }

        num_played
    }

    /// Scores every word the play forms. Premiums count only under the
    /// newly placed tiles. Does not change the board.
    pub fn score(
        &mut self,
        board_state: &board_state::BoardState,
        play: &movegen::Candidate,
    ) -> ScoredPlay {
        let alphabet = board_state.game_config.alphabet();
        let mut words = Vec::new();
        let num_played = self.for_each_formed_word(board_state, play, |word, score| {
            words.push(WordScore {
                word: alphabet.fmt_word(word),
                score,
            })
        });
        let full_rack_bonus = board_state.game_config.num_played_bonus(num_played);
        ScoredPlay {
            total: words.iter().map(|w| w.score).sum::<i32>() + full_rack_bonus,
            words,
            full_rack_bonus,
        }
    }

    pub fn compute_score(
        &mut self,
        board_state: &board_state::BoardState,
        play: &movegen::Candidate,
    ) -> i32 {
        let mut recounted_score = 0;
        let num_played = self.for_each_formed_word(board_state, play, |_, score| {
            recounted_score += score;
        });
        recounted_score + board_state.game_config.num_played_bonus(num_played)
    }

    /// True if the main word and every perpendicular word are in the lexicon.
    pub fn words_formed_are_valid(
        &mut self,
        board_state: &board_state::BoardState,
        play: &movegen::Candidate,
    ) -> bool {
        let lexicon = board_state.lexicon;
        let mut all_valid = true;
        self.for_each_formed_word(board_state, play, |word, _| {
            all_valid &= lexicon.is_word(word);
        });
        all_valid
    }
}
