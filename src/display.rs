// Copyright (C) 2020-2026 Andy Kurnia.

use super::{alphabet, board, board_layout, movegen};
use std::fmt::Write;

#[inline(always)]
pub fn empty_label(board_layout: &board_layout::BoardLayout, row: i8, col: i8) -> &'static str {
    if row == board_layout.star_row() && col == board_layout.star_col() {
        return "*";
    }
    let premium = board_layout.premiums()[board_layout.dim().at_row_col(row, col)];
    match (premium.word_multiplier, premium.tile_multiplier) {
        (3, _) => "=",
        (2, _) => "-",
        (_, 3) => "\"",
        (_, 2) => "\'",
        _ => " ",
    }
}

#[inline(always)]
pub fn board_label<'a>(
    alphabet: &'a alphabet::Alphabet,
    board_layout: &board_layout::BoardLayout,
    board_tiles: &'a [u8],
    row: i8,
    col: i8,
) -> &'a str {
    alphabet
        .from_board(board_tiles[board_layout.dim().at_row_col(row, col)])
        .unwrap_or_else(|| empty_label(board_layout, row, col))
}

fn fmt_col_labels(s: &mut String, cols: i8) {
    s.push_str("  ");
    for c in 0..cols {
        s.push(' ');
        s.push(((c as u8) + 0x61) as char);
    }
    s.push('\n');
}

fn fmt_rule(s: &mut String, cols: i8) {
    s.push_str("  +");
    for _ in 1..cols {
        s.push_str("--");
    }
    s.push_str("-+\n");
}

pub fn fmt_board(
    alphabet: &alphabet::Alphabet,
    board_layout: &board_layout::BoardLayout,
    board_tiles: &[u8],
) -> String {
    let dim = board_layout.dim();
    let mut s = String::new();
    fmt_col_labels(&mut s, dim.cols);
    fmt_rule(&mut s, dim.cols);
    for r in 0..dim.rows {
        let _ = write!(s, "{:2}|", r + 1);
        for c in 0..dim.cols {
            if c > 0 {
                s.push(' ');
            }
            s.push_str(board_label(alphabet, board_layout, board_tiles, r, c));
        }
        let _ = writeln!(s, "|{}", r + 1);
    }
    fmt_rule(&mut s, dim.cols);
    fmt_col_labels(&mut s, dim.cols);
    s
}

pub fn print_board(
    alphabet: &alphabet::Alphabet,
    board_layout: &board_layout::BoardLayout,
    board_tiles: &[u8],
) {
    print!("{}", fmt_board(alphabet, board_layout, board_tiles));
}

// 8h for across from row 8 col h, h8 for down. played-through tiles in ().
pub fn fmt_coord(down: bool, lane: i8, idx: i8) -> String {
    if down {
        format!("{}{}", (lane as u8 + 0x61) as char, idx + 1)
    } else {
        format!("{}{}", lane + 1, (idx as u8 + 0x61) as char)
    }
}

pub fn fmt_play(
    alphabet: &alphabet::Alphabet,
    board: &board::Board,
    play: &movegen::Candidate,
) -> String {
    let strider = board.dim().lane(play.down, play.lane);
    let mut s = fmt_coord(play.down, play.lane, play.idx);
    s.push(' ');
    let mut inside = false;
    for (i, &w) in (play.idx..).zip(play.word.iter()) {
        if w == 0 {
            if !inside {
                s.push('(');
                inside = true;
            }
            s.push_str(alphabet.from_board(board.tiles()[strider.at(i)]).unwrap_or("?"));
        } else {
            if inside {
                s.push(')');
                inside = false;
            }
            s.push_str(alphabet.from_board(w).unwrap_or("?"));
        }
    }
    if inside {
        s.push(')');
    }
    s
}
