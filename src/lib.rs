// Copyright (C) 2020-2026 Andy Kurnia.

#[macro_use]
pub mod error;

pub mod alphabet;
pub mod bag;
pub mod board;
pub mod board_layout;
pub mod board_state;
pub mod build;
pub mod display;
pub mod engine;
pub mod fash;
pub mod game_config;
pub mod kwg;
pub mod lexicon;
pub mod logger;
pub mod matrix;
pub mod move_picker;
pub mod movegen;
pub mod play_scorer;
