// Copyright (C) 2020-2026 Andy Kurnia.

use lexplay::{board, display, engine, error, game_config, lexicon, logger, move_picker};
use std::io::Read;
use std::sync::Arc;

// wordlist: path to a word list, or to a prebuilt .kwg.
// rack: letters, ? for blank.
// board: one string per row. . for empty, A for A, a for blank-as-A.
// count: maximum number of plays returned.
// config: optional engine settings.
#[derive(serde::Deserialize)]
struct Question {
    wordlist: String,
    rack: String,
    board: Vec<String>,
    #[serde(rename = "count", default = "default_count")]
    max_gen: usize,
    #[serde(default)]
    config: engine::EngineConfig,
}

fn default_count() -> usize {
    15
}

#[derive(serde::Serialize)]
struct Answer<'a> {
    #[serde(rename = "move")]
    notation: String,
    down: bool,
    row: i8,
    col: i8,
    word: String,
    score: i32,
    #[serde(flatten)]
    scored: &'a lexplay::play_scorer::ScoredPlay,
}

fn load_lexicon(
    game_config: &game_config::GameConfig,
    path: &str,
) -> error::Returns<lexicon::Lexicon> {
    Ok(if path.ends_with(".kwg") {
        lexicon::Lexicon::from_kwg_bytes(&std::fs::read(path)?)?
    } else {
        lexicon::Lexicon::build(game_config.alphabet(), lexicon::read_word_source(path)?)?
    })
}

fn main() -> error::Returns<()> {
    logger::init_from_env();
    let args = std::env::args().collect::<Vec<_>>();
    let data = match args.get(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            s
        }
    };
    let question = serde_json::from_str::<Question>(&data)?;

    let game_config = Arc::new(game_config::make_english_game_config());
    let lexicon = Arc::new(load_lexicon(&game_config, &question.wordlist)?);
    let alphabet = game_config.alphabet();
    let rack = match alphabet.parse_rack(&question.rack) {
        Some(rack) => rack,
        None => {
            lexplay::return_error!(format!("invalid rack {:?}", question.rack));
        }
    };
    let board = board::Board::from_rows(
        alphabet,
        game_config.board_layout().dim(),
        &question.board,
    )?;

    let engine = engine::Engine::new(
        Arc::clone(&game_config),
        lexicon,
        engine::EngineConfig {
            max_candidates: question.max_gen,
            ..question.config
        },
    );
    let ranked = match engine.find_moves(&board, &rack) {
        Ok(ranked) => ranked,
        Err(err) => match move_picker::FallbackReason::from_error(&err) {
            Some(reason) => {
                println!("{}", serde_json::json!({ "fallback": reason }));
                return Ok(());
            }
            None => return Err(err.into()),
        },
    };
    let answers = ranked
        .iter()
        .take(question.max_gen)
        .map(|ranked_move| {
            let candidate = &ranked_move.candidate;
            let (row, col) = candidate.row_col();
            Answer {
                notation: display::fmt_play(alphabet, &board, candidate),
                down: candidate.down,
                row,
                col,
                word: alphabet.fmt_word(&candidate.letters(&board)),
                score: ranked_move.scored.total,
                scored: &ranked_move.scored,
            }
        })
        .collect::<Vec<_>>();
    println!("{}", serde_json::to_string_pretty(&answers)?);
    Ok(())
}
