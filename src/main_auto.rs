// Copyright (C) 2020-2026 Andy Kurnia.

// Plays the engine against itself, several games at once, to exercise the
// whole pipeline. Passes whenever the engine says to fall back.

use lexplay::{
    bag, board, board_state, display, engine, error, error::EngineError, game_config, lexicon,
    logger, move_picker, play_scorer,
};
use rand::prelude::*;
use std::sync::Arc;

struct GameSummary {
    seed: u64,
    scores: [i32; 2],
    num_turns: usize,
    num_fallbacks: usize,
    final_board: String,
}

fn rack_value(alphabet: &lexplay::alphabet::Alphabet, rack: &[u8]) -> i32 {
    rack.iter().map(|&tile| alphabet.score(tile) as i32).sum()
}

async fn play_game(engine: Arc<engine::Engine>, seed: u64) -> Result<GameSummary, EngineError> {
    let game_config = Arc::clone(engine.game_config());
    let alphabet = game_config.alphabet();
    let rack_size = game_config.rack_size() as usize;
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
    let mut bag = bag::Bag::new(alphabet);
    bag.shuffle(&mut rng);
    let mut racks = [Vec::new(), Vec::new()];
    for rack in racks.iter_mut() {
        bag.replenish(rack, rack_size);
    }
    let mut board = board::Board::new(game_config.board_layout().dim());
    let mut scores = [0i32; 2];
    let mut zero_turns = 0;
    let mut num_fallbacks = 0;
    let mut num_turns = 0;

    loop {
        let player = num_turns % 2;
        num_turns += 1;
        let choice = {
            let board_state =
                board_state::BoardState::new(&game_config, engine.lexicon(), &board)?;
            let mut play_scorer = play_scorer::PlayScorer::new();
            engine
                .choose(&board, &racks[player], |ranked_move| {
                    play_scorer.words_formed_are_valid(&board_state, &ranked_move.candidate)
                })
                .await?
        };
        match choice {
            move_picker::Choice::Play(ranked_move) => {
                let candidate = &ranked_move.candidate;
                log::debug!(
                    "game {} p{} {} {} {}",
                    seed,
                    player + 1,
                    alphabet.fmt_rack(&racks[player]),
                    display::fmt_play(alphabet, &board, candidate),
                    ranked_move.scored.total
                );
                board.place(alphabet, candidate)?;
                let rack = &mut racks[player];
                for tile in candidate.rack_tiles() {
                    if let Some(pos) = rack.iter().position(|&t| t == tile) {
                        rack.swap_remove(pos);
                    }
                }
                bag.replenish(rack, rack_size);
                scores[player] += ranked_move.scored.total;
                zero_turns = 0;
                if racks[player].is_empty() {
                    // played out, collects twice the other rack.
                    scores[player] += 2 * rack_value(alphabet, &racks[1 - player]);
                    break;
                }
            }
            move_picker::Choice::Fallback(reason) => {
                log::debug!("game {} p{} passes: {:?}", seed, player + 1, reason);
                num_fallbacks += 1;
                zero_turns += 1;
                if zero_turns >= 6 {
                    for (score, rack) in scores.iter_mut().zip(racks.iter()) {
                        *score -= rack_value(alphabet, rack);
                    }
                    break;
                }
            }
        }
    }

    Ok(GameSummary {
        seed,
        scores,
        num_turns,
        num_fallbacks,
        final_board: display::fmt_board(alphabet, game_config.board_layout(), board.tiles()),
    })
}

#[tokio::main]
async fn main() -> error::Returns<()> {
    logger::init_from_env();
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 2 {
        println!(
            "args:
  wordlist.txt [num_games] [seed]
    play num_games (default one per cpu) games, seeds counting up from seed"
        );
        return Ok(());
    }
    let num_games = match args.get(2) {
        Some(s) => s.parse()?,
        None => num_cpus::get(),
    };
    let seed = match args.get(3) {
        Some(s) => s.parse()?,
        None => rand::random::<u64>(),
    };

    let t0 = std::time::Instant::now();
    let game_config = Arc::new(game_config::make_english_game_config());
    let lexicon_cell = lexicon::LexiconCell::new();
    let path = args[1].clone();
    let engine = Arc::new(
        engine::Engine::load(
            game_config,
            &lexicon_cell,
            engine::EngineConfig::default(),
            || async move {
                tokio::task::spawn_blocking(move || lexicon::read_word_source(path))
                    .await
                    .map_err(|err| EngineError::DictionaryUnavailable(err.to_string()))?
            },
        )
        .await?,
    );
    println!(
        "{} words loaded in {:?}",
        engine.lexicon().num_words(),
        t0.elapsed()
    );

    let t0 = std::time::Instant::now();
    let handles = (0..num_games as u64)
        .map(|i| tokio::spawn(play_game(Arc::clone(&engine), seed.wrapping_add(i))))
        .collect::<Vec<_>>();
    let mut num_done = 0;
    for handle in handles {
        let summary = handle.await??;
        println!("{}", summary.final_board);
        println!(
            "seed {}: {} - {} in {} turns, {} passes",
            summary.seed,
            summary.scores[0],
            summary.scores[1],
            summary.num_turns,
            summary.num_fallbacks
        );
        num_done += 1;
    }
    println!("{} games in {:?}", num_done, t0.elapsed());
    Ok(())
}
