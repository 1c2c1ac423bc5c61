// Copyright (C) 2020-2026 Andy Kurnia.

use lexplay::{
    bag, board, board_state, engine, error::EngineError, game_config, lexicon, move_picker,
    movegen, play_scorer,
};
use rand::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

static SMALL_WORDS: &[&str] = &[
    "AA", "AB", "AT", "BA", "TA", "AS", "ACT", "BAT", "CAB", "CAT", "TAB", "ABS", "CABS", "CATS",
    "SCAT", "TABS", "BATS", "ACTS", "CAST", "EAT", "TEA", "ATE", "SEA", "SET", "EATS", "TEAS",
];

fn empty_rows(n: usize) -> Vec<String> {
    vec![".".repeat(n); n]
}

fn all_moves(
    game_config: &game_config::GameConfig,
    lexicon: &lexicon::Lexicon,
    board: &board::Board,
    rack: &[u8],
) -> Vec<movegen::Candidate> {
    let board_state = board_state::BoardState::new(game_config, lexicon, board).unwrap();
    let mut move_generator = movegen::MoveGenerator::new();
    move_generator
        .gen_moves(&board_state, rack, usize::MAX)
        .unwrap();
    std::mem::take(&mut move_generator.plays)
}

fn touches_board(board: &board::Board, candidate: &movegen::Candidate) -> bool {
    if candidate.word.iter().any(|&t| t == 0) {
        return true;
    }
    let dim = board.dim();
    candidate.placements().any(|(row, col, _)| {
        [(-1, 0), (1, 0), (0, -1), (0, 1)].iter().any(|&(dr, dc)| {
            let (r, c) = (row + dr, col + dc);
            dim.contains(r, c) && board.tiles()[dim.at_row_col(r, c)] != 0
        })
    })
}

// every candidate places a distinct set of tiles, forms only words, fits
// the board, and scores the same when recounted.
fn check_candidates(
    game_config: &game_config::GameConfig,
    lexicon: &lexicon::Lexicon,
    board: &board::Board,
    candidates: &[movegen::Candidate],
) {
    let alphabet = game_config.alphabet();
    let board_state = board_state::BoardState::new(game_config, lexicon, board).unwrap();
    let layout = game_config.board_layout();
    let mut play_scorer = play_scorer::PlayScorer::new();
    let mut seen = std::collections::HashSet::new();
    for candidate in candidates {
        assert!(
            seen.insert(candidate.placements().collect::<Vec<_>>()),
            "repeated {:?}",
            candidate
        );
        assert!(candidate.num_played() > 0);
        assert!(
            play_scorer.words_formed_are_valid(&board_state, candidate),
            "invalid {:?}",
            candidate
        );
        assert_eq!(
            play_scorer.compute_score(&board_state, candidate),
            candidate.score
        );
        if board.is_empty() {
            assert!(
                candidate
                    .placements()
                    .any(|(r, c, _)| (r, c) == (layout.star_row(), layout.star_col()))
            );
        } else {
            assert!(touches_board(board, candidate), "floating {:?}", candidate);
        }
        let mut after = board.clone();
        after.place(alphabet, candidate).unwrap();
    }
}

type Placements = Vec<(i8, i8, u8)>;

// Every legal play found the slow way: each word at each spot in each
// lane, with each way the rack can supply the new tiles.
fn legal_placements(
    game_config: &game_config::GameConfig,
    lexicon: &lexicon::Lexicon,
    board: &board::Board,
    rack: &[u8],
) -> BTreeSet<Placements> {
    let alphabet = game_config.alphabet();
    let layout = game_config.board_layout();
    let dim = board.dim();
    let tiles = board.tiles();
    let words = SMALL_WORDS
        .iter()
        .map(|w| alphabet.parse_word(w).unwrap())
        .collect::<Vec<_>>();
    let tile_at = |r: i8, c: i8| {
        if dim.contains(r, c) {
            tiles[dim.at_row_col(r, c)]
        } else {
            0
        }
    };
    // the perpendicular word through (row, col) if tile went there.
    let cross_word = |down: bool, row: i8, col: i8, tile: u8| -> Vec<u8> {
        let (dr, dc) = if down { (1, 0) } else { (0, 1) };
        let (mut r, mut c) = (row, col);
        while tile_at(r - dr, c - dc) != 0 {
            r -= dr;
            c -= dc;
        }
        let mut word = Vec::new();
        while dim.contains(r, c) {
            let t = if (r, c) == (row, col) { tile } else { tile_at(r, c) };
            if t == 0 {
                break;
            }
            word.push(t & 0x7f);
            r += dr;
            c += dc;
        }
        word
    };
    let mut tally = vec![0u8; alphabet.len() as usize];
    for &tile in rack {
        tally[tile as usize] += 1;
    }

    fn supply(
        new_cells: &[(i8, i8, u8)],
        tally: &mut [u8],
        chosen: &mut Placements,
        found: &mut Vec<Placements>,
    ) {
        let Some(&(row, col, letter)) = new_cells.first() else {
            found.push(chosen.clone());
            return;
        };
        for (rack_tile, placed) in [(letter, letter), (0, 0x80 | letter)] {
            if tally[rack_tile as usize] == 0 {
                continue;
            }
            tally[rack_tile as usize] -= 1;
            chosen.push((row, col, placed));
            supply(&new_cells[1..], tally, chosen, found);
            chosen.pop();
            tally[rack_tile as usize] += 1;
        }
    }

    let mut ret = BTreeSet::new();
    for down in [false, true] {
        if board.is_empty() && down {
            continue;
        }
        for lane in 0..dim.num_lanes(down) {
            let lane_len = dim.num_lanes(!down);
            let cell = |i: i8| if down { (i, lane) } else { (lane, i) };
            for start in 0..lane_len {
                for word in &words {
                    let end = start + word.len() as i8;
                    if end > lane_len {
                        continue;
                    }
                    let (br, bc) = cell(start - 1);
                    let (ar, ac) = cell(end);
                    if tile_at(br, bc) != 0 || tile_at(ar, ac) != 0 {
                        continue;
                    }
                    let mut new_cells = Vec::new();
                    let mut fits = true;
                    let mut connected = false;
                    for (i, &letter) in (start..end).zip(word.iter()) {
                        let (r, c) = cell(i);
                        let b = tile_at(r, c);
                        if b != 0 {
                            fits &= b & 0x7f == letter;
                            connected = true;
                            continue;
                        }
                        let perpendicular = cross_word(!down, r, c, letter);
                        if perpendicular.len() >= 2 {
                            fits &= lexicon.is_word(&perpendicular);
                            connected = true;
                        }
                        if board.is_empty() && (r, c) == (layout.star_row(), layout.star_col()) {
                            connected = true;
                        }
                        new_cells.push((r, c, letter));
                    }
                    if !fits || !connected || new_cells.is_empty() {
                        continue;
                    }
                    let mut found = Vec::new();
                    supply(&new_cells, &mut tally, &mut Vec::new(), &mut found);
                    ret.extend(found);
                }
            }
        }
    }
    ret
}

// the generator finds exactly the legal plays, each once.
fn check_complete(
    game_config: &game_config::GameConfig,
    lexicon: &lexicon::Lexicon,
    board: &board::Board,
    rack: &[u8],
    candidates: &[movegen::Candidate],
) {
    let generated = candidates
        .iter()
        .map(|m| m.placements().collect::<Placements>())
        .collect::<BTreeSet<_>>();
    assert_eq!(generated.len(), candidates.len(), "repeated plays");
    let expected = legal_placements(game_config, lexicon, board, rack);
    let alphabet = game_config.alphabet();
    assert_eq!(
        generated.difference(&expected).collect::<Vec<_>>(),
        Vec::<&Placements>::new(),
        "extra plays for {}",
        alphabet.fmt_rack(rack)
    );
    assert_eq!(
        expected.difference(&generated).collect::<Vec<_>>(),
        Vec::<&Placements>::new(),
        "missed plays for {}",
        alphabet.fmt_rack(rack)
    );
}

#[test]
fn test_first_move_on_both_layouts() {
    for game_config in [
        game_config::make_english_game_config(),
        game_config::make_plain_game_config(15, 15),
    ] {
        let alphabet = game_config.alphabet();
        let lexicon = lexicon::Lexicon::build(alphabet, ["CAT", "AT", "CATS"]).unwrap();
        let board = board::Board::new(game_config.board_layout().dim());
        let rack = alphabet.parse_rack("CATS").unwrap();
        let moves = all_moves(&game_config, &lexicon, &board, &rack);
        assert_eq!(moves.len(), 9);
        let mut scores = moves.iter().map(|m| m.score).collect::<Vec<_>>();
        scores.sort_unstable();
        assert_eq!(scores, vec![4, 4, 10, 10, 10, 12, 12, 12, 12]);
        // first play goes across through the star.
        assert!(moves.iter().all(|m| !m.down && m.lane == 7));
        check_candidates(&game_config, &lexicon, &board, &moves);
    }
}

#[test]
fn test_hooking_an_s() {
    let game_config = game_config::make_english_game_config();
    let alphabet = game_config.alphabet();
    let lexicon = lexicon::Lexicon::build(alphabet, ["CAT", "AT", "CATS"]).unwrap();
    let mut rows = empty_rows(15);
    rows[7] = ".......CAT.....".into();
    let board = board::Board::from_rows(alphabet, game_config.board_layout().dim(), &rows).unwrap();
    let moves = all_moves(&game_config, &lexicon, &board, &[19]);
    assert_eq!(moves.len(), 1);
    let m = &moves[0];
    assert_eq!((m.down, m.lane, m.idx, m.score), (false, 7, 7, 6));
    assert_eq!(&m.word[..], &[0, 0, 0, 19]);
    assert_eq!(m.placements().collect::<Vec<_>>(), vec![(7, 10, 19)]);
}

#[test]
fn test_every_word_splits_everywhere() {
    let alphabet = lexplay::alphabet::make_english_alphabet();
    let lexicon = lexicon::Lexicon::build(&alphabet, SMALL_WORDS).unwrap();
    assert_eq!(lexicon.num_words(), SMALL_WORDS.len());
    for word in SMALL_WORDS {
        let machine_word = alphabet.parse_word(word).unwrap();
        assert!(lexicon.is_word(&machine_word));
        for idx in 0..machine_word.len() {
            assert!(lexicon.has_split(&machine_word, idx), "{} at {}", word, idx);
        }
    }
    let not_word = alphabet.parse_word("TAC").unwrap();
    assert!(!lexicon.is_word(&not_word));
    assert!(!(0..3).any(|idx| lexicon.has_split(&not_word, idx)));
}

#[test]
fn test_random_games_keep_invariants() {
    let game_config = game_config::make_english_game_config();
    let alphabet = game_config.alphabet();
    let lexicon = lexicon::Lexicon::build(alphabet, SMALL_WORDS).unwrap();
    for seed in 0..4 {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
        let mut board = board::Board::new(game_config.board_layout().dim());
        for _ in 0..10 {
            let mut bag = bag::Bag::new(alphabet);
            bag.shuffle(&mut rng);
            let mut rack = Vec::new();
            bag.replenish(&mut rack, 7);
            let before = board.tiles().to_vec();
            let moves = all_moves(&game_config, &lexicon, &board, &rack);
            // same input, same output, board untouched.
            let again = all_moves(&game_config, &lexicon, &board, &rack);
            assert_eq!(board.tiles(), &before[..]);
            assert_eq!(moves, again);
            check_candidates(&game_config, &lexicon, &board, &moves);
            check_complete(&game_config, &lexicon, &board, &rack, &moves);
            // best first.
            assert!(moves.windows(2).all(|w| w[0].score >= w[1].score));
            if let Some(best) = moves.first() {
                board.place(alphabet, best).unwrap();
            }
        }
    }
}

#[test]
fn test_small_board_games_find_every_play() {
    let game_config = game_config::make_plain_game_config(7, 7);
    let alphabet = game_config.alphabet();
    let lexicon = lexicon::Lexicon::build(alphabet, SMALL_WORDS).unwrap();
    let rack_size = game_config.rack_size() as usize;
    for seed in 0..8 {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
        let mut bag = bag::Bag::new(alphabet);
        bag.shuffle(&mut rng);
        let mut rack = Vec::new();
        let mut board = board::Board::new(game_config.board_layout().dim());
        for _ in 0..8 {
            bag.replenish(&mut rack, rack_size);
            let moves = all_moves(&game_config, &lexicon, &board, &rack);
            check_candidates(&game_config, &lexicon, &board, &moves);
            check_complete(&game_config, &lexicon, &board, &rack, &moves);
            let Some(best) = moves.first() else {
                // swap the whole rack.
                rack.clear();
                continue;
            };
            board.place(alphabet, best).unwrap();
            for tile in best.rack_tiles() {
                if let Some(pos) = rack.iter().position(|&t| t == tile) {
                    rack.swap_remove(pos);
                }
            }
        }
    }
}

#[test]
fn test_both_way_plays_on_a_fixed_board() {
    let game_config = game_config::make_plain_game_config(7, 7);
    let alphabet = game_config.alphabet();
    let lexicon = lexicon::Lexicon::build(alphabet, SMALL_WORDS).unwrap();
    let rows = [
        ".......", "..CAT..", "..A....", "..BAT..", "..S....", ".......", ".......",
    ];
    let board = board::Board::from_rows(alphabet, game_config.board_layout().dim(), &rows).unwrap();
    for rack in ["SEATBAT", "AT?", "S", "E?"] {
        let rack = alphabet.parse_rack(rack).unwrap();
        let moves = all_moves(&game_config, &lexicon, &board, &rack);
        assert!(!moves.is_empty());
        check_candidates(&game_config, &lexicon, &board, &moves);
        check_complete(&game_config, &lexicon, &board, &rack, &moves);
    }
}

#[test]
fn test_empty_rack_and_bad_rack() {
    let game_config = game_config::make_english_game_config();
    let lexicon = lexicon::Lexicon::build(game_config.alphabet(), SMALL_WORDS).unwrap();
    let board = board::Board::new(game_config.board_layout().dim());
    assert!(all_moves(&game_config, &lexicon, &board, &[]).is_empty());
    let board_state = board_state::BoardState::new(&game_config, &lexicon, &board).unwrap();
    let mut move_generator = movegen::MoveGenerator::new();
    assert!(matches!(
        move_generator.gen_moves(&board_state, &[1, 99], 10),
        Err(EngineError::MalformedInput(_))
    ));
    assert!(matches!(
        move_generator.gen_moves(&board_state, &[1; 256], 10),
        Err(EngineError::MalformedInput(_))
    ));
}

fn make_engine(words: &[String], config: engine::EngineConfig) -> engine::Engine {
    let game_config = Arc::new(game_config::make_english_game_config());
    let lexicon = Arc::new(lexicon::Lexicon::build(game_config.alphabet(), words).unwrap());
    engine::Engine::new(game_config, lexicon, config)
}

// all four-letter words starting with A to D.
fn many_words() -> Vec<String> {
    let letters = (b'A'..=b'Z').map(char::from).collect::<Vec<_>>();
    let mut words = Vec::new();
    for &a in &letters[..4] {
        for &b in &letters {
            for &c in &letters {
                for &d in &letters {
                    words.push([a, b, c, d].iter().collect::<String>());
                }
            }
        }
    }
    words
}

#[tokio::test]
async fn test_timeout_then_recovers() {
    let engine = make_engine(
        &many_words(),
        engine::EngineConfig {
            generation_budget_ms: 1,
            max_parallel_generations: 1,
            ..engine::EngineConfig::default()
        },
    );
    let board = board::Board::new(engine.game_config().board_layout().dim());
    let blanks = vec![0u8; 7];
    assert!(matches!(
        engine.find_moves_within(board.clone(), blanks.clone()).await,
        Err(EngineError::GenerationTimeout(_))
    ));
    assert!(matches!(
        engine.choose(&board, &blanks, |_| true).await,
        Ok(move_picker::Choice::Fallback(move_picker::FallbackReason::Timeout))
    ));
    // still usable once the budget allows.
    let ranked = engine.find_moves(&board, &[1, 1, 1, 1]).unwrap();
    assert_eq!(ranked.len(), 4);
    assert!(ranked.iter().all(|r| r.scored.total == 8));
}

#[tokio::test]
async fn test_fallbacks() {
    let words = SMALL_WORDS.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let engine = make_engine(&words, engine::EngineConfig::default());
    let alphabet = engine.game_config().alphabet();
    let board = board::Board::new(engine.game_config().board_layout().dim());
    let rack = alphabet.parse_rack("QZ").unwrap();
    assert!(matches!(
        engine.choose(&board, &rack, |_| true).await,
        Ok(move_picker::Choice::Fallback(move_picker::FallbackReason::NoLegalMoves))
    ));
    let rack = alphabet.parse_rack("CATS").unwrap();
    assert!(matches!(
        engine.choose(&board, &rack, |_| false).await,
        Ok(move_picker::Choice::Fallback(move_picker::FallbackReason::AllRejected))
    ));
    match engine.choose(&board, &rack, |_| true).await.unwrap() {
        move_picker::Choice::Play(ranked_move) => assert_eq!(ranked_move.scored.total, 12),
        other => panic!("expected a play, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dictionary_failures_reach_the_caller() {
    let game_config = Arc::new(game_config::make_english_game_config());
    let lexicon_cell = lexicon::LexiconCell::new();
    let result = engine::Engine::load(
        Arc::clone(&game_config),
        &lexicon_cell,
        engine::EngineConfig::default(),
        || async { Ok(Vec::new()) },
    )
    .await;
    assert!(matches!(result, Err(ref err) if err.is_dictionary_failure()));
    // a failed build is not kept.
    assert!(lexicon_cell.get().is_none());
    let result = engine::Engine::load(
        game_config,
        &lexicon_cell,
        engine::EngineConfig {
            build_budget_ms: 1000,
            ..engine::EngineConfig::default()
        },
        || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec!["CAT".to_string()])
        },
    )
    .await;
    assert!(matches!(result, Err(EngineError::BuildTimeout(_))));
}
