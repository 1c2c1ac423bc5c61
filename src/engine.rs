// Copyright (C) 2020-2026 Andy Kurnia.

//! The engine context: one shared lexicon, the game it plays, and the
//! generate, score, rank pipeline run under a wall-clock budget.

use super::{
    board, board_state, error::EngineError, game_config, lexicon, move_picker, movegen,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// best plays kept from one search.
    pub max_candidates: usize,
    /// best plays offered to the caller's check before falling back.
    pub validation_cutoff: usize,
    pub generation_budget_ms: u64,
    pub build_budget_ms: u64,
    pub max_parallel_generations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidates: 1000,
            validation_cutoff: move_picker::DEFAULT_VALIDATION_CUTOFF,
            generation_budget_ms: 5000,
            build_budget_ms: 60000,
            max_parallel_generations: num_cpus::get(),
        }
    }
}

impl EngineConfig {
    // missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, EngineError> {
        serde_json::from_str(s).map_err(|err| EngineError::MalformedInput(err.to_string()))
    }

    #[inline(always)]
    pub fn generation_budget(&self) -> Duration {
        Duration::from_millis(self.generation_budget_ms)
    }

    #[inline(always)]
    pub fn build_budget(&self) -> Duration {
        Duration::from_millis(self.build_budget_ms)
    }
}

pub struct Engine {
    game_config: Arc<game_config::GameConfig>,
    lexicon: Arc<lexicon::Lexicon>,
    config: EngineConfig,
    permits: Arc<tokio::sync::Semaphore>,
}

impl Engine {
    pub fn new(
        game_config: Arc<game_config::GameConfig>,
        lexicon: Arc<lexicon::Lexicon>,
        config: EngineConfig,
    ) -> Self {
        let permits = Arc::new(tokio::sync::Semaphore::new(
            config.max_parallel_generations.max(1),
        ));
        Self {
            game_config,
            lexicon,
            config,
            permits,
        }
    }

    /// Gets the lexicon from the shared cell, building it within the build
    /// budget if nobody has yet.
    pub async fn load<F, Fut>(
        game_config: Arc<game_config::GameConfig>,
        lexicon_cell: &lexicon::LexiconCell,
        config: EngineConfig,
        load_words: F,
    ) -> Result<Self, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<String>, EngineError>>,
    {
        let lexicon = lexicon_cell
            .get_or_build(game_config.alphabet(), config.build_budget(), load_words)
            .await?;
        Ok(Self::new(game_config, lexicon, config))
    }

    #[inline(always)]
    pub fn game_config(&self) -> &Arc<game_config::GameConfig> {
        &self.game_config
    }

    #[inline(always)]
    pub fn lexicon(&self) -> &Arc<lexicon::Lexicon> {
        &self.lexicon
    }

    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn find_moves_until(
        game_config: &game_config::GameConfig,
        lexicon: &lexicon::Lexicon,
        board: &board::Board,
        rack: &[u8],
        max_candidates: usize,
        stop: &AtomicBool,
    ) -> Result<Vec<move_picker::RankedMove>, EngineError> {
        let t0 = Instant::now();
        let board_state = board_state::BoardState::new(game_config, lexicon, board)?;
        let mut move_generator = movegen::MoveGenerator::new();
        let flow = move_generator.gen_moves_until(&board_state, rack, max_candidates, || {
            stop.load(Ordering::Relaxed)
        })?;
        if flow.is_break() {
            log::debug!("search stopped after {:?}", t0.elapsed());
        }
        let ranked = move_picker::rank(std::mem::take(&mut move_generator.plays), &board_state);
        log::debug!(
            "found {} plays for rack of {} in {:?}",
            ranked.len(),
            rack.len(),
            t0.elapsed()
        );
        if ranked.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }
        Ok(ranked)
    }

    /// Ranked legal plays, best first. Blocks the calling thread.
    pub fn find_moves(
        &self,
        board: &board::Board,
        rack: &[u8],
    ) -> Result<Vec<move_picker::RankedMove>, EngineError> {
        Self::find_moves_until(
            &self.game_config,
            &self.lexicon,
            board,
            rack,
            self.config.max_candidates,
            &AtomicBool::new(false),
        )
    }

    /// Like find_moves, on the blocking pool and within the generation
    /// budget. On timeout the search is told to stop and the caller gets
    /// a recoverable error.
    pub async fn find_moves_within(
        &self,
        board: board::Board,
        rack: Vec<u8>,
    ) -> Result<Vec<move_picker::RankedMove>, EngineError> {
        let budget = self.config.generation_budget();
        let stop = Arc::new(AtomicBool::new(false));
        let game_config = Arc::clone(&self.game_config);
        let lexicon = Arc::clone(&self.lexicon);
        let permits = Arc::clone(&self.permits);
        let max_candidates = self.config.max_candidates;
        let search_stop = Arc::clone(&stop);
        let work = async move {
            // the permit stays with the search until it really ends.
            let permit = permits.acquire_owned().await.ok();
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                Self::find_moves_until(
                    &game_config,
                    &lexicon,
                    &board,
                    &rack,
                    max_candidates,
                    &search_stop,
                )
            })
            .await
        };
        match tokio::time::timeout(budget, work).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Ok(Err(_)) | Err(_) => {
                stop.store(true, Ordering::Relaxed);
                log::warn!("move generation exceeded {:?}", budget);
                Err(EngineError::GenerationTimeout(budget))
            }
        }
    }

    /// The play to make, or why to pass or exchange instead. Only
    /// dictionary failures and malformed input come back as errors.
    pub async fn choose<Validate: FnMut(&move_picker::RankedMove) -> bool>(
        &self,
        board: &board::Board,
        rack: &[u8],
        validate: Validate,
    ) -> Result<move_picker::Choice, EngineError> {
        match self.find_moves_within(board.clone(), rack.to_vec()).await {
            Ok(ranked) => Ok(move_picker::pick(
                &ranked,
                self.config.validation_cutoff,
                validate,
            )),
            Err(err) => match move_picker::FallbackReason::from_error(&err) {
                Some(reason) => {
                    log::debug!("falling back: {}", err);
                    Ok(move_picker::Choice::Fallback(reason))
                }
                None => Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_engine(words: &[&str], config: EngineConfig) -> Engine {
        let game_config = Arc::new(game_config::make_english_game_config());
        let lexicon = Arc::new(lexicon::Lexicon::build(game_config.alphabet(), words).unwrap());
        Engine::new(game_config, lexicon, config)
    }

    fn empty_board(engine: &Engine) -> board::Board {
        board::Board::new(engine.game_config().board_layout().dim())
    }

    #[test]
    fn test_config_from_json() {
        let config = EngineConfig::from_json(r#"{ "validation_cutoff": 5 }"#).unwrap();
        assert_eq!(config.validation_cutoff, 5);
        assert_eq!(config.max_candidates, EngineConfig::default().max_candidates);
        assert_eq!(config.generation_budget(), Duration::from_millis(5000));
        assert!(matches!(
            EngineConfig::from_json("{ nope"),
            Err(EngineError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_find_moves() {
        let engine = make_engine(&["CAT", "AT", "CATS"], EngineConfig::default());
        let board = empty_board(&engine);
        let ranked = engine.find_moves(&board, &[1, 3, 19, 20]).unwrap();
        assert_eq!(ranked.len(), 9);
        assert_eq!(ranked[0].scored.total, 12);
        // nothing to make from these.
        assert!(matches!(
            engine.find_moves(&board, &[17, 17]),
            Err(EngineError::NoLegalMoves)
        ));
        assert!(matches!(
            engine.find_moves(&board::Board::new(crate::matrix::Dim { rows: 3, cols: 3 }), &[1]),
            Err(EngineError::MalformedInput(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_find_moves_within_budget() {
        let engine = make_engine(
            &["CAT", "AT", "CATS"],
            EngineConfig {
                max_parallel_generations: 1,
                ..EngineConfig::default()
            },
        );
        let engine = Arc::new(engine);
        let mut handles = Vec::new();
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                let board = empty_board(&engine);
                engine.find_moves_within(board, vec![1, 3, 19, 20]).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().len(), 9);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_choose_falls_back() {
        let engine = make_engine(&["CAT", "AT", "CATS"], EngineConfig::default());
        let board = empty_board(&engine);
        match engine.choose(&board, &[17, 17], |_| true).await.unwrap() {
            move_picker::Choice::Fallback(reason) => {
                assert_eq!(reason, move_picker::FallbackReason::NoLegalMoves)
            }
            move_picker::Choice::Play(_) => panic!("QQ has no plays"),
        }
        match engine.choose(&board, &[1, 3, 19, 20], |_| false).await.unwrap() {
            move_picker::Choice::Fallback(reason) => {
                assert_eq!(reason, move_picker::FallbackReason::AllRejected)
            }
            move_picker::Choice::Play(_) => panic!("everything was rejected"),
        }
        match engine.choose(&board, &[1, 3, 19, 20], |_| true).await.unwrap() {
            move_picker::Choice::Play(ranked_move) => assert_eq!(ranked_move.scored.total, 12),
            move_picker::Choice::Fallback(reason) => panic!("{:?}", reason),
        }
    }

    #[tokio::test]
    async fn test_load_shares_one_build() {
        let game_config = Arc::new(game_config::make_english_game_config());
        let lexicon_cell = lexicon::LexiconCell::new();
        let first = Engine::load(
            Arc::clone(&game_config),
            &lexicon_cell,
            EngineConfig::default(),
            || async { Ok(vec!["CAT".to_string()]) },
        )
        .await
        .unwrap();
        let second = Engine::load(
            Arc::clone(&game_config),
            &lexicon_cell,
            EngineConfig::default(),
            || async { Err(EngineError::DictionaryUnavailable("not needed".into())) },
        )
        .await
        .unwrap();
        assert!(Arc::ptr_eq(first.lexicon(), second.lexicon()));
        let failed = Engine::load(
            game_config,
            &lexicon::LexiconCell::new(),
            EngineConfig::default(),
            || async { Ok(Vec::new()) },
        )
        .await;
        assert!(failed.err().unwrap().is_dictionary_failure());
    }
}
