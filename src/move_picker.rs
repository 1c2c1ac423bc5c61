// Copyright (C) 2020-2026 Andy Kurnia.

use super::{board_state, error::EngineError, movegen, play_scorer};

// how many of the best plays get the caller's full check before giving up.
pub const DEFAULT_VALIDATION_CUTOFF: usize = 15;

#[derive(Clone, Debug)]
pub struct RankedMove {
    pub candidate: movegen::Candidate,
    pub scored: play_scorer::ScoredPlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum FallbackReason {
    NoLegalMoves,
    Timeout,
    AllRejected,
}

impl FallbackReason {
    // recoverable errors map to a reason, the rest must reach the caller.
    pub fn from_error(err: &EngineError) -> Option<Self> {
        match err {
            EngineError::NoLegalMoves => Some(FallbackReason::NoLegalMoves),
            EngineError::GenerationTimeout(_) => Some(FallbackReason::Timeout),
            _ => None,
        }
    }
}

/// What the caller should do: make this play, or pass/exchange instead.
#[derive(Clone, Debug)]
pub enum Choice {
    Play(RankedMove),
    Fallback(FallbackReason),
}

/// Scores every candidate and orders them best first. Equal totals keep
/// the order they were found in.
pub fn rank(
    candidates: Vec<movegen::Candidate>,
    board_state: &board_state::BoardState,
) -> Vec<RankedMove> {
    let mut play_scorer = play_scorer::PlayScorer::new();
    let mut ranked = candidates
        .into_iter()
        .map(|candidate| {
            let scored = play_scorer.score(board_state, &candidate);
            if scored.total != candidate.score {
                log::debug!(
                    "recounted {} for a play found at {}",
                    scored.total,
                    candidate.score
                );
            }
            RankedMove { candidate, scored }
        })
        .collect::<Vec<_>>();
    // sort_by is stable.
    ranked.sort_by(|a, b| b.scored.total.cmp(&a.scored.total));
    ranked
}

/// Walks the best `cutoff` plays in order and takes the first one the
/// caller's check accepts.
pub fn pick<Validate: FnMut(&RankedMove) -> bool>(
    ranked: &[RankedMove],
    cutoff: usize,
    mut validate: Validate,
) -> Choice {
    if ranked.is_empty() {
        return Choice::Fallback(FallbackReason::NoLegalMoves);
    }
    match ranked.iter().take(cutoff).find(|&ranked_move| validate(ranked_move)) {
        Some(ranked_move) => Choice::Play(ranked_move.clone()),
        None => {
            log::warn!(
                "none of the top {} of {} plays passed validation",
                cutoff.min(ranked.len()),
                ranked.len()
            );
            Choice::Fallback(FallbackReason::AllRejected)
        }
    }
}
