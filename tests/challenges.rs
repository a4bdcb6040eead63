// Copyright (C) 2020-2024 Andy Kurnia.

mod common;

use common::*;
use cwgame::error::GameError;
use cwgame::event::{ChallengeRule, EventType, GameEndReason, PlayState};
use cwgame::game;
use cwgame::letter_distribution::LetterDistribution;

#[test_log::test]
fn phony_comes_off_the_board() {
    let mut t = Table::new(21);
    let mut doc = t.start_with(ChallengeRule::Single);
    t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
    let before = doc.clone();

    t.place(&mut doc, ALICE, "8G", "TAC").unwrap();
    assert_eq!(doc.current_scores, [10, 0]);
    assert_eq!(doc.bag.len(), 83);

    assert_eq!(t.challenge(&mut doc, BOB).unwrap(), false);
    let evt = doc.events.last().unwrap();
    assert_eq!(evt.kind, EventType::PhonyTilesReturned);
    assert_eq!(evt.player_index, 0);
    assert_eq!(evt.lost_score, 10);
    assert_eq!(evt.cumulative, 0);
    assert_eq!(fmt_rack(&evt.played_tiles), "TAC");

    assert_eq!(doc.board, before.board);
    assert_eq!(doc.racks, before.racks);
    assert_eq!(sorted(&doc.bag.0), sorted(&before.bag.0));
    assert_eq!(doc.current_scores, [0, 0]);
    assert_eq!(doc.play_state, PlayState::Playing);
    // the challenger keeps the turn.
    assert_eq!(doc.player_on_turn, 1);
    assert_eq!(doc.scoreless_turns, 1);
    t.assert_conserved(&mut doc);

    // bob can now play normally.
    t.deal(&mut doc, ["ACTDOGS", "DOGSEEI"]);
    t.place(&mut doc, BOB, "H7", "DOG").unwrap();
    assert_eq!(doc.current_scores, [0, 10]);
    assert_eq!(doc.scoreless_turns, 0);
}

#[test_log::test]
fn valid_play_earns_the_bonus() {
    for (rule, bonus) in [
        (ChallengeRule::Single, 0),
        (ChallengeRule::Five, 5),
        (ChallengeRule::Ten, 10),
    ] {
        let mut t = Table::new(22);
        let mut doc = t.start_with(rule);
        t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
        t.place(&mut doc, ALICE, "8G", "CAT").unwrap();
        assert_eq!(t.challenge(&mut doc, BOB).unwrap(), false);
        let evt = doc.events.last().unwrap();
        assert_eq!(evt.kind, EventType::ChallengeBonus);
        assert_eq!(evt.player_index, 0);
        assert_eq!(evt.bonus, bonus);
        assert_eq!(evt.cumulative, 10 + bonus);
        assert_eq!(doc.current_scores, [10 + bonus, 0]);
        assert_eq!(doc.player_on_turn, 1);
        assert_eq!(doc.scoreless_turns, 0);
    }
}

#[test_log::test]
fn double_challenge_loses_a_turn() {
    let mut t = Table::new(23);
    let mut doc = t.start_with(ChallengeRule::Double);
    t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
    t.place(&mut doc, ALICE, "8G", "CAT").unwrap();
    assert_eq!(t.challenge(&mut doc, BOB).unwrap(), false);
    let evt = doc.events.last().unwrap();
    assert_eq!(evt.kind, EventType::UnsuccessfulChallengeTurnLoss);
    assert_eq!(evt.player_index, 1);
    assert_eq!(doc.current_scores, [10, 0]);
    assert_eq!(doc.player_on_turn, 0);
    assert_eq!(doc.scoreless_turns, 1);
}

#[test_log::test]
fn triple_challenge_ends_the_game_either_way() {
    let mut t = Table::new(24);
    let mut doc = t.start_with(ChallengeRule::Triple);
    t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
    t.place(&mut doc, ALICE, "8G", "CAT").unwrap();
    assert_eq!(t.challenge(&mut doc, BOB).unwrap(), true);
    assert_eq!(doc.winner, Some(0));
    assert_eq!(doc.end_reason, GameEndReason::TripleChallenge);

    let mut doc = t.start_with(ChallengeRule::Triple);
    t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
    t.place(&mut doc, ALICE, "8G", "TAC").unwrap();
    assert_eq!(t.challenge(&mut doc, BOB).unwrap(), true);
    assert_eq!(doc.winner, Some(1));
    assert_eq!(doc.end_reason, GameEndReason::TripleChallenge);
    assert!(doc.board.is_empty());
    assert_eq!(doc.current_scores, [0, 0]);
    t.assert_conserved(&mut doc);
}

#[test_log::test]
fn challenges_that_are_not_allowed() {
    let mut t = Table::new(25);
    let mut doc = t.start_with(ChallengeRule::Single);
    assert!(matches!(t.challenge(&mut doc, ALICE), Err(GameError::ChallengeNotPermitted(_))));
    t.pass(&mut doc, ALICE).unwrap();
    assert!(matches!(t.challenge(&mut doc, BOB), Err(GameError::ChallengeNotPermitted(_))));

    let mut doc = t.start_with(ChallengeRule::Void);
    t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
    t.place(&mut doc, ALICE, "8G", "CAT").unwrap();
    let before = doc.clone();
    assert!(matches!(t.challenge(&mut doc, BOB), Err(GameError::ChallengeNotPermitted(_))));
    assert_eq!(doc, before);
}

#[test_log::test]
fn successful_challenge_can_be_the_sixth_zero() {
    let mut t = Table::new(26);
    let mut doc = t.start_with(ChallengeRule::Single);
    t.deal(&mut doc, ["EEIIOOU", "ACTDOGS"]);
    for turn in 0..5 {
        let user = if turn % 2 == 0 { ALICE } else { BOB };
        t.pass(&mut doc, user).unwrap();
    }
    t.place(&mut doc, BOB, "8G", "TAC").unwrap();
    assert_eq!(doc.scoreless_turns, 0);
    assert_eq!(t.challenge(&mut doc, ALICE).unwrap(), true);

    assert_eq!(doc.end_reason, GameEndReason::ConsecutiveZeroes);
    let n = doc.events.len();
    let penalties = doc.events[n - 2..]
        .iter()
        .map(|e| (e.kind, e.player_index, e.lost_score))
        .collect::<Vec<_>>();
    // EEIIOOU is 7, ACTDOGS is 11.
    assert_eq!(
        penalties,
        [(EventType::EndRackPenalty, 0, 7), (EventType::EndRackPenalty, 1, 11)]
    );
    assert_eq!(doc.current_scores, [-7, -11]);
    assert_eq!(doc.winner, Some(0));
}

#[test_log::test]
fn unplay_needs_a_returned_placement() {
    let mut t = Table::new(27);
    let mut doc = t.start_with(ChallengeRule::Single);
    t.deal(&mut doc, ["ACTDOGS", "EEIIOOU"]);
    let dist = LetterDistribution::english();
    assert!(game::unplay_last_move(&mut doc, &dist, &mut t.rng).is_err());
    t.place(&mut doc, ALICE, "8G", "CAT").unwrap();
    t.pass(&mut doc, BOB).unwrap();
    let before = doc.clone();
    assert!(matches!(
        game::unplay_last_move(&mut doc, &dist, &mut t.rng),
        Err(GameError::InvalidInput(_))
    ));
    assert_eq!(doc, before);
}
