// Copyright (C) 2020-2024 Andy Kurnia.

use super::alphabet::Tile;
use super::event::{ChallengeRule, ClientEventType, EventType, GameEndReason, GameEvent, PlayState};
use super::game_state::GameDocument;
use super::{
    alphabet, bag, board, board_layout, cache, config, dawg, error, event, game_config, game_state,
    game_timers, inventory, letter_distribution,
};
use rand::prelude::*;
use std::sync::Arc;

const UID_LEN: usize = 22;

pub struct Resources {
    pub dist: Arc<letter_distribution::LetterDistribution>,
    pub dawg: Arc<dawg::Dawg>,
    pub layout: Arc<board_layout::BoardLayout>,
}

/// Applies events to game documents. One engine serves any number of games;
/// each document must only see one event at a time.
pub struct Engine {
    config: config::Config,
    cache: Arc<cache::ObjectCache>,
    clock: Arc<dyn game_timers::Clock>,
}

/// Board, racks and bag as they will be after a placement. The document is
/// only touched by `commit`; dropping the transaction discards it.
struct MoveTransaction {
    board: board::Board,
    racks: Vec<Vec<u8>>,
    bag: bag::Bag,
}

impl MoveTransaction {
    fn begin(doc: &GameDocument) -> Self {
        Self {
            board: doc.board.clone(),
            racks: doc.racks.clone(),
            bag: doc.bag.clone(),
        }
    }

    fn place(
        &mut self,
        pos: &board::Position,
        tiles: &[Tile],
        player: usize,
        leave: Vec<u8>,
    ) -> error::Returns<()> {
        self.board.place(pos, tiles)?;
        self.racks[player] = leave;
        Ok(())
    }

    fn draw(
        &mut self,
        dist: &letter_distribution::LetterDistribution,
        rng: &mut dyn RngCore,
        player: usize,
        n: usize,
    ) -> error::Returns<usize> {
        inventory::TileInventory::new(dist, &mut self.bag, &mut self.racks, &self.board, rng)
            .draw_at_most_to_rack(player, n)
    }

    fn commit(self, doc: &mut GameDocument) {
        doc.board = self.board;
        doc.racks = self.racks;
        doc.bag = self.bag;
    }
}

/// "8H" is across from row 8 column H, "H8" is down. Rows count from 1.
pub fn from_board_game_coords(c: &str) -> error::Returns<board::Position> {
    fn parse_row(digits: &str, c: &str) -> error::Returns<i8> {
        match digits.parse::<u32>() {
            Ok(n) if (1..=127).contains(&n) => Ok((n - 1) as i8),
            _ => Err(error::GameError::InvalidInput(format!("bad coordinates {c:?}"))),
        }
    }
    let b = c.as_bytes();
    if b.len() >= 2 {
        let first = b[0];
        let last = b[b.len() - 1];
        if first.is_ascii_uppercase() && b[1..].iter().all(u8::is_ascii_digit) {
            return Ok(board::Position {
                row: parse_row(&c[1..], c)?,
                col: (first - b'A') as i8,
                down: true,
            });
        }
        if last.is_ascii_uppercase() && b[..b.len() - 1].iter().all(u8::is_ascii_digit) {
            return Ok(board::Position {
                row: parse_row(&c[..c.len() - 1], c)?,
                col: (last - b'A') as i8,
                down: false,
            });
        }
    }
    return_error!(format!("bad coordinates {c:?}"));
}

pub fn infer_rack_for_play(played_tiles: &[u8]) -> Vec<u8> {
    played_tiles
        .iter()
        .filter_map(|&t| Tile::from_byte(t).rack_tile())
        .collect()
}

// a designated blank must stand for a real letter, and racks hold none.
fn checked_machine_letters(
    bytes: &[u8],
    alphabet: &alphabet::Alphabet,
    on_rack: bool,
) -> error::Returns<Vec<u8>> {
    let letters = 1..=alphabet.len();
    for &b in bytes {
        let ok = match Tile::from_byte(b) {
            Tile::Zero => true,
            Tile::Letter(c) => letters.contains(&c),
            Tile::Blank(c) => !on_rack && letters.contains(&c),
        };
        if !ok {
            return_error!(format!("invalid machine letter {b}"));
        }
    }
    Ok(bytes.to_vec())
}

/// Turns what a player sent into the event it would produce, checking that
/// the tiles it uses are on the player's rack.
pub fn client_event_to_game_event(
    doc: &GameDocument,
    evt: &event::ClientGameplayEvent,
    alphabet: &alphabet::Alphabet,
) -> error::Returns<GameEvent> {
    let player = doc.player_on_turn;
    let rack = doc.racks.get(player).cloned().unwrap_or_default();
    if !evt.tiles.is_empty() && !evt.machine_letters.is_empty() {
        return_error!("cannot specify both tiles and machine letters".into());
    }
    match evt.kind {
        ClientEventType::TilePlacement => {
            let position = from_board_game_coords(&evt.position_coords)?;
            let played_tiles = if !evt.tiles.is_empty() {
                alphabet::encode(&alphabet.to_tiles(&evt.tiles)?)
            } else {
                checked_machine_letters(&evt.machine_letters, alphabet, false)?
            };
            inventory::leave(&rack, &infer_rack_for_play(&played_tiles), false)?;
            Ok(GameEvent {
                position: Some(position),
                position_coords: evt.position_coords.clone(),
                played_tiles,
                rack,
                ..GameEvent::new(EventType::TilePlacementMove, player)
            })
        }
        ClientEventType::Pass => Ok(GameEvent {
            rack,
            ..GameEvent::new(EventType::Pass, player)
        }),
        ClientEventType::Exchange => {
            let exchanged = if !evt.tiles.is_empty() {
                alphabet.to_rack(&evt.tiles)?
            } else {
                checked_machine_letters(&evt.machine_letters, alphabet, true)?
            };
            if exchanged.is_empty() {
                return_error!("nothing to exchange".into());
            }
            inventory::leave(&rack, &exchanged, false)?;
            Ok(GameEvent {
                exchanged,
                rack,
                ..GameEvent::new(EventType::Exchange, player)
            })
        }
        ClientEventType::Challenge => Ok(GameEvent {
            rack,
            ..GameEvent::new(EventType::Challenge, player)
        }),
        ClientEventType::Resign => Err(error::GameError::MoveTypeNotUserInputtable),
    }
}

fn validate_move(doc: &GameDocument, kind: EventType) -> error::Returns<()> {
    if doc.is_over() {
        return Err(error::GameError::GameNotActive);
    }
    let waiting = doc.play_state == PlayState::WaitingForFinalPass;
    match kind {
        EventType::Exchange => {
            if waiting {
                return Err(error::GameError::OnlyPassOrChallenge);
            }
            if doc.bag.len() < game_config::EXCHANGE_TILE_LIMIT {
                return Err(error::GameError::ExchangeNotPermitted(
                    game_config::EXCHANGE_TILE_LIMIT,
                ));
            }
            Ok(())
        }
        EventType::Pass | EventType::UnsuccessfulChallengeTurnLoss | EventType::Challenge => Ok(()),
        EventType::TilePlacementMove => {
            if waiting {
                return Err(error::GameError::OnlyPassOrChallenge);
            }
            Ok(())
        }
        _ => Err(error::GameError::MoveTypeNotUserInputtable),
    }
}

/// Formed words the lexicon rejects. Jumbled variants accept any word whose
/// letters can be rearranged into a valid word.
pub fn invalid_words(
    dawg: &dawg::Dawg,
    words: &[Vec<u8>],
    variant: game_config::Variant,
) -> error::Returns<Vec<Vec<u8>>> {
    let mut illegal = Vec::new();
    for word in words {
        let valid = if variant.is_jumbled() {
            dawg.has_anagram(word)?
        } else {
            dawg.has_word(word)
        };
        if !valid {
            illegal.push(word.clone());
        }
    }
    Ok(illegal)
}

fn invalid_words_error(alphabet: &alphabet::Alphabet, words: Vec<Vec<u8>>) -> error::GameError {
    let rendered = words.iter().map(|w| alphabet.fmt_word(w)).collect();
    error::GameError::InvalidWords(error::InvalidWords { words, rendered })
}

fn event_from_move(doc: &GameDocument, gevt: &GameEvent) -> GameEvent {
    let player = doc.player_on_turn;
    GameEvent {
        player_index: player,
        cumulative: doc.current_scores[player],
        ..gevt.clone()
    }
}

/// Scoreless turns at the end of `events`, replayed from the start: a
/// placement resets the count unless its tiles came back off the board.
pub fn count_scoreless_turns(events: &[GameEvent]) -> u32 {
    let mut n = 0;
    for (i, evt) in events.iter().enumerate() {
        match evt.kind {
            EventType::TilePlacementMove => {
                let returned = events
                    .get(i + 1)
                    .is_some_and(|next| next.kind == EventType::PhonyTilesReturned);
                n = if returned { n + 1 } else { 0 };
            }
            kind if kind.is_scoreless_turn() => n += 1,
            _ => {}
        }
    }
    n
}

fn add_winner(doc: &mut GameDocument) {
    let scores = &doc.current_scores;
    let all_equal = scores.iter().all(|&s| Some(&s) == scores.first());
    doc.winner = if all_equal {
        None
    } else {
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate() {
            if s > scores[best] {
                best = i;
            }
        }
        Some(best)
    };
}

// the player who went out gets twice the value of every rack left.
fn end_rack_calcs(
    doc: &mut GameDocument,
    dist: &letter_distribution::LetterDistribution,
    went_out: usize,
) {
    let all_racks = doc.racks.concat();
    let points = dist.word_score(&all_racks) * 2;
    doc.current_scores[went_out] += points;
    doc.events.push(GameEvent {
        cumulative: doc.current_scores[went_out],
        rack: all_racks,
        end_rack_points: points,
        ..GameEvent::new(EventType::EndRackPts, went_out)
    });
}

fn handle_consecutive_scoreless_turns(
    doc: &mut GameDocument,
    dist: &letter_distribution::LetterDistribution,
) {
    doc.play_state = PlayState::GameOver;
    doc.end_reason = GameEndReason::ConsecutiveZeroes;
    let mut order = (0..doc.num_players()).collect::<Vec<_>>();
    order.swap(0, doc.player_on_turn);
    for p in order {
        let points = dist.word_score(&doc.racks[p]);
        doc.current_scores[p] -= points;
        doc.events.push(GameEvent {
            cumulative: doc.current_scores[p],
            rack: doc.racks[p].clone(),
            lost_score: points,
            ..GameEvent::new(EventType::EndRackPenalty, p)
        });
    }
    add_winner(doc);
}

fn find_only_nonquitter(doc: &GameDocument) -> Option<usize> {
    let mut remaining = doc.players.iter().enumerate().filter(|(_, p)| !p.quit);
    match (remaining.next(), remaining.next()) {
        (Some((i, _)), None) => Some(i),
        _ => None,
    }
}

fn assign_turn_to_next_nonquitter(doc: &mut GameDocument, start: usize) -> error::Returns<()> {
    if doc.is_over() {
        return Ok(());
    }
    let n = doc.num_players();
    let mut i = (start + 1) % n;
    while i != start {
        if !doc.players[i].quit {
            doc.player_on_turn = i;
            log::debug!("assign-turn: {i}");
            return Ok(());
        }
        i = (i + 1) % n;
    }
    return_error!("everyone quit".into());
}

fn set_timed_out(doc: &mut GameDocument, on_turn: usize) -> error::Returns<()> {
    log::debug!("timed out! play state {:?}", doc.play_state);
    // the loser always overtimes by exactly the maximum.
    let floor = -doc.timers.max_overtime_ms();
    if let Some(tr) = doc.timers.time_remaining.get_mut(on_turn) {
        *tr = floor;
    }
    doc.events.push(GameEvent {
        cumulative: doc.current_scores[on_turn],
        millis_remaining: floor,
        ..GameEvent::new(EventType::TimedOut, on_turn)
    });
    doc.players[on_turn].quit = true;
    match find_only_nonquitter(doc) {
        Some(winner) => {
            doc.winner = Some(winner);
            doc.end_reason = GameEndReason::Time;
            doc.play_state = PlayState::GameOver;
            Ok(())
        }
        None => assign_turn_to_next_nonquitter(doc, on_turn),
    }
}

/// Reverses the placement before the trailing phony-tiles-returned event:
/// tiles leave the board, tiles drawn after the play go back to the bag and
/// the player gets the rack they played from.
pub fn unplay_last_move(
    doc: &mut GameDocument,
    dist: &letter_distribution::LetterDistribution,
    rng: &mut dyn RngCore,
) -> error::Returns<()> {
    let n = doc.events.len();
    if n < 2 {
        return_error!("not enough events to unplay".into());
    }
    let off_board = doc.events[n - 1].clone();
    let original = doc.events[n - 2].clone();
    if off_board.kind != EventType::PhonyTilesReturned {
        return_error!("wrong event type for offboard event".into());
    }
    if original.kind != EventType::TilePlacementMove {
        return_error!("wrong event type for original event".into());
    }
    if original.player_index != off_board.player_index {
        return_error!("player indexes don't match".into());
    }
    let Some(pos) = original.position else {
        return_error!("placement has no position".into());
    };
    let player = off_board.player_index;
    doc.board.unplace(&pos, &alphabet::decode(&original.played_tiles))?;
    let drawn_after = inventory::leave(&doc.racks[player], &original.leave, false)?;
    doc.inventory(dist, rng).validated_put_back(&drawn_after)?;
    doc.racks[player] = original.rack;
    doc.play_state = PlayState::Playing;
    doc.end_reason = GameEndReason::None;
    doc.winner = None;
    doc.current_scores[player] = off_board.cumulative;
    doc.scoreless_turns = count_scoreless_turns(&doc.events);
    let inv = doc.inventory(dist, rng);
    inv.log_tile_state("after-unplay");
    inv.validate_invariants()
}

impl Engine {
    pub fn new(
        config: config::Config,
        cache: Arc<cache::ObjectCache>,
        clock: Arc<dyn game_timers::Clock>,
    ) -> Self {
        Self { config, cache, clock }
    }

    pub fn with_wall_clock(config: config::Config, cache: Arc<cache::ObjectCache>) -> Self {
        Self::new(config, cache, Arc::new(game_timers::WallClock))
    }

    #[inline(always)]
    pub fn config(&self) -> &config::Config {
        &self.config
    }

    #[inline(always)]
    pub fn cache(&self) -> &Arc<cache::ObjectCache> {
        &self.cache
    }

    #[inline(always)]
    fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn resources(
        &self,
        lexicon: &str,
        distribution: &str,
        layout: &str,
    ) -> error::Returns<Resources> {
        Ok(Resources {
            dist: self.cache.load(&self.config, distribution)?,
            dawg: self.cache.load(&self.config, lexicon)?,
            layout: self.cache.load(&self.config, layout)?,
        })
    }

    fn doc_resources(&self, doc: &GameDocument) -> error::Returns<Resources> {
        self.resources(&doc.lexicon, &doc.letter_distribution, &doc.board_layout)
    }

    fn doc_distribution(
        &self,
        doc: &GameDocument,
    ) -> error::Returns<Arc<letter_distribution::LetterDistribution>> {
        self.cache.load(&self.config, &doc.letter_distribution)
    }

    pub fn new_game(
        &self,
        rules: &game_config::GameRules,
        players: &[game_state::GamePlayer],
    ) -> error::Returns<GameDocument> {
        rules.validate(players.len())?;
        let mut seen = std::collections::HashSet::new();
        if !players.iter().all(|p| seen.insert(p.user_id.as_str())) {
            return Err(error::GameError::Setup("user IDs must be unique".into()));
        }
        let res = self.resources(
            rules.lexicon(),
            rules.letter_distribution(),
            rules.board_layout(),
        )?;
        if res.dawg.alphabet().letters() != res.dist.alphabet().letters() {
            return Err(error::GameError::Setup(format!(
                "lexicon {} and letter distribution {} have different alphabets",
                rules.lexicon(),
                rules.letter_distribution()
            )));
        }
        let n = players.len();
        let uid = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(UID_LEN)
            .map(char::from)
            .collect::<String>();
        log::debug!("new game {uid} for {n} players, lexicon {}", rules.lexicon());
        Ok(GameDocument {
            version: game_state::GAME_DOCUMENT_VERSION,
            uid,
            players: players
                .iter()
                .map(|p| game_state::GamePlayer {
                    quit: false,
                    ..p.clone()
                })
                .collect(),
            events: Vec::new(),
            lexicon: rules.lexicon().into(),
            variant: rules.variant(),
            board_layout: res.layout.name().into(),
            letter_distribution: rules.letter_distribution().into(),
            racks: vec![Vec::new(); n],
            board: board::Board::new(res.layout.dim()),
            bag: bag::Bag::new(&res.dist),
            player_on_turn: 0,
            current_scores: vec![0; n],
            timers: game_timers::GameTimers::new(
                rules.seconds_per_player(),
                rules.increment_seconds(),
                rules.reset_to_increment_after_turn(),
                rules.max_overtime_minutes(),
                rules.time_bank_ms(),
                rules.is_untimed(),
            ),
            play_state: PlayState::Unstarted,
            challenge_rule: rules.challenge_rule(),
            scoreless_turns: 0,
            end_reason: GameEndReason::None,
            winner: None,
        })
    }

    pub fn start_game(&self, doc: &mut GameDocument) -> error::Returns<()> {
        self.start_game_with_rng(doc, &mut rand::rng())
    }

    pub fn start_game_with_rng(
        &self,
        doc: &mut GameDocument,
        rng: &mut dyn RngCore,
    ) -> error::Returns<()> {
        if doc.play_state != PlayState::Unstarted {
            return Err(error::GameError::StartNotPermitted);
        }
        let dist = self.doc_distribution(doc)?;
        let mut work = doc.clone();
        for p in 0..work.num_players() {
            work.inventory(&dist, rng).draw_to_rack(p, game_config::RACK_SIZE)?;
        }
        work.timers.reset_and_start(self.now());
        work.play_state = PlayState::Playing;
        *doc = work;
        Ok(())
    }

    pub fn assign_racks(
        &self,
        doc: &mut GameDocument,
        racks: &[Vec<u8>],
        behavior: inventory::RackAssignBehavior,
    ) -> error::Returns<()> {
        let dist = self.doc_distribution(doc)?;
        let mut work = doc.clone();
        work.inventory(&dist, &mut rand::rng()).assign_racks(racks, behavior)?;
        *doc = work;
        Ok(())
    }

    pub fn process_gameplay_event(
        &self,
        doc: &mut GameDocument,
        evt: &event::ClientGameplayEvent,
        user_id: &str,
    ) -> error::Returns<bool> {
        self.process_gameplay_event_with_rng(doc, evt, user_id, &mut rand::rng())
    }

    /// Applies one player event. On error the document is left exactly as
    /// it was. Returns whether the game is now over.
    pub fn process_gameplay_event_with_rng(
        &self,
        doc: &mut GameDocument,
        evt: &event::ClientGameplayEvent,
        user_id: &str,
        rng: &mut dyn RngCore,
    ) -> error::Returns<bool> {
        let mut work = doc.clone();
        self.apply_event(&mut work, evt, user_id, rng)?;
        *doc = work;
        Ok(doc.is_over())
    }

    fn apply_event(
        &self,
        doc: &mut GameDocument,
        evt: &event::ClientGameplayEvent,
        user_id: &str,
        rng: &mut dyn RngCore,
    ) -> error::Returns<()> {
        if matches!(doc.play_state, PlayState::GameOver | PlayState::Unstarted) {
            return Err(error::GameError::GameNotActive);
        }
        if evt.game_id != doc.uid {
            return Err(error::GameError::UnmatchedGameId);
        }
        let on_turn = doc.player_on_turn;
        if evt.kind != ClientEventType::Resign && doc.players[on_turn].user_id != user_id {
            return Err(error::GameError::NotOnTurn);
        }
        let now = self.now();
        let tr = doc.timers.time_remaining(now, on_turn, on_turn);
        log::debug!("process-gameplay-event {:?} now={now} time-remaining={tr}", evt.kind);

        let final_pass_window = doc.play_state == PlayState::WaitingForFinalPass;
        let forced_pass;
        let mut evt = evt;
        if !(final_pass_window && evt.kind == ClientEventType::Pass)
            && doc.timers.time_ran_out(now, on_turn, on_turn)
        {
            log::debug!("got-move-too-late");
            if final_pass_window {
                log::debug!("timed out, so passing instead of processing the submitted move");
                forced_pass =
                    event::ClientGameplayEvent::new(ClientEventType::Pass, &evt.game_id, user_id);
                evt = &forced_pass;
            } else {
                return set_timed_out(doc, on_turn);
            }
        }

        if evt.kind == ClientEventType::Resign {
            if doc.num_players() != 2 {
                return Err(error::GameError::ResignNotPermitted(doc.num_players()));
            }
            let resigner = doc.player_index(user_id).ok_or(error::GameError::PlayerNotInGame)?;
            doc.timers.calculate_and_set(now, on_turn, on_turn, false);
            doc.events.push(GameEvent {
                cumulative: doc.current_scores[resigner],
                millis_remaining: doc.timers.time_remaining.get(resigner).copied().unwrap_or(0),
                ..GameEvent::new(EventType::Resigned, resigner)
            });
            doc.players[resigner].quit = true;
            return match find_only_nonquitter(doc) {
                Some(winner) => {
                    doc.winner = Some(winner);
                    doc.end_reason = GameEndReason::Resigned;
                    doc.play_state = PlayState::GameOver;
                    Ok(())
                }
                None => assign_turn_to_next_nonquitter(doc, on_turn),
            };
        }

        let res = self.doc_resources(doc)?;
        let gevt = client_event_to_game_event(doc, evt, res.dist.alphabet())?;
        self.play_move(doc, gevt, tr, &res, rng)
    }

    fn play_move(
        &self,
        doc: &mut GameDocument,
        gevt: GameEvent,
        tr: i64,
        res: &Resources,
        rng: &mut dyn RngCore,
    ) -> error::Returns<()> {
        if gevt.kind == EventType::Challenge {
            return self.challenge(doc, tr, res, rng);
        }
        validate_move(doc, gevt.kind)?;
        let on_turn = doc.player_on_turn;
        doc.timers.calculate_and_set(self.now(), on_turn, on_turn, true);

        match gevt.kind {
            EventType::TilePlacementMove => play_tile_placement_move(doc, &gevt, tr, res, rng)?,
            EventType::Pass | EventType::UnsuccessfulChallengeTurnLoss => {
                doc.events.push(GameEvent {
                    millis_remaining: tr,
                    ..event_from_move(doc, &gevt)
                });
                if doc.play_state == PlayState::WaitingForFinalPass {
                    doc.play_state = PlayState::GameOver;
                    doc.end_reason = GameEndReason::Standard;
                    let Some(went_out) = doc.racks.iter().rposition(|r| r.is_empty()) else {
                        return_error!("no empty rack but player went out".into());
                    };
                    end_rack_calcs(doc, &res.dist, went_out);
                    add_winner(doc);
                } else {
                    doc.scoreless_turns += 1;
                }
            }
            EventType::Exchange => {
                let leave = inventory::leave(&doc.racks[on_turn], &gevt.exchanged, false)?;
                doc.inventory(&res.dist, rng).exchange_tiles(on_turn, &gevt.exchanged)?;
                doc.scoreless_turns += 1;
                doc.events.push(GameEvent {
                    millis_remaining: tr,
                    leave,
                    ..event_from_move(doc, &gevt)
                });
            }
            _ => return Err(error::GameError::MoveTypeNotUserInputtable),
        }

        if doc.scoreless_turns == game_config::NUM_ZEROS_TO_END {
            handle_consecutive_scoreless_turns(doc, &res.dist);
            Ok(())
        } else {
            assign_turn_to_next_nonquitter(doc, on_turn)
        }
    }

    // Re-judges the previous placement. The player on turn is the challenger.
    fn challenge(
        &self,
        doc: &mut GameDocument,
        tr: i64,
        res: &Resources,
        rng: &mut dyn RngCore,
    ) -> error::Returns<()> {
        let Some(last) = doc.events.last().cloned() else {
            return Err(error::GameError::ChallengeNotPermitted("this game has no history".into()));
        };
        if doc.challenge_rule == ChallengeRule::Void {
            return Err(error::GameError::ChallengeNotPermitted(
                "challenges are not valid in void".into(),
            ));
        }
        if last.words_formed.is_empty() {
            return Err(error::GameError::ChallengeNotPermitted(
                "there are no words to challenge".into(),
            ));
        }
        let challenger = doc.player_on_turn;
        // a challenge spends time but earns no increment.
        doc.timers.calculate_and_set(self.now(), challenger, challenger, false);

        let play_legal = invalid_words(&res.dawg, &last.words_formed, doc.variant)?.is_empty();
        let challengee = last.player_index;
        let cumulative_before = last.cumulative;
        let off_board = GameEvent {
            lost_score: last.score,
            cumulative: cumulative_before - last.score,
            rack: last.rack.clone(),
            played_tiles: last.played_tiles.clone(),
            millis_remaining: tr,
            ..GameEvent::new(EventType::PhonyTilesReturned, challengee)
        };

        if doc.challenge_rule == ChallengeRule::Triple {
            let winner = if play_legal {
                challengee
            } else {
                doc.events.push(off_board);
                unplay_last_move(doc, &res.dist, rng)?;
                challenger
            };
            doc.winner = Some(winner);
            doc.play_state = PlayState::GameOver;
            doc.end_reason = GameEndReason::TripleChallenge;
        } else if !play_legal {
            log::debug!("successful challenge");
            doc.events.push(off_board);
            unplay_last_move(doc, &res.dist, rng)?;
            if doc.scoreless_turns == game_config::NUM_ZEROS_TO_END {
                handle_consecutive_scoreless_turns(doc, &res.dist);
            }
        } else {
            log::debug!("unsuccessful challenge");
            if doc.challenge_rule == ChallengeRule::Double {
                let turn_loss = GameEvent {
                    rack: doc.racks[challenger].clone(),
                    ..GameEvent::new(EventType::UnsuccessfulChallengeTurnLoss, challenger)
                };
                self.play_move(doc, turn_loss, tr, res, rng)?;
            } else if let Some(bonus) = doc.challenge_rule.bonus() {
                let evt = GameEvent {
                    rack: doc.racks[challengee].clone(),
                    bonus,
                    cumulative: cumulative_before + bonus,
                    millis_remaining: tr,
                    ..GameEvent::new(EventType::ChallengeBonus, challengee)
                };
                log::debug!("adding bonus score evt {evt:?}");
                doc.events.push(evt);
                doc.current_scores[challengee] += bonus;
            }
            if doc.play_state == PlayState::WaitingForFinalPass {
                doc.play_state = PlayState::GameOver;
                doc.end_reason = GameEndReason::Standard;
                end_rack_calcs(doc, &res.dist, challengee);
                add_winner(doc);
            }
        }
        Ok(())
    }

    pub fn to_cgp(&self, doc: &GameDocument) -> error::Returns<String> {
        let dist = self.doc_distribution(doc)?;
        let alphabet = dist.alphabet();
        let n = doc.num_players();
        let in_turn_order = (0..n).map(|i| (doc.player_on_turn + i) % n).collect::<Vec<_>>();
        let racks = in_turn_order
            .iter()
            .map(|&p| alphabet.fmt_rack(&doc.racks[p]))
            .collect::<Vec<_>>()
            .join("/");
        let scores = in_turn_order
            .iter()
            .map(|&p| doc.current_scores[p].to_string())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{} {racks} {scores} {} lex {}; ld {};",
            doc.board.to_fen(alphabet),
            doc.scoreless_turns,
            doc.lexicon,
            doc.letter_distribution
        ))
    }
}

fn play_tile_placement_move(
    doc: &mut GameDocument,
    gevt: &GameEvent,
    tr: i64,
    res: &Resources,
    rng: &mut dyn RngCore,
) -> error::Returns<()> {
    let Some(pos) = gevt.position else {
        return_error!("placement has no position".into());
    };
    let tiles = alphabet::decode(&gevt.played_tiles);
    doc.board.error_if_illegal_play(&pos, &tiles)?;
    let words_formed = doc.board.formed_words(&pos, &tiles)?;
    if doc.challenge_rule == ChallengeRule::Void {
        let illegal = invalid_words(&res.dawg, &words_formed, doc.variant)?;
        if !illegal.is_empty() {
            return Err(invalid_words_error(res.dist.alphabet(), illegal));
        }
    }
    let player = doc.player_on_turn;
    let leave = inventory::leave(&doc.racks[player], &gevt.played_tiles, true)?;
    let score = doc.board.score(
        &res.layout,
        &res.dist,
        &pos,
        &tiles,
        game_config::RACK_SIZE,
        game_config::BINGO_BONUS,
    )?;
    let tiles_played = tiles.iter().filter(|&&t| t != Tile::Zero).count();

    let mut txn = MoveTransaction::begin(doc);
    txn.place(&pos, &tiles, player, leave.clone())?;
    txn.draw(&res.dist, rng, player, tiles_played)?;
    txn.commit(doc);

    // a placement is never a scoreless turn, even for zero points.
    doc.scoreless_turns = 0;
    doc.current_scores[player] += score;
    doc.events.push(GameEvent {
        score,
        is_bingo: tiles_played == game_config::RACK_SIZE,
        millis_remaining: tr,
        leave,
        words_formed,
        ..event_from_move(doc, gevt)
    });

    if doc.racks[player].is_empty() {
        if doc.challenge_rule != ChallengeRule::Void {
            doc.play_state = PlayState::WaitingForFinalPass;
        } else {
            doc.play_state = PlayState::GameOver;
            doc.end_reason = GameEndReason::Standard;
            end_rack_calcs(doc, &res.dist, player);
            add_winner(doc);
        }
    }
    Ok(())
}
