// Copyright (C) 2020-2024 Andy Kurnia.

use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond timestamps for the clocks.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_ms(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as i64)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FakeClock(AtomicI64);

impl FakeClock {
    pub fn new(now_ms: i64) -> Self {
        Self(AtomicI64::new(now_ms))
    }

    pub fn sleep(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-player clocks. Only the player on turn has a running clock; the
/// stored value for them is as of `time_of_last_update`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GameTimers {
    pub time_remaining: Vec<i64>,
    // empty when the game has no time bank.
    pub time_bank: Vec<i64>,
    pub increment_seconds: u32,
    pub reset_to_increment_after_turn: bool,
    pub max_overtime_minutes: u32,
    pub time_of_last_update: i64,
    pub time_started: i64,
    pub started: bool,
    pub untimed: bool,
}

impl GameTimers {
    pub fn new(
        seconds_per_player: &[u32],
        increment_seconds: u32,
        reset_to_increment_after_turn: bool,
        max_overtime_minutes: u32,
        time_bank_ms: Option<i64>,
        untimed: bool,
    ) -> Self {
        Self {
            time_remaining: seconds_per_player.iter().map(|&s| s as i64 * 1000).collect(),
            time_bank: time_bank_ms.map_or_else(Vec::new, |ms| vec![ms; seconds_per_player.len()]),
            increment_seconds,
            reset_to_increment_after_turn,
            max_overtime_minutes,
            time_of_last_update: 0,
            time_started: 0,
            started: false,
            untimed,
        }
    }

    #[inline(always)]
    pub fn max_overtime_ms(&self) -> i64 {
        self.max_overtime_minutes as i64 * 60000
    }

    #[inline(always)]
    fn bank(&self, player: usize) -> Option<i64> {
        self.time_bank.get(player).copied()
    }

    // main time as if charged at `now`, before any bank.
    #[inline(always)]
    fn raw_remaining(&self, now: i64, player: usize) -> i64 {
        self.time_remaining.get(player).copied().unwrap_or(0) - (now - self.time_of_last_update)
    }

    /// Remaining time as of `now`, with any deficit drawn from the bank and
    /// the overtime floor applied. Untimed games always report 0.
    pub fn time_remaining(&self, now: i64, on_turn: usize, player: usize) -> i64 {
        if self.untimed {
            return 0;
        }
        if on_turn != player {
            return self.time_remaining.get(player).copied().unwrap_or(0);
        }
        let mut tr = self.raw_remaining(now, player);
        if tr < 0 {
            if let Some(bank) = self.bank(player) {
                tr = (tr + bank).min(0);
            }
        }
        tr.max(-self.max_overtime_ms())
    }

    /// True once main time, bank and overtime are all used up.
    pub fn time_ran_out(&self, now: i64, on_turn: usize, player: usize) -> bool {
        if self.untimed || on_turn != player {
            return false;
        }
        let tr = self.raw_remaining(now, player);
        if tr < 0 {
            if let Some(bank) = self.bank(player) {
                return tr + bank < 0;
            }
        }
        tr < -self.max_overtime_ms()
    }

    /// Charges the player on turn for the time since the last update.
    pub fn calculate_and_set(
        &mut self,
        now: i64,
        on_turn: usize,
        player: usize,
        apply_increment: bool,
    ) {
        if on_turn != player || self.untimed || player >= self.time_remaining.len() {
            return;
        }
        if apply_increment && self.reset_to_increment_after_turn {
            self.time_remaining[player] = self.increment_seconds as i64 * 1000;
            self.time_of_last_update = now;
            return;
        }
        let mut tr = self.time_remaining[player] - (now - self.time_of_last_update);
        if apply_increment {
            tr += self.increment_seconds as i64 * 1000;
        }
        if tr < 0 {
            if let Some(bank) = self.time_bank.get_mut(player) {
                let deficit = -tr;
                if *bank >= deficit {
                    *bank -= deficit;
                    tr = 0;
                } else {
                    tr = -(deficit - *bank);
                    *bank = 0;
                }
            }
        }
        let floor = -self.max_overtime_ms();
        if tr < floor {
            log::debug!("capping remaining time {tr} to {floor}");
            tr = floor;
        }
        self.time_remaining[player] = tr;
        self.time_of_last_update = now;
    }

    pub fn reset_and_start(&mut self, now: i64) {
        self.time_of_last_update = now;
        self.time_started = now;
        self.started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timers() -> GameTimers {
        let mut t = GameTimers::new(&[300, 300], 0, false, 1, None, false);
        t.reset_and_start(1000);
        t
    }

    #[test]
    fn only_the_player_on_turn_runs() {
        let t = timers();
        assert_eq!(t.time_remaining(11000, 0, 0), 290000);
        assert_eq!(t.time_remaining(11000, 0, 1), 300000);
        assert!(!t.time_ran_out(1_000_000, 1, 0));
    }

    #[test]
    fn overtime_is_capped() {
        let mut t = timers();
        let far = 1000 + 300000 + 10 * 60000;
        assert_eq!(t.time_remaining(far, 0, 0), -60000);
        assert!(t.time_ran_out(far, 0, 0));
        assert!(!t.time_ran_out(1000 + 300000 + 59999, 0, 0));
        t.calculate_and_set(far, 0, 0, true);
        assert_eq!(t.time_remaining[0], -60000);
        assert_eq!(t.time_of_last_update, far);
    }

    #[test]
    fn increments() {
        let mut t = timers();
        t.increment_seconds = 5;
        t.calculate_and_set(11000, 0, 0, true);
        assert_eq!(t.time_remaining[0], 295000);
        // not on turn: nothing moves
        t.calculate_and_set(21000, 0, 1, true);
        assert_eq!(t.time_remaining[1], 300000);
        t.reset_to_increment_after_turn = true;
        t.calculate_and_set(21000, 0, 0, true);
        assert_eq!(t.time_remaining[0], 5000);
        t.calculate_and_set(22000, 0, 0, false);
        assert_eq!(t.time_remaining[0], 4000);
    }

    #[test]
    fn bank_covers_deficit_first() {
        let mut t = GameTimers::new(&[10, 10], 0, false, 1, Some(20000), false);
        t.reset_and_start(0);
        // 15s used: 5s from the bank
        assert_eq!(t.time_remaining(15000, 0, 0), 0);
        assert!(!t.time_ran_out(15000, 0, 0));
        // 31s used: bank gone, 1s into overtime
        assert!(t.time_ran_out(31000, 0, 0));
        assert_eq!(t.time_remaining(31000, 0, 0), -1000);
        t.calculate_and_set(15000, 0, 0, false);
        assert_eq!((t.time_remaining[0], t.time_bank[0]), (0, 15000));
        t.calculate_and_set(35000, 0, 0, false);
        assert_eq!((t.time_remaining[0], t.time_bank[0]), (-5000, 0));
    }

    #[test]
    fn untimed_never_runs_out() {
        let mut t = GameTimers::new(&[0, 0], 0, false, 0, None, true);
        t.reset_and_start(0);
        assert_eq!(t.time_remaining(1_000_000, 0, 0), 0);
        assert!(!t.time_ran_out(1_000_000, 0, 0));
    }

    #[test]
    fn fake_clock_sleeps() {
        let clock = FakeClock::new(100);
        clock.sleep(50);
        assert_eq!(clock.now_ms(), 150);
        clock.set(7);
        assert_eq!(clock.now_ms(), 7);
        assert!(WallClock.now_ms() > 0);
    }
}
