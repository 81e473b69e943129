use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{GameConfig, Rules};
use crate::constants::MAX_LEVEL;
use crate::error::GameError;
use crate::game::board::Board;
use crate::game::catalog::PieceCatalog;
use crate::game::piece::Piece;
use crate::game::speed::{soft_drop_interval, EntryDelays};
use crate::input::{InputSource, Key};

/// Either a piece is falling, or the next one is waiting for its entry delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Falling(Piece),
    EntryDelay { spawn_at: Instant },
}

/// Clock and edge-detection state carried from one update to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingState {
    pub last_frame: Instant,
    pub last_gravity: Instant,
    /// DAS accumulator.
    pub das: Duration,
    /// Left or right was held on the previous update.
    pub horizontal_held: bool,
    pub rotate_left_held: bool,
    pub rotate_right_held: bool,
}

impl TimingState {
    fn new(now: Instant) -> Self {
        Self {
            last_frame: now,
            last_gravity: now,
            das: Duration::ZERO,
            horizontal_held: false,
            rotate_left_held: false,
            rotate_right_held: false,
        }
    }
}

/// What a single [`Game::update`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub spawned: bool,
    /// Gravity moved the piece down a row.
    pub dropped: bool,
    /// The piece locked; holds the entry delay before the next spawn.
    pub locked: Option<Duration>,
    /// Accepted horizontal move.
    pub shifted: Option<i32>,
    pub rotated_left: bool,
    pub rotated_right: bool,
}

#[derive(Debug)]
pub struct Game {
    pub board: Board,
    pub phase: Phase,
    pub next_piece: Piece,
    level: i32,
    gravity_interval: Duration,
    entry_delays: EntryDelays,
    rules: Rules,
    timing: TimingState,
    catalog: PieceCatalog,
    rng: StdRng,
}

impl Game {
    /// Starts a session whose first piece spawns on the first update at or after `now`.
    pub fn new(config: GameConfig, catalog: PieceCatalog, now: Instant) -> Result<Self, GameError> {
        let GameConfig { level, seed, rules } = config;
        rules.validate()?;

        let clamped = level.clamp(0, MAX_LEVEL);
        if clamped != level {
            warn!(requested = level, level = clamped, "level out of range, clamping");
        }
        let gravity_interval = rules.speed_curve()?.gravity_interval(clamped);
        let entry_delays = rules.entry_delay_table()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let next_piece = Piece::new(catalog.pick(&mut rng));

        info!(
            level = clamped,
            gravity_ms = gravity_interval.as_secs_f64() * 1000.0,
            pieces = catalog.len(),
            "game session created"
        );

        Ok(Self {
            board: Board::new(),
            phase: Phase::EntryDelay { spawn_at: now },
            next_piece,
            level: clamped,
            gravity_interval,
            entry_delays,
            rules,
            timing: TimingState::new(now),
            catalog,
            rng,
        })
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Gravity interval resolved from the level at construction.
    pub fn gravity_interval(&self) -> Duration {
        self.gravity_interval
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn timing(&self) -> &TimingState {
        &self.timing
    }

    pub fn active_piece(&self) -> Option<&Piece> {
        match &self.phase {
            Phase::Falling(piece) => Some(piece),
            Phase::EntryDelay { .. } => None,
        }
    }

    pub fn spawn_at(&self) -> Option<Instant> {
        match self.phase {
            Phase::Falling(_) => None,
            Phase::EntryDelay { spawn_at } => Some(spawn_at),
        }
    }

    /// Inside the board and not overlapping locked cells.
    pub fn is_valid(&self, piece: &Piece) -> bool {
        fits(&self.board, piece)
    }

    /// Advances the game to `now` with the keys currently held.
    ///
    /// Order matters: spawn, gravity, horizontal movement, rotation, then the
    /// edge flags for the next call. Rejected moves are reverted in place.
    pub fn update<I: InputSource + ?Sized>(&mut self, input: &I, now: Instant) -> TickEvents {
        let mut events = TickEvents::default();
        let left = input.is_held(Key::Left);
        let right = input.is_held(Key::Right);
        let down = input.is_held(Key::Down);
        let rotate_left = input.is_held(Key::RotateLeft);
        let rotate_right = input.is_held(Key::RotateRight);

        if let Phase::EntryDelay { spawn_at } = self.phase {
            if now >= spawn_at {
                self.spawn(now);
                events.spawned = true;
            }
        }

        let interval = if down {
            soft_drop_interval(self.gravity_interval, self.rules.soft_drop_floor())
        } else {
            self.gravity_interval
        };
        if matches!(self.phase, Phase::Falling(_))
            && now.saturating_duration_since(self.timing.last_gravity) >= interval
        {
            self.apply_gravity(now, &mut events);
            self.timing.last_gravity = now;
        }

        if left != right && !down {
            let delta = now.saturating_duration_since(self.timing.last_frame);
            self.shift(if left { -1 } else { 1 }, delta, &mut events);
        }

        if let Phase::Falling(piece) = &mut self.phase {
            if rotate_left && !self.timing.rotate_left_held {
                piece.rotate_left();
                if fits(&self.board, piece) {
                    events.rotated_left = true;
                } else {
                    piece.rotate_right();
                }
            }
            if rotate_right && !self.timing.rotate_right_held {
                piece.rotate_right();
                if fits(&self.board, piece) {
                    events.rotated_right = true;
                } else {
                    piece.rotate_left();
                }
            }
        }

        self.timing.horizontal_held = left || right;
        self.timing.rotate_left_held = rotate_left;
        self.timing.rotate_right_held = rotate_right;
        self.timing.last_frame = now;
        events
    }

    fn spawn(&mut self, now: Instant) {
        let next = Piece::new(self.catalog.pick(&mut self.rng));
        let piece = std::mem::replace(&mut self.next_piece, next);
        debug!(piece = %piece.name, next = %self.next_piece.name, "piece spawned");
        self.phase = Phase::Falling(piece);
        self.timing.last_gravity = now;
    }

    fn apply_gravity(&mut self, now: Instant, events: &mut TickEvents) {
        let landed = match &mut self.phase {
            Phase::Falling(piece) => {
                piece.move_by(0, 1);
                if fits(&self.board, piece) {
                    events.dropped = true;
                    false
                } else {
                    piece.move_by(0, -1);
                    true
                }
            }
            Phase::EntryDelay { .. } => false,
        };
        if landed {
            self.lock(now, events);
        }
    }

    fn lock(&mut self, now: Instant, events: &mut TickEvents) {
        let placeholder = Phase::EntryDelay { spawn_at: now };
        if let Phase::Falling(piece) = std::mem::replace(&mut self.phase, placeholder) {
            let bottom_row = piece.bottom_row();
            let delay = self.entry_delays.delay_for(bottom_row);
            debug!(
                piece = %piece.name,
                bottom_row,
                entry_delay_ms = delay.as_secs_f64() * 1000.0,
                "piece locked"
            );
            self.board.add_piece(piece);
            self.phase = Phase::EntryDelay { spawn_at: now + delay };
            events.locked = Some(delay);
        }
    }

    /// Delayed auto shift: a fresh press moves at once, a held key moves each
    /// time the accumulator reaches the charge value.
    fn shift(&mut self, dx: i32, delta: Duration, events: &mut TickEvents) {
        let charge = self.rules.das_charge();
        let charged = self.rules.das_charged();
        let Phase::Falling(piece) = &mut self.phase else {
            return;
        };

        self.timing.das += delta;
        let should_move = if !self.timing.horizontal_held {
            self.timing.das = Duration::ZERO;
            true
        } else if self.timing.das >= charge {
            self.timing.das = charged;
            true
        } else {
            false
        };

        if should_move {
            piece.move_by(dx, 0);
            if fits(&self.board, piece) {
                events.shifted = Some(dx);
            } else {
                piece.move_by(-dx, 0);
                // Stay charged against the wall.
                self.timing.das = charge;
            }
        }
    }
}

fn fits(board: &Board, piece: &Piece) -> bool {
    !piece.out_of_bounds(board.width(), board.height()) && board.is_valid(piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::frames;
    use crate::game::board::Cell;
    use crate::game::catalog::PieceDescriptor;
    use crate::input::HeldKeys;

    fn o_catalog() -> PieceCatalog {
        PieceCatalog::new(vec![PieceDescriptor::parse("O", 2, &["XX", "XX"]).unwrap()]).unwrap()
    }

    fn game_at(level: i32, now: Instant) -> Game {
        let config = GameConfig {
            level,
            seed: Some(42),
            rules: Rules::default(),
        };
        Game::new(config, o_catalog(), now).unwrap()
    }

    #[test]
    fn test_starts_waiting_for_first_spawn() {
        let t0 = Instant::now();
        let game = game_at(0, t0);
        assert_eq!(game.spawn_at(), Some(t0));
        assert!(game.active_piece().is_none());
        assert_eq!(game.next_piece.name, "O");
    }

    #[test]
    fn test_first_update_spawns() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        let events = game.update(&HeldKeys::none(), t0);
        assert!(events.spawned);
        assert!(!events.dropped);
        let piece = game.active_piece().unwrap();
        assert_eq!((piece.x, piece.y), (4, 0));
        assert_eq!(game.timing().last_gravity, t0);
    }

    #[test]
    fn test_level_is_clamped_at_construction() {
        let t0 = Instant::now();
        assert_eq!(game_at(-3, t0).level(), 0);
        assert_eq!(game_at(40, t0).level(), 29);
        assert_eq!(game_at(40, t0).gravity_interval(), frames(1));
        assert_eq!(game_at(0, t0).gravity_interval(), frames(48));
    }

    #[test]
    fn test_gravity_waits_full_interval() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        game.update(&HeldKeys::none(), t0);

        let events = game.update(&HeldKeys::none(), t0 + frames(47));
        assert!(!events.dropped);
        assert_eq!(game.active_piece().unwrap().y, 0);

        let events = game.update(&HeldKeys::none(), t0 + frames(48));
        assert!(events.dropped);
        assert_eq!(game.active_piece().unwrap().y, 1);
        assert_eq!(game.timing().last_gravity, t0 + frames(48));
    }

    #[test]
    fn test_soft_drop_uses_floor() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        let down = HeldKeys::with(&[Key::Down]);
        game.update(&down, t0);

        assert!(!game.update(&down, t0 + frames(7)).dropped);
        assert!(game.update(&down, t0 + frames(8)).dropped);
        assert!(game.update(&down, t0 + frames(16)).dropped);
        assert_eq!(game.active_piece().unwrap().y, 2);
    }

    #[test]
    fn test_lock_schedules_entry_delay() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        game.update(&HeldKeys::none(), t0);
        if let Phase::Falling(piece) = &mut game.phase {
            piece.move_by(0, 18);
        }

        let lock_time = t0 + frames(48);
        let events = game.update(&HeldKeys::none(), lock_time);
        assert_eq!(events.locked, Some(frames(10)));
        assert_eq!(game.spawn_at(), Some(lock_time + frames(10)));
        assert_eq!(game.board.get(4, 19), Some(Cell::Filled(2)));
        assert_eq!(game.board.get(5, 18), Some(Cell::Filled(2)));

        assert!(!game.update(&HeldKeys::none(), lock_time + frames(9)).spawned);
        assert!(game.active_piece().is_none());
        assert!(game.update(&HeldKeys::none(), lock_time + frames(10)).spawned);
        assert_eq!(game.timing().last_gravity, lock_time + frames(10));
    }

    #[test]
    fn test_no_input_reaches_piece_during_entry_delay() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        game.phase = Phase::EntryDelay { spawn_at: t0 + frames(100) };
        let keys = HeldKeys::with(&[Key::Left, Key::RotateLeft, Key::RotateRight]);

        let events = game.update(&keys, t0 + frames(1));
        assert_eq!(events, TickEvents::default());
        assert_eq!(game.timing().das, Duration::ZERO);
        assert!(game.timing().horizontal_held);
        assert!(game.timing().rotate_left_held);
    }

    #[test]
    fn test_both_horizontal_keys_cancel() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        game.update(&HeldKeys::none(), t0);
        let events = game.update(&HeldKeys::with(&[Key::Left, Key::Right]), t0 + frames(1));
        assert_eq!(events.shifted, None);
        assert_eq!(game.active_piece().unwrap().x, 4);
        assert!(game.timing().horizontal_held);
    }

    #[test]
    fn test_down_blocks_horizontal_movement() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        game.update(&HeldKeys::none(), t0);
        let events = game.update(&HeldKeys::with(&[Key::Right, Key::Down]), t0 + frames(1));
        assert_eq!(events.shifted, None);
        assert_eq!(game.active_piece().unwrap().x, 4);
    }

    #[test]
    fn test_is_valid_combines_bounds_and_occupancy() {
        let t0 = Instant::now();
        let mut game = game_at(0, t0);
        let mut piece = game.next_piece.clone();
        assert!(game.is_valid(&piece));

        piece.move_by(0, 19);
        assert!(!game.is_valid(&piece));
        piece.move_by(0, -19);

        game.board.set(4, 1, Cell::Filled(0));
        assert!(!game.is_valid(&piece));
    }
}
