use std::time::Duration;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

// NTSC NES refresh rate (frames per second)
pub const FRAME_RATE: f64 = 60.0988;
// 1e9 / FRAME_RATE, truncated to whole nanoseconds
pub const FRAME_NANOS: u64 = 16_639_267;

pub const MAX_LEVEL: i32 = 29;

// DAS settings (in frames)
pub const DAS_CHARGE_FRAMES: u32 = 16; // Time to fully charge DAS
pub const DAS_CHARGED_FRAMES: u32 = 10; // DAS value after an auto-repeat
pub const SOFT_DROP_FLOOR_FRAMES: u32 = 8; // Slowest gravity while down is held

// Frames per row for each level threshold, ascending.
pub const CLASSIC_SPEED_TABLE: [(i32, u32); 15] = [
    (0, 48),
    (1, 43),
    (2, 38),
    (3, 33),
    (4, 28),
    (5, 23),
    (6, 18),
    (7, 13),
    (8, 8),
    (9, 6),
    (10, 5), // 10-12
    (13, 4), // 13-15
    (16, 3), // 16-18
    (19, 2), // 19-28
    (29, 1), // 29+
];

// Entry delay (in frames) keyed by the lowest row a locked piece occupies, descending.
pub const CLASSIC_ENTRY_DELAYS: [(i32, u32); 4] = [(18, 10), (14, 12), (10, 14), (6, 16)];
pub const ENTRY_DELAY_FALLBACK_FRAMES: u32 = 18;

pub const KEY_TIMEOUT: u64 = 100; // Timeout for key release detection fallback (milliseconds)
pub const FRAME_POLL: u64 = 16; // Input poll timeout per rendered frame (milliseconds)

/// Duration of `n` NES frames.
///
/// Every duration the game compares is built from this so that sums of
/// per-frame deltas line up exactly with the thresholds.
pub const fn frames(n: u32) -> Duration {
    Duration::from_nanos(FRAME_NANOS * n as u64)
}
