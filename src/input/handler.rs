use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEventKind};

use crate::constants::KEY_TIMEOUT;
use crate::input::keys::{HeldKeys, InputSource, Key};

/// Held state for one key, plus when the terminal last reported it.
#[derive(Debug, Clone, Copy)]
struct KeyState {
    pressed: bool,
    last_update: Instant,
}

/// Terminal-backed [`InputSource`].
///
/// With keyboard enhancement the terminal reports releases and the held state
/// is exact. Without it a key is treated as released once no press or repeat
/// event has arrived for `KEY_TIMEOUT` milliseconds.
pub struct InputState {
    keys: [KeyState; 5],
    pub keyboard_enhancement_active: bool,
}

impl InputState {
    pub fn new(now: Instant) -> Self {
        Self {
            keys: [KeyState {
                pressed: false,
                last_update: now,
            }; 5],
            keyboard_enhancement_active: false,
        }
    }

    pub fn press(&mut self, key: Key, now: Instant) {
        let state = &mut self.keys[key.index()];
        state.pressed = true;
        state.last_update = now;
    }

    pub fn release(&mut self, key: Key, now: Instant) {
        let state = &mut self.keys[key.index()];
        state.pressed = false;
        state.last_update = now;
    }

    pub fn check_timeouts(&mut self, now: Instant) {
        if self.keyboard_enhancement_active {
            return;
        }
        let timeout = Duration::from_millis(KEY_TIMEOUT);
        for state in self.keys.iter_mut() {
            if state.pressed && now.duration_since(state.last_update) > timeout {
                state.pressed = false;
            }
        }
    }

    pub fn snapshot(&self) -> HeldKeys {
        let mut held = HeldKeys::none();
        for key in Key::ALL {
            held.set(key, self.is_held(key));
        }
        held
    }
}

impl InputSource for InputState {
    fn is_held(&self, key: Key) -> bool {
        self.keys[key.index()].pressed
    }
}

/// Feeds one terminal key event into `input`. Keys the game does not read are ignored.
pub fn handle_input(input: &mut InputState, code: KeyCode, kind: KeyEventKind, now: Instant) {
    let Some(key) = Key::from_key_code(code) else {
        return;
    };
    match kind {
        KeyEventKind::Press | KeyEventKind::Repeat => input.press(key, now),
        KeyEventKind::Release => input.release(key, now),
    }
}
