use crossterm::event::KeyCode;

/// Keys the gameplay core reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Down,
    RotateLeft,
    RotateRight,
}

impl Key {
    pub const ALL: [Key; 5] = [
        Key::Left,
        Key::Right,
        Key::Down,
        Key::RotateLeft,
        Key::RotateRight,
    ];

    pub fn index(self) -> usize {
        match self {
            Key::Left => 0,
            Key::Right => 1,
            Key::Down => 2,
            Key::RotateLeft => 3,
            Key::RotateRight => 4,
        }
    }

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left => Some(Key::Left),
            KeyCode::Right => Some(Key::Right),
            KeyCode::Down => Some(Key::Down),
            KeyCode::Char('z') | KeyCode::Char('Z') => Some(Key::RotateLeft),
            KeyCode::Char('x') | KeyCode::Char('X') => Some(Key::RotateRight),
            _ => None,
        }
    }
}

/// Anything that can answer "is this key held right now".
pub trait InputSource {
    fn is_held(&self, key: Key) -> bool;
}

/// Plain held/not-held snapshot of every [`Key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    held: [bool; 5],
}

impl HeldKeys {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(keys: &[Key]) -> Self {
        let mut held = Self::default();
        for &key in keys {
            held.set(key, true);
        }
        held
    }

    pub fn set(&mut self, key: Key, held: bool) {
        self.held[key.index()] = held;
    }
}

impl InputSource for HeldKeys {
    fn is_held(&self, key: Key) -> bool {
        self.held[key.index()]
    }
}
