use std::{fs, io, path::Path};

use log::warn;
use thiserror::Error;

use crate::floor::Direction;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read input script: {0}")]
    Io(#[from] io::Error),
    #[error("unknown key '{key}' on line {line}")]
    UnknownKey { key: char, line: usize },
}

/// What one keypress asks the game to do. Live keys and scripted keys both
/// end up here; selling is only reachable from the live keyboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Interact,
    UseItem(usize),
    Sell(usize),
    Reroll,
    Leave,
    Restart,
    Quit,
}

pub struct ScriptedInput {
    intents: Vec<Intent>,
    cursor: usize,
}

impl ScriptedInput {
    /// Parses a script: one or more keys per line, blank lines and `#` comments
    /// skipped. With `strict` unknown keys are an error, otherwise they are logged
    /// and dropped.
    pub fn parse(text: &str, strict: bool) -> Result<Self, ScriptError> {
        let mut intents = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            for key in trimmed.chars().filter(|c| !c.is_whitespace()) {
                match intent_for_char(key) {
                    Some(intent) => intents.push(intent),
                    None if strict => {
                        return Err(ScriptError::UnknownKey {
                            key,
                            line: line_no + 1,
                        });
                    }
                    None => warn!("unknown key in script: {key:?}"),
                }
            }
        }
        Ok(Self { intents, cursor: 0 })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, false)
    }

    pub fn next_intent(&mut self) -> Option<Intent> {
        let intent = self.intents.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(intent)
    }

    pub fn remaining(&self) -> usize {
        self.intents.len() - self.cursor
    }
}

pub fn intent_for_char(c: char) -> Option<Intent> {
    let intent = match c.to_ascii_lowercase() {
        'w' | 'k' => Intent::Move(Direction::North),
        's' | 'j' => Intent::Move(Direction::South),
        'a' | 'h' => Intent::Move(Direction::West),
        'd' | 'l' => Intent::Move(Direction::East),
        'y' => Intent::Move(Direction::NorthWest),
        'u' => Intent::Move(Direction::NorthEast),
        'b' => Intent::Move(Direction::SouthWest),
        'n' => Intent::Move(Direction::SouthEast),
        'e' | 'g' => Intent::Interact,
        'r' => Intent::Reroll,
        'x' => Intent::Leave,
        'z' => Intent::Restart,
        'q' | '\x1B' => Intent::Quit,
        digit @ '1'..='9' => Intent::UseItem(digit as usize - '1' as usize),
        _ => return None,
    };
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut script = ScriptedInput::parse("# opening\n\nwd\n  e 1\n", true).unwrap();
        assert_eq!(script.remaining(), 4);
        assert_eq!(script.next_intent(), Some(Intent::Move(Direction::North)));
        assert_eq!(script.next_intent(), Some(Intent::Move(Direction::East)));
        assert_eq!(script.next_intent(), Some(Intent::Interact));
        assert_eq!(script.next_intent(), Some(Intent::UseItem(0)));
        assert_eq!(script.next_intent(), None);
    }

    #[test]
    fn vi_keys_and_diagonals() {
        assert_eq!(intent_for_char('H'), Some(Intent::Move(Direction::West)));
        assert_eq!(intent_for_char('u'), Some(Intent::Move(Direction::NorthEast)));
        assert_eq!(intent_for_char('9'), Some(Intent::UseItem(8)));
        assert_eq!(intent_for_char('0'), None);
    }

    #[test]
    fn strict_parsing_reports_the_line() {
        match ScriptedInput::parse("ww\nw?w", true) {
            Err(ScriptError::UnknownKey { key, line }) => {
                assert_eq!(key, '?');
                assert_eq!(line, 2);
            }
            other => panic!("expected an unknown key error, got {:?}", other.err()),
        }
        let lenient = ScriptedInput::parse("w?w", false).unwrap();
        assert_eq!(lenient.remaining(), 2);
    }
}
