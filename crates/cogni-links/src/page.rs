use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A stable, opaque pagination cursor. Encodes nothing more than the row
/// offset for the caller's filter; callers must not parse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub offset: u32,
}

impl Cursor {
    pub fn encode(&self) -> String {
        STANDARD.encode(self.offset.to_string())
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let bytes = STANDARD.decode(raw).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let offset = text.parse().ok()?;
        Some(Self { offset })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let cursor = Cursor { offset: 42 };
        let encoded = cursor.encode();
        assert_eq!(Cursor::decode(&encoded), Some(cursor));
    }

    #[test]
    fn garbage_cursor_fails_to_decode() {
        assert_eq!(Cursor::decode("not-valid-base64!!"), None);
    }
}
