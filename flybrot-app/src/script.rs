//! Timed input events replayed against the engine in place of a live window.

use serde::{Deserialize, Serialize};

/// Mouse buttons as the original window reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Zoom in while held.
    Left,
    /// Halt on press.
    Middle,
    /// Zoom out while held.
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlightAction {
    Press { button: PointerButton },
    Release { button: PointerButton },
    Move { x: i32, y: i32 },
    Stop,
    Reset,
    Recolor,
    /// Add one unit of velocity.
    Faster,
    /// Remove one unit of velocity.
    Slower,
    Screenshot,
    Resize { width: u32, height: u32 },
    /// A keyboard shortcut, translated with [`FlightAction::from_key`].
    Key { key: char },
}

impl FlightAction {
    /// Keyboard shortcuts: `+`/`=` faster, `-` slower, space stop, enter
    /// reset, `c` recolor, `p` screenshot.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '=' | '+' => Some(Self::Faster),
            '-' => Some(Self::Slower),
            ' ' => Some(Self::Stop),
            '\r' | '\n' => Some(Self::Reset),
            'c' => Some(Self::Recolor),
            'p' => Some(Self::Screenshot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Milliseconds since the start of the run.
    pub at_ms: u64,
    pub action: FlightAction,
}

impl TimedEvent {
    pub fn new(at_ms: u64, action: FlightAction) -> Self {
        Self { at_ms, action }
    }
}

/// A script sorted by time, consumed as the simulated clock advances.
#[derive(Debug, Clone)]
pub struct Script {
    events: Vec<TimedEvent>,
    cursor: usize,
}

impl Script {
    pub fn new(mut events: Vec<TimedEvent>) -> Self {
        // Stable: events sharing a timestamp keep their written order.
        events.sort_by_key(|e| e.at_ms);
        Self { events, cursor: 0 }
    }

    /// Events due at or before `now_ms` that have not been returned yet.
    pub fn due(&mut self, now_ms: u64) -> &[TimedEvent] {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].at_ms <= now_ms {
            self.cursor += 1;
        }
        &self.events[start..self.cursor]
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Timestamp of the last event, or 0 for an empty script.
    pub fn last_at(&self) -> u64 {
        self.events.last().map_or(0, |e| e.at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_returns_events_in_time_order() {
        let mut script = Script::new(vec![
            TimedEvent::new(100, FlightAction::Stop),
            TimedEvent::new(0, FlightAction::Move { x: 1, y: 2 }),
            TimedEvent::new(50, FlightAction::Recolor),
            TimedEvent::new(50, FlightAction::Faster),
        ]);

        assert_eq!(script.due(0), &[TimedEvent::new(0, FlightAction::Move { x: 1, y: 2 })]);
        assert!(script.due(40).is_empty());
        assert_eq!(
            script.due(60),
            &[
                TimedEvent::new(50, FlightAction::Recolor),
                TimedEvent::new(50, FlightAction::Faster),
            ]
        );
        assert!(!script.is_finished());
        assert_eq!(script.due(1000).len(), 1);
        assert!(script.is_finished());
        assert_eq!(script.last_at(), 100);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(FlightAction::from_key('='), Some(FlightAction::Faster));
        assert_eq!(FlightAction::from_key('+'), Some(FlightAction::Faster));
        assert_eq!(FlightAction::from_key('-'), Some(FlightAction::Slower));
        assert_eq!(FlightAction::from_key(' '), Some(FlightAction::Stop));
        assert_eq!(FlightAction::from_key('\r'), Some(FlightAction::Reset));
        assert_eq!(FlightAction::from_key('c'), Some(FlightAction::Recolor));
        assert_eq!(FlightAction::from_key('p'), Some(FlightAction::Screenshot));
        assert_eq!(FlightAction::from_key('x'), None);
    }

    #[test]
    fn events_parse_from_json() {
        let json = r#"[
            {"at_ms": 0, "action": {"type": "move", "x": 250, "y": 220}},
            {"at_ms": 0, "action": {"type": "press", "button": "left"}},
            {"at_ms": 3000, "action": {"type": "release", "button": "left"}},
            {"at_ms": 3100, "action": {"type": "key", "key": "p"}}
        ]"#;
        let events: Vec<TimedEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[1].action,
            FlightAction::Press {
                button: PointerButton::Left
            }
        );
        assert_eq!(events[3].action, FlightAction::Key { key: 'p' });
    }
}
