//! Scripted input timelines replayed by the headless simulation.
//!
//! ```toml
//! [[event]]
//! at = 0.0
//! kind = "move"
//! y = 1.0
//!
//! [[event]]
//! at = 1.5
//! kind = "jump"
//! ```

use nalgebra::Vector2;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::input::InputBus;
use crate::locomotion::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Move,
    Look,
    Jump,
    SprintStart,
    SprintStop,
    CrouchStart,
    CrouchStop,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptEvent {
    /// Seconds since the start of the run.
    pub at: f32,
    pub kind: ScriptKind,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl ScriptEvent {
    fn apply(&self, bus: &mut InputBus) {
        let discrete = match self.kind {
            ScriptKind::Move => {
                bus.set_move(Vector2::new(self.x, self.y));
                return;
            }
            ScriptKind::Look => {
                bus.set_look(Vector2::new(self.x, self.y));
                return;
            }
            ScriptKind::Jump => InputEvent::Jump,
            ScriptKind::SprintStart => InputEvent::SprintStarted,
            ScriptKind::SprintStop => InputEvent::SprintStopped,
            ScriptKind::CrouchStart => InputEvent::CrouchStarted,
            ScriptKind::CrouchStop => InputEvent::CrouchStopped,
        };
        bus.emit(discrete);
    }
}

/// Time-ordered list of input events.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputScript {
    #[serde(default, rename = "event")]
    events: Vec<ScriptEvent>,
}

impl InputScript {
    pub fn new(mut events: Vec<ScriptEvent>) -> Result<Self, ScriptError> {
        for (index, event) in events.iter().enumerate() {
            if !event.at.is_finite() || event.at < 0.0 {
                return Err(ScriptError::InvalidTime { index, at: event.at });
            }
        }
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(Self { events })
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path.to_path_buf())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        Self::parse(content, PathBuf::from("<inline>"))
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, ScriptError> {
        let raw: InputScript =
            toml::from_str(content).map_err(|source| ScriptError::Parse { path, source })?;
        Self::new(raw.events)
    }

    /// Walk forward, sprint, try a double jump, stop sprinting and glance right.
    pub fn demo() -> Self {
        let event = |at: f32, kind: ScriptKind, x: f32, y: f32| ScriptEvent { at, kind, x, y };
        Self {
            events: vec![
                event(0.0, ScriptKind::Move, 0.0, 1.0),
                event(1.0, ScriptKind::SprintStart, 0.0, 0.0),
                event(1.5, ScriptKind::Jump, 0.0, 0.0),
                event(1.6, ScriptKind::Jump, 0.0, 0.0),
                event(3.0, ScriptKind::SprintStop, 0.0, 0.0),
                event(3.0, ScriptKind::Look, 4.0, 0.0),
                event(3.5, ScriptKind::Look, 0.0, 0.0),
                event(4.0, ScriptKind::Move, 0.0, 0.0),
            ],
        }
    }

    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Replays an [`InputScript`] against an [`InputBus`] as time advances.
#[derive(Debug, Clone)]
pub struct ScriptPlayer {
    script: InputScript,
    cursor: usize,
}

impl ScriptPlayer {
    pub fn new(script: InputScript) -> Self {
        Self { script, cursor: 0 }
    }

    /// Apply every not-yet-played event with `at <= elapsed`. Returns how many were applied.
    pub fn advance(&mut self, elapsed: f32, bus: &mut InputBus) -> usize {
        let start = self.cursor;
        while let Some(event) = self.script.events.get(self.cursor) {
            if event.at > elapsed {
                break;
            }
            event.apply(bus);
            self.cursor += 1;
        }
        self.cursor - start
    }

    pub fn finished(&self) -> bool {
        self.cursor >= self.script.events.len()
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("event {index} has invalid time {at}")]
    InvalidTime { index: usize, at: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::InputSource;

    #[test]
    fn test_parse_and_sort() {
        let toml = r#"
            [[event]]
            at = 2.0
            kind = "jump"

            [[event]]
            at = 0.5
            kind = "move"
            x = 1.0
        "#;
        let script = InputScript::from_toml_str(toml).unwrap();
        assert_eq!(script.events().len(), 2);
        assert_eq!(script.events()[0].kind, ScriptKind::Move);
        assert_eq!(script.events()[0].x, 1.0);
        assert_eq!(script.events()[0].y, 0.0);
        assert_eq!(script.events()[1].kind, ScriptKind::Jump);
    }

    #[test]
    fn test_empty_script() {
        let script = InputScript::from_toml_str("").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_rejects_negative_time() {
        let toml = r#"
            [[event]]
            at = -1.0
            kind = "jump"
        "#;
        let err = InputScript::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidTime { index: 0, .. }));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let toml = r#"
            [[event]]
            at = 0.0
            kind = "teleport"
        "#;
        assert!(matches!(
            InputScript::from_toml_str(toml),
            Err(ScriptError::Parse { .. })
        ));
    }

    #[test]
    fn test_player_applies_events_once() {
        let mut bus = InputBus::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        bus.subscribe(tx);

        let mut player = ScriptPlayer::new(InputScript::demo());
        assert_eq!(player.advance(0.0, &mut bus), 1);
        assert_eq!(bus.move_vector(), Vector2::new(0.0, 1.0));

        assert_eq!(player.advance(1.55, &mut bus), 2);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![InputEvent::SprintStarted, InputEvent::Jump]);

        assert_eq!(player.advance(1.55, &mut bus), 0);
        assert!(!player.finished());
        player.advance(10.0, &mut bus);
        assert!(player.finished());
    }
}
