//! User input events and their sources.
//!
//! Front ends translate their native events (mouse clicks, button presses,
//! form submits) into [`InputEvent`]s. [`ScriptedInput`] replays events from
//! a small line-oriented script, which is how the headless binary drives the
//! editor.

use std::collections::VecDeque;

use thiserror::Error;

use crate::model::{DisplayPoint, ShapeType};

/// An editor-level input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer click, relative to the canvas origin
    Click(DisplayPoint),
    /// Switch between subject and composition mode
    ToggleMode,
    /// Remove the last point of the active set
    Undo,
    /// Empty the active set
    Clear,
    /// Explicit shape type choice
    SelectShapeType(ShapeType),
    /// Add a free-text label to the catalog
    AddLabel(String),
    /// Check or uncheck a label
    SetLabel(String, bool),
    /// Persist the current annotation
    Save,
    /// Drop the current image and start over
    NextImage,
}

/// Something that produces input events.
pub trait InputSource {
    /// Next pending event, or `None` when the source is exhausted.
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// Error in an input script.
#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

/// Input events parsed from a script.
///
/// One event per line; blank lines and lines starting with `#` are skipped.
///
/// ```text
/// click 100 100
/// mode
/// shape triangle
/// label add Sunset
/// label on Nacht
/// save
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    /// Wrap a list of events.
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Parse a whole script.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut events = VecDeque::new();
        for (index, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event = parse_line(line).map_err(|message| ScriptError {
                line: index + 1,
                message,
            })?;
            events.push_back(event);
        }
        Ok(Self { events })
    }

    /// Number of events left.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if all events have been consumed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

fn parse_line(line: &str) -> Result<InputEvent, String> {
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    match command {
        "click" => {
            let mut coords = rest.split_whitespace().map(str::parse::<f32>);
            match (coords.next(), coords.next(), coords.next()) {
                (Some(Ok(x)), Some(Ok(y)), None) => Ok(InputEvent::Click(DisplayPoint::new(x, y))),
                _ => Err(format!("expected 'click <x> <y>', got '{}'", line)),
            }
        }
        "mode" => Ok(InputEvent::ToggleMode),
        "undo" => Ok(InputEvent::Undo),
        "clear" => Ok(InputEvent::Clear),
        "save" => Ok(InputEvent::Save),
        "next" => Ok(InputEvent::NextImage),
        "shape" => ShapeType::parse(rest)
            .map(InputEvent::SelectShapeType)
            .ok_or_else(|| format!("unknown shape type '{}'", rest)),
        "label" => {
            let (action, label) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let label = label.trim();
            if label.is_empty() {
                return Err("missing label text".to_string());
            }
            match action {
                "add" => Ok(InputEvent::AddLabel(label.to_string())),
                "on" => Ok(InputEvent::SetLabel(label.to_string(), true)),
                "off" => Ok(InputEvent::SetLabel(label.to_string(), false)),
                other => Err(format!("unknown label action '{}'", other)),
            }
        }
        other => Err(format!("unknown command '{}'", other)),
    }
}
