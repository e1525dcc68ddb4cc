//! Marking modes of the editor.

/// Which point set receives clicks, undo and clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Mark the main subject of the image
    #[default]
    Subject,
    /// Draw the composition shape
    Composition,
}

impl Mode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Subject => "Subject",
            Mode::Composition => "Composition",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Subject => Mode::Composition,
            Mode::Composition => Mode::Subject,
        }
    }

    /// Status hint shown while this mode is active.
    pub fn hint(&self) -> &'static str {
        match self {
            Mode::Subject => "Mark subject (red) - click on the image",
            Mode::Composition => "Draw composition (blue) - click on the image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_subject() {
        assert_eq!(Mode::default(), Mode::Subject);
    }

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(Mode::Subject.toggled(), Mode::Composition);
        assert_eq!(Mode::Subject.toggled().toggled(), Mode::Subject);
    }
}
