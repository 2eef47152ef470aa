//! Tracks word-boundary events reported by the speech engine.

/// Whether the current voice reports word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordBoundaryMode {
    /// No boundary seen yet for this voice.
    #[default]
    Unknown,
    Supported,
    /// An utterance finished without a single boundary event.
    NotSupported,
}

/// Boundary state for the unit being spoken.
///
/// Speech of a unit may be paused and resumed; the resumed utterance only
/// covers the rest of the unit, so its indices are relative to where the
/// pause happened. `speech_utterance_start_index` holds that shift.
#[derive(Debug, Clone, Default)]
pub struct WordBoundaries {
    pub mode: WordBoundaryMode,
    /// Offset of the active utterance within the unit.
    pub speech_utterance_start_index: usize,
    /// Last boundary index, relative to the active utterance.
    pub previously_spoken_index: usize,
    /// Length the engine reported with the last boundary, if any.
    pub speech_utterance_length: Option<usize>,
}

impl WordBoundaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a boundary event. A reported length overrides the word length
    /// the segmentation model would pick.
    pub fn update_boundary(&mut self, char_index: usize, reported_length: Option<usize>) {
        self.previously_spoken_index = char_index;
        self.speech_utterance_length = reported_length.filter(|&len| len > 0);
        self.mode = WordBoundaryMode::Supported;
    }

    pub fn has_boundaries(&self) -> bool {
        self.mode == WordBoundaryMode::Supported
    }

    /// Index within the current unit of the word being spoken.
    pub fn current_index(&self) -> usize {
        self.speech_utterance_start_index + self.previously_spoken_index
    }

    pub fn reported_length(&self) -> Option<usize> {
        self.speech_utterance_length
    }

    /// Speech paused: the next utterance resumes at the last boundary.
    pub fn update_for_pause(&mut self) {
        self.speech_utterance_start_index = self.current_index();
        self.previously_spoken_index = 0;
        self.speech_utterance_length = None;
    }

    /// An utterance ended without boundary events.
    pub fn notify_no_boundaries(&mut self) {
        if self.mode != WordBoundaryMode::Supported {
            self.mode = WordBoundaryMode::NotSupported;
        }
    }

    /// Moving to another unit: indices restart, voice support is kept.
    pub fn reset_for_new_unit(&mut self) {
        self.speech_utterance_start_index = 0;
        self.previously_spoken_index = 0;
        self.speech_utterance_length = None;
    }

    /// Voice or locale changed: forget everything.
    pub fn reset_to_default_state(&mut self) {
        *self = Self::default();
    }
}
