use serde::Serialize;

/// Working text for a spoken journal note.
///
/// Interim fragments are appended rather than replaced, so a recognizer that
/// re-sends growing hypotheses produces repeated words. That is a known
/// limitation of the buffer, not something it corrects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCaptureBuffer {
    text: String,
    available: bool,
    #[serde(skip)]
    notice_shown: bool,
}

impl VoiceCaptureBuffer {
    pub fn new(available: bool) -> Self {
        Self {
            text: String::new(),
            available,
            notice_shown: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Appends `text` after a single space. Blank fragments are dropped.
    pub fn on_fragment(&mut self, text: &str, _is_final: bool) {
        if !self.available {
            return;
        }
        let fragment = text.trim();
        if fragment.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
    }

    /// Current contents for the pending entry's notes. The buffer is kept.
    pub fn commit(&self) -> String {
        if !self.available {
            return String::new();
        }
        self.text.clone()
    }

    pub fn clear(&mut self) {
        if self.available {
            self.text.clear();
        }
    }

    /// Turns voice off for the rest of the session. Returns true the first
    /// time, so the caller shows the unavailable notice once.
    pub fn disable(&mut self) -> bool {
        self.available = false;
        self.text.clear();
        !std::mem::replace(&mut self.notice_shown, true)
    }
}

impl Default for VoiceCaptureBuffer {
    fn default() -> Self {
        Self::new(true)
    }
}
