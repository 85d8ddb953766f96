//! Sound playback seam
//!
//! The simulation core never touches an audio backend; it fires sound ids
//! at whatever [`Audio`] implementation the embedder supplies.

/// Fire-and-forget sound playback by id.
pub trait Audio {
    fn play(&mut self, id: &str);
}

/// Discards every request. Used by headless runs.
#[derive(Debug, Default)]
pub struct NullAudio;

impl Audio for NullAudio {
    fn play(&mut self, id: &str) {
        tracing::debug!(sound = id, "play sound");
    }
}

/// Records every request, in order. Useful for embedders that batch audio
/// submission and for tests.
#[derive(Debug, Default)]
pub struct MemoryAudio {
    pub played: Vec<String>,
}

impl MemoryAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Audio for MemoryAudio {
    fn play(&mut self, id: &str) {
        self.played.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_audio_records_in_order() {
        let mut audio = MemoryAudio::new();
        audio.play("woodcutting_00");
        audio.play("drop_00");
        assert_eq!(audio.played, vec!["woodcutting_00", "drop_00"]);
    }
}
