//! services/api/src/adapters/recitation.rs
//!
//! Resolves an audio category to the Quran recitation the client should play
//! when a reminder fires. The catalog follows the EveryAyah naming scheme
//! (surah and ayah numbers, zero-padded).

use habit_tracker_core::domain::AudioCategory;

/// "Hayya 'ala as-Salah" (Come to prayer) is hosted separately from the
/// per-ayah recitations.
const PRAYER_CALL_URL: &str =
    "https://islamic-audio.cdn.prismic.io/islamic-audio/c0d5f663-bbc8-49bb-aad9-8525c3ca7d67_hayya-alas-salah.mp3";

/// Maps audio categories to recitation URLs.
#[derive(Debug, Clone)]
pub struct RecitationLibrary {
    base_url: String,
}

impl RecitationLibrary {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// The recitation played for the given category.
    pub fn url_for(&self, category: AudioCategory) -> String {
        let track = match category {
            // Surah Al-'Alaq 96:1 (Read! In the name of your Lord...)
            AudioCategory::QuranStudy => "096001.mp3",
            AudioCategory::Prayer => return PRAYER_CALL_URL.to_string(),
            // Surah Al-Baqarah 2:261 (The parable of those who spend...)
            AudioCategory::Charity => "002261.mp3",
            // Surah Luqman 31:14 (And We have enjoined upon man care for his parents...)
            AudioCategory::Family => "031014.mp3",
            // Surah Al-Fatihah 1:1 as the default.
            AudioCategory::General => "001001.mp3",
        };
        format!("{}/{}", self.base_url, track)
    }
}
