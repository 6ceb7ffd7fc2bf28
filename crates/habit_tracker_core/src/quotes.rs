//! crates/habit_tracker_core/src/quotes.rs
//!
//! The curated quote catalog and its daily rotation.

use chrono::{Datelike, NaiveDate};

/// A Quran or Hadith quote with its English rendering and source reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub reference: &'static str,
    pub arabic: &'static str,
}

pub const QUOTES: [Quote; 5] = [
    Quote {
        text: "And whoever relies upon Allah - then He is sufficient for him. Indeed, Allah will accomplish His purpose.",
        reference: "Quran 65:3",
        arabic: "وَمَن يَتَوَكَّلْ عَلَى اللَّهِ فَهُوَ حَسْبُهُ ۚ إِنَّ اللَّهَ بَالِغُ أَمْرِهِ",
    },
    Quote {
        text: "So remember Me; I will remember you. And be grateful to Me and do not deny Me.",
        reference: "Quran 2:152",
        arabic: "فَاذْكُرُونِي أَذْكُرْكُمْ وَاشْكُرُوا لِي وَلَا تَكْفُرُونِ",
    },
    Quote {
        text: "And it is He who created the heavens and earth in truth. And the day He says, 'Be,' and it is, His word is the truth.",
        reference: "Quran 6:73",
        arabic: "وَهُوَ الَّذِي خَلَقَ السَّمَاوَاتِ وَالْأَرْضَ بِالْحَقِّ",
    },
    Quote {
        text: "And whoever does righteous deeds, whether male or female, while being a believer - those will enter Paradise.",
        reference: "Quran 4:124",
        arabic: "وَمَن يَعْمَلْ مِنَ الصَّالِحَاتِ مِن ذَكَرٍ أَوْ أُنثَىٰ وَهُوَ مُؤْمِنٌ",
    },
    Quote {
        text: "The believers in their mutual kindness, compassion, and sympathy are just one body.",
        reference: "Hadith - Bukhari",
        arabic: "مَثَلُ الْمُؤْمِنِينَ فِي تَوَادِّهِمْ وَتَرَاحُمِهِمْ",
    },
];

/// A short motivational message shown alongside the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encouragement {
    pub title: &'static str,
    pub message: &'static str,
}

pub const ENCOURAGEMENTS: [Encouragement; 3] = [
    Encouragement {
        title: "You're Building Paradise",
        message: "Every good deed is a brick in your house in Paradise. Keep building.",
    },
    Encouragement {
        title: "Small Steps, Big Rewards",
        message: "The most beloved deeds to Allah are those done consistently, even if small.",
    },
    Encouragement {
        title: "Allah Sees Your Efforts",
        message: "Not a single effort goes unnoticed. Your consistency is being rewarded.",
    },
];

/// The quote for the given calendar day. Stable within a day and cycles
/// through the catalog across days.
pub fn daily(day: NaiveDate) -> &'static Quote {
    let index = day.num_days_from_ce().rem_euclid(QUOTES.len() as i32);
    &QUOTES[index as usize]
}
