//! Market category classification by trigger phrase.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarketCategory {
    OverUnderGoals,
    CorrectScore,
    MatchResult,
    Other,
}

impl MarketCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::OverUnderGoals => "Over/Under Goals",
            Self::CorrectScore => "Correct Score",
            Self::MatchResult => "Match Result",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluated top to bottom; the first rule with a matching phrase wins.
pub const MARKET_RULES: [(MarketCategory, &[&str]); 3] = [
    (
        MarketCategory::OverUnderGoals,
        &["mais/menos", "total de gols", "gols", "over/under", "goals"],
    ),
    (
        MarketCategory::CorrectScore,
        &["placar correto", "correct score"],
    ),
    (
        MarketCategory::MatchResult,
        &[
            "resultado da partida",
            "match odds",
            "resultado final",
            "match result",
        ],
    ),
];

/// Maps a market description to its category. Plain substring search, so an
/// unrelated occurrence of a phrase still counts.
pub fn classify_market(description: &str) -> MarketCategory {
    let lowered = description.to_lowercase();
    MARKET_RULES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|phrase| lowered.contains(phrase)))
        .map(|(category, _)| *category)
        .unwrap_or(MarketCategory::Other)
}
