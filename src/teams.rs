//! Team name extraction from market descriptions.

use std::sync::OnceLock;

use regex::Regex;

/// Returned when no rule recovers a team name. Leaderboards skip it.
pub const UNKNOWN_TEAM: &str = "unknown team";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamRule {
    /// `<left> x|vs <right>` with an optional `: ...` or `(...)` tail.
    Matchup,
    /// `... - <name>`, used by single-team markets.
    TrailingName,
}

pub const TEAM_RULES: [TeamRule; 2] = [TeamRule::Matchup, TeamRule::TrailingName];

impl TeamRule {
    /// `description` must already be lower-cased and prefix-stripped.
    pub fn apply(self, description: &str) -> Option<Vec<String>> {
        match self {
            Self::Matchup => {
                let caps = matchup_re().captures(description)?;
                let left = strip_parenthetical(caps.get(1)?.as_str().trim());
                let right = strip_parenthetical(caps.get(3)?.as_str().trim());
                if left.is_empty() || right.is_empty() {
                    return None;
                }
                Some(vec![left, right])
            }
            Self::TrailingName => {
                let caps = trailing_name_re().captures(description)?;
                let name = caps.get(1)?.as_str().trim();
                if name.is_empty() {
                    return None;
                }
                let name = trailing_market_re().replace(name, "");
                let name = strip_parenthetical(name.trim());
                if name.is_empty() {
                    return None;
                }
                Some(vec![name])
            }
        }
    }
}

/// Recovers one or two lower-cased team names; never returns an empty list.
pub fn extract_teams(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();
    let stripped = sport_prefix_re().replace(&lowered, "");
    let stripped = stripped.trim();

    TEAM_RULES
        .iter()
        .find_map(|rule| rule.apply(stripped))
        .unwrap_or_else(|| vec![UNKNOWN_TEAM.to_string()])
}

pub fn is_unknown_team(name: &str) -> bool {
    name == UNKNOWN_TEAM
}

fn strip_parenthetical(raw: &str) -> String {
    parenthetical_re().replace_all(raw, "").trim().to_string()
}

fn sport_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:futebol|esporte|football|sport|soccer)\s+/\s*")
            .expect("sport prefix pattern is valid")
    })
}

fn matchup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(.+?)\s+(x|vs)\s+(.+?)(?:\s*[:(].*|$)").expect("matchup pattern is valid")
    })
}

fn trailing_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\s*(.+)").expect("trailing name pattern is valid"))
}

fn trailing_market_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\s*(?:resultado da partida|placar correto|mais/menos de.*gols|match odds|correct score|over/under.*goals)\s*$",
        )
        .expect("trailing market pattern is valid")
    })
}

fn parenthetical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(.+\)\s*").expect("parenthetical pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchup_with_prefix_and_market_suffix() {
        assert_eq!(
            extract_teams("Futebol / Flamengo x Palmeiras: Resultado Final"),
            vec!["flamengo", "palmeiras"]
        );
    }

    #[test]
    fn vs_separator_and_english_prefix() {
        assert_eq!(
            extract_teams("Football / Arsenal vs Chelsea"),
            vec!["arsenal", "chelsea"]
        );
    }

    #[test]
    fn parenthetical_suffixes_are_removed_from_both_sides() {
        assert_eq!(
            extract_teams("Futebol / Inter (RS) x Gremio (RS): Mais/Menos de 2,5 Gols"),
            vec!["inter", "gremio"]
        );
    }

    #[test]
    fn trailing_name_for_single_team_markets() {
        assert_eq!(extract_teams("Placar Correto - Real Madrid"), vec!["real madrid"]);
        assert_eq!(
            extract_teams("Futebol / Especiais - Santos (Sub-20)"),
            vec!["santos"]
        );
    }

    #[test]
    fn trailing_market_phrase_is_stripped() {
        assert_eq!(
            extract_teams("Especiais - Corinthians Placar Correto"),
            vec!["corinthians"]
        );
        assert_eq!(
            extract_teams("Especiais - Bahia Mais/Menos de 1,5 Gols"),
            vec!["bahia"]
        );
    }

    #[test]
    fn unmatched_descriptions_yield_the_sentinel() {
        assert_eq!(extract_teams(""), vec![UNKNOWN_TEAM]);
        assert_eq!(extract_teams("Futebol / Resultado Final"), vec![UNKNOWN_TEAM]);
        assert_eq!(extract_teams("Especiais -   "), vec![UNKNOWN_TEAM]);
        assert!(is_unknown_team(&extract_teams("Mercado Especial")[0]));
    }

    #[test]
    fn rules_report_no_match_independently() {
        assert_eq!(TeamRule::Matchup.apply("placar correto - real madrid"), None);
        assert_eq!(TeamRule::TrailingName.apply("flamengo x palmeiras"), None);
        assert_eq!(
            TeamRule::TrailingName.apply("placar correto - real madrid"),
            Some(vec!["real madrid".to_string()])
        );
    }

    #[test]
    fn extraction_is_never_empty() {
        for description in [
            "",
            "-",
            " x ",
            "a x b",
            "Futebol / ",
            "Placar Correto - (x)",
            "Tênis / Nadal vs Federer (Final)",
        ] {
            let teams = extract_teams(description);
            assert!(!teams.is_empty(), "{description:?}");
            assert!(teams.len() <= 2);
            assert!(teams.iter().all(|team| !team.is_empty()));
        }
    }
}
