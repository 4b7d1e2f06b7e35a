//! The 32 NHL clubs: API abbreviation and full name.

pub const TEAMS: [(&str, &str); 32] = [
    ("ANA", "Anaheim Ducks"),
    ("BOS", "Boston Bruins"),
    ("BUF", "Buffalo Sabres"),
    ("CAR", "Carolina Hurricanes"),
    ("CBJ", "Columbus Blue Jackets"),
    ("CGY", "Calgary Flames"),
    ("CHI", "Chicago Blackhawks"),
    ("COL", "Colorado Avalanche"),
    ("DAL", "Dallas Stars"),
    ("DET", "Detroit Red Wings"),
    ("EDM", "Edmonton Oilers"),
    ("FLA", "Florida Panthers"),
    ("LAK", "Los Angeles Kings"),
    ("MIN", "Minnesota Wild"),
    ("MTL", "Montréal Canadiens"),
    ("NJD", "New Jersey Devils"),
    ("NSH", "Nashville Predators"),
    ("NYI", "New York Islanders"),
    ("NYR", "New York Rangers"),
    ("OTT", "Ottawa Senators"),
    ("PHI", "Philadelphia Flyers"),
    ("PIT", "Pittsburgh Penguins"),
    ("SEA", "Seattle Kraken"),
    ("SJS", "San Jose Sharks"),
    ("STL", "St. Louis Blues"),
    ("TBL", "Tampa Bay Lightning"),
    ("TOR", "Toronto Maple Leafs"),
    ("UTA", "Utah Mammoth"),
    ("VAN", "Vancouver Canucks"),
    ("VGK", "Vegas Golden Knights"),
    ("WPG", "Winnipeg Jets"),
    ("WSH", "Washington Capitals"),
];

pub fn abbreviations() -> impl Iterator<Item = &'static str> {
    TEAMS.iter().map(|(abbrev, _)| *abbrev)
}

pub fn team_name(abbrev: &str) -> Option<&'static str> {
    TEAMS
        .iter()
        .find(|(a, _)| a.eq_ignore_ascii_case(abbrev))
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_abbreviations_are_unique() {
        let unique: HashSet<&str> = abbreviations().collect();
        assert_eq!(unique.len(), 32);
    }

    #[test]
    fn test_team_name_lookup() {
        assert_eq!(team_name("TOR"), Some("Toronto Maple Leafs"));
        assert_eq!(team_name("vgk"), Some("Vegas Golden Knights"));
        assert_eq!(team_name("XXX"), None);
    }
}
