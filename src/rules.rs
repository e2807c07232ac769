// 🏷️ Offense Rules - keyword tables as data
// Ordered (keyword, category) pairs; the first keyword found in the description wins

use crate::vocabulary::OffenseCategory;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffenseRule {
    /// Uppercase substring to look for
    pub keyword: &'static str,

    /// Category assigned when the keyword matches
    pub category: OffenseCategory,
}

impl OffenseRule {
    const fn new(keyword: &'static str, category: OffenseCategory) -> Self {
        OffenseRule { keyword, category }
    }

    /// `text` is expected to be uppercased already
    pub fn matches(&self, text: &str) -> bool {
        text.contains(self.keyword)
    }
}

use OffenseCategory::*;

/// NYPD `OFNS_DESC` keywords. Order is the tie-break: "FELONY ASSAULT" is
/// caught by "ASSAULT" before its own entry is reached.
pub const NYPD_OFFENSE_RULES: &[OffenseRule] = &[
    OffenseRule::new("ROBBERY", ViolentCrime),
    OffenseRule::new("ASSAULT", ViolentCrime),
    OffenseRule::new("BURGLARY", PropertyCrime),
    OffenseRule::new("GRAND LARCENY", PropertyCrime),
    OffenseRule::new("DANGEROUS DRUGS", DrugOffense),
    OffenseRule::new("DANGEROUS WEAPONS", WeaponOffense),
    OffenseRule::new("FELONY ASSAULT", ViolentCrime),
    OffenseRule::new("PETIT LARCENY", PropertyCrime),
];

/// LAPD `Charge Group Description` keywords
pub const LAPD_OFFENSE_RULES: &[OffenseRule] = &[
    OffenseRule::new("ROBBERY", ViolentCrime),
    OffenseRule::new("ASSAULT", ViolentCrime),
    OffenseRule::new("BURGLARY", PropertyCrime),
    OffenseRule::new("THEFT", PropertyCrime),
    OffenseRule::new("NARCOTIC", DrugOffense),
    OffenseRule::new("WEAPON", WeaponOffense),
    OffenseRule::new("TRAFFIC", TrafficViolation),
];

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct OffenseClassifier {
    rules: &'static [OffenseRule],
}

impl OffenseClassifier {
    pub const fn new(rules: &'static [OffenseRule]) -> Self {
        OffenseClassifier { rules }
    }

    /// Uppercase the description and return the category of the first matching rule
    pub fn classify(&self, description: &str) -> OffenseCategory {
        let upper = description.to_uppercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&upper))
            .map(|rule| rule.category)
            .unwrap_or(OffenseCategory::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nypd_assault_is_violent() {
        let classifier = OffenseClassifier::new(NYPD_OFFENSE_RULES);
        assert_eq!(classifier.classify("ASSAULT 3 & RELATED OFFENSES"), ViolentCrime);
        assert_eq!(classifier.classify("FELONY ASSAULT"), ViolentCrime);
    }

    #[test]
    fn test_case_insensitive_match() {
        let classifier = OffenseClassifier::new(LAPD_OFFENSE_RULES);
        assert_eq!(classifier.classify("Aggravated Assault"), ViolentCrime);
        assert_eq!(classifier.classify("Narcotic Drug Laws"), DrugOffense);
        assert_eq!(classifier.classify("Driving Under Influence"), Other);
    }

    #[test]
    fn test_first_rule_wins() {
        // "ROBBERY" precedes "BURGLARY" in the table
        let classifier = OffenseClassifier::new(LAPD_OFFENSE_RULES);
        assert_eq!(classifier.classify("BURGLARY AND ROBBERY"), ViolentCrime);
    }

    #[test]
    fn test_no_match_is_other() {
        let classifier = OffenseClassifier::new(NYPD_OFFENSE_RULES);
        assert_eq!(classifier.classify("Not Specified"), Other);
        assert_eq!(classifier.classify(""), Other);
    }
}
