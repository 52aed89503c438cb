use std::time::SystemTime;

/// Coarse age category derived from the raw age cell.
///
/// Never present in the source sheet; recomputed on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBracket {
    Junior,
    JeuneAdulte,
    Adulte,
    Senior,
    Unspecified,
}

impl AgeBracket {
    /// All brackets in display order.
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::Junior,
        AgeBracket::JeuneAdulte,
        AgeBracket::Adulte,
        AgeBracket::Senior,
        AgeBracket::Unspecified,
    ];

    /// Breakpoints: <1, [1,5], (5,10), >=10. Exactly 1 and exactly 5 are
    /// young adults; exactly 10 is senior.
    pub fn from_age(age_years: Option<f64>) -> Self {
        match age_years {
            None => AgeBracket::Unspecified,
            Some(a) if a < 1.0 => AgeBracket::Junior,
            Some(a) if a <= 5.0 => AgeBracket::JeuneAdulte,
            Some(a) if a < 10.0 => AgeBracket::Adulte,
            Some(_) => AgeBracket::Senior,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Junior => "Junior",
            AgeBracket::JeuneAdulte => "Jeune adulte",
            AgeBracket::Adulte => "Adulte",
            AgeBracket::Senior => "Senior",
            AgeBracket::Unspecified => "Âge inconnu",
        }
    }
}

/// Parse an age cell. The sheet writes ages with a comma decimal separator
/// ("3,5") and sometimes a trailing unit ("3 ans").
pub fn parse_age(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    let token = cleaned.split_whitespace().next()?;
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One row of the adoption catalog.
#[derive(Debug, Clone)]
pub struct AnimalRecord {
    /// May be blank; blank-name rows are kept unless decoding opts out.
    pub name: String,
    pub species: Option<String>,
    pub sex: String,
    /// Raw age cell, kept for display.
    pub age_raw: String,
    pub age_years: Option<f64>,
    pub age_bracket: AgeBracket,
    /// Free text, classified into a badge at projection time.
    pub status: String,
    pub photo: String,
    pub story: String,
    pub description: String,
    pub arrival_date: String,
}

/// Immutable point-in-time copy of the catalog, in source row order.
///
/// Replaced wholesale on reload; filtering only ever borrows it.
#[derive(Debug)]
pub struct CatalogSnapshot {
    records: Vec<AnimalRecord>,
    loaded_at: SystemTime,
}

impl CatalogSnapshot {
    pub fn new(records: Vec<AnimalRecord>) -> Self {
        CatalogSnapshot {
            records,
            loaded_at: SystemTime::now(),
        }
    }

    pub fn empty() -> Self {
        CatalogSnapshot::new(Vec::new())
    }

    pub fn records(&self) -> &[AnimalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("3"), Some(3.0));
        assert_eq!(parse_age("3,5"), Some(3.5));
        assert_eq!(parse_age("3.5"), Some(3.5));
        assert_eq!(parse_age(" 7 "), Some(7.0));
        assert_eq!(parse_age("2 ans"), Some(2.0));
        assert_eq!(parse_age(""), None);
        assert_eq!(parse_age("inconnu"), None);
        assert_eq!(parse_age("NaN"), None);
    }

    #[test]
    fn test_bracket_breakpoints() {
        assert_eq!(AgeBracket::from_age(Some(0.5)), AgeBracket::Junior);
        assert_eq!(AgeBracket::from_age(Some(1.0)), AgeBracket::JeuneAdulte);
        assert_eq!(AgeBracket::from_age(Some(3.5)), AgeBracket::JeuneAdulte);
        assert_eq!(AgeBracket::from_age(Some(5.0)), AgeBracket::JeuneAdulte);
        assert_eq!(AgeBracket::from_age(Some(5.1)), AgeBracket::Adulte);
        assert_eq!(AgeBracket::from_age(Some(9.9)), AgeBracket::Adulte);
        assert_eq!(AgeBracket::from_age(Some(10.0)), AgeBracket::Senior);
        assert_eq!(AgeBracket::from_age(Some(14.0)), AgeBracket::Senior);
        assert_eq!(AgeBracket::from_age(None), AgeBracket::Unspecified);
    }

    #[test]
    fn test_comma_and_dot_parse_identically() {
        assert_eq!(
            AgeBracket::from_age(parse_age("3,5")),
            AgeBracket::from_age(parse_age("3.5"))
        );
    }
}
