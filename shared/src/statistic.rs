use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The aggregate shown in area tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Statistic {
    Age,
    Match,
    #[default]
    Users,
    Gender,
    ProUsers,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown statistic {0:?}")]
pub struct UnknownStatistic(pub String);

/// Toolbar entry for one statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: Statistic,
    pub label: String,
    pub active: bool,
}

impl Statistic {
    /// Toolbar order.
    pub const ALL: [Statistic; 5] = [
        Statistic::Age,
        Statistic::Match,
        Statistic::Users,
        Statistic::Gender,
        Statistic::ProUsers,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Match => "Match",
            Self::Users => "Users",
            Self::Gender => "Gender",
            Self::ProUsers => "ProUsers",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProUsers => "Pro Users",
            other => other.as_str(),
        }
    }

    pub fn options(active: Statistic) -> Vec<FilterOption> {
        Self::ALL
            .iter()
            .map(|&value| FilterOption {
                value,
                label: value.label().to_string(),
                active: value == active,
            })
            .collect()
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = UnknownStatistic;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|statistic| statistic.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStatistic(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Statistic, UnknownStatistic};

    #[test]
    fn defaults_to_users() {
        assert_eq!(Statistic::default(), Statistic::Users);
    }

    #[test]
    fn pro_users_has_spaced_label() {
        assert_eq!(Statistic::ProUsers.label(), "Pro Users");
        assert_eq!(Statistic::ProUsers.as_str(), "ProUsers");
        assert_eq!(Statistic::Match.label(), "Match");
    }

    #[test]
    fn parses_wire_values_case_insensitively() {
        assert_eq!("Age".parse::<Statistic>(), Ok(Statistic::Age));
        assert_eq!(" prousers ".parse::<Statistic>(), Ok(Statistic::ProUsers));
        assert_eq!(
            "Pro Users".parse::<Statistic>(),
            Err(UnknownStatistic("Pro Users".to_string()))
        );
    }

    #[test]
    fn options_follow_toolbar_order_and_mark_active() {
        let options = Statistic::options(Statistic::Gender);
        let values: Vec<_> = options.iter().map(|option| option.value).collect();
        assert_eq!(values, Statistic::ALL.to_vec());
        let active: Vec<_> = options
            .iter()
            .filter(|option| option.active)
            .map(|option| option.value)
            .collect();
        assert_eq!(active, vec![Statistic::Gender]);
    }

    #[test]
    fn serializes_as_variant_name() {
        let encoded = serde_json::to_string(&Statistic::ProUsers).expect("serialize statistic");
        assert_eq!(encoded, "\"ProUsers\"");
    }
}
