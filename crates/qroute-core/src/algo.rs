//! Names of the node and path selection policies built on top of the routers.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::ConfigError;

/// A selection policy. Every policy has a variant that checks feasibility before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionAlgo {
    /// Pick a candidate at random.
    Random,
    /// Pick the candidate with the shortest path first.
    Spf,
    /// Pick the candidate that best fits the residual capacity.
    BestFit,
    /// [`SelectionAlgo::Random`], checking feasibility.
    RandomFeas,
    /// [`SelectionAlgo::Spf`], checking feasibility.
    SpfFeas,
    /// [`SelectionAlgo::BestFit`], checking feasibility.
    BestFitFeas,
}

const NAMES: [(SelectionAlgo, &str); 6] = [
    (SelectionAlgo::Random, "random"),
    (SelectionAlgo::Spf, "spf"),
    (SelectionAlgo::BestFit, "bestfit"),
    (SelectionAlgo::RandomFeas, "randomfeas"),
    (SelectionAlgo::SpfFeas, "spffeas"),
    (SelectionAlgo::BestFitFeas, "bestfitfeas"),
];

impl SelectionAlgo {
    /// All policies.
    pub const ALL: [SelectionAlgo; 6] = [
        SelectionAlgo::Random,
        SelectionAlgo::Spf,
        SelectionAlgo::BestFit,
        SelectionAlgo::RandomFeas,
        SelectionAlgo::SpfFeas,
        SelectionAlgo::BestFitFeas,
    ];

    /// The policy's name.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find_map(|&(algo, name)| (algo == self).then_some(name))
            .unwrap_or("unknown")
    }

    /// Returns `true` if the policy checks feasibility.
    pub fn checks_feasibility(self) -> bool {
        matches!(
            self,
            SelectionAlgo::RandomFeas | SelectionAlgo::SpfFeas | SelectionAlgo::BestFitFeas
        )
    }

    /// The policy without the feasibility check.
    pub fn base(self) -> SelectionAlgo {
        match self {
            SelectionAlgo::Random | SelectionAlgo::RandomFeas => SelectionAlgo::Random,
            SelectionAlgo::Spf | SelectionAlgo::SpfFeas => SelectionAlgo::Spf,
            SelectionAlgo::BestFit | SelectionAlgo::BestFitFeas => SelectionAlgo::BestFit,
        }
    }
}

impl fmt::Display for SelectionAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionAlgo {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find_map(|&(algo, name)| (name == s).then_some(algo))
            .ok_or_else(|| ConfigError::UnknownAlgo {
                name: s.to_owned(),
                valid: NAMES.iter().map(|(_, name)| name).join(","),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() -> anyhow::Result<()> {
        for algo in SelectionAlgo::ALL {
            assert_eq!(algo.to_string().parse::<SelectionAlgo>()?, algo);
        }
        Ok(())
    }

    #[test]
    fn unknown_name_lists_valid_names() {
        let err = "fastest".parse::<SelectionAlgo>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAlgo { .. }));
        let msg = err.to_string();
        assert!(msg.contains("fastest"));
        for algo in SelectionAlgo::ALL {
            assert!(msg.contains(algo.name()));
        }
        insta::assert_snapshot!(msg, @"invalid routing algorithm: fastest (valid options are: random,spf,bestfit,randomfeas,spffeas,bestfitfeas)");
    }

    #[test]
    fn feasibility_variants_map_to_base() {
        let checked = SelectionAlgo::ALL
            .into_iter()
            .filter(|algo| algo.checks_feasibility())
            .collect::<Vec<_>>();
        assert_eq!(checked.len(), 3);
        for algo in checked {
            assert!(!algo.base().checks_feasibility());
            assert!(algo.name().starts_with(algo.base().name()));
        }
    }

    #[test]
    fn serde_uses_names() {
        insta::assert_yaml_snapshot!(SelectionAlgo::ALL, @r###"
        - random
        - spf
        - bestfit
        - randomfeas
        - spffeas
        - bestfitfeas
        "###);
    }
}
