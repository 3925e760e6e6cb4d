use std::fmt;

/// A named class of compute resources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SizingTier {
    Small,
    Medium,
    Large,
}

/// CPU and memory requests/limits, expressed as Kubernetes quantities.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResourceQuantities {
    pub cpu_request: &'static str,
    pub memory_request: &'static str,
    pub cpu_limit: &'static str,
    pub memory_limit: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown sizing tier {0:?}; expected one of small, medium, large")]
pub struct UnknownSizingTier(pub String);

// === impl SizingTier ===

impl SizingTier {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Resolves the tier through the fixed sizing table.
    pub fn quantities(self) -> ResourceQuantities {
        match self {
            Self::Small => ResourceQuantities {
                cpu_request: "100m",
                memory_request: "128Mi",
                cpu_limit: "500m",
                memory_limit: "512Mi",
            },
            Self::Medium => ResourceQuantities {
                cpu_request: "250m",
                memory_request: "256Mi",
                cpu_limit: "1",
                memory_limit: "1Gi",
            },
            Self::Large => ResourceQuantities {
                cpu_request: "500m",
                memory_request: "512Mi",
                cpu_limit: "2",
                memory_limit: "2Gi",
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::str::FromStr for SizingTier {
    type Err = UnknownSizingTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            s => Err(UnknownSizingTier(s.to_string())),
        }
    }
}

impl fmt::Display for SizingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tiers() {
        for tier in SizingTier::ALL {
            assert_eq!(tier.as_str().parse::<SizingTier>(), Ok(tier));
        }
    }

    #[test]
    fn rejects_unknown_tier() {
        assert_eq!(
            "xlarge".parse::<SizingTier>(),
            Err(UnknownSizingTier("xlarge".to_string()))
        );
        // Tier names are case sensitive.
        assert!("Small".parse::<SizingTier>().is_err());
    }

    #[test]
    fn tiers_grow_monotonically() {
        let small = SizingTier::Small.quantities();
        let large = SizingTier::Large.quantities();
        assert_eq!(small.cpu_request, "100m");
        assert_eq!(small.memory_limit, "512Mi");
        assert_eq!(large.cpu_limit, "2");
        assert_eq!(large.memory_request, "512Mi");
        assert_eq!(SizingTier::Medium.quantities().memory_limit, "1Gi");
    }
}
