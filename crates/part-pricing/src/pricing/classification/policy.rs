use super::super::domain::LabelStyle;
use serde::{Deserialize, Serialize};

/// Named rule generations. Each trained model artifact was fit against the
/// features produced by exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesVariant {
    /// Strict format bands, structure-dependent gauge tiers, no roll exemption.
    Legacy,
    /// Inclusive format bands, flat gauge tier, roll exemption, upper-case labels.
    Current,
}

impl RulesVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v1" => Some(Self::Legacy),
            "current" | "v2" => Some(Self::Current),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RulesVariant::Legacy => "legacy",
            RulesVariant::Current => "current",
        }
    }
}

/// Comparison used at the `GrupoFormato` band boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// `value > boundary` moves to the next band.
    Strict,
    /// `value >= boundary` moves to the next band.
    Inclusive,
}

/// How the `Calibre` threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugePolicy {
    /// 70 for single-layer flexible structures, 100 otherwise.
    StructureDependent,
    /// 100 for every structure.
    Flat,
}

/// Knobs that distinguish the rule generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationPolicy {
    pub boundaries: BoundaryMode,
    pub gauge: GaugePolicy,
    pub rollo_exemption: bool,
    pub labels: LabelStyle,
}

impl ClassificationPolicy {
    pub fn legacy() -> Self {
        Self {
            boundaries: BoundaryMode::Strict,
            gauge: GaugePolicy::StructureDependent,
            rollo_exemption: false,
            labels: LabelStyle::Legacy,
        }
    }

    pub fn current() -> Self {
        Self {
            boundaries: BoundaryMode::Inclusive,
            gauge: GaugePolicy::Flat,
            rollo_exemption: true,
            labels: LabelStyle::Uppercase,
        }
    }
}

impl From<RulesVariant> for ClassificationPolicy {
    fn from(variant: RulesVariant) -> Self {
        match variant {
            RulesVariant::Legacy => Self::legacy(),
            RulesVariant::Current => Self::current(),
        }
    }
}
