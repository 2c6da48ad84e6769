use super::domain::{ClassifiedRecord, DieGrade, PartAttributes, ZipperUse};
use serde::Serialize;
use std::fmt;

const NOT_REQUIRED: &str = "no increment required";

/// Entries of the markup table, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementRule {
    FoilRoll,
    Roll,
    FlowPackBag,
    ZipperBag,
    DieCutBag,
    Bag,
    Unpriced,
}

impl IncrementRule {
    /// Target percentage the prediction is compared against.
    pub fn base(self) -> Option<f64> {
        match self {
            IncrementRule::FoilRoll => Some(108.0),
            IncrementRule::Roll => Some(105.0),
            IncrementRule::FlowPackBag => Some(108.0),
            IncrementRule::ZipperBag => Some(108.0),
            IncrementRule::DieCutBag => Some(107.0),
            IncrementRule::Bag => Some(106.0),
            IncrementRule::Unpriced => None,
        }
    }

    /// First matching rule for the record.
    pub fn select(record: &ClassifiedRecord) -> Self {
        let attrs = &record.attributes;
        let product = record.product_type().trim().to_uppercase();
        let structure = PartAttributes::text(&attrs.estructura).to_uppercase();
        let bag_type = PartAttributes::text(&attrs.tipo_bolsa).trim().to_uppercase();

        match product.as_str() {
            "ROLLO" if structure.contains("FOIL") => IncrementRule::FoilRoll,
            "ROLLO" => IncrementRule::Roll,
            "BOLSA" if bag_type == "FLOW PACK" => IncrementRule::FlowPackBag,
            "BOLSA" if record.zipper == ZipperUse::Zipper => IncrementRule::ZipperBag,
            "BOLSA" if matches!(record.die_grade, DieGrade::High | DieGrade::Shaped) => {
                IncrementRule::DieCutBag
            }
            "BOLSA" => IncrementRule::Bag,
            _ => IncrementRule::Unpriced,
        }
    }
}

/// Markup to add on top of the model's prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementDecision {
    Percentage(i64),
    NotRequired,
}

impl fmt::Display for IncrementDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncrementDecision::Percentage(value) => write!(f, "{value}%"),
            IncrementDecision::NotRequired => f.write_str(NOT_REQUIRED),
        }
    }
}

impl Serialize for IncrementDecision {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rule that fired plus the resulting decision, for audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncrementOutcome {
    pub rule: IncrementRule,
    pub raw_increment: f64,
    pub decision: IncrementDecision,
}

/// `floor(x + 0.5)`; halves always round toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Applies the markup table to a record and a fractional prediction.
pub fn decide(record: &ClassifiedRecord, prediction: f64) -> IncrementOutcome {
    let rule = IncrementRule::select(record);
    let raw_increment = match rule.base() {
        Some(base) => base - prediction * 100.0,
        None => 0.0,
    };

    let decision = if raw_increment <= 0.0 {
        IncrementDecision::NotRequired
    } else {
        IncrementDecision::Percentage(round_half_up(raw_increment))
    };

    IncrementOutcome {
        rule,
        raw_increment,
        decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::classification::{ClassificationEngine, RulesVariant};
    use crate::pricing::domain::fields;
    use serde_json::json;

    fn record(product: &str, pairs: &[(&str, &str)]) -> ClassifiedRecord {
        let mut attrs = PartAttributes::default();
        attrs.assign(fields::TIPO_PRODUCTO, json!(product));
        attrs.assign(fields::ANCHO, json!(300));
        attrs.assign(fields::LARGO, json!(300));
        attrs.assign(fields::CALIBRE_2, json!(60));
        for (name, value) in pairs {
            attrs.assign(name, json!(value));
        }
        ClassificationEngine::for_variant(RulesVariant::Current)
            .classify(attrs)
            .expect("classifies")
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4), 2);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(57.5), 58);
    }

    #[test]
    fn flow_pack_bag_uses_base_108() {
        let record = record("BOLSA", &[(fields::TIPO_BOLSA, "FLOW PACK")]);
        let outcome = decide(&record, 0.5);
        assert_eq!(outcome.rule, IncrementRule::FlowPackBag);
        assert_eq!(outcome.decision.to_string(), "58%");
    }

    #[test]
    fn plain_bag_above_base_needs_no_increment() {
        let record = record("BOLSA", &[]);
        assert_eq!(record.die_grade.label(record.labels), "NO TROQUEL");
        assert_eq!(record.zipper.label(record.labels), "NO");

        let outcome = decide(&record, 1.1);
        assert_eq!(outcome.rule, IncrementRule::Bag);
        assert!((outcome.raw_increment + 4.0).abs() < 1e-9);
        assert_eq!(outcome.decision, IncrementDecision::NotRequired);
        assert_eq!(outcome.decision.to_string(), "no increment required");
    }

    #[test]
    fn roll_rules_check_for_foil_first() {
        let foil = record("ROLLO", &[(fields::ESTRUCTURA, "PET/Foil/PE")]);
        assert_eq!(IncrementRule::select(&foil), IncrementRule::FoilRoll);
        assert_eq!(decide(&foil, 0.9).decision.to_string(), "18%");

        let plain = record("rollo", &[(fields::ESTRUCTURA, "PET/PE")]);
        assert_eq!(IncrementRule::select(&plain), IncrementRule::Roll);
        assert_eq!(decide(&plain, 1.0).decision, IncrementDecision::Percentage(5));
    }

    #[test]
    fn bag_rules_follow_priority_order() {
        let zipper_and_die = record(
            "BOLSA",
            &[(fields::DISPOSITIVO_1, "ZIPPER"), (fields::TROQUEL_1, "TR013")],
        );
        assert_eq!(IncrementRule::select(&zipper_and_die), IncrementRule::ZipperBag);
        assert_eq!(
            decide(&zipper_and_die, 1.0).decision,
            IncrementDecision::Percentage(8)
        );

        let die = record("BOLSA", &[(fields::TROQUEL_2, "TR013")]);
        assert_eq!(IncrementRule::select(&die), IncrementRule::DieCutBag);
        assert_eq!(decide(&die, 1.0).decision, IncrementDecision::Percentage(7));

        let low_die = record("BOLSA", &[(fields::TROQUEL_2, "TR007")]);
        assert_eq!(IncrementRule::select(&low_die), IncrementRule::Bag);
    }

    #[test]
    fn other_products_are_unpriced() {
        let record = record("LAMINA", &[]);
        let outcome = decide(&record, 0.2);
        assert_eq!(outcome.rule, IncrementRule::Unpriced);
        assert_eq!(outcome.decision, IncrementDecision::NotRequired);
    }

    #[test]
    fn small_positive_increment_rounds_to_zero_percent() {
        let record = record("BOLSA", &[]);
        let outcome = decide(&record, 1.057);
        assert_eq!(outcome.decision, IncrementDecision::Percentage(0));
    }

    #[test]
    fn decision_serializes_as_text() {
        let encoded = serde_json::to_string(&IncrementDecision::Percentage(12)).expect("json");
        assert_eq!(encoded, "\"12%\"");
    }
}
