mod catalog;
mod policy;
mod rules;

pub use catalog::{CatalogError, DieCatalog, DieClass};
pub use policy::{BoundaryMode, ClassificationPolicy, GaugePolicy, RulesVariant};

use super::domain::{
    fields, ClassifiedRecord, DieGrade, PartAttributes, ValveUse, ZipperUse, NOT_APPLICABLE,
};
use serde_json::Value;
use std::sync::Arc;

/// Stateless engine deriving the categorical model features from mapped attributes.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    policy: ClassificationPolicy,
    catalog: Arc<DieCatalog>,
}

impl ClassificationEngine {
    pub fn new(policy: ClassificationPolicy, catalog: Arc<DieCatalog>) -> Self {
        Self { policy, catalog }
    }

    pub fn for_variant(variant: RulesVariant) -> Self {
        Self::new(variant.into(), Arc::new(DieCatalog::standard()))
    }

    pub fn classify(
        &self,
        mut attributes: PartAttributes,
    ) -> Result<ClassifiedRecord, ClassificationError> {
        let product_type = attributes
            .tipo_producto
            .clone()
            .ok_or(ClassificationError::MissingField {
                field: fields::TIPO_PRODUCTO,
            })?;
        let ancho = required_integer(fields::ANCHO, attributes.ancho.as_ref())?;
        let largo = required_integer(fields::LARGO, attributes.largo.as_ref())?;
        let calibre = required_integer(fields::CALIBRE_2, attributes.calibre.as_ref())?;

        let text = PartAttributes::text;

        let dimension = if rules::uses_width(&product_type, text(&attributes.tipo_montaje)) {
            ancho
        } else {
            largo
        };
        let format_group = rules::format_group(dimension, self.policy.boundaries);
        let printing = rules::printing(text(&attributes.tipo_impresion));
        let gauge = rules::gauge(text(&attributes.estructura), calibre, self.policy.gauge);

        let (valve, zipper, die_grade) =
            if self.policy.rollo_exemption && rules::is_roll(&product_type) {
                attributes.tipo_bolsa = Some(NOT_APPLICABLE.to_string());
                attributes.tipo_sellado = Some(NOT_APPLICABLE.to_string());
                (
                    ValveUse::NotApplicable,
                    ZipperUse::NotApplicable,
                    DieGrade::NotApplicable,
                )
            } else {
                let devices: Vec<&str> = attributes.dispositivos[..3].iter().map(text).collect();
                let die_fields: Vec<&str> = attributes
                    .dispositivos
                    .iter()
                    .chain(attributes.troqueles.iter())
                    .map(text)
                    .collect();
                (
                    rules::valve(&devices),
                    rules::zipper(&devices),
                    rules::die_grade(&die_fields, &self.catalog),
                )
            };

        Ok(ClassifiedRecord {
            attributes,
            ancho,
            largo,
            calibre,
            format_group,
            printing,
            gauge,
            valve,
            zipper,
            die_grade,
            labels: self.policy.labels,
        })
    }
}

fn required_integer(field: &'static str, value: Option<&Value>) -> Result<i64, ClassificationError> {
    let value = value.ok_or(ClassificationError::MissingField { field })?;
    rules::coerce_integer(field, value)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("required field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("field '{field}' is not numeric: '{value}'")]
    Conversion { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag() -> PartAttributes {
        let mut attrs = PartAttributes::default();
        attrs.assign(fields::TIPO_PRODUCTO, json!("BOLSA"));
        attrs.assign(fields::ESTRUCTURA, json!("PET/PE"));
        attrs.assign(fields::TIPO_BOLSA, json!("STAND UP"));
        attrs.assign(fields::TIPO_SELLADO, json!("FONDO"));
        attrs.assign(fields::ANCHO, json!(180.0));
        attrs.assign(fields::LARGO, json!("640.5"));
        attrs.assign(fields::CALIBRE_2, json!(110));
        attrs.assign(fields::TIPO_IMPRESION, json!("FLEXO 8 TINTAS"));
        attrs.assign(fields::DISPOSITIVO_1, json!("ZIPPER"));
        attrs.assign(fields::DISPOSITIVO_2, json!("VALVULA DESGASIFICADORA"));
        attrs.assign(fields::TROQUEL_1, json!("TR001"));
        attrs
    }

    fn roll() -> PartAttributes {
        let mut attrs = bag();
        attrs.assign(fields::TIPO_PRODUCTO, json!("Rollo"));
        attrs.assign(fields::ESTRUCTURA, json!("PET/FOIL/PE"));
        attrs.assign(fields::TIPO_MONTAJE, json!("FRONTAL"));
        attrs.assign(fields::ANCHO, json!(820));
        attrs
    }

    #[test]
    fn current_variant_classifies_a_bag() {
        let engine = ClassificationEngine::for_variant(RulesVariant::Current);
        let record = engine.classify(bag()).expect("classifies");

        assert_eq!(record.largo, 640);
        assert_eq!(record.format_group.label(), "Grupo 4");
        assert_eq!(record.printing.label(), "SI");
        assert_eq!(record.gauge.label(), ">100");
        assert_eq!(record.valve, ValveUse::Valve);
        assert_eq!(record.zipper, ZipperUse::Zipper);
        assert_eq!(record.die_grade.label(record.labels), "GRADO ALTO");
    }

    #[test]
    fn legacy_variant_uses_its_own_labels() {
        let engine = ClassificationEngine::for_variant(RulesVariant::Legacy);
        let record = engine.classify(bag()).expect("classifies");

        assert_eq!(record.gauge.label(), "mayor 100");
        assert_eq!(record.valve.label(record.labels), "Valvula");
        assert_eq!(record.zipper.label(record.labels), "zipper");
        assert_eq!(record.die_grade.label(record.labels), "Grado alto");
    }

    #[test]
    fn roll_exemption_overrides_bag_fields() {
        let engine = ClassificationEngine::for_variant(RulesVariant::Current);
        let record = engine.classify(roll()).expect("classifies");

        assert_eq!(record.attributes.tipo_bolsa.as_deref(), Some(NOT_APPLICABLE));
        assert_eq!(record.attributes.tipo_sellado.as_deref(), Some(NOT_APPLICABLE));
        assert_eq!(record.valve, ValveUse::NotApplicable);
        assert_eq!(record.zipper, ZipperUse::NotApplicable);
        assert_eq!(record.die_grade, DieGrade::NotApplicable);
    }

    #[test]
    fn legacy_variant_has_no_roll_exemption() {
        let engine = ClassificationEngine::for_variant(RulesVariant::Legacy);
        let record = engine.classify(roll()).expect("classifies");

        assert_eq!(record.attributes.tipo_bolsa.as_deref(), Some("STAND UP"));
        assert_eq!(record.valve, ValveUse::Valve);
        assert_eq!(record.die_grade, DieGrade::High);
    }

    #[test]
    fn roll_format_group_comes_from_width_in_every_variant() {
        for variant in [RulesVariant::Current, RulesVariant::Legacy] {
            let engine = ClassificationEngine::for_variant(variant);
            let record = engine.classify(roll()).expect("classifies");
            assert_eq!(record.format_group.label(), "Grupo 5");
        }
    }

    #[test]
    fn side_mounted_width_at_boundary_depends_on_policy() {
        let mut attrs = bag();
        attrs.assign(fields::TIPO_MONTAJE, json!("lateral"));
        attrs.assign(fields::ANCHO, json!(1000));

        let inclusive = ClassificationEngine::for_variant(RulesVariant::Current)
            .classify(attrs.clone())
            .expect("classifies");
        assert_eq!(inclusive.format_group.label(), "Grupo 6");

        let strict = ClassificationEngine::for_variant(RulesVariant::Legacy)
            .classify(attrs)
            .expect("classifies");
        assert_eq!(strict.format_group.label(), "Grupo 5");
    }

    #[test]
    fn custom_policy_mixes_knobs() {
        let policy = ClassificationPolicy {
            boundaries: BoundaryMode::Strict,
            gauge: GaugePolicy::Flat,
            rollo_exemption: true,
            labels: crate::pricing::domain::LabelStyle::Legacy,
        };
        let engine = ClassificationEngine::new(policy, Arc::new(DieCatalog::standard()));
        let record = engine.classify(roll()).expect("classifies");
        assert_eq!(record.gauge.label(), ">100");
        assert_eq!(record.valve.label(record.labels), NOT_APPLICABLE);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let engine = ClassificationEngine::for_variant(RulesVariant::Current);

        let mut attrs = bag();
        attrs.tipo_producto = None;
        assert_eq!(
            engine.classify(attrs).expect_err("missing product type"),
            ClassificationError::MissingField {
                field: "TipoProducto"
            }
        );

        let mut attrs = bag();
        attrs.assign(fields::CALIBRE_2, serde_json::Value::Null);
        assert_eq!(
            engine.classify(attrs).expect_err("missing gauge"),
            ClassificationError::MissingField { field: "Calibre2" }
        );
    }

    #[test]
    fn malformed_dimension_is_a_conversion_error() {
        let engine = ClassificationEngine::for_variant(RulesVariant::Current);
        let mut attrs = bag();
        attrs.assign(fields::ANCHO, json!("ancho?"));
        assert_eq!(
            engine.classify(attrs).expect_err("conversion fails"),
            ClassificationError::Conversion {
                field: "Ancho",
                value: "ancho?".to_string()
            }
        );
    }

    #[test]
    fn absent_optional_text_reads_as_empty() {
        let mut attrs = PartAttributes::default();
        attrs.assign(fields::TIPO_PRODUCTO, json!("BOLSA"));
        attrs.assign(fields::ANCHO, json!(100));
        attrs.assign(fields::LARGO, json!(100));
        attrs.assign(fields::CALIBRE_2, json!(50));

        let record = ClassificationEngine::for_variant(RulesVariant::Current)
            .classify(attrs)
            .expect("classifies");
        assert_eq!(record.printing.label(), "NO");
        assert_eq!(record.valve, ValveUse::NoValve);
        assert_eq!(record.die_grade, DieGrade::NoDie);
        assert_eq!(record.format_group.label(), "Grupo 1");
    }
}
