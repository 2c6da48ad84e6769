use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record as returned by the engineering-data API, keyed by opaque field codes.
pub type RawAttributes = serde_json::Map<String, Value>;

/// Domain field names produced by the rename table.
pub mod fields {
    pub const PART: &str = "Part";
    pub const TIPO_PRODUCTO: &str = "TipoProducto";
    pub const ESTRUCTURA: &str = "Estructura";
    pub const ESTRUCTURA_2: &str = "Estructura 2";
    pub const TIPO_BOLSA: &str = "TipoBolsa";
    pub const TIPO_SELLADO: &str = "TipoSellado";
    pub const TIPO_MONTAJE: &str = "Tipo de montaje";
    pub const ANCHO: &str = "Ancho";
    pub const LARGO: &str = "Largo";
    pub const CALIBRE_2: &str = "Calibre2";
    pub const DISPOSITIVO_1: &str = "Dispositivo 1";
    pub const DISPOSITIVO_2: &str = "Dispositivo 2";
    pub const DISPOSITIVO_3: &str = "Dispositivo 3";
    pub const DISPOSITIVO_4: &str = "Dispositivo 4";
    pub const TROQUEL_1: &str = "Troquel 1";
    pub const TROQUEL_2: &str = "Troquel 2";
    pub const DOBLE_CORTE: &str = "DobleCorte_c";
    pub const TIPO_IMPRESION: &str = "Tipo de impresion";

    pub const GRUPO_FORMATO: &str = "GrupoFormato";
    pub const IMPRESO: &str = "Impreso";
    pub const CALIBRE: &str = "Calibre";
    pub const VALVULA: &str = "Valvula";
    pub const USO_ZIPPER: &str = "UsoZipper";
    pub const GRADO_TROQUEL: &str = "GradoTroquel";
}

/// Categorical columns the price model consumes, in training-frame order.
pub const MODEL_INPUT_COLUMNS: [&str; 10] = [
    fields::ESTRUCTURA,
    fields::TIPO_PRODUCTO,
    fields::TIPO_BOLSA,
    fields::TIPO_SELLADO,
    fields::GRUPO_FORMATO,
    fields::IMPRESO,
    fields::CALIBRE,
    fields::VALVULA,
    fields::GRADO_TROQUEL,
    fields::USO_ZIPPER,
];

/// Sentinel written into fields that do not apply to roll stock.
pub const NOT_APPLICABLE: &str = "NO APLICA";

/// Part attributes after renaming, one optional slot per known domain field.
///
/// Keys the rename table does not know about are preserved in `extra` so that
/// nothing the API sends is silently lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartAttributes {
    pub part: Option<String>,
    pub tipo_producto: Option<String>,
    pub estructura: Option<String>,
    pub estructura_2: Option<String>,
    pub tipo_bolsa: Option<String>,
    pub tipo_sellado: Option<String>,
    pub tipo_montaje: Option<String>,
    pub ancho: Option<Value>,
    pub largo: Option<Value>,
    pub calibre: Option<Value>,
    pub dispositivos: [Option<String>; 4],
    pub troqueles: [Option<String>; 2],
    pub doble_corte: Option<String>,
    pub tipo_impresion: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl PartAttributes {
    /// Stores `value` under the domain field `name`. JSON `null` counts as absent
    /// for known fields.
    pub fn assign(&mut self, name: &str, value: Value) {
        let slot = match name {
            fields::PART => &mut self.part,
            fields::TIPO_PRODUCTO => &mut self.tipo_producto,
            fields::ESTRUCTURA => &mut self.estructura,
            fields::ESTRUCTURA_2 => &mut self.estructura_2,
            fields::TIPO_BOLSA => &mut self.tipo_bolsa,
            fields::TIPO_SELLADO => &mut self.tipo_sellado,
            fields::TIPO_MONTAJE => &mut self.tipo_montaje,
            fields::DISPOSITIVO_1 => &mut self.dispositivos[0],
            fields::DISPOSITIVO_2 => &mut self.dispositivos[1],
            fields::DISPOSITIVO_3 => &mut self.dispositivos[2],
            fields::DISPOSITIVO_4 => &mut self.dispositivos[3],
            fields::TROQUEL_1 => &mut self.troqueles[0],
            fields::TROQUEL_2 => &mut self.troqueles[1],
            fields::DOBLE_CORTE => &mut self.doble_corte,
            fields::TIPO_IMPRESION => &mut self.tipo_impresion,
            fields::ANCHO => {
                self.ancho = non_null(value);
                return;
            }
            fields::LARGO => {
                self.largo = non_null(value);
                return;
            }
            fields::CALIBRE_2 => {
                self.calibre = non_null(value);
                return;
            }
            other => {
                self.extra.insert(other.to_string(), value);
                return;
            }
        };
        *slot = text_value(value);
    }

    /// Text of a field as the rules see it: absent fields read as empty.
    pub(crate) fn text(field: &Option<String>) -> &str {
        field.as_deref().unwrap_or("")
    }

    /// Flattened view keyed by domain field names.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = self.extra.clone();
        let text_fields = [
            (fields::PART, &self.part),
            (fields::TIPO_PRODUCTO, &self.tipo_producto),
            (fields::ESTRUCTURA, &self.estructura),
            (fields::ESTRUCTURA_2, &self.estructura_2),
            (fields::TIPO_BOLSA, &self.tipo_bolsa),
            (fields::TIPO_SELLADO, &self.tipo_sellado),
            (fields::TIPO_MONTAJE, &self.tipo_montaje),
            (fields::DISPOSITIVO_1, &self.dispositivos[0]),
            (fields::DISPOSITIVO_2, &self.dispositivos[1]),
            (fields::DISPOSITIVO_3, &self.dispositivos[2]),
            (fields::DISPOSITIVO_4, &self.dispositivos[3]),
            (fields::TROQUEL_1, &self.troqueles[0]),
            (fields::TROQUEL_2, &self.troqueles[1]),
            (fields::DOBLE_CORTE, &self.doble_corte),
            (fields::TIPO_IMPRESION, &self.tipo_impresion),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value {
                map.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        for (name, value) in [
            (fields::ANCHO, &self.ancho),
            (fields::LARGO, &self.largo),
            (fields::CALIBRE_2, &self.calibre),
        ] {
            if let Some(value) = value {
                map.insert(name.to_string(), value.clone());
            }
        }
        map
    }
}

fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

fn text_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

/// How derived labels are spelled. The two rule generations trained models on
/// different spellings, so the encoder must reproduce the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// "Valvula", "zipper", "Grado alto".
    Legacy,
    /// "SI"/"NO", "GRADO ALTO".
    Uppercase,
}

/// `GrupoFormato`: size band 1 (smallest) to 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatGroup(u8);

impl FormatGroup {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(band: u8) -> Self {
        Self(band.clamp(Self::MIN, Self::MAX))
    }

    pub fn band(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        format!("Grupo {}", self.0)
    }
}

/// `Impreso`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Printing {
    Printed,
    Unprinted,
}

impl Printing {
    pub fn label(self) -> &'static str {
        match self {
            Printing::Printed => "SI",
            Printing::Unprinted => "NO",
        }
    }
}

/// Spelling used for the gauge tier labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeNotation {
    /// "mayor 100" / "menor igual 100".
    Words,
    /// ">100" / "<=100".
    Symbols,
}

/// `Calibre`: whether the film gauge sits above its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeTier {
    pub threshold: i64,
    pub above: bool,
    pub notation: GaugeNotation,
}

impl GaugeTier {
    pub fn label(&self) -> String {
        match (self.notation, self.above) {
            (GaugeNotation::Words, true) => format!("mayor {}", self.threshold),
            (GaugeNotation::Words, false) => format!("menor igual {}", self.threshold),
            (GaugeNotation::Symbols, true) => format!(">{}", self.threshold),
            (GaugeNotation::Symbols, false) => format!("<={}", self.threshold),
        }
    }
}

/// `Valvula`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveUse {
    Valve,
    NoValve,
    NotApplicable,
}

impl ValveUse {
    pub fn label(self, style: LabelStyle) -> &'static str {
        match (self, style) {
            (ValveUse::NotApplicable, _) => NOT_APPLICABLE,
            (ValveUse::Valve, LabelStyle::Legacy) => "Valvula",
            (ValveUse::NoValve, LabelStyle::Legacy) => "No valvula",
            (ValveUse::Valve, LabelStyle::Uppercase) => "SI",
            (ValveUse::NoValve, LabelStyle::Uppercase) => "NO",
        }
    }
}

/// `UsoZipper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipperUse {
    Zipper,
    NoZipper,
    NotApplicable,
}

impl ZipperUse {
    pub fn label(self, style: LabelStyle) -> &'static str {
        match (self, style) {
            (ZipperUse::NotApplicable, _) => NOT_APPLICABLE,
            (ZipperUse::Zipper, LabelStyle::Legacy) => "zipper",
            (ZipperUse::NoZipper, LabelStyle::Legacy) => "no zipper",
            (ZipperUse::Zipper, LabelStyle::Uppercase) => "SI",
            (ZipperUse::NoZipper, LabelStyle::Uppercase) => "NO",
        }
    }
}

/// `GradoTroquel`: die-cutting complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DieGrade {
    Shaped,
    High,
    Low,
    NoDie,
    NotApplicable,
}

impl DieGrade {
    pub fn label(self, style: LabelStyle) -> &'static str {
        match (self, style) {
            (DieGrade::NotApplicable, _) => NOT_APPLICABLE,
            (DieGrade::Shaped, LabelStyle::Legacy) => "Troquel forma",
            (DieGrade::High, LabelStyle::Legacy) => "Grado alto",
            (DieGrade::Low, LabelStyle::Legacy) => "Grado bajo",
            (DieGrade::NoDie, LabelStyle::Legacy) => "No troquel",
            (DieGrade::Shaped, LabelStyle::Uppercase) => "TROQUEL FORMA",
            (DieGrade::High, LabelStyle::Uppercase) => "GRADO ALTO",
            (DieGrade::Low, LabelStyle::Uppercase) => "GRADO BAJO",
            (DieGrade::NoDie, LabelStyle::Uppercase) => "NO TROQUEL",
        }
    }
}

/// Mapped attributes plus the six derived categorical features.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub attributes: PartAttributes,
    pub ancho: i64,
    pub largo: i64,
    pub calibre: i64,
    pub format_group: FormatGroup,
    pub printing: Printing,
    pub gauge: GaugeTier,
    pub valve: ValveUse,
    pub zipper: ZipperUse,
    pub die_grade: DieGrade,
    pub labels: LabelStyle,
}

impl ClassifiedRecord {
    /// The ten model input columns paired with their values, in
    /// [`MODEL_INPUT_COLUMNS`] order. Absent source text stays `None`.
    pub fn model_inputs(&self) -> Vec<(&'static str, Option<String>)> {
        let attrs = &self.attributes;
        vec![
            (fields::ESTRUCTURA, attrs.estructura.clone()),
            (fields::TIPO_PRODUCTO, attrs.tipo_producto.clone()),
            (fields::TIPO_BOLSA, attrs.tipo_bolsa.clone()),
            (fields::TIPO_SELLADO, attrs.tipo_sellado.clone()),
            (fields::GRUPO_FORMATO, Some(self.format_group.label())),
            (fields::IMPRESO, Some(self.printing.label().to_string())),
            (fields::CALIBRE, Some(self.gauge.label())),
            (
                fields::VALVULA,
                Some(self.valve.label(self.labels).to_string()),
            ),
            (
                fields::GRADO_TROQUEL,
                Some(self.die_grade.label(self.labels).to_string()),
            ),
            (
                fields::USO_ZIPPER,
                Some(self.zipper.label(self.labels).to_string()),
            ),
        ]
    }

    /// Full record keyed by domain names, with integer dimensions and derived labels.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = self.attributes.to_map();
        map.insert(fields::ANCHO.to_string(), Value::from(self.ancho));
        map.insert(fields::LARGO.to_string(), Value::from(self.largo));
        map.insert(fields::CALIBRE_2.to_string(), Value::from(self.calibre));
        for (name, value) in self.model_inputs() {
            if let Some(value) = value {
                map.insert(name.to_string(), Value::String(value));
            }
        }
        map
    }

    pub fn product_type(&self) -> &str {
        PartAttributes::text(&self.attributes.tipo_producto)
    }
}
