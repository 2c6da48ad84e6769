use super::domain::{fields, PartAttributes, RawAttributes};
use std::collections::HashMap;
use std::sync::OnceLock;

static FIELD_RENAMES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Source field codes exposed by the part query and the domain names they map to.
pub const RENAME_TABLE: [(&str, &str); 18] = [
    ("PartPlant_PartNum", fields::PART),
    ("Part_ShortChar02", fields::TIPO_PRODUCTO),
    ("Part_ShortChar04", fields::ESTRUCTURA),
    ("Part_ShortChar05", fields::ESTRUCTURA_2),
    ("Part_ShortChar03", fields::TIPO_BOLSA),
    ("Part_ShortChar10", fields::TIPO_SELLADO),
    ("UD02_ShortChar05", fields::TIPO_MONTAJE),
    ("Part_Number01", fields::ANCHO),
    ("Part_Number02", fields::LARGO),
    ("Part_Number03", fields::CALIBRE_2),
    ("Part_Character07", fields::DISPOSITIVO_1),
    ("Part_Character08", fields::DISPOSITIVO_2),
    ("Part_Character06", fields::DISPOSITIVO_3),
    ("Part_Dispositivo4_c", fields::DISPOSITIVO_4),
    ("UD02_ShortChar03", fields::TROQUEL_1),
    ("Part_UserChar4", fields::TROQUEL_2),
    ("Part_DobleCorte_c", fields::DOBLE_CORTE),
    ("Part_ShortChar01", fields::TIPO_IMPRESION),
];

fn field_renames() -> &'static HashMap<&'static str, &'static str> {
    FIELD_RENAMES.get_or_init(|| RENAME_TABLE.iter().copied().collect())
}

/// Domain name for a source code; unknown codes pass through unchanged.
pub fn domain_name(code: &str) -> &str {
    field_renames().get(code).copied().unwrap_or(code)
}

/// Renames every key of `raw` and collects the values into a typed record.
pub fn map_attributes(raw: &RawAttributes) -> PartAttributes {
    let mut attributes = PartAttributes::default();
    for (code, value) in raw {
        attributes.assign(domain_name(code), value.clone());
    }
    attributes
}
