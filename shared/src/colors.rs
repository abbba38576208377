/// Fill opacity for area layers.
pub const AREA_FILL_OPACITY: f64 = 0.3;

/// Fill color for an area: `#11` followed by four hex digits taken from the
/// CRC32 hash of the area id. Stable across reloads, carries no meaning
/// beyond telling neighbouring areas apart.
pub fn area_fill_color(area_id: i64) -> String {
    let hash = crc32fast::hash(&area_id.to_be_bytes());
    let bytes = hash.to_be_bytes();
    format!("#11{:02X}{:02X}", bytes[0], bytes[1])
}
