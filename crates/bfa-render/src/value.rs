use bfa_annotator::{BinaryRegion, BinaryRegionType};

/// Elements shown for an array region before eliding the rest.
const MAX_ARRAY_ITEMS: usize = 8;

/// The bytes of `region`, clipped to the buffer.
pub(crate) fn region_bytes<'a>(region: &BinaryRegion, buffer: &'a [u8]) -> &'a [u8] {
    let start = usize::try_from(region.offset).map_or(buffer.len(), |s| s.min(buffer.len()));
    let end = usize::try_from(region.end()).map_or(buffer.len(), |e| e.min(buffer.len()));
    buffer.get(start..end).unwrap_or(&[])
}

/// Upper-case hex, space separated, at most `max` bytes followed by
/// ` ...` when more were left out.
pub(crate) fn hex_bytes(bytes: &[u8], max: usize) -> String {
    let shown: Vec<String> = bytes.iter().take(max).map(|b| format!("{b:02X}")).collect();
    let mut hex = shown.join(" ");
    if bytes.len() > max {
        hex.push_str(" ...");
    }
    hex
}

/// Human-readable value of a region decoded from its bytes.
pub(crate) fn region_value(region: &BinaryRegion, bytes: &[u8]) -> String {
    if (bytes.len() as u64) < region.length {
        return "<out of bounds>".to_string();
    }
    if region.array_length.is_some() {
        array_value(region.region_type, bytes)
    } else {
        scalar_value(region, bytes)
    }
}

fn array_value(region_type: BinaryRegionType, bytes: &[u8]) -> String {
    match region_type {
        BinaryRegionType::Char => format!("{:?}", String::from_utf8_lossy(bytes)),
        BinaryRegionType::Unknown => String::new(),
        _ => {
            let width = usize::try_from(region_type.width()).unwrap_or(1);
            let items: Vec<String> = bytes
                .chunks_exact(width)
                .take(MAX_ARRAY_ITEMS)
                .map(|chunk| element_text(region_type, chunk))
                .collect();
            let more = if bytes.len() / width > MAX_ARRAY_ITEMS { ", ..." } else { "" };
            format!("[{}{more}]", items.join(", "))
        }
    }
}

fn scalar_value(region: &BinaryRegion, bytes: &[u8]) -> String {
    let location = region
        .points_to_offset
        .map(|target| format!(" Loc: 0x{target:04X}"))
        .unwrap_or_default();
    let text = match region.region_type {
        BinaryRegionType::UOffset => le::<4>(bytes)
            .map(u32::from_le_bytes)
            .map(|raw| format!("0x{raw:08X} ({raw}){location}")),
        BinaryRegionType::SOffset => le::<4>(bytes)
            .map(i32::from_le_bytes)
            .map(|raw| format!("0x{raw:08X} ({raw}){location}")),
        BinaryRegionType::VOffset | BinaryRegionType::Uint16 => le::<2>(bytes)
            .map(u16::from_le_bytes)
            .map(|raw| format!("0x{raw:04X} ({raw})")),
        BinaryRegionType::Char => bytes.first().map(|b| format!("0x{b:02X}")),
        BinaryRegionType::Uint8 => bytes.first().map(|b| format!("0x{b:02X} ({b})")),
        BinaryRegionType::Int8 => le::<1>(bytes)
            .map(i8::from_le_bytes)
            .map(|v| format!("0x{v:02X} ({v})")),
        BinaryRegionType::Int16 => le::<2>(bytes)
            .map(i16::from_le_bytes)
            .map(|v| format!("0x{v:04X} ({v})")),
        BinaryRegionType::Uint32 => le::<4>(bytes)
            .map(u32::from_le_bytes)
            .map(|v| format!("0x{v:08X} ({v})")),
        BinaryRegionType::Int32 => le::<4>(bytes)
            .map(i32::from_le_bytes)
            .map(|v| format!("0x{v:08X} ({v})")),
        BinaryRegionType::Uint64 => le::<8>(bytes)
            .map(u64::from_le_bytes)
            .map(|v| format!("0x{v:016X} ({v})")),
        BinaryRegionType::Int64 => le::<8>(bytes)
            .map(i64::from_le_bytes)
            .map(|v| format!("0x{v:016X} ({v})")),
        BinaryRegionType::Bool | BinaryRegionType::Float | BinaryRegionType::Double => {
            Some(element_text(region.region_type, bytes))
        }
        BinaryRegionType::Unknown => Some(String::new()),
    };
    text.unwrap_or_else(|| "<out of bounds>".to_string())
}

/// Decimal text of one element.
fn element_text(region_type: BinaryRegionType, bytes: &[u8]) -> String {
    let text = match region_type {
        BinaryRegionType::Bool => bytes.first().map(|b| (*b != 0).to_string()),
        BinaryRegionType::Char => bytes.first().map(|b| format!("{:?}", char::from(*b))),
        BinaryRegionType::Uint8 | BinaryRegionType::Unknown => bytes.first().map(u8::to_string),
        BinaryRegionType::Int8 => le::<1>(bytes).map(|b| i8::from_le_bytes(b).to_string()),
        BinaryRegionType::Uint16 | BinaryRegionType::VOffset => {
            le::<2>(bytes).map(|b| u16::from_le_bytes(b).to_string())
        }
        BinaryRegionType::Int16 => le::<2>(bytes).map(|b| i16::from_le_bytes(b).to_string()),
        BinaryRegionType::Uint32 | BinaryRegionType::UOffset => {
            le::<4>(bytes).map(|b| u32::from_le_bytes(b).to_string())
        }
        BinaryRegionType::Int32 | BinaryRegionType::SOffset => {
            le::<4>(bytes).map(|b| i32::from_le_bytes(b).to_string())
        }
        BinaryRegionType::Uint64 => le::<8>(bytes).map(|b| u64::from_le_bytes(b).to_string()),
        BinaryRegionType::Int64 => le::<8>(bytes).map(|b| i64::from_le_bytes(b).to_string()),
        BinaryRegionType::Float => le::<4>(bytes).map(|b| f32::from_le_bytes(b).to_string()),
        BinaryRegionType::Double => le::<8>(bytes).map(|b| f64::from_le_bytes(b).to_string()),
    };
    text.unwrap_or_default()
}

fn le<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_truncated_after_max_bytes() {
        assert_eq!(hex_bytes(&[0x0C, 0, 0, 0], 8), "0C 00 00 00");
        assert_eq!(hex_bytes(&[1, 2, 3, 4, 5], 3), "01 02 03 ...");
        assert_eq!(hex_bytes(&[], 8), "");
    }

    #[test]
    fn offsets_show_their_target() {
        let region = BinaryRegion::pointer(0, BinaryRegionType::UOffset, 12, "root");
        assert_eq!(
            region_value(&region, &[12, 0, 0, 0]),
            "0x0000000C (12) Loc: 0x000C"
        );
        let soffset = BinaryRegion::pointer(12, BinaryRegionType::SOffset, 20, "vtable");
        assert_eq!(
            region_value(&soffset, &(-8i32).to_le_bytes()),
            "0xFFFFFFF8 (-8) Loc: 0x0014"
        );
    }

    #[test]
    fn scalars_show_hex_and_decimal() {
        let int = BinaryRegion::scalar(0, BinaryRegionType::Int32, "");
        assert_eq!(region_value(&int, &42i32.to_le_bytes()), "0x0000002A (42)");
        let short = BinaryRegion::scalar(0, BinaryRegionType::Int16, "");
        assert_eq!(region_value(&short, &(-1i16).to_le_bytes()), "0xFFFF (-1)");
        let float = BinaryRegion::scalar(0, BinaryRegionType::Float, "");
        assert_eq!(region_value(&float, &1.5f32.to_le_bytes()), "1.5");
        let flag = BinaryRegion::scalar(0, BinaryRegionType::Bool, "");
        assert_eq!(region_value(&flag, &[1]), "true");
    }

    #[test]
    fn arrays_are_listed_or_quoted() {
        let text = BinaryRegion::array(0, BinaryRegionType::Char, 2, "");
        assert_eq!(region_value(&text, b"hi"), "\"hi\"");
        let items = BinaryRegion::array(0, BinaryRegionType::Uint8, 3, "");
        assert_eq!(region_value(&items, &[1, 2, 3]), "[1, 2, 3]");
        let many = BinaryRegion::array(0, BinaryRegionType::Uint8, 10, "");
        assert_eq!(
            region_value(&many, &[0; 10]),
            "[0, 0, 0, 0, 0, 0, 0, 0, ...]"
        );
        let unknown = BinaryRegion::unknown(0, 2, "");
        assert_eq!(region_value(&unknown, &[9, 9]), "");
    }

    #[test]
    fn short_buffer_is_reported() {
        let int = BinaryRegion::scalar(0, BinaryRegionType::Int32, "");
        assert_eq!(region_value(&int, &[1, 2]), "<out of bounds>");
    }
}
