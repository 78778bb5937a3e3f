use encoding_rs::Encoding;

/// Decodes SVG bytes, honoring a BOM or an XML `encoding="..."` declaration.
pub(crate) fn decode_svg_bytes(body: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        let (decoded, _) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return decoded.into_owned();
    }

    if let Some(label) = parse_encoding_from_xml_declaration(body) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    String::from_utf8_lossy(body).to_string()
}

pub(crate) fn parse_encoding_from_xml_declaration(body: &[u8]) -> Option<String> {
    if !body.starts_with(b"<?xml") {
        return None;
    }

    let end = body.windows(2).position(|window| window == b"?>")?;
    let declaration = String::from_utf8_lossy(&body[..end]);
    let lower = declaration.to_ascii_lowercase();
    let start = lower.find("encoding")? + "encoding".len();
    let remainder = declaration[start..].trim_start().strip_prefix('=')?.trim_start();

    let quote = remainder.chars().next().filter(|ch| *ch == '"' || *ch == '\'')?;
    let value = &remainder[1..];
    let close = value.find(quote)?;
    let label = value[..close].trim();
    if label.is_empty() {
        return None;
    }

    Some(label.to_owned())
}
