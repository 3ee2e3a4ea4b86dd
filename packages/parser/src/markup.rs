//! Attribute names and formatting rules shared by the serializer and the
//! reconstruction pass

pub const ATTR_ID: &str = "id";
pub const ATTR_KIND: &str = "kind";
pub const ATTR_INSTANCE_REF: &str = "instance-ref";
pub const ATTR_NAME: &str = "name";
pub const ATTR_OWNERSHIP_TYPE: &str = "ownership-type";
pub const ATTR_COMPONENT_ID: &str = "component-id";
pub const ATTR_OWNER_ID: &str = "owner-id";
pub const ATTR_STYLE: &str = "style";
pub const STATE_PREFIX: &str = "data-state-";

/// Inert first child of any element that carries a binding
pub const BINDINGS_MARKER: &str = "/* has-bindings */";

const METADATA_ATTRS: [&str; 7] = [
    ATTR_ID,
    ATTR_KIND,
    ATTR_INSTANCE_REF,
    ATTR_NAME,
    ATTR_OWNERSHIP_TYPE,
    ATTR_COMPONENT_ID,
    ATTR_OWNER_ID,
];

const SIZE_KEYS: [&str; 6] = ["width", "height", "padding", "margin", "gap", "fontsize"];

/// Identity metadata written by the serializer
pub fn is_metadata_attr(name: &str) -> bool {
    METADATA_ATTRS.contains(&name)
}

/// Names a plain attribute or event may not use
pub fn is_reserved_attr(name: &str) -> bool {
    is_metadata_attr(name) || name == ATTR_STYLE || name.starts_with(STATE_PREFIX)
}

/// `minWidth`, `padding-top`, `fontSize` ... get `px` appended to bare numbers
pub fn is_size_key(key: &str) -> bool {
    let folded: String = key
        .chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    SIZE_KEYS.iter().any(|size| folded.contains(size))
}

/// Text that cannot be written as a bare JSX text child
pub fn needs_string_wrapper(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.contains(['{', '}', '<', '>', '\n', '\r'])
}

/// Valid JS identifier usable as a bare object key
pub fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// JSON-style double-quoted string
pub fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// JSX attribute strings take no backslash escapes, only HTML entities
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the entities of a JSX attribute string. Unknown entities are kept as written.
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = match name.strip_prefix('#')? {
                hex if hex.starts_with(['x', 'X']) => u32::from_str_radix(&hex[1..], 16).ok()?,
                dec => dec.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
