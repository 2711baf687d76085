// q_shared.rs -- string helpers shared between the engine and the menus
//
// Info strings, the console token parser and the colour-aware string
// comparisons used by sortable menu tables.

use std::cmp::Ordering;

pub const MAX_TOKEN_CHARS: usize = 1024;
pub const MAX_INFO_KEY: usize = 64;
pub const MAX_INFO_VALUE: usize = 64;
pub const MAX_INFO_STRING: usize = 512;

/// Colour escape marker, followed by a digit (`^1red`).
pub const COLOR_ESCAPE: u8 = b'^';

// ============================================================
// String comparison (case-insensitive)
// ============================================================

pub fn q_stricmp(s1: &str, s2: &str) -> Ordering {
    let a = s1.bytes().map(|c| c.to_ascii_lowercase());
    let b = s2.bytes().map(|c| c.to_ascii_lowercase());
    a.cmp(b)
}

/// True if `s` starts with a `^N` colour escape.
#[inline]
pub fn is_color_string(s: &[u8]) -> bool {
    s.len() >= 2 && s[0] == COLOR_ESCAPE && s[1].is_ascii_digit()
}

/// Strip `^N` colour escapes from a string.
pub fn remove_color_codes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if is_color_string(&bytes[i..]) {
            i += 2;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    // only ASCII pairs were removed, so the rest is still valid UTF-8
    String::from_utf8(out).unwrap_or_default()
}

/// Case-insensitive comparison that skips colour escapes on both sides.
pub fn colorstricmp(s1: &str, s2: &str) -> Ordering {
    q_stricmp(&remove_color_codes(s1), &remove_color_codes(s2))
}

// ============================================================
// Token parser (COM_Parse equivalent)
// ============================================================

/// Parse one token from `data`, skipping whitespace and `//` comments and
/// honouring "quoted strings". Returns the token and the unparsed rest, or
/// `None` once the data is exhausted.
pub fn com_parse(data: &str) -> Option<(String, &str)> {
    let bytes = data.as_bytes();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && bytes[pos] <= b' ' {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }

        if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        break;
    }

    if bytes[pos] == b'"' {
        let start = pos + 1;
        let end = data[start..].find('"').map_or(data.len(), |off| start + off);
        let token = clamp_token(&data[start..end]);
        let rest = if end < data.len() { &data[end + 1..] } else { "" };
        return Some((token, rest));
    }

    let start = pos;
    while pos < bytes.len() && bytes[pos] > b' ' {
        pos += 1;
    }
    Some((clamp_token(&data[start..pos]), &data[pos..]))
}

fn clamp_token(s: &str) -> String {
    if s.len() < MAX_TOKEN_CHARS {
        return s.to_string();
    }
    let mut end = MAX_TOKEN_CHARS - 1;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

// ============================================================
// Info string functions
// ============================================================

/// Iterate the `(key, value)` pairs of a `\key\value\...` string.
/// A trailing key without a value is dropped.
pub fn info_pairs(s: &str) -> impl Iterator<Item = (&str, &str)> {
    let body = s.strip_prefix('\\').unwrap_or(s);
    let mut parts = body.split('\\');
    std::iter::from_fn(move || {
        let key = parts.next()?;
        let value = parts.next()?;
        Some((key, value))
    })
}

/// Search info string `s` for `key`, return value or empty string.
pub fn info_value_for_key(s: &str, key: &str) -> String {
    info_pairs(s)
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default()
}

/// Remove a key (and its value) from an info string.
pub fn info_remove_key(s: &mut String, key: &str) {
    if key.contains('\\') {
        return;
    }

    let mut result = String::with_capacity(s.len());
    for (k, v) in info_pairs(s) {
        if k == key {
            continue;
        }
        result.push('\\');
        result.push_str(k);
        result.push('\\');
        result.push_str(v);
    }
    *s = result;
}

pub fn info_validate(s: &str) -> bool {
    !s.contains('"') && !s.contains(';')
}

/// Set a key/value pair in an info string. Invalid or oversized pairs are
/// ignored; an empty value just removes the key.
pub fn info_set_value_for_key(s: &mut String, key: &str, value: &str) {
    if key.contains('\\') || value.contains('\\') {
        return;
    }
    if key.contains(';') || !info_validate(key) || !info_validate(value) {
        return;
    }
    if key.len() >= MAX_INFO_KEY || value.len() >= MAX_INFO_VALUE {
        return;
    }

    info_remove_key(s, key);

    if value.is_empty() {
        return;
    }

    let newi = format!("\\{}\\{}", key, value);
    if newi.len() + s.len() > MAX_INFO_STRING {
        return;
    }

    // only printable ASCII goes into info strings
    s.extend(newi.bytes().filter(|c| (32..127).contains(c)).map(char::from));
}

// ============================================================
// Tests
// ============================================================
