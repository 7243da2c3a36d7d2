//! `application/x-www-form-urlencoded` field extraction over raw bytes
//!
//! Page content is an arbitrary byte sequence, so values are decoded to
//! `Vec<u8>` without passing through UTF-8.

use percent_encoding::percent_decode;

/// Decoded value of the first field named `name`, if present
pub fn form_field(raw: &[u8], name: &str) -> Option<Vec<u8>> {
    raw.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = match pair.iter().position(|&b| b == b'=') {
                Some(at) => (&pair[..at], &pair[at + 1..]),
                None => (pair, &pair[pair.len()..]),
            };
            (decode_component(key) == name.as_bytes()).then(|| decode_component(value))
        })
}

/// `+` is a space; `%XX` escapes are raw bytes
fn decode_component(input: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = input
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}
