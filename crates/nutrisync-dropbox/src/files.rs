//! File request builders and the `Dropbox-API-Arg` header encoding.

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Request Builders
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Upload arg header: replace whatever is at `path`, never rename.
pub fn build_overwrite_arg(path: &str) -> serde_json::Value {
    serde_json::json!({
        "path": path,
        "mode": "overwrite",
        "autorename": false,
    })
}

/// Build a get_metadata request body.
pub fn build_get_metadata(path: &str) -> serde_json::Value {
    serde_json::json!({
        "path": path,
        "include_media_info": false,
        "include_deleted": false,
        "include_has_explicit_shared_members": false,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Header encoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Serialise `value` as JSON that is safe inside an HTTP header.
///
/// Dropbox rejects raw non-ASCII bytes in `Dropbox-API-Arg`, so every
/// character above U+007F (and DEL) is written as a `\uXXXX` escape,
/// using surrogate pairs outside the BMP.
pub fn header_safe_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_string(value)?;
    let mut out = String::with_capacity(raw.len());
    let mut units = [0u16; 2];
    for c in raw.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(out)
}
