use regex::Regex;
use std::sync::OnceLock;

fn re_unsafe_chars() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("invalid regex"))
}

/// Reduce an arbitrary client-supplied filename to a flat, ASCII-only name
/// that is safe to join onto a storage directory.
///
/// Non-ASCII characters are dropped, path separators become whitespace,
/// whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is removed and
/// leading/trailing `.` and `_` are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    re_unsafe_chars()
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Filename without its final extension. A leading dot does not start an extension.
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}
