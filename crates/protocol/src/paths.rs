/// Canonical form for paths supplied by the context collaborator:
/// forward slashes, no leading `./`, no surrounding slashes.
pub fn normalize_context_path(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");
    while value.starts_with("./") {
        value = value[2..].to_string();
    }
    let value = value.trim_matches('/');
    if value == "." {
        return String::new();
    }
    value.to_string()
}

/// Directory part of a normalized path, `None` for top-level files.
pub fn parent_directory(path: &str) -> Option<String> {
    let normalized = normalize_context_path(path);
    let (parent, _) = normalized.rsplit_once('/')?;
    if parent.is_empty() {
        return None;
    }
    Some(parent.to_string())
}
