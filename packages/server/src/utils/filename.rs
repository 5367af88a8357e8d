use chrono::Utc;
use uuid::Uuid;

/// Replace everything outside `[A-Za-z0-9._-]` with `-`.
pub fn sanitize(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Storage key for an upload: `{prefix}/{unix_millis}-{random}-{sanitized}`.
/// Every call yields a distinct key; stored objects are never overwritten.
pub fn unique_key(prefix: &str, filename: &str) -> String {
    format!(
        "{}/{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        sanitize(filename)
    )
}
