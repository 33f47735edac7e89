/// Environment key carrying the operator-supplied tag of a step.
pub const DEFAULT_TAG_KEY: &str = "REMOTE_TAG_NAME";

/// Returns the value of the first `KEY=VALUE` entry whose key is `key`,
/// or an empty string. Entries without `=` are skipped.
pub fn extract_tag<S: AsRef<str>>(env: &[S], key: &str) -> String {
    env.iter()
        .filter_map(|e| e.as_ref().split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default()
}
