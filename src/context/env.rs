/// Selects `<prefix>_<NAME>` variables and maps them to lower-cased `<name>`.
///
/// Empty names (the bare `<prefix>_` variable) are skipped.
pub(crate) fn prefixed_vars(
    vars: impl IntoIterator<Item = (String, String)>,
    prefix: &str,
) -> Vec<(String, String)> {
    let prefix_with_sep = format!("{prefix}_");
    let mut selected: Vec<(String, String)> = vars
        .into_iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(&prefix_with_sep)?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_lowercase(), value))
        })
        .collect();

    // std::env::vars() order is platform dependent
    selected.sort();
    selected
}
