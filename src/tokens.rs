//! `[KEY]` token substitution for paths and link targets.
use crate::config::Variables;

/// Suffix marking a file whose content goes through the template engine.
pub const TEMPLATE_MARKER: &str = ".tpl";

/// Replace every `[KEY]` whose `KEY` is defined in `vars` with its value.
///
/// Unknown keys and unbalanced brackets are copied verbatim.  The input is
/// scanned once from left to right, so substituted values are never scanned
/// again and the result does not depend on variable order.
#[must_use]
pub fn substitute(input: &str, vars: &Variables) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('[') {
        let (before, from_open) = rest.split_at(open);
        out.push_str(before);
        let replaced = from_open
            .find(']')
            .and_then(|close| Some((vars.get(from_open.get(1..close)?)?, close)));
        if let Some((value, close)) = replaced {
            out.push_str(value);
            rest = from_open.get(close + 1..).unwrap_or_default();
        } else {
            out.push('[');
            rest = from_open.get(1..).unwrap_or_default();
        }
    }
    out.push_str(rest);
    out
}

/// `true` when `path` carries the template marker.
#[must_use]
pub fn is_template(path: &str) -> bool {
    path.ends_with(TEMPLATE_MARKER)
}

/// Remove one trailing template marker, if present.
#[must_use]
pub fn strip_template_marker(path: &str) -> &str {
    path.strip_suffix(TEMPLATE_MARKER).unwrap_or(path)
}

/// Destination-relative path for a catalog path: substituted, then stripped
/// of one template marker.
#[must_use]
pub fn output_path(relative: &str, vars: &Variables) -> String {
    let substituted = substitute(relative, vars);
    strip_template_marker(&substituted).to_string()
}
