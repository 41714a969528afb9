//! Template message rendering.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::TemplateData;

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

/// Replace `{key}` placeholders with values from `data`.
///
/// Placeholders with no matching key are left as written, as is an
/// unterminated `{`.
pub fn render(text: &str, data: Option<&TemplateData>) -> String {
    let Some(data) = data.filter(|d| !d.is_empty()) else {
        return text.to_string();
    };

    RE_PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match data.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
