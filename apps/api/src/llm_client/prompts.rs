// Shared prompt constants and prompt-building utilities.
// Each task that needs LLM calls defines its own template in aeo/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only, matching the requested schema exactly. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Replaces each `{name}` placeholder in `template` with its value, verbatim.
/// Single pass: braces inside substituted values are never re-expanded.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let out = render("Q: {q}\nAgain: {q}\nT: {t}", &[("q", "what is AEO"), ("t", "body")]);
        assert_eq!(out, "Q: what is AEO\nAgain: what is AEO\nT: body");
    }

    #[test]
    fn test_render_keeps_values_verbatim() {
        let out = render("{text}", &[("text", "<b>\"quoted\" {braces}</b>")]);
        assert_eq!(out, "<b>\"quoted\" {braces}</b>");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        let out = render("{text} / {question}", &[("text", "{question}"), ("question", "why")]);
        assert_eq!(out, "{question} / why");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{a} {b}", &[("a", "1")]), "1 {b}");
    }
}
