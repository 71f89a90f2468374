use std::borrow::Cow;

/// Rewrite dot-prefixed references inside mustache tags into Handlebars paths.
///
/// `{{.NAME}}` becomes `{{this.NAME}}`, `{{#if .FLAG}}` becomes
/// `{{#if this.FLAG}}` and a bare `{{.}}` becomes `{{this}}`.  Text outside
/// tags, string literals, comments, raw blocks, escaped `\{{` and Handlebars'
/// own `./` and `../` paths are left untouched.
#[must_use]
pub fn normalize_dot_paths(source: &str) -> Cow<'_, str> {
    if !source.contains("{{") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len() + 16);
    let mut rest = source;
    while let Some(open) = rest.find("{{") {
        let (text, tail) = rest.split_at(open);
        out.push_str(text);

        if text.ends_with('\\') {
            out.push_str("{{");
            rest = tail.get(2..).unwrap_or_default();
            continue;
        }

        let verbatim_end = if tail.starts_with("{{{{") {
            tail.find("{{{{/")
                .and_then(|start| Some(start + tail.get(start..)?.find("}}}}")? + 4))
        } else if tail.starts_with("{{!--") {
            tail.find("--}}").map(|end| end + 4)
        } else if tail.starts_with("{{!") {
            tail.find("}}").map(|end| end + 2)
        } else {
            None
        };
        if let Some(end) = verbatim_end {
            out.push_str(tail.get(..end).unwrap_or(tail));
            rest = tail.get(end..).unwrap_or_default();
            continue;
        }

        // Unterminated tags are left for the parser to report.
        let Some(close) = tail.find("}}") else {
            out.push_str(tail);
            return Cow::Owned(out);
        };
        let body = tail.get(2..close).unwrap_or_default();
        out.push_str("{{");
        rewrite_expression(body, &mut out);
        rest = tail.get(close..).unwrap_or_default();
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn rewrite_expression(body: &str, out: &mut String) {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                out.push(c);
            }
            None if c == '.' && starts_token(prev) => match chars.peek() {
                Some(&next) if next.is_alphanumeric() || next == '_' => out.push_str("this."),
                None => out.push_str("this"),
                Some(&next) if next.is_whitespace() || matches!(next, '}' | '~' | ')') => {
                    out.push_str("this");
                }
                Some(_) => out.push('.'),
            },
            None => out.push(c),
        }
        prev = Some(c);
    }
}

fn starts_token(prev: Option<char>) -> bool {
    prev.is_none_or(|p| p.is_whitespace() || matches!(p, '(' | '=' | '~' | '#' | '^' | '&' | '>' | '{'))
}
