//! Literal `{token}` substitution
//!
//! Templates are scanned once from left to right. Each `{name}` whose name
//! the lookup knows is replaced by its value; inserted values are never
//! scanned again, and unknown tokens are copied through untouched.

/// Replace every known `{token}` in `template`
///
/// # Example
/// ```rust
/// use hyperite::layout::substitute;
///
/// let out = substitute("Hi {name}! {unknown}", |token| match token {
///     "name" => Some("{name}"),
///     _ => None,
/// });
/// assert_eq!(out, "Hi {name}! {unknown}");
/// ```
pub fn substitute<'v, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let token = &after[..close];
                match lookup(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // unterminated, or another '{' starts first: keep this brace literally
            _ => {
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
    use std::collections::HashMap;

    fn from_map<'a>(
        map: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<&'static str> + 'a {
        move |token| map.get(token).copied()
    }

    #[test]
    fn test_replaces_known_tokens() {
        let values = HashMap::from([("title", "Welcome"), ("content", "Hello")]);
        assert_eq!(
            substitute("<h1>{title}</h1><p>{content}</p>", from_map(&values)),
            "<h1>Welcome</h1><p>Hello</p>"
        );
    }

    #[test]
    fn test_repeated_tokens() {
        let values = HashMap::from([("x", "1")]);
        assert_eq!(substitute("{x}+{x}={x}{x}", from_map(&values)), "1+1=11");
    }

    #[test]
    fn test_unknown_tokens_are_left_intact() {
        let values = HashMap::from([("name", "A")]);
        assert_eq!(substitute("{greeting} {name}", from_map(&values)), "{greeting} A");
    }

    #[test]
    fn test_inserted_values_are_not_expanded() {
        let values = HashMap::from([("title", "{content}"), ("content", "body")]);
        assert_eq!(substitute("{title}|{content}", from_map(&values)), "{content}|body");
    }

    #[test]
    fn test_stray_braces() {
        let values = HashMap::from([("title", "T")]);
        assert_eq!(substitute("{{title}}", from_map(&values)), "{T}");
        assert_eq!(substitute("a { b", from_map(&values)), "a { b");
        assert_eq!(substitute("} {title", from_map(&values)), "} {title");
        assert_eq!(substitute("{}", from_map(&values)), "{}");
    }

    #[test]
    fn test_multibyte_text() {
        let values = HashMap::from([("name", "Zoë")]);
        assert_eq!(substitute("¡Hola {name}! ✓", from_map(&values)), "¡Hola Zoë! ✓");
    }
}
