//! Query template registry.
//!
//! Templates are GraphQL documents stored under `queries/` and embedded at
//! compile time. They are looked up by hierarchical name
//! (e.g. `github/basic`) and contain `$name` placeholder tokens that are
//! substituted textually before the query is sent. Substitution is not
//! escaping-aware; the template author is responsible for valid syntax.

/// Look up an embedded query template by name.
pub fn lookup(name: &str) -> Option<&'static str> {
    match name {
        "github/basic" => Some(include_str!("../../queries/github/basic.graphql")),
        "github/owner-repos" => Some(include_str!("../../queries/github/owner-repos.graphql")),
        "github/contributed-repos" => {
            Some(include_str!("../../queries/github/contributed-repos.graphql"))
        }
        "github/prs" => Some(include_str!("../../queries/github/prs.graphql")),
        "github/gists" => Some(include_str!("../../queries/github/gists.graphql")),
        "cloudflare/http" => Some(include_str!("../../queries/cloudflare/http.graphql")),
        _ => None,
    }
}

/// Substitute `$key` placeholders in a template with the supplied values.
///
/// Every occurrence of each placeholder is replaced; `$`-prefixed substrings
/// with no matching variable are left untouched.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut text = template.to_string();
    for (key, value) in variables {
        text = text.replace(&format!("${}", key), value);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_templates() {
        for name in [
            "github/basic",
            "github/owner-repos",
            "github/contributed-repos",
            "github/prs",
            "github/gists",
            "cloudflare/http",
        ] {
            assert!(lookup(name).is_some(), "template {} missing", name);
        }
    }

    #[test]
    fn test_lookup_unknown_template() {
        assert!(lookup("github/nope").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_render_replaces_all_occurrences() {
        let rendered = render("a=$a b=$a c=$b", &[("a", "1"), ("b", "2")]);
        assert_eq!(rendered, "a=1 b=1 c=2");
    }

    #[test]
    fn test_render_leaves_unrelated_tokens() {
        let rendered = render("date: \"$date\" tag: $account", &[("date", "2024-01-01")]);
        assert_eq!(rendered, "date: \"2024-01-01\" tag: $account");
    }

    #[test]
    fn test_render_empty_cursor() {
        let rendered = render("repositories(first: 100 $cursor)", &[("cursor", "")]);
        assert_eq!(rendered, "repositories(first: 100 )");
    }

    #[test]
    fn test_paginated_templates_carry_cursor_site() {
        for name in [
            "github/owner-repos",
            "github/contributed-repos",
            "github/prs",
            "github/gists",
        ] {
            let template = lookup(name).unwrap();
            assert!(template.contains("$cursor"), "{} lacks $cursor", name);
            assert!(template.contains("pageInfo"), "{} lacks pageInfo", name);
        }
    }
}
