//! Route naming: component file names to route paths and identifiers.
//!
//! Every script component under the components tree gets two names:
//!
//! - a **route path**: the posix-style relative path with the script
//!   extension stripped (`blog/Post.jsx` → `blog/Post`)
//! - an **identifier**: a code-safe PascalCase name derived from the route
//!   path (`blog/Post` → `BlogPost`)
//!
//! ## Identifier Derivation
//!
//! Every character that is neither an ASCII letter nor whitespace is
//! removed, so path separators and punctuation simply vanish. The remaining
//! whitespace-separated words each get their first letter uppercased and are
//! joined with no separator:
//!
//! - `Home` → `Home`
//! - `blog/Post` → `BlogPost`
//! - `blog/post` → `Blogpost`
//! - `about-us` → `Aboutus`
//! - `my page/v2 draft` → `MyPagevDraft`
//! - `404` → `` (no letters at all)
//!
//! Distinct paths can therefore share an identifier (`a/bc` and `ab/c` are
//! both `Abc`); the route table resolves that.

/// File extensions recognised as script components.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx"];

/// Derived names for a single script component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentName {
    /// Route path: prefix-joined basename, posix separators, no extension.
    pub route_path: String,
    /// PascalCase identifier derived from `route_path`. Empty when the path
    /// contains no letters.
    pub identifier: String,
}

/// Strip a script extension from a file name.
///
/// Returns `None` for non-script files. Matching is exact (`.JS` is not a
/// script), mirroring the watcher's extension filter.
pub fn script_basename(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || !SCRIPT_EXTENSIONS.contains(&ext) {
        return None;
    }
    Some(stem)
}

/// Join a route prefix and a segment with a posix separator.
pub fn join_route_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}/{segment}")
    }
}

/// Drop everything but ASCII letters and whitespace, then split into
/// whitespace-separated words.
pub fn tokenize(source: &str) -> Vec<String> {
    source
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Uppercase the first letter of every word and concatenate.
pub fn pascalize(source: &str) -> String {
    let mut identifier = String::with_capacity(source.len());
    for token in tokenize(source) {
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            identifier.push(first.to_ascii_uppercase());
            identifier.push_str(chars.as_str());
        }
    }
    identifier
}

/// Derive the route path and identifier for a script file inside `prefix`.
///
/// Returns `None` when `file_name` is not a script component.
pub fn component_name(prefix: &str, file_name: &str) -> Option<ComponentName> {
    let basename = script_basename(file_name)?;
    let route_path = join_route_path(prefix, basename);
    let identifier = pascalize(&route_path);
    Some(ComponentName {
        route_path,
        identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascalize_single_word() {
        assert_eq!(pascalize("Home"), "Home");
        assert_eq!(pascalize("home"), "Home");
    }

    #[test]
    fn pascalize_separators_vanish() {
        assert_eq!(pascalize("blog/Post"), "BlogPost");
        assert_eq!(pascalize("blog/post"), "Blogpost");
        assert_eq!(pascalize("about-us"), "Aboutus");
        assert_eq!(pascalize("docs/guide/intro"), "Docsguideintro");
    }

    #[test]
    fn pascalize_capitalises_whitespace_words() {
        assert_eq!(pascalize("  my   page  "), "MyPage");
        assert_eq!(pascalize("my page/v2 draft"), "MyPagevDraft");
        assert_eq!(pascalize("release\tnotes"), "ReleaseNotes");
    }

    #[test]
    fn pascalize_drops_digits_and_punctuation() {
        assert_eq!(pascalize("v2/release_notes"), "Vreleasenotes");
        assert_eq!(pascalize("what's-new!"), "Whatsnew");
    }

    #[test]
    fn pascalize_preserves_inner_case() {
        assert_eq!(pascalize("blog/myPost"), "BlogmyPost");
    }

    #[test]
    fn pascalize_without_letters_is_empty() {
        assert_eq!(pascalize("404"), "");
        assert_eq!(pascalize(" - "), "");
        assert_eq!(pascalize(""), "");
    }

    #[test]
    fn pascalize_ignores_non_ascii_letters() {
        assert_eq!(pascalize("café/menu"), "Cafmenu");
    }

    #[test]
    fn different_segmentations_collide() {
        assert_eq!(pascalize("a/bc"), "Abc");
        assert_eq!(pascalize("ab/c"), "Abc");
    }

    #[test]
    fn tokenize_splits_on_whitespace_only() {
        assert_eq!(tokenize("blog/Post-draft 2 final"), vec!["blogPostdraft", "final"]);
    }

    #[test]
    fn script_basename_matches_js_and_jsx() {
        assert_eq!(script_basename("Home.jsx"), Some("Home"));
        assert_eq!(script_basename("util.js"), Some("util"));
        assert_eq!(script_basename("style.scss"), None);
        assert_eq!(script_basename("README"), None);
        assert_eq!(script_basename("Home.JSX"), None);
    }

    #[test]
    fn script_basename_strips_only_last_extension() {
        assert_eq!(script_basename("Page.test.jsx"), Some("Page.test"));
    }

    #[test]
    fn join_route_path_at_root_and_nested() {
        assert_eq!(join_route_path("", "Home"), "Home");
        assert_eq!(join_route_path("blog", "Post"), "blog/Post");
        assert_eq!(join_route_path("a/b", "c"), "a/b/c");
    }

    #[test]
    fn component_name_for_nested_script() {
        let name = component_name("blog", "Post.jsx").unwrap();
        assert_eq!(name.route_path, "blog/Post");
        assert_eq!(name.identifier, "BlogPost");
    }

    #[test]
    fn component_name_skips_non_scripts() {
        assert_eq!(component_name("blog", "cover.png"), None);
    }
}
