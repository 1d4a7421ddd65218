//! URL slugs for events and organizations.

lazy_static::lazy_static! {
    /// Lowercase alphanumeric with single hyphens, no leading/trailing hyphen.
    pub static ref SLUG_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Fallback when a title has no sluggable characters at all.
const EMPTY_SLUG: &str = "item";

/// Folds the accented Latin letters used in Spanish, Catalan, Galician and
/// Basque titles to ASCII.
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        c if c.is_ascii_alphanumeric() => c,
        _ => return None,
    };
    Some(folded)
}

/// Deterministic slug for a free-text title.
///
/// Lowercases, folds accents, turns every run of other characters
/// (whitespace included) into one hyphen and trims hyphens at both ends.
///
/// ```
/// use shared::slug::slugify;
///
/// assert_eq!(slugify("Foo Bar"), "foo-bar");
/// assert_eq!(slugify("Taller de DFIR: De la Alerta a la Evidencia"),
///            "taller-de-dfir-de-la-alerta-a-la-evidencia");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        match fold_char(c) {
            Some(c) => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            None => pending_hyphen = true,
        }
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns `base` if free, otherwise the first free `base-2`, `base-3`, ...
pub fn disambiguate<F>(base: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Slugifies `input` and disambiguates it against `is_taken`.
pub fn unique_slug<F>(input: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    disambiguate(&slugify(input), is_taken)
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Foo Bar"), "foo-bar");
        assert_eq!(slugify("CyberSec Summit Madrid 2024"), "cybersec-summit-madrid-2024");
    }

    #[test]
    fn test_slugify_collapses_whitespace_and_punctuation() {
        assert_eq!(slugify("  Red Team  vs   Blue Team: Live!  "), "red-team-vs-blue-team-live");
        assert_eq!(slugify("a\tb\nc"), "a-b-c");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Hackingétic"), "hackingetic");
        assert_eq!(slugify("Ñandú en Castellón"), "nandu-en-castellon");
        assert_eq!(slugify("Formació Ciberseguretat"), "formacio-ciberseguretat");
    }

    #[test]
    fn test_slugify_empty_input() {
        assert_eq!(slugify(""), "item");
        assert_eq!(slugify("!!!"), "item");
    }

    #[test]
    fn test_slugify_output_is_valid() {
        for title in ["Foo Bar", "¿Qué es OSINT?", "CTF (Capture The Flag)", "x"] {
            assert!(is_valid_slug(&slugify(title)), "{}", title);
        }
    }

    #[test]
    fn test_disambiguate_free_slug() {
        assert_eq!(disambiguate("foo-bar", |_| false), "foo-bar");
    }

    #[test]
    fn test_disambiguate_appends_counter() {
        let taken: HashSet<&str> = ["foo-bar", "foo-bar-2"].into_iter().collect();
        assert_eq!(disambiguate("foo-bar", |s| taken.contains(s)), "foo-bar-3");
    }

    #[test]
    fn test_unique_slug() {
        let taken: HashSet<&str> = ["foo-bar"].into_iter().collect();
        assert_eq!(unique_slug("Foo   Bar", |s| taken.contains(s)), "foo-bar-2");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("cybersecurity-spain"));
        assert!(is_valid_slug("a1"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("Upper"));
    }
}
