/// Split an identifier-ish string into words.
///
/// Any non-alphanumeric character separates words. Case transitions also
/// split: `petId` is `pet`, `Id`, and an acronym run ends before the last
/// uppercase letter when a lowercase one follows (`HTTPServer` is `HTTP`,
/// `Server`). Digits stay attached to the word they follow.
///
/// # Examples
/// ```
/// use oasgen_core::utils::split_words;
/// assert_eq!(split_words("list_pets"), ["list", "pets"]);
/// assert_eq!(split_words("application/json"), ["application", "json"]);
/// assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
/// ```
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let lower_to_upper = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let acronym_end = prev.is_ascii_uppercase() && next_is_lower;
            if lower_to_upper || acronym_end {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let all_upper = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .all(|c| c.is_ascii_uppercase());

    let mut out = String::with_capacity(word.len());
    for (i, c) in word.chars().enumerate() {
        if i == 0 {
            out.push(c.to_ascii_uppercase());
        } else if all_upper {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert snake_case, kebab-case, camelCase or arbitrary text to PascalCase.
///
/// If the input is already PascalCase (starts uppercase, has lowercase, no
/// separators), it is returned unchanged.
///
/// # Examples
/// ```
/// use oasgen_core::utils::to_pascal_case;
/// assert_eq!(to_pascal_case("foo_bar"), "FooBar");
/// assert_eq!(to_pascal_case("FOO_BAR"), "FooBar");
/// assert_eq!(to_pascal_case("petId"), "PetId");
/// assert_eq!(to_pascal_case("FooBar"), "FooBar");  // idempotent
/// ```
pub fn to_pascal_case(s: &str) -> String {
    let has_separator = s.chars().any(|c| !c.is_ascii_alphanumeric());
    let has_lowercase = s.chars().any(|c| c.is_ascii_lowercase());
    let starts_uppercase = s.chars().next().is_some_and(|c| c.is_ascii_uppercase());

    if starts_uppercase && has_lowercase && !has_separator {
        return s.to_string();
    }

    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert to camelCase.
///
/// # Examples
/// ```
/// use oasgen_core::utils::to_camel_case;
/// assert_eq!(to_camel_case("PetId"), "petId");
/// assert_eq!(to_camel_case("HTTPServer"), "httpServer");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in split_words(s).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_ascii_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Convert PascalCase or camelCase to snake_case.
///
/// # Examples
/// ```
/// use oasgen_core::utils::to_snake_case;
/// assert_eq!(to_snake_case("FooBar"), "foo_bar");
/// assert_eq!(to_snake_case("fooBar"), "foo_bar");
/// ```
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether `s` is usable as an identifier in the common subset of target
/// languages: ASCII letters, digits and `_`, not starting with a digit.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
