// src/utils/text.rs

/// Uppercase the first letter of a string, lowercasing the rest.
/// Used to normalize person names on the save path.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Capitalize each whitespace-separated word.
/// Used for state/city names, countries and vehicle brand/model, which are
/// stored title-cased.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}
