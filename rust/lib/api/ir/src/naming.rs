//! Naming rules shared by every emitter.
//!
//! All emitters derive route paths, type names and module names from the
//! functions here; a backend and frontend that disagree on a path produce an
//! application that silently 404s.

/// English `+s` pluralization. Irregular plurals are not handled (`category` → `categorys`).
pub fn pluralize(name: &str) -> String {
    format!("{name}s")
}

/// Upper-case the first character, leave the rest alone (`blogPost` → `BlogPost`).
pub fn type_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character (`BlogPost` → `blogPost`).
pub fn camel_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// camelCase / kebab-case → snake_case (`paymentRecord` → `payment_record`).
pub fn snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch.is_whitespace() {
            if !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }
    result
}

/// snake_case → "Title Case" for labels (`created_at` → `Created At`).
pub fn title_case(s: &str) -> String {
    snake_case(s)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(type_name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case and collapse whitespace runs into `sep` (`My  Blog` → `my-blog`).
pub fn slug(name: &str, sep: char) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}
