//! Naming conventions
//!
//! Column names are the snake_case form of field names; table names are the
//! pluralized snake_case form of type names. Both can be overridden: columns
//! with the `COLUMN` tag, tables with an explicit per-type name, and every
//! table name passes through the registry's table-name hook.

use crate::tags::{COLUMN, TagSettings};
use heck::ToSnakeCase;
use std::sync::Arc;

/// Rewrites a derived table name, e.g. to add a deployment prefix
pub type TableNameHook = Arc<dyn Fn(&str) -> String + Send + Sync>;

// ============================================================================
// Identifiers
// ============================================================================

/// Convert an identifier to its database form
///
/// A run of capitals is one word unless the last capital starts a new
/// lower-case word:
///
/// - "UserID" -> "user_id"
/// - "HTTPCode" -> "http_code"
/// - "owner_id" -> "owner_id"
pub fn to_db_name(name: &str) -> String {
    name.to_snake_case()
}

/// Column name of a field: the `COLUMN` tag, else the snake_case name
pub fn column_name(field_name: &str, settings: &TagSettings) -> String {
    match settings.get(COLUMN) {
        Some(column) => column.to_string(),
        None => to_db_name(field_name),
    }
}

/// Concatenate a prefix and a field name into a key identifier
///
/// PascalCase names are glued ("Owner" + "ID" -> "OwnerID"); a snake_case
/// name gets an underscore ("Owner" + "id" -> "Owner_id"), so both spell
/// `owner_id` once converted with `to_db_name`.
pub fn join_identifier(prefix: &str, name: &str) -> String {
    let starts_lower = name.chars().next().is_some_and(|c| c.is_lowercase());
    if starts_lower && !prefix.is_empty() && !prefix.ends_with('_') {
        format!("{}_{}", prefix, name)
    } else {
        format!("{}{}", prefix, name)
    }
}

/// Strip a key prefix from an identifier
///
/// Tries the literal prefix first ("OwnerID" - "Owner" -> "ID"), then the
/// database form ("owner_id" - "Owner" -> "id").
pub fn strip_identifier_prefix(name: &str, prefix: &str) -> Option<String> {
    if let Some(rest) = name.strip_prefix(prefix) {
        return Some(rest.to_string());
    }
    let db_prefix = format!("{}_", to_db_name(prefix));
    to_db_name(name)
        .strip_prefix(&db_prefix)
        .map(ToString::to_string)
}

// ============================================================================
// Table Names
// ============================================================================

/// Derive a table name from a type name
///
/// An explicit name wins outright; otherwise the type name is snake-cased
/// and, unless `singular` is set, pluralized. The hook is applied last.
pub fn table_name(
    type_name: &str,
    explicit: Option<&str>,
    singular: bool,
    hook: Option<&TableNameHook>,
) -> String {
    let default_name = match explicit {
        Some(name) => name.to_string(),
        None => {
            let snake = to_db_name(type_name);
            if singular { snake } else { pluralize(&snake) }
        }
    };

    match hook {
        Some(hook) => hook(&default_name),
        None => default_name,
    }
}

// ============================================================================
// Pluralization
// ============================================================================

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("move", "moves"),
    ("quiz", "quizzes"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("buffalo", "buffaloes"),
    ("criterion", "criteria"),
    ("datum", "data"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
];

/// English pluralization of a snake_case name
///
/// Only the last `_`-separated word is inflected ("blog_post" -> "blog_posts").
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let (head, word) = match name.rfind('_') {
        Some(idx) => name.split_at(idx + 1),
        None => ("", name),
    };
    format!("{}{}", head, pluralize_word(word))
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();

    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return plural.to_string();
    }

    // Sibilant endings
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", word);
    }

    // Consonant + 'y'
    if let Some(stem) = lower.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    // "knife" -> "knives", "wolf" -> "wolves", "scarf" -> "scarves"
    if lower.ends_with("fe") && !lower.ends_with("ffe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    if lower.ends_with("lf") || lower.ends_with("rf") {
        return format!("{}ves", &word[..word.len() - 1]);
    }

    format!("{}s", word)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_db_name() {
        assert_eq!(to_db_name("UserID"), "user_id");
        assert_eq!(to_db_name("ID"), "id");
        assert_eq!(to_db_name("HTTPCode"), "http_code");
        assert_eq!(to_db_name("PostalOrZipCode"), "postal_or_zip_code");
        assert_eq!(to_db_name("owner_id"), "owner_id");
        assert_eq!(to_db_name("Owner_id"), "owner_id");
    }

    #[test]
    fn test_column_name_override() {
        let settings = TagSettings::parse("column:email_address");
        assert_eq!(column_name("PrimaryEmail", &settings), "email_address");
        assert_eq!(
            column_name("PrimaryEmail", &TagSettings::default()),
            "primary_email"
        );
    }

    #[test]
    fn test_join_identifier() {
        assert_eq!(join_identifier("Owner", "ID"), "OwnerID");
        assert_eq!(join_identifier("Owner", "id"), "Owner_id");
        assert_eq!(join_identifier("owner", "id"), "owner_id");
        assert_eq!(to_db_name(&join_identifier("Owner", "ID")), "owner_id");
        assert_eq!(to_db_name(&join_identifier("Owner", "id")), "owner_id");
    }

    #[test]
    fn test_strip_identifier_prefix() {
        assert_eq!(
            strip_identifier_prefix("OwnerID", "Owner"),
            Some("ID".to_string())
        );
        assert_eq!(
            strip_identifier_prefix("owner_id", "Owner"),
            Some("id".to_string())
        );
        assert_eq!(strip_identifier_prefix("creator_id", "Owner"), None);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("church"), "churches");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("wolf"), "wolves");
        assert_eq!(pluralize("sheep"), "sheep");
    }

    #[test]
    fn test_pluralize_last_word_only() {
        assert_eq!(pluralize("auth_token"), "auth_tokens");
        assert_eq!(pluralize("sales_person"), "sales_people");
        assert_eq!(pluralize("farm_address"), "farm_addresses");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("User", None, false, None), "users");
        assert_eq!(table_name("Address", None, false, None), "addresses");
        assert_eq!(table_name("User", None, true, None), "user");
        assert_eq!(table_name("Address", None, true, None), "address");
        assert_eq!(table_name("AuthToken", None, false, None), "auth_tokens");
    }

    #[test]
    fn test_table_name_explicit_and_hook() {
        let hook: TableNameHook = Arc::new(|name: &str| format!("app_{}", name));
        assert_eq!(table_name("User", Some("members"), false, None), "members");
        assert_eq!(table_name("User", None, false, Some(&hook)), "app_users");
        assert_eq!(
            table_name("User", Some("members"), false, Some(&hook)),
            "app_members"
        );
    }
}
