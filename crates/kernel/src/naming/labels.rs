//! Display labels derived from a singular and a plural name.

use std::sync::LazyLock;

use custom_objects_sdk::host::Translator;
use custom_objects_sdk::types::LabelSet;
use regex::Regex;

#[allow(clippy::expect_used)]
static UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]+").expect("valid regex literal"));

/// Translation contexts for resource labels that need disambiguation.
pub const RESOURCE_LABEL_CONTEXTS: &[(&str, &str)] = &[
    ("name", "post type general name"),
    ("singular_name", "post type singular name"),
    ("add_new", "Post"),
];

/// Translation contexts for taxonomy labels that need disambiguation.
pub const TAXONOMY_LABEL_CONTEXTS: &[(&str, &str)] = &[
    ("name", "taxonomy general name"),
    ("singular_name", "taxonomy singular name"),
    ("menu_name", "taxonomy general name"),
];

/// Uppercase the first character, leave the rest alone.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn humanize(word: &str, separators: &Regex) -> String {
    capitalize_first(&separators.replace_all(word, " "))
}

/// The general label of a resource type, e.g. "Movies" or "Press releases".
pub fn resource_label(plural: &str) -> String {
    humanize(plural, &UNDERSCORES)
}

/// The 13 English labels of a resource type.
pub fn resource_labels(singular: &str, plural: &str) -> LabelSet {
    let item = humanize(singular, &UNDERSCORES);
    let items = humanize(plural, &UNDERSCORES);
    let lower_items = items.to_lowercase();

    [
        ("name", items.clone()),
        ("singular_name", item.clone()),
        ("add_new", "Add New".to_string()),
        ("add_new_item", format!("Add New {item}")),
        ("edit_item", format!("Edit {item}")),
        ("new_item", format!("New {item}")),
        ("all_items", format!("All {items}")),
        ("view_item", format!("View {item}")),
        ("search_items", format!("Search {items}")),
        ("not_found", format!("No {lower_items} found")),
        ("not_found_in_trash", format!("No {lower_items} found in Trash")),
        ("parent_item_colon", format!("Parent {item}:")),
        ("menu_name", items),
    ]
    .into_iter()
    .collect()
}

/// The 17 English labels of a taxonomy.
pub fn taxonomy_labels(singular: &str, plural: &str) -> LabelSet {
    let item = humanize(singular, &SEPARATORS);
    let items = humanize(plural, &SEPARATORS);

    [
        ("name", items.clone()),
        ("singular_name", item.clone()),
        ("menu_name", items.clone()),
        ("all_items", format!("All {items}")),
        ("edit_item", format!("Edit {item}")),
        ("view_item", format!("View {item}")),
        ("update_item", format!("Update {item}")),
        ("add_new_item", format!("Add New {item}")),
        ("new_item_name", format!("New {item} Name")),
        ("parent_item", format!("Parent {item}")),
        ("parent_item_colon", format!("Parent {item}:")),
        ("search_items", format!("Search {items}")),
        ("popular_items", format!("Popular {items}")),
        (
            "separate_items_with_commas",
            format!("Separate {items} with commas"),
        ),
        ("add_or_remove_items", format!("Add or remove {items}")),
        (
            "choose_from_most_used",
            format!("Choose from the most used {items}"),
        ),
        ("not_found", format!("No {items} found")),
    ]
    .into_iter()
    .collect()
}

/// Translate every label in `domain`; keys listed in `contexts` are
/// translated with their context.
pub fn localize(
    labels: &LabelSet,
    contexts: &[(&str, &str)],
    translator: &dyn Translator,
    domain: &str,
) -> LabelSet {
    labels
        .iter()
        .map(|(key, text)| {
            let translated = match contexts.iter().find(|(k, _)| *k == key) {
                Some((_, context)) => translator.translate_with_context(text, context, domain),
                None => translator.translate(text, domain),
            };
            (key, translated)
        })
        .collect()
}
