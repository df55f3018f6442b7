//! Name validation and derivation.
//!
//! A definition is declared with one canonical singular name. Its plural,
//! REST route base and display labels are derived from that name, and a
//! malformed name is rejected before anything reaches the host.
//!
//! Validation runs in a fixed order: empty name, reserved name, domain,
//! plural, naming convention. The registrars go through [`derive_in`],
//! which lets the taxonomy registrar slot its object-list check in before
//! the convention check.

mod labels;
mod reserved;

use std::fmt;
use std::sync::LazyLock;

use custom_objects_sdk::types::LabelSet;
use regex::Regex;

use crate::error::DefinitionError;
use crate::inflect;

pub use labels::{
    RESOURCE_LABEL_CONTEXTS, TAXONOMY_LABEL_CONTEXTS, capitalize_first, localize, resource_label,
    resource_labels, taxonomy_labels,
};
pub use reserved::{RESOURCE_RESERVED, TAXONOMY_RESERVED};

/// Localization domain used when a definition names none.
pub const DEFAULT_DOMAIN: &str = "default";

#[allow(clippy::expect_used)]
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static ROUTE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]+").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("valid regex literal"));

/// Explicit route bases become literal route patterns, so no regex syntax.
#[allow(clippy::expect_used)]
static ROUTE_BASE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w/-]+$").expect("valid regex literal"));

/// What kind of definition a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Resource,
    Taxonomy,
}

impl NameKind {
    /// Names this kind may not use unless the definition is builtin.
    pub fn reserved(self) -> &'static [&'static str] {
        match self {
            Self::Resource => RESOURCE_RESERVED,
            Self::Taxonomy => TAXONOMY_RESERVED,
        }
    }

    /// Human description of the naming convention, for diagnostics.
    pub fn convention(self) -> &'static str {
        match self {
            Self::Resource => {
                "singular and all lowercase, without dashes, e.g.: status, link, movie"
            }
            Self::Taxonomy => "singular and all lowercase, e.g.: tag, director",
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => f.write_str("resource type"),
            Self::Taxonomy => f.write_str("taxonomy"),
        }
    }
}

/// Everything derived from a validated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    pub name: String,
    pub plural: String,
    pub domain: String,
    /// Untranslated English labels.
    pub labels: LabelSet,
    /// REST path prefix, always starting with `/`.
    pub route_base: String,
}

/// Validate and derive a resource type name.
pub fn derive_resource(name: &str, plural: Option<&str>) -> Result<DerivedName, DefinitionError> {
    derive(name, plural, NameKind::Resource, false)
}

/// Validate and derive a taxonomy name.
pub fn derive_taxonomy(name: &str, plural: Option<&str>) -> Result<DerivedName, DefinitionError> {
    derive(name, plural, NameKind::Taxonomy, false)
}

/// Validate and derive a name of `kind`.
///
/// `builtin` marks a definition standing for a type the host already
/// provides; only those may use reserved names.
pub fn derive(
    name: &str,
    plural: Option<&str>,
    kind: NameKind,
    builtin: bool,
) -> Result<DerivedName, DefinitionError> {
    derive_in(
        name,
        plural,
        kind,
        builtin,
        DeriveContext::default(),
        |_| Ok(()),
    )
}

/// Registrar inputs folded into derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveContext<'a> {
    /// Localization domain; [`DEFAULT_DOMAIN`] when absent.
    pub domain: Option<&'a str>,
    /// Explicit REST route base.
    pub route_base: Option<&'a str>,
}

/// [`derive`] with a localization domain, an explicit route base and one
/// extra check.
///
/// Checks run in order: empty name, reserved name, domain, plural,
/// `before_convention` (called with the trimmed name), naming convention,
/// route base.
pub fn derive_in<F>(
    name: &str,
    plural: Option<&str>,
    kind: NameKind,
    builtin: bool,
    context: DeriveContext<'_>,
    before_convention: F,
) -> Result<DerivedName, DefinitionError>
where
    F: FnOnce(&str) -> Result<(), DefinitionError>,
{
    let name = require_name(name, kind)?;
    check_reserved(name, kind, builtin)?;
    let domain = require_domain(context.domain.unwrap_or(DEFAULT_DOMAIN))?;
    let explicit = explicit_plural(name, plural)?;
    before_convention(name)?;
    check_convention(name, kind)?;

    let plural = explicit.unwrap_or_else(|| inflect::pluralize(name));
    let labels = match kind {
        NameKind::Resource => resource_labels(name, &plural),
        NameKind::Taxonomy => taxonomy_labels(name, &plural),
    };
    let route_base = route_base(&plural, context.route_base)?;

    Ok(DerivedName {
        name: name.to_string(),
        plural,
        domain: domain.to_string(),
        labels,
        route_base,
    })
}

/// Validate a name without deriving anything: non-empty and conventional.
pub fn validate_name(name: &str, kind: NameKind) -> Result<(), DefinitionError> {
    let name = require_name(name, kind)?;
    check_convention(name, kind)
}

/// Trim `name`, failing if nothing is left.
pub fn require_name(name: &str, kind: NameKind) -> Result<&str, DefinitionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DefinitionError::EmptyName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(trimmed)
}

/// Trim the localization domain, failing if nothing is left.
pub fn require_domain(domain: &str) -> Result<&str, DefinitionError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DefinitionError::EmptyDomain(domain.to_string()));
    }
    Ok(trimmed)
}

/// Reject reserved names unless the definition is builtin.
pub fn check_reserved(name: &str, kind: NameKind, builtin: bool) -> Result<(), DefinitionError> {
    if !builtin && kind.reserved().contains(&name) {
        return Err(DefinitionError::ReservedName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Resolve an explicitly supplied plural.
///
/// Absent or empty means "derive it"; present but blank is an error.
pub fn explicit_plural(name: &str, plural: Option<&str>) -> Result<Option<String>, DefinitionError> {
    match plural {
        None | Some("") => Ok(None),
        Some(p) if p.trim().is_empty() => Err(DefinitionError::InvalidPlural {
            name: name.to_string(),
            plural: p.to_string(),
        }),
        Some(p) => Ok(Some(p.trim().to_string())),
    }
}

/// The form `name` must already be in to be accepted.
///
/// Resource names are lowercased, singularized and stripped of dashes;
/// taxonomy names keep their dashes.
pub fn canonical_form(name: &str, kind: NameKind) -> String {
    let singular = inflect::singularize(&name.to_lowercase());
    match kind {
        NameKind::Resource => DASHES.replace_all(&singular, "").into_owned(),
        NameKind::Taxonomy => singular,
    }
}

/// Reject names that are not already singular, lowercase identifiers.
pub fn check_convention(name: &str, kind: NameKind) -> Result<(), DefinitionError> {
    let expected = canonical_form(name, kind);
    if expected != name || !NAME_CHARS.is_match(name) {
        return Err(DefinitionError::NamingConvention {
            kind,
            name: name.to_string(),
            expected,
        });
    }
    Ok(())
}

/// Compute the REST route base.
///
/// An explicit base is normalized to a single leading slash with no trailing
/// one. Otherwise the base is the lowercased plural with runs of dashes and
/// underscores collapsed to one dash. Either way it may only contain word
/// characters, dashes and slashes.
pub fn route_base(plural: &str, explicit: Option<&str>) -> Result<String, DefinitionError> {
    match explicit {
        None | Some("") => {
            let lower = plural.to_lowercase();
            let slug = ROUTE_SEPARATORS.replace_all(&lower, "-");
            if !ROUTE_BASE_CHARS.is_match(&slug) {
                return Err(DefinitionError::InvalidRouteBase(slug.into_owned()));
            }
            Ok(format!("/{slug}"))
        }
        Some(base) => {
            let trimmed = base.trim().trim_matches('/');
            if trimmed.is_empty() || !ROUTE_BASE_CHARS.is_match(trimmed) {
                return Err(DefinitionError::InvalidRouteBase(base.to_string()));
            }
            Ok(format!("/{trimmed}"))
        }
    }
}
