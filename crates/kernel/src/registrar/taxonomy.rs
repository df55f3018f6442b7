//! Custom taxonomy definitions.

use std::sync::Arc;

use custom_objects_sdk::host::{ContentHost, Translator};
use custom_objects_sdk::types::{LabelSet, QueryVar, Rewrite, TaxonomyConfig};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::{Hooks, RegistrationState};
use crate::error::{DefinitionError, RegistrationError};
use crate::naming::{
    self, DEFAULT_DOMAIN, DeriveContext, DerivedName, NameKind, TAXONOMY_LABEL_CONTEXTS,
};

/// Explicit overrides for a taxonomy's configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyOptions {
    pub labels: Option<LabelSet>,
    pub public: Option<bool>,
    pub show_ui: Option<bool>,
    pub show_in_nav_menus: Option<bool>,
    pub show_tagcloud: Option<bool>,
    pub meta_box_cb: Option<String>,
    pub show_admin_column: Option<bool>,
    pub hierarchical: Option<bool>,
    pub update_count_callback: Option<String>,
    pub query_var: Option<QueryVar>,
    pub rewrite: Option<Rewrite>,
    pub capabilities: Option<IndexMap<String, String>>,
    pub sort: Option<bool>,
    pub builtin: bool,
}

/// A validated taxonomy definition attached to one or more resource types.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: String,
    plural: String,
    domain: String,
    object_types: Vec<String>,
    labels: LabelSet,
    options: TaxonomyOptions,
    hooks: Hooks<TaxonomyConfig>,
    state: RegistrationState,
}

impl Taxonomy {
    /// Start a definition for the taxonomy `name` classifying `object_types`.
    pub fn builder<I, S>(name: impl Into<String>, object_types: I) -> TaxonomyBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TaxonomyBuilder {
            name: name.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            plural: None,
            object_types: object_types.into_iter().map(Into::into).collect(),
            options: TaxonomyOptions::default(),
            hooks: Hooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Resource type names this taxonomy classifies.
    pub fn object_types(&self) -> &[String] {
        &self.object_types
    }

    pub fn applies_to(&self, resource: &str) -> bool {
        self.object_types.iter().any(|t| t == resource)
    }

    /// English labels before localization.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn options(&self) -> &TaxonomyOptions {
        &self.options
    }

    pub fn is_builtin(&self) -> bool {
        self.options.builtin
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// Assemble the configuration handed to the host.
    pub fn config(&self, translator: &dyn Translator) -> TaxonomyConfig {
        let o = &self.options;

        let public = o.public.unwrap_or(true);
        let show_ui = o.show_ui.unwrap_or(public);

        TaxonomyConfig {
            labels: o.labels.clone().unwrap_or_else(|| {
                naming::localize(&self.labels, TAXONOMY_LABEL_CONTEXTS, translator, &self.domain)
            }),
            public,
            show_ui,
            show_in_nav_menus: o.show_in_nav_menus.unwrap_or(public),
            show_tagcloud: o.show_tagcloud.unwrap_or(show_ui),
            meta_box_cb: o.meta_box_cb.clone(),
            show_admin_column: o.show_admin_column.unwrap_or(false),
            hierarchical: o.hierarchical.unwrap_or(false),
            update_count_callback: o.update_count_callback.clone().unwrap_or_default(),
            query_var: o
                .query_var
                .clone()
                .unwrap_or_else(|| QueryVar::Name(self.name.clone())),
            rewrite: o
                .rewrite
                .clone()
                .unwrap_or_else(|| Rewrite::slug(self.name.as_str())),
            capabilities: o.capabilities.clone(),
            sort: o.sort,
            builtin: o.builtin,
            object_type: self.object_types.clone(),
        }
    }

    /// Hand the definition to the host.
    ///
    /// Builtin taxonomies skip the host call but still become registered.
    pub fn register_with_host(
        &mut self,
        host: &dyn ContentHost,
        translator: &dyn Translator,
    ) -> Result<TaxonomyConfig, RegistrationError> {
        if self.state != RegistrationState::Unregistered {
            return Err(RegistrationError::AlreadyRegistered {
                kind: NameKind::Taxonomy,
                name: self.name.clone(),
            });
        }

        self.state = RegistrationState::Registering;
        let config = self.config(translator);
        self.hooks.run_before(&self.name, &config);

        if self.is_builtin() {
            debug!(taxonomy = %self.name, "builtin taxonomy, skipping host registration");
        } else if let Err(e) = host.register_taxonomy(&self.name, &config) {
            warn!(taxonomy = %self.name, error = %e, "host rejected taxonomy");
            self.state = RegistrationState::Unregistered;
            return Err(e.into());
        }

        self.state = RegistrationState::Registered;
        self.hooks.run_after(&self.name, &config);
        info!(
            taxonomy = %self.name,
            object_types = ?self.object_types,
            "taxonomy registered"
        );

        Ok(config)
    }
}

/// Builder for [`Taxonomy`].
#[derive(Debug, Clone)]
pub struct TaxonomyBuilder {
    name: String,
    domain: String,
    plural: Option<String>,
    object_types: Vec<String>,
    options: TaxonomyOptions,
    hooks: Hooks<TaxonomyConfig>,
}

impl TaxonomyBuilder {
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    /// Classify one more resource type.
    pub fn object_type(mut self, resource: impl Into<String>) -> Self {
        self.object_types.push(resource.into());
        self
    }

    pub fn builtin(mut self) -> Self {
        self.options.builtin = true;
        self
    }

    override_setters! {
        labels: LabelSet,
        public: bool,
        show_ui: bool,
        show_in_nav_menus: bool,
        show_tagcloud: bool,
        meta_box_cb: String,
        show_admin_column: bool,
        hierarchical: bool,
        update_count_callback: String,
        query_var: QueryVar,
        rewrite: Rewrite,
        sort: bool,
    }

    pub fn capability(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .capabilities
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn before_registration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &TaxonomyConfig) + Send + Sync + 'static,
    {
        self.hooks.set_before(Arc::new(hook));
        self
    }

    pub fn after_registration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &TaxonomyConfig) + Send + Sync + 'static,
    {
        self.hooks.set_after(Arc::new(hook));
        self
    }

    /// Validate and derive. Nothing reaches the host on failure.
    pub fn build(self) -> Result<Taxonomy, DefinitionError> {
        let Self {
            name,
            domain,
            plural,
            object_types,
            options,
            hooks,
        } = self;
        let mut objects: Vec<String> = Vec::with_capacity(object_types.len());
        let DerivedName {
            name,
            plural,
            domain,
            labels,
            ..
        } = naming::derive_in(
            &name,
            plural.as_deref(),
            NameKind::Taxonomy,
            options.builtin,
            DeriveContext {
                domain: Some(&domain),
                route_base: None,
            },
            |name| {
                for object in &object_types {
                    let object = object.trim();
                    if !object.is_empty() && !objects.iter().any(|o| o == object) {
                        objects.push(object.to_string());
                    }
                }
                if objects.is_empty() {
                    return Err(DefinitionError::EmptyObjectList(name.to_string()));
                }
                Ok(())
            },
        )?;

        info!(taxonomy = %name, plural = %plural, object_types = ?objects, "taxonomy defined");

        Ok(Taxonomy {
            name,
            plural,
            domain,
            object_types: objects,
            labels,
            options,
            hooks,
            state: RegistrationState::Unregistered,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use custom_objects_sdk::HostError;
    use custom_objects_sdk::host::PassThrough;
    use custom_objects_sdk::types::ResourceConfig;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        taxonomies: Mutex<Vec<String>>,
    }

    impl ContentHost for RecordingHost {
        fn register_type(&self, _: &str, _: &ResourceConfig) -> Result<(), HostError> {
            Ok(())
        }

        fn register_taxonomy(&self, name: &str, _: &TaxonomyConfig) -> Result<(), HostError> {
            let mut taxonomies = self.taxonomies.lock();
            if taxonomies.iter().any(|t| t == name) {
                return Err(HostError::duplicate("taxonomy", name));
            }
            taxonomies.push(name.to_string());
            Ok(())
        }
    }

    #[test]
    fn defaults() {
        let genre = Taxonomy::builder("genre", ["movie"]).build().unwrap();
        let config = genre.config(&PassThrough);
        assert!(config.public);
        assert!(config.show_ui);
        assert!(config.show_in_nav_menus);
        assert!(config.show_tagcloud);
        assert!(!config.show_admin_column);
        assert!(!config.hierarchical);
        assert_eq!(config.update_count_callback, "");
        assert_eq!(config.query_var, QueryVar::Name("genre".into()));
        assert_eq!(config.rewrite, Rewrite::slug("genre"));
        assert_eq!(config.capabilities, None);
        assert_eq!(config.sort, None);
        assert_eq!(config.object_type, vec!["movie"]);
        assert_eq!(config.labels.len(), 17);
        assert_eq!(config.labels.get("name"), Some("Genres"));
    }

    #[test]
    fn private_taxonomy_hides_ui_and_cloud() {
        let genre = Taxonomy::builder("genre", ["movie"])
            .public(false)
            .build()
            .unwrap();
        let config = genre.config(&PassThrough);
        assert!(!config.show_ui);
        assert!(!config.show_in_nav_menus);
        assert!(!config.show_tagcloud);
    }

    #[test]
    fn config_has_fifteen_keys() {
        let genre = Taxonomy::builder("genre", ["movie"]).build().unwrap();
        let value = serde_json::to_value(genre.config(&PassThrough)).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 15);
        assert_eq!(value["rewrite"], serde_json::json!({"slug": "genre"}));
        assert_eq!(value["query_var"], "genre");
    }

    #[test]
    fn object_list_is_required() {
        let err = Taxonomy::builder("genre", Vec::<String>::new())
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::EmptyObjectList("genre".into()));

        let err = Taxonomy::builder("genre", [" "]).build().unwrap_err();
        assert!(matches!(err, DefinitionError::EmptyObjectList(_)));
    }

    #[test]
    fn object_list_is_checked_before_convention() {
        let err = Taxonomy::builder("Genres", Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::EmptyObjectList(_)));
    }

    #[test]
    fn object_types_are_trimmed_and_deduplicated() {
        let genre = Taxonomy::builder("genre", ["movie", " movie "])
            .object_type("book")
            .build()
            .unwrap();
        assert_eq!(genre.object_types(), ["movie", "book"]);
        assert!(genre.applies_to("book"));
        assert!(!genre.applies_to("album"));
    }

    #[test]
    fn reserved_names_need_builtin() {
        let err = Taxonomy::builder("tag", ["post"]).build().unwrap_err();
        assert!(matches!(err, DefinitionError::ReservedName { .. }));

        let mut tag = Taxonomy::builder("tag", ["post"]).builtin().build().unwrap();
        let host = RecordingHost::default();
        tag.register_with_host(&host, &PassThrough).unwrap();
        assert!(host.taxonomies.lock().is_empty());
        assert_eq!(tag.state(), RegistrationState::Registered);
    }

    #[test]
    fn duplicate_host_registration_surfaces() {
        let host = RecordingHost::default();
        let mut first = Taxonomy::builder("genre", ["movie"]).build().unwrap();
        let mut second = Taxonomy::builder("genre", ["book"]).build().unwrap();
        first.register_with_host(&host, &PassThrough).unwrap();

        let err = second.register_with_host(&host, &PassThrough).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Host(HostError::duplicate("taxonomy", "genre"))
        );
        assert_eq!(second.state(), RegistrationState::Unregistered);
    }
}
