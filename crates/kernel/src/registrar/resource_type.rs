//! Custom resource type definitions.

use std::sync::Arc;

use custom_objects_sdk::host::{ContentHost, Translator};
use custom_objects_sdk::types::{EP_PERMALINK, LabelSet, QueryVar, ResourceConfig, Rewrite};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::{Hooks, RegistrationState};
use crate::error::{DefinitionError, RegistrationError};
use crate::naming::{
    self, DEFAULT_DOMAIN, DeriveContext, DerivedName, NameKind, RESOURCE_LABEL_CONTEXTS,
};

/// Explicit overrides for a resource type's configuration.
///
/// `None` means "use the derived default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceOptions {
    pub label: Option<String>,
    pub labels: Option<LabelSet>,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub exclude_from_search: Option<bool>,
    pub publicly_queryable: Option<bool>,
    pub show_ui: Option<bool>,
    pub show_in_nav_menus: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_admin_bar: Option<bool>,
    pub menu_position: Option<u32>,
    pub menu_icon: Option<String>,
    pub capability_type: Option<String>,
    pub capabilities: IndexMap<String, String>,
    pub map_meta_cap: Option<bool>,
    pub hierarchical: Option<bool>,
    pub supports: Option<Vec<String>>,
    pub register_meta_box_cb: Option<String>,
    pub taxonomies: Vec<String>,
    pub has_archive: Option<bool>,
    pub permalink_epmask: Option<u32>,
    pub rewrite: Option<Rewrite>,
    pub query_var: Option<QueryVar>,
    pub can_export: Option<bool>,
    pub builtin: bool,
    pub edit_link: Option<String>,
    pub rest_base: Option<String>,
}

/// A validated resource type definition.
#[derive(Debug, Clone)]
pub struct ResourceType {
    name: String,
    plural: String,
    domain: String,
    labels: LabelSet,
    route_base: String,
    options: ResourceOptions,
    hooks: Hooks<ResourceConfig>,
    state: RegistrationState,
}

impl ResourceType {
    /// Start a definition for the resource type `name`.
    pub fn builder(name: impl Into<String>) -> ResourceTypeBuilder {
        ResourceTypeBuilder {
            name: name.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            plural: None,
            options: ResourceOptions::default(),
            hooks: Hooks::default(),
        }
    }

    /// Shorthand for `builder(name).build()`.
    pub fn new(name: impl Into<String>) -> Result<Self, DefinitionError> {
        Self::builder(name).build()
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

    /// English labels before localization.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// REST path prefix, e.g. `/movies`.
    pub fn route_base(&self) -> &str {
        &self.route_base
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    /// Taxonomies declared on this type.
    pub fn taxonomies(&self) -> &[String] {
        &self.options.taxonomies
    }

    pub fn is_builtin(&self) -> bool {
        self.options.builtin
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// Assemble the configuration handed to the host.
    pub fn config(&self, translator: &dyn Translator) -> ResourceConfig {
        let o = &self.options;

        let label = o
            .label
            .clone()
            .unwrap_or_else(|| naming::resource_label(&self.plural));
        let labels = o.labels.clone().unwrap_or_else(|| {
            naming::localize(&self.labels, RESOURCE_LABEL_CONTEXTS, translator, &self.domain)
        });
        let description = o.description.clone().unwrap_or_else(|| {
            translator
                .translate("%s post content type", &self.domain)
                .replacen("%s", &label, 1)
        });

        let public = o.public.unwrap_or(false);
        let show_ui = o.show_ui.unwrap_or(public);
        let show_in_menu = o.show_in_menu.unwrap_or(show_ui);

        ResourceConfig {
            label,
            labels,
            description,
            public,
            exclude_from_search: o.exclude_from_search.unwrap_or(!public),
            publicly_queryable: o.publicly_queryable.unwrap_or(public),
            show_ui,
            show_in_nav_menus: o.show_in_nav_menus.unwrap_or(public),
            show_in_menu,
            show_in_admin_bar: o.show_in_admin_bar.unwrap_or(show_in_menu),
            menu_position: o.menu_position,
            menu_icon: o.menu_icon.clone(),
            capability_type: o
                .capability_type
                .clone()
                .unwrap_or_else(|| "post".to_string()),
            capabilities: o.capabilities.clone(),
            map_meta_cap: o.map_meta_cap,
            hierarchical: o.hierarchical.unwrap_or(false),
            supports: o
                .supports
                .clone()
                .unwrap_or_else(|| vec!["title".to_string(), "editor".to_string()]),
            register_meta_box_cb: o.register_meta_box_cb.clone(),
            taxonomies: o.taxonomies.clone(),
            has_archive: o.has_archive.unwrap_or(false),
            permalink_epmask: o.permalink_epmask.unwrap_or(EP_PERMALINK),
            rewrite: o.rewrite.clone().unwrap_or(Rewrite::Enabled(true)),
            query_var: o.query_var.clone().unwrap_or(QueryVar::Enabled(true)),
            can_export: o.can_export.unwrap_or(true),
            builtin: o.builtin,
            edit_link: o
                .edit_link
                .clone()
                .unwrap_or_else(|| "post.php?post=%d".to_string()),
            rest_base: self.route_base.clone(),
        }
    }

    /// Hand the definition to the host.
    ///
    /// Builtin types skip the host call but still become registered. A
    /// failed host call returns the definition to `Unregistered`.
    pub fn register_with_host(
        &mut self,
        host: &dyn ContentHost,
        translator: &dyn Translator,
    ) -> Result<ResourceConfig, RegistrationError> {
        if self.state != RegistrationState::Unregistered {
            return Err(RegistrationError::AlreadyRegistered {
                kind: NameKind::Resource,
                name: self.name.clone(),
            });
        }

        self.state = RegistrationState::Registering;
        let config = self.config(translator);
        self.hooks.run_before(&self.name, &config);

        if self.is_builtin() {
            debug!(resource = %self.name, "builtin resource type, skipping host registration");
        } else if let Err(e) = host.register_type(&self.name, &config) {
            warn!(resource = %self.name, error = %e, "host rejected resource type");
            self.state = RegistrationState::Unregistered;
            return Err(e.into());
        }

        self.state = RegistrationState::Registered;
        self.hooks.run_after(&self.name, &config);
        info!(resource = %self.name, rest_base = %self.route_base, "resource type registered");

        Ok(config)
    }
}

/// Builder for [`ResourceType`].
#[derive(Debug, Clone)]
pub struct ResourceTypeBuilder {
    name: String,
    domain: String,
    plural: Option<String>,
    options: ResourceOptions,
    hooks: Hooks<ResourceConfig>,
}

impl ResourceTypeBuilder {
    override_setters! {
        label: String,
        labels: LabelSet,
        description: String,
        public: bool,
        exclude_from_search: bool,
        publicly_queryable: bool,
        show_ui: bool,
        show_in_nav_menus: bool,
        show_in_menu: bool,
        show_in_admin_bar: bool,
        menu_position: u32,
        menu_icon: String,
        capability_type: String,
        map_meta_cap: bool,
        hierarchical: bool,
        register_meta_box_cb: String,
        has_archive: bool,
        permalink_epmask: u32,
        rewrite: Rewrite,
        query_var: QueryVar,
        can_export: bool,
        edit_link: String,
        rest_base: String,
    }

    /// Localization domain for labels and description.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Explicit plural; derived by inflection when absent or empty.
    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    /// Mark the definition as standing for a type the host already provides.
    pub fn builtin(mut self) -> Self {
        self.options.builtin = true;
        self
    }

    /// Map one meta capability to a host capability.
    pub fn capability(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.capabilities.insert(key.into(), value.into());
        self
    }

    pub fn supports<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.supports = Some(features.into_iter().map(Into::into).collect());
        self
    }

    /// Associate a taxonomy; repeated names are kept once.
    pub fn taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        let taxonomy = taxonomy.into();
        if !self.options.taxonomies.contains(&taxonomy) {
            self.options.taxonomies.push(taxonomy);
        }
        self
    }

    pub fn taxonomies<I, S>(self, taxonomies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        taxonomies.into_iter().fold(self, |b, t| b.taxonomy(t))
    }

    pub fn before_registration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &ResourceConfig) + Send + Sync + 'static,
    {
        self.hooks.set_before(Arc::new(hook));
        self
    }

    pub fn after_registration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &ResourceConfig) + Send + Sync + 'static,
    {
        self.hooks.set_after(Arc::new(hook));
        self
    }

    /// Validate and derive. Nothing reaches the host on failure.
    pub fn build(self) -> Result<ResourceType, DefinitionError> {
        let Self {
            name,
            domain,
            plural,
            options,
            hooks,
        } = self;
        let DerivedName {
            name,
            plural,
            domain,
            labels,
            route_base,
        } = naming::derive_in(
            &name,
            plural.as_deref(),
            NameKind::Resource,
            options.builtin,
            DeriveContext {
                domain: Some(&domain),
                route_base: options.rest_base.as_deref(),
            },
            |_| Ok(()),
        )?;

        info!(resource = %name, plural = %plural, route_base = %route_base, "resource type defined");

        Ok(ResourceType {
            name,
            plural,
            domain,
            labels,
            route_base,
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
    use custom_objects_sdk::types::TaxonomyConfig;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        registered: Mutex<Vec<(String, ResourceConfig)>>,
        fail: bool,
    }

    impl ContentHost for RecordingHost {
        fn register_type(&self, name: &str, config: &ResourceConfig) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::Storage("offline".into()));
            }
            self.registered
                .lock()
                .push((name.to_string(), config.clone()));
            Ok(())
        }

        fn register_taxonomy(&self, _: &str, _: &TaxonomyConfig) -> Result<(), HostError> {
            Ok(())
        }
    }

    #[test]
    fn defaults_follow_public() {
        let movie = ResourceType::new("movie").unwrap();
        let config = movie.config(&PassThrough);
        assert_eq!(config.label, "Movies");
        assert_eq!(config.description, "Movies post content type");
        assert!(!config.public);
        assert!(config.exclude_from_search);
        assert!(!config.publicly_queryable);
        assert!(!config.show_ui);
        assert!(!config.show_in_admin_bar);
        assert_eq!(config.capability_type, "post");
        assert_eq!(config.supports, vec!["title", "editor"]);
        assert_eq!(config.permalink_epmask, EP_PERMALINK);
        assert_eq!(config.rewrite, Rewrite::Enabled(true));
        assert_eq!(config.query_var, QueryVar::Enabled(true));
        assert!(config.can_export);
        assert_eq!(config.edit_link, "post.php?post=%d");
        assert_eq!(config.rest_base, "/movies");
        assert_eq!(config.labels.len(), 13);

        let public = ResourceType::builder("movie").public(true).build().unwrap();
        let config = public.config(&PassThrough);
        assert!(!config.exclude_from_search);
        assert!(config.publicly_queryable);
        assert!(config.show_ui);
        assert!(config.show_in_nav_menus);
        assert!(config.show_in_menu);
        assert!(config.show_in_admin_bar);
    }

    #[test]
    fn overrides_flow_into_dependents() {
        let movie = ResourceType::builder("movie")
            .public(true)
            .show_ui(false)
            .build()
            .unwrap();
        let config = movie.config(&PassThrough);
        assert!(!config.show_ui);
        assert!(!config.show_in_menu);
        assert!(!config.show_in_admin_bar);
        assert!(config.show_in_nav_menus);
    }

    #[test]
    fn config_serializes_every_key_in_order() {
        let movie = ResourceType::builder("movie")
            .taxonomy("genre")
            .capability("edit_post", "edit_movie")
            .build()
            .unwrap();
        let value = serde_json::to_value(movie.config(&PassThrough)).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 27);
        assert_eq!(keys.first().map(String::as_str), Some("label"));
        assert!(keys.contains(&"_builtin".to_string()));
        assert!(keys.contains(&"_edit_link".to_string()));
        assert_eq!(value["taxonomies"], serde_json::json!(["genre"]));
        assert_eq!(value["capabilities"]["edit_post"], "edit_movie");
        assert_eq!(value["menu_position"], serde_json::Value::Null);
    }

    #[test]
    fn check_order() {
        // Reserved is reported before the blank domain.
        let err = ResourceType::builder("post").domain(" ").build().unwrap_err();
        assert!(matches!(err, DefinitionError::ReservedName { .. }));

        // Domain is reported before the plural.
        let err = ResourceType::builder("movie")
            .domain("")
            .plural(" ")
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::EmptyDomain(_)));

        // Plural is reported before the convention.
        let err = ResourceType::builder("Movies").plural(" ").build().unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidPlural { .. }));
    }

    #[test]
    fn explicit_rest_base() {
        let movie = ResourceType::builder("movie")
            .rest_base("/films/")
            .build()
            .unwrap();
        assert_eq!(movie.route_base(), "/films");

        let err = ResourceType::builder("movie").rest_base("/").build().unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidRouteBase(_)));
    }

    #[test]
    fn registers_once_and_runs_hooks() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let before = Arc::clone(&calls);
        let after = Arc::clone(&calls);
        let mut movie = ResourceType::builder("movie")
            .before_registration(move |name, _| before.lock().push(format!("before {name}")))
            .after_registration(move |name, _| after.lock().push(format!("after {name}")))
            .build()
            .unwrap();

        let host = RecordingHost::default();
        movie.register_with_host(&host, &PassThrough).unwrap();
        assert_eq!(movie.state(), RegistrationState::Registered);
        assert_eq!(host.registered.lock().len(), 1);
        assert_eq!(*calls.lock(), vec!["before movie", "after movie"]);

        let err = movie.register_with_host(&host, &PassThrough).unwrap_err();
        assert!(matches!(err, RegistrationError::AlreadyRegistered { .. }));
        assert_eq!(host.registered.lock().len(), 1);
    }

    #[test]
    fn builtin_skips_host() {
        let mut post = ResourceType::builder("post").builtin().build().unwrap();
        let host = RecordingHost {
            fail: true,
            ..Default::default()
        };
        let config = post.register_with_host(&host, &PassThrough).unwrap();
        assert!(config.builtin);
        assert_eq!(post.state(), RegistrationState::Registered);
    }

    #[test]
    fn host_failure_reverts_state() {
        let mut movie = ResourceType::new("movie").unwrap();
        let host = RecordingHost {
            fail: true,
            ..Default::default()
        };
        let err = movie.register_with_host(&host, &PassThrough).unwrap_err();
        assert!(matches!(err, RegistrationError::Host(HostError::Storage(_))));
        assert_eq!(movie.state(), RegistrationState::Unregistered);
    }
}
