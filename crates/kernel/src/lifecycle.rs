//! Two-phase startup.
//!
//! The embedding application collects definitions, calls
//! [`Lifecycle::initialize`] once the host is ready to accept registrations,
//! and then [`Lifecycle::register_routes`] once its REST server is ready.
//! Routes are only built for definitions the host already knows about.

use std::sync::Arc;

use custom_objects_sdk::host::{ContentHost, ContentStore, Translator};
use tracing::info;

use crate::error::LifecycleError;
use crate::naming::NameKind;
use crate::registrar::{RegistrationState, ResourceType, Taxonomy};
use crate::rest::{LinkBuilder, ResourceEndpoints, RestServer, TaxonomyEndpoints};

/// Which startup phase has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Definitions are being collected.
    #[default]
    Defining,
    /// Every definition is registered with the host.
    Initialized,
    /// Routes are registered with the REST server.
    Serving,
}

/// Owns the definitions and drives them through startup.
#[derive(Debug, Default)]
pub struct Lifecycle {
    resources: Vec<ResourceType>,
    taxonomies: Vec<Taxonomy>,
    phase: Phase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn resources(&self) -> &[ResourceType] {
        &self.resources
    }

    pub fn taxonomies(&self) -> &[Taxonomy] {
        &self.taxonomies
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceType> {
        self.resources.iter().find(|r| r.name() == name)
    }

    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.taxonomies.iter().find(|t| t.name() == name)
    }

    pub fn add_resource(&mut self, resource: ResourceType) -> Result<(), LifecycleError> {
        self.ensure_defining()?;
        if self.resource(resource.name()).is_some() {
            return Err(LifecycleError::AlreadyRegistered {
                kind: NameKind::Resource,
                name: resource.name().to_string(),
            });
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn add_taxonomy(&mut self, taxonomy: Taxonomy) -> Result<(), LifecycleError> {
        self.ensure_defining()?;
        if self.taxonomy(taxonomy.name()).is_some() {
            return Err(LifecycleError::AlreadyRegistered {
                kind: NameKind::Taxonomy,
                name: taxonomy.name().to_string(),
            });
        }
        self.taxonomies.push(taxonomy);
        Ok(())
    }

    /// Register every resource type, then every taxonomy, with the host.
    ///
    /// Stops at the first failure. Definitions registered before it stay
    /// registered and are skipped if `initialize` is called again.
    pub fn initialize(
        &mut self,
        host: &dyn ContentHost,
        translator: &dyn Translator,
    ) -> Result<(), LifecycleError> {
        self.ensure_defining()?;

        for resource in &mut self.resources {
            if resource.state() == RegistrationState::Unregistered {
                resource.register_with_host(host, translator)?;
            }
        }
        for taxonomy in &mut self.taxonomies {
            if taxonomy.state() == RegistrationState::Unregistered {
                taxonomy.register_with_host(host, translator)?;
            }
        }

        self.phase = Phase::Initialized;
        info!(
            resources = self.resources.len(),
            taxonomies = self.taxonomies.len(),
            "definitions initialized"
        );
        Ok(())
    }

    /// Mount record and taxonomy routes for every resource type.
    ///
    /// Taxonomy routes are mounted under a resource's base when at least one
    /// taxonomy is associated with it.
    pub fn register_routes(
        &mut self,
        server: &mut dyn RestServer,
        store: Arc<dyn ContentStore>,
        links: &LinkBuilder,
    ) -> Result<(), LifecycleError> {
        match self.phase {
            Phase::Defining => return Err(LifecycleError::NotInitialized),
            Phase::Serving => return Err(LifecycleError::RoutesAlreadyRegistered),
            Phase::Initialized => {}
        }

        for resource in &self.resources {
            let endpoints = Arc::new(ResourceEndpoints::for_resource(
                resource,
                Arc::clone(&store),
                links.clone(),
            ));
            server.register_routes(endpoints.routes());
            server.add_dispatch_filter(endpoints);

            let taxonomies = self.taxonomy_names_for(resource);
            if !taxonomies.is_empty() {
                let endpoints = Arc::new(TaxonomyEndpoints::for_resource(
                    resource,
                    Arc::clone(&store),
                    links.clone(),
                ));
                server.register_routes(endpoints.routes());
                server.add_dispatch_filter(endpoints);
            }

            info!(
                resource = %resource.name(),
                base = %resource.route_base(),
                taxonomies = ?taxonomies,
                "routes registered"
            );
        }

        self.phase = Phase::Serving;
        Ok(())
    }

    /// Taxonomies associated with `resource`, from either side.
    pub fn taxonomy_names_for(&self, resource: &ResourceType) -> Vec<String> {
        let mut names: Vec<String> = resource.taxonomies().to_vec();
        for taxonomy in &self.taxonomies {
            if taxonomy.applies_to(resource.name()) && !names.iter().any(|n| n == taxonomy.name())
            {
                names.push(taxonomy.name().to_string());
            }
        }
        names
    }

    fn ensure_defining(&self) -> Result<(), LifecycleError> {
        if self.phase == Phase::Defining {
            Ok(())
        } else {
            Err(LifecycleError::AlreadyInitialized)
        }
    }
}
