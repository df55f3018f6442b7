//! Assembles the demo content model and the REST dispatcher behind it.

use std::sync::Arc;

use anyhow::{Context, Result};
use custom_objects_sdk::host::ContentStore;
use custom_objects_sdk::types::RecordInput;
use tracing::info;

use crate::config::Config;
use crate::host::InMemoryHost;
use crate::lifecycle::Lifecycle;
use crate::registrar::{ResourceType, Taxonomy};
use crate::rest::{Dispatcher, LinkBuilder};
use crate::state::AppState;

/// The demo definitions: a public `movie` type with a hierarchical `genre`.
pub fn definitions(config: &Config) -> Result<Lifecycle> {
    let movie = ResourceType::builder("movie")
        .domain(config.text_domain.as_str())
        .public(true)
        .has_archive(true)
        .supports(["title", "editor", "excerpt", "thumbnail"])
        .taxonomy("genre")
        .build()
        .context("invalid movie definition")?;

    let genre = Taxonomy::builder("genre", ["movie"])
        .domain(config.text_domain.as_str())
        .hierarchical(true)
        .build()
        .context("invalid genre definition")?;

    let mut lifecycle = Lifecycle::new();
    lifecycle.add_resource(movie)?;
    lifecycle.add_taxonomy(genre)?;
    Ok(lifecycle)
}

/// Sample records and terms so the API has something to show.
pub fn seed(host: &InMemoryHost) -> Result<()> {
    let drama = host.insert_term("genre", "Drama", 0)?;
    let noir = host.insert_term("genre", "Film Noir", drama.term_id)?;
    host.insert_term("genre", "Comedy", 0)?;

    let movie = host.create_record(
        "movie",
        RecordInput {
            title: Some("The Third Man".to_string()),
            content: Some("Holly Martins arrives in post-war Vienna.".to_string()),
            status: Some("publish".to_string()),
            ..RecordInput::default()
        },
    )?;
    host.tag_record(movie.id, "genre", noir.term_id)?;

    info!(records = 1, terms = 3, "demo content seeded");
    Ok(())
}

/// Register the demo definitions with a fresh host and build the app state.
pub fn build(config: Config) -> Result<(AppState, Arc<InMemoryHost>)> {
    let host = Arc::new(InMemoryHost::new(config.site_url.as_str()));
    let mut lifecycle = definitions(&config)?;

    lifecycle
        .initialize(host.as_ref(), host.as_ref())
        .context("failed to register definitions")?;
    seed(&host).context("failed to seed demo content")?;

    let links = LinkBuilder::new(&config.site_url, &config.api_prefix);
    let mut dispatcher = Dispatcher::new();
    lifecycle
        .register_routes(&mut dispatcher, host.clone(), &links)
        .context("failed to register routes")?;

    info!(
        routes = dispatcher.route_count(),
        prefix = %config.api_prefix,
        "REST routes ready"
    );
    Ok((AppState::new(config, dispatcher), host))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn build_registers_and_seeds() {
        let (state, host) = build(Config::default()).unwrap();
        assert!(host.is_type_registered("movie"));
        assert_eq!(host.taxonomy_names(), vec!["genre"]);
        // movie: 2 record patterns + 4 taxonomy patterns.
        assert_eq!(state.dispatcher().route_count(), 6);
        assert_eq!(host.record_terms(1).len(), 1);
    }
}
