#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Definition-to-route flows driven through the dispatcher directly:
//! naming, registration with a host, and route mounting.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::{Method, StatusCode};
use serde_json::json;

use custom_objects_kernel::error::{DefinitionError, LifecycleError};
use custom_objects_kernel::host::InMemoryHost;
use custom_objects_kernel::naming::{self, NameKind};
use custom_objects_kernel::registrar::{RegistrationState, ResourceType, Taxonomy};
use custom_objects_kernel::rest::{Dispatcher, LinkBuilder};
use custom_objects_kernel::{Lifecycle, Phase};
use custom_objects_sdk::types::QueryVar;

const SITE: &str = "http://example.com";

fn serve(lifecycle: &mut Lifecycle, host: &Arc<InMemoryHost>) -> Dispatcher {
    lifecycle.initialize(host.as_ref(), host.as_ref()).unwrap();
    let mut dispatcher = Dispatcher::new();
    lifecycle
        .register_routes(&mut dispatcher, host.clone(), &LinkBuilder::new(SITE, "/wp-json"))
        .unwrap();
    dispatcher
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn irregular_and_compound_plurals() {
    assert_eq!(naming::derive_resource("person", None).unwrap().plural, "people");
    assert_eq!(naming::derive_resource("category_item", None).unwrap().plural, "category_items");
    let press = naming::derive_resource("press_release", None).unwrap();
    assert_eq!(press.route_base, "/press-releases");
    assert_eq!(press.labels.get("name"), Some("Press releases"));
}

#[test]
fn names_must_already_be_canonical() {
    let err = naming::derive_resource("Movies", None).unwrap_err();
    assert_eq!(
        err,
        DefinitionError::NamingConvention {
            kind: NameKind::Resource,
            name: "Movies".to_string(),
            expected: "movie".to_string(),
        }
    );
    assert!(naming::derive_resource("film-clip", None).is_err());
    assert!(naming::derive_taxonomy("film-genre", None).is_ok());
}

#[test]
fn reserved_names_need_builtin() {
    assert!(matches!(
        ResourceType::new("post"),
        Err(DefinitionError::ReservedName { .. })
    ));
    let post = ResourceType::builder("post").builtin().build().unwrap();
    assert!(post.is_builtin());
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn host_receives_translated_configuration() {
    let host = Arc::new(InMemoryHost::new(SITE));
    host.add_translation("films", "%s post content type", "Type de contenu %s");

    let mut lifecycle = Lifecycle::new();
    lifecycle
        .add_resource(
            ResourceType::builder("movie")
                .domain("films")
                .public(true)
                .build()
                .unwrap(),
        )
        .unwrap();
    lifecycle.initialize(host.as_ref(), host.as_ref()).unwrap();

    let config = host.type_config("movie").unwrap();
    assert_eq!(config.label, "Movies");
    assert_eq!(config.description, "Type de contenu Movies");
    assert!(config.show_ui);
    assert!(!config.exclude_from_search);
    assert_eq!(config.rest_base, "/movies");
    assert_eq!(lifecycle.resource("movie").unwrap().state(), RegistrationState::Registered);
}

#[test]
fn taxonomy_defaults_follow_name() {
    let host = Arc::new(InMemoryHost::new(SITE));
    let mut taxonomy = Taxonomy::builder("genre", ["movie", "movie", " book "])
        .build()
        .unwrap();
    assert_eq!(taxonomy.object_types(), ["movie", "book"]);

    let config = taxonomy
        .register_with_host(host.as_ref(), host.as_ref())
        .unwrap();
    assert!(config.public);
    assert_eq!(config.query_var, QueryVar::Name("genre".to_string()));
    assert_eq!(config.labels.get("name"), Some("Genres"));
}

#[test]
fn hooks_run_around_host_registration() {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let (b, a) = (before.clone(), after.clone());

    let mut movie = ResourceType::builder("movie")
        .before_registration(move |name, _| {
            assert_eq!(name, "movie");
            b.fetch_add(1, Ordering::SeqCst);
        })
        .after_registration(move |_, config| {
            assert_eq!(config.label, "Movies");
            a.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let host = InMemoryHost::new(SITE);
    movie.register_with_host(&host, &host).unwrap();
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 1);

    // A second registration is refused before any hook runs.
    assert!(movie.register_with_host(&host, &host).is_err());
    assert_eq!(before.load(Ordering::SeqCst), 1);
}

#[test]
fn duplicate_definitions_are_refused() {
    let mut lifecycle = Lifecycle::new();
    lifecycle.add_resource(ResourceType::new("movie").unwrap()).unwrap();
    let err = lifecycle
        .add_resource(ResourceType::new("movie").unwrap())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyRegistered { .. }));
    assert_eq!(lifecycle.phase(), Phase::Defining);
}

// =============================================================================
// Route mounting
// =============================================================================

#[test]
fn type_injection_respects_segment_boundary() {
    let host = Arc::new(InMemoryHost::new(SITE));
    let mut lifecycle = Lifecycle::new();
    lifecycle.add_resource(ResourceType::new("movie").unwrap()).unwrap();
    lifecycle
        .add_resource(
            ResourceType::builder("clip")
                .rest_base("movies-extra")
                .build()
                .unwrap(),
        )
        .unwrap();
    let dispatcher = serve(&mut lifecycle, &host);

    let movie = dispatcher
        .dispatch(Method::POST, "/movies", HashMap::new(), Some(json!({ "title": "Heat" })))
        .unwrap();
    assert_eq!(movie.status, StatusCode::CREATED);
    assert_eq!(movie.body["type"], "movie");

    let clip = dispatcher
        .dispatch(
            Method::POST,
            "/movies-extra",
            HashMap::new(),
            Some(json!({ "title": "Trailer" })),
        )
        .unwrap();
    assert_eq!(clip.body["type"], "clip");

    let clip_id = clip.body["ID"].as_u64().unwrap();
    let err = dispatcher
        .dispatch(Method::GET, &format!("/movies/{clip_id}"), HashMap::new(), None)
        .unwrap_err();
    assert_eq!(err.into_api_error().code, "json_post_invalid_type");
}

#[test]
fn taxonomy_routes_mount_only_when_associated() {
    let host = Arc::new(InMemoryHost::new(SITE));
    let mut lifecycle = Lifecycle::new();
    lifecycle.add_resource(ResourceType::new("movie").unwrap()).unwrap();
    lifecycle.add_resource(ResourceType::new("book").unwrap()).unwrap();
    lifecycle
        .add_taxonomy(Taxonomy::builder("genre", ["movie"]).build().unwrap())
        .unwrap();
    let dispatcher = serve(&mut lifecycle, &host);

    let listed = dispatcher
        .dispatch(Method::GET, "/movies/taxonomies", HashMap::new(), None)
        .unwrap();
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let err = dispatcher
        .dispatch(Method::GET, "/books/taxonomies", HashMap::new(), None)
        .unwrap_err();
    assert_eq!(err.into_api_error().code, "json_no_route");
}

#[test]
fn route_bases_with_pattern_syntax_are_refused() {
    for base in ["films.v2", "books("] {
        let err = ResourceType::builder("book")
            .rest_base(base)
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::InvalidRouteBase(base.to_string()));
    }
}

#[test]
fn dashed_taxonomy_is_reachable() {
    let host = Arc::new(InMemoryHost::new(SITE));
    let mut lifecycle = Lifecycle::new();
    lifecycle.add_resource(ResourceType::new("movie").unwrap()).unwrap();
    lifecycle
        .add_taxonomy(Taxonomy::builder("film-genre", ["movie"]).build().unwrap())
        .unwrap();
    let dispatcher = serve(&mut lifecycle, &host);
    host.insert_term("film-genre", "Heist", 0).unwrap();

    let listed = dispatcher
        .dispatch(Method::GET, "/movies/taxonomies", HashMap::new(), None)
        .unwrap();
    let archives = listed.body[0]["meta"]["links"]["archives"].as_str().unwrap();
    assert_eq!(archives, "http://example.com/wp-json/movies/taxonomies/film-genre/terms");

    let taxonomy = dispatcher
        .dispatch(Method::GET, "/movies/taxonomies/film-genre", HashMap::new(), None)
        .unwrap();
    assert_eq!(taxonomy.body["slug"], "film-genre");

    let terms = dispatcher
        .dispatch(Method::GET, "/movies/taxonomies/film-genre/terms", HashMap::new(), None)
        .unwrap();
    assert_eq!(terms.status, StatusCode::OK);
    assert_eq!(terms.body[0]["name"], "Heist");
    assert_eq!(terms.body[0]["link"], "http://example.com/film-genre/heist/");
}

#[test]
fn explicit_type_query_selects_taxonomy_target() {
    let host = Arc::new(InMemoryHost::new(SITE));
    let mut lifecycle = Lifecycle::new();
    lifecycle
        .add_resource(ResourceType::builder("movie").taxonomy("genre").build().unwrap())
        .unwrap();
    lifecycle.add_resource(ResourceType::new("book").unwrap()).unwrap();
    lifecycle
        .add_taxonomy(Taxonomy::builder("genre", ["movie"]).build().unwrap())
        .unwrap();
    let dispatcher = serve(&mut lifecycle, &host);

    let query = HashMap::from([("type".to_string(), "book".to_string())]);
    let err = dispatcher
        .dispatch(Method::GET, "/movies/taxonomies/genre", query, None)
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
