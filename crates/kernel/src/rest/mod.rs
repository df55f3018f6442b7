//! REST exposure of resource types and taxonomies.

mod dispatcher;
mod links;
mod resource;
mod route_table;
mod taxonomy;

pub use dispatcher::Dispatcher;
pub use links::LinkBuilder;
pub use resource::ResourceEndpoints;
pub use route_table::{
    Capability, DispatchArgs, DispatchFilter, Handler, RestServer, RouteHandler, RouteTable,
};
pub use taxonomy::{TaxonomyEndpoints, TermContext};
