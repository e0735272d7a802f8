//! # Providers
//!
//! Collaborator interfaces the engine talks to, their error type and in-memory
//! implementations used by tests and local runs.

pub mod errors;
pub mod in_memory;
pub mod pagination;
pub mod traits;

pub use errors::{ProviderError, ProviderResult};
pub use in_memory::{
    InMemoryOrganizations, InMemoryParameterStore, InMemoryServiceCatalog, RecordingInvoker,
};
pub use pagination::{collect_pages, Page};
pub use traits::{DownstreamInvoker, OrganizationsApi, ParameterStore, ServiceCatalogApi};
