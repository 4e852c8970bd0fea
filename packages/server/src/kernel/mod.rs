//! Collaborator adapters consumed by the extraction routes.

pub mod document_store;
pub mod object_store;

pub use document_store::PgDocumentStore;
pub use object_store::ObjectStoreClient;
