//! Runner services: loading, discovery, expansion, dispatch and assertions.

pub mod aggregator;
pub mod assertion;
pub mod discovery;
pub mod dispatcher;
pub mod expander;
pub mod loader;
pub mod resolver;
pub mod runner;
pub mod transport;

pub use discovery::load_dir_or_file;
pub use loader::{FileSuiteSource, RegistrySuiteSource, SuiteSource};
pub use runner::{HttpRunner, Runner};
pub use transport::{ReqwestTransport, Transport, UnitRequest};
