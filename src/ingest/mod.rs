pub mod batch;
pub mod source;
pub mod validator;

pub use batch::{BatchIngestor, IngestError, IngestSummary};
pub use source::{HttpObjectSource, LocalObjectSource, ObjectError, ObjectSource};
