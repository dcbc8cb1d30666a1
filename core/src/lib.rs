//! Endpoint resolution and response normalization against the crowd-work
//! marketplace's inconsistent REST surface.

pub mod candidate;
pub mod config;
pub mod error;
pub mod identifier;
pub mod normalize;
pub mod operation;
pub mod resolver;
pub mod status;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use candidate::{CandidateTable, EndpointCandidate, ExpectedShape, HttpMethod, Pagination, PaginationStyle};
pub use config::UpstreamConfig;
pub use error::{ApiError, ResolveError};
pub use normalize::NormalizedResult;
pub use operation::LogicalOperation;
pub use resolver::{AttemptRecord, ResolutionFailure, ResolutionOutcome, ResolveParams, Resolved, Resolver};
pub use status::{Rating, StatusToken};
pub use transport::{TransportError, UpstreamRequest, UpstreamResponse, UpstreamTransport};
