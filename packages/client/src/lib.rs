//! # Pagecraft Client
//!
//! Everything that talks to the page backend:
//!
//! - [`PageApi`]: the REST collaborator contract
//! - [`HttpPageApi`] / [`MemoryPageApi`]: over the network, or in process
//! - [`VersionService`]: snapshot save/list/apply/delete with tier caps
//! - [`Builder`]: an edit session plus the network operations around it
//!
//! Network calls are async and never serialized against each other. Only
//! uploads carry an [`InFlight`] guard.

pub mod api;
pub mod builder;
pub mod checkout;
pub mod error;
pub mod guard;
pub mod http;
pub mod memory;
pub mod versions;

pub use api::{CheckoutRequest, CopyRequest, PageApi, SaveVersionRequest, SnapshotRef, VersionSnapshot};
pub use builder::Builder;
pub use checkout::price_to_cents;
pub use error::{ApiError, BuilderError, VersionError};
pub use guard::{InFlight, InFlightToken};
pub use http::{HttpPageApi, DEFAULT_TIMEOUT};
pub use memory::{MemoryPageApi, Operation};
pub use versions::{Tier, VersionService};
