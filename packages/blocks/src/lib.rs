//! # Pagecraft Blocks
//!
//! Data model for landing pages built from content blocks.
//!
//! ```text
//! LandingPage
//!  └─ PageContent (theme, fonts, motion, ...)
//!      └─ BlockTree
//!          ├─ Block (heading)
//!          ├─ Block (container)
//!          │   ├─ Block (image)
//!          │   └─ Block (paragraph)
//!          └─ Block (stripe_checkout)
//! ```
//!
//! - [`BlockKind`] is the closed set of block types
//! - [`schema`] declares each kind's editable fields once
//! - [`BlockRegistry`] derives defaults, caps and Pro gates from it
//! - [`BlockTree`] decodes leniently and normalizes structural invariants

pub mod block;
pub mod error;
pub mod id_generator;
pub mod kind;
pub mod page;
pub mod registry;
pub mod schema;
pub mod tree;

pub use block::{is_reserved_key, Block, BlockId, BlockMotion, FaqItem, FieldBag, OpaqueBlock, SocialLink, RESERVED_KEYS};
pub use error::BlockError;
pub use id_generator::{IdSource, SequentialIds, UuidIds};
pub use kind::BlockKind;
pub use page::{FontColors, LandingPage, MotionSettings, PageContent};
pub use registry::{BlockRegistry, RegistryBuilder};
pub use schema::{field_spec, schema, FieldDefault, FieldKind, FieldSpec};
pub use tree::{BlockLocation, BlockTree};
