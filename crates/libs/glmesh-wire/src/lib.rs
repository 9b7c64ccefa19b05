//! # glmesh-wire
//!
//! Wire format for the GL vendor model carried over Bluetooth Mesh.
//!
//! Every vendor message is a 3-byte opcode followed by a fixed-width
//! payload. The opcode packs a per-kind message code with the vendor's
//! company identifier:
//!
//! ```text
//! [0xC0 | code][company_id lo][company_id hi][payload:fixed width]
//! ```
//!
//! Widened to `u32` for convenience, this is
//! `(0xC0 | code) << 16 | company_id.swap_bytes()`.
//!
//! ## Example
//!
//! ```rust
//! use glmesh_wire::{MessageRegistry, VendorRequest, VendorStatus, COMPANY_ID};
//!
//! let request = VendorRequest::RunTime(300).encode(COMPANY_ID).unwrap();
//! assert_eq!(request.opcode(), 0x00C1_4108);
//! assert_eq!(request.payload(), &[0x03, 0x00]);
//!
//! let registry = MessageRegistry::new(COMPANY_ID);
//! let status = registry.decode(request.opcode(), request.payload()).unwrap();
//! assert_eq!(status.status, VendorStatus::RunTime(300));
//! ```
//!
//! Besides the vendor messages, the crate names the standard configuration
//! and scene messages a controller issues ([`ConfigRequest`]) and their
//! replies ([`ConfigStatus`]); those are encoded by the mesh stack itself and
//! only their identity matters here. [`ResponseTable`] ties every request
//! kind to the reply kind that completes it.

pub mod address;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod response;

pub use address::Address;
pub use codec::{opcode, Coordinate, Switch};
pub use config::{ConfigRequest, ConfigStatus, ModelId};
pub use error::WireError;
pub use message::{InboundStatus, MessageKind, VendorMessage, VendorRequest, VendorStatus};
pub use registry::{Decoder, MessageRegistry};
pub use response::{RequestKind, ResponseKind, ResponseTable};

/// Company identifier assigned to the lighting vendor.
pub const COMPANY_ID: u16 = 0x0841;
