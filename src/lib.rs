//! Security binding pipeline engine for SOAP/WS-* bindings.
//!
//! Turns a high-level security choice (security mode, transport and message
//! descriptors, encoding) into an ordered sequence of binding elements, and
//! recognizes such sequences when they are recovered from service metadata.
//! Also builds the protocol faults a receiver sends back to a sender.
//!
//! # Features
//!
//! - Closed security mode taxonomies with a unified bit-flag projection
//! - HTTP, TCP and named pipe transport security descriptors
//! - Basic profile, TCP and federated message security descriptors
//! - Basic HTTP, Basic HTTPS, WS-Federation HTTP, Net TCP and Net Named Pipe
//!   bindings with synthesis and recognition
//! - Fault codes, multilingual reasons, MustUnderstand and WS-Addressing
//!   faults rendered as SOAP 1.1 or 1.2 envelopes
//!
//! # Example
//!
//! ```
//! use zentinel_soap_binding::binding::{BasicHttpBinding, SecurityBinding};
//! use zentinel_soap_binding::mode::BasicHttpSecurityMode;
//!
//! let binding = BasicHttpBinding::new(BasicHttpSecurityMode::Transport);
//! let sequence = binding.create_elements().unwrap();
//! assert_eq!(sequence.len(), 2);
//! assert_eq!(BasicHttpBinding::try_recover(&sequence), Some(binding.normalized()));
//! ```

pub mod binding;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod message;
pub mod mode;
pub mod pipeline;
pub mod transport;
pub mod version;

pub use binding::{BindingConfiguration, SecurityBinding};
pub use config::BindingDescriptionConfig;
pub use error::{BindingError, Result};
pub use pipeline::{BindingElement, BindingElementSequence, BindingFamily, EncodingKind};
