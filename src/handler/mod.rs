//! Request handler module
//!
//! Routes requests to the landing page or to the document dispatcher, which
//! resolves paths against the contexts and vocab document sets.

pub mod dispatch;
pub mod landing;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
