//! Earth Engine helpers used by the preprocessing notebooks.
//!
//! - [`Session`]: unauthenticated/authenticated bootstrap with a single
//!   credential-refresh retry
//! - [`mask_clouds`]: Sentinel-2 QA60 cloud and cirrus masking

pub mod cloud_mask;
pub mod credentials;
pub mod error;
pub mod session;

pub use cloud_mask::{is_cloudy, mask_clouds, read_image, write_image, Image};
pub use credentials::{default_credentials_path, CredentialsBackend};
pub use error::{EeError, EeResult};
pub use session::{EeBackend, Session, SessionState};
