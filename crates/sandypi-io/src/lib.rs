//! sandypi-io: Talking to the table and the local filesystem.
//!
//! Uploads generated G-code as drawings, saves it locally, and fetches
//! stored drawings back for preview.  User-facing outcomes go through
//! an injected [`Notifier`]; diagnostics go to the `log` facade.

pub mod api;
pub mod download;
pub mod error;
pub mod filename;
pub mod notify;
pub mod preview;
pub mod upload;

pub use api::{DrawingsApi, HttpDrawingsApi, UploadAck};
pub use download::download;
pub use error::IoError;
pub use filename::{normalize_filename, normalize_filename_now};
pub use notify::{Level, LogNotifier, Notifier};
pub use preview::{PreviewState, fetch_for_preview, load_preview};
pub use upload::{Uploaded, Uploader};
