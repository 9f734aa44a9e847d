//! Uploading generated G-code as a new drawing.

use crate::api::{DrawingsApi, UploadAck};
use crate::error::IoError;
use crate::filename::{DEFAULT_PREFIX, normalize_filename_now};
use crate::notify::{Level, Notifier};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Uploaded {
    /// File name the drawing was stored under.
    pub filename: String,
    /// Server acknowledgement.
    pub ack: UploadAck,
}

/// Uploads drawings and tells the user how it went.
///
/// Each call is a single attempt.  A failure is reported through the
/// notifier and returned; nothing is retried or queued.
#[derive(Debug)]
pub struct Uploader<A, N> {
    api: A,
    notifier: N,
    prefix: String,
}

impl<A: DrawingsApi, N: Notifier> Uploader<A, N> {
    /// An uploader generating `drawing_<timestamp>` names for unnamed
    /// drawings.
    #[must_use]
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Use `prefix` for generated names (e.g. `pattern`, `kaleidoscope`).
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The underlying API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Upload `gcode` under `name`.
    ///
    /// # Errors
    ///
    /// Returns the [`IoError`] from the API after notifying the user.
    pub fn upload(&self, gcode: &str, name: &str) -> Result<Uploaded, IoError> {
        let filename = normalize_filename_now(name, &self.prefix);
        match self.api.upload(gcode, &filename) {
            Ok(ack) => {
                log::info!("uploaded {filename} (id {:?})", ack.id);
                self.notifier
                    .notify(Level::Success, &format!("Drawing \"{filename}\" sent to drawings!"));
                Ok(Uploaded { filename, ack })
            }
            Err(err) => {
                log::warn!("upload of {filename} failed: {err}");
                self.notifier
                    .notify(Level::Error, &format!("Error uploading drawing \"{filename}\""));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct FakeApi {
        refuse: bool,
        uploads: RefCell<Vec<(String, String)>>,
    }

    impl DrawingsApi for FakeApi {
        fn upload(&self, gcode: &str, filename: &str) -> Result<UploadAck, IoError> {
            self.uploads
                .borrow_mut()
                .push((gcode.to_owned(), filename.to_owned()));
            if self.refuse {
                UploadAck::from_body(json!(-1))
            } else {
                UploadAck::from_body(json!(7))
            }
        }

        fn fetch_gcode(&self, _id: u64) -> Result<String, IoError> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(Level, String)>>);

    impl Notifier for Recorder {
        fn notify(&self, level: Level, message: &str) {
            self.0.borrow_mut().push((level, message.to_owned()));
        }
    }

    #[test]
    fn success_is_notified() {
        let notes = Recorder::default();
        let uploader = Uploader::new(FakeApi::default(), &notes);
        let uploaded = uploader.upload("G0 X0 Y0\n", " waves ").unwrap();

        assert_eq!(uploaded.filename, "waves.gcode");
        assert_eq!(uploaded.ack.id, Some(7));
        assert_eq!(
            uploader.api().uploads.borrow().as_slice(),
            [("G0 X0 Y0\n".to_owned(), "waves.gcode".to_owned())]
        );
        let notes = notes.0.borrow();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].0, Level::Success);
        assert!(notes[0].1.contains("waves.gcode"));
    }

    #[test]
    fn failure_is_notified_once_and_not_retried() {
        let notes = Recorder::default();
        let api = FakeApi {
            refuse: true,
            ..FakeApi::default()
        };
        let uploader = Uploader::new(api, &notes);
        let err = uploader.upload("G0 X0 Y0\n", "waves").unwrap_err();

        assert!(matches!(err, IoError::Rejected(_)));
        assert_eq!(uploader.api().uploads.borrow().len(), 1);
        let expected = (Level::Error, "Error uploading drawing \"waves.gcode\"".to_owned());
        assert_eq!(notes.0.borrow().as_slice(), [expected]);
    }

    #[test]
    fn custom_prefix_names_unnamed_drawings() {
        let uploader = Uploader::new(FakeApi::default(), crate::LogNotifier).with_prefix("pattern");
        let uploaded = uploader.upload("G0 X0 Y0\n", "").unwrap();
        assert!(uploaded.filename.starts_with("pattern_"));
        assert!(uploaded.filename.ends_with(".gcode"));
    }
}
