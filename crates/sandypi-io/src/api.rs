//! Client for the table's drawings API.
//!
//! Two endpoints are used:
//!
//! - `POST /api/upload/` with a multipart form holding the G-code as
//!   `file` and its name as `filename`.  The server answers with JSON:
//!   the new drawing id, `-1` when it refused the file, or an object
//!   carrying `success`.
//! - `GET /api/download/<id>` returning the stored G-code as text.

use reqwest::blocking::{Client, Response, multipart};
use serde_json::Value;

use crate::error::IoError;

/// Server acknowledgement of an accepted upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadAck {
    /// Id of the new drawing, when the server reported one.
    pub id: Option<i64>,
    /// Raw response body.
    pub body: Value,
}

impl UploadAck {
    /// Interpret an upload response body.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Rejected`] for a negative id or an object with
    /// `"success": false`.
    pub fn from_body(body: Value) -> Result<Self, IoError> {
        let id = match &body {
            Value::Number(n) => match n.as_i64() {
                Some(id) if id >= 0 => Some(id),
                _ => return Err(IoError::Rejected(body.to_string())),
            },
            Value::Object(map) => {
                if map.get("success").and_then(Value::as_bool) == Some(false) {
                    return Err(IoError::Rejected(body.to_string()));
                }
                map.get("id").and_then(Value::as_i64)
            }
            _ => None,
        };
        Ok(Self { id, body })
    }
}

/// Storage for drawings on the table.
pub trait DrawingsApi {
    /// Store `gcode` under `filename`.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if the request fails or is refused.
    fn upload(&self, gcode: &str, filename: &str) -> Result<UploadAck, IoError>;

    /// Fetch the raw G-code of drawing `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if the request fails.
    fn fetch_gcode(&self, id: u64) -> Result<String, IoError>;
}

/// [`DrawingsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDrawingsApi {
    client: Client,
    base_url: String,
}

impl HttpDrawingsApi {
    /// A client for the server at `base_url`, e.g. `http://sandypi.local`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, IoError> {
        let client = Client::builder()
            .user_agent(concat!("sandypi/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Server root this client talks to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl DrawingsApi for HttpDrawingsApi {
    fn upload(&self, gcode: &str, filename: &str) -> Result<UploadAck, IoError> {
        let file = multipart::Part::text(gcode.to_owned())
            .file_name(filename.to_owned())
            .mime_str("text/plain")?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("filename", filename.to_owned());

        let url = self.url("/api/upload/");
        log::debug!("POST {url} ({filename}, {} bytes)", gcode.len());
        let response = success(self.client.post(&url).multipart(form).send()?)?;
        UploadAck::from_body(response.json()?)
    }

    fn fetch_gcode(&self, id: u64) -> Result<String, IoError> {
        let url = self.url(&format!("/api/download/{id}"));
        log::debug!("GET {url}");
        let response = success(self.client.get(&url).send()?)?;
        Ok(response.text()?)
    }
}

fn success(response: Response) -> Result<Response, IoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(IoError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_id_is_accepted() {
        let ack = UploadAck::from_body(json!(17)).unwrap();
        assert_eq!(ack.id, Some(17));
    }

    #[test]
    fn negative_id_is_rejected() {
        assert!(matches!(
            UploadAck::from_body(json!(-1)),
            Err(IoError::Rejected(_))
        ));
    }

    #[test]
    fn success_object() {
        let ack = UploadAck::from_body(json!({"success": true, "id": 3})).unwrap();
        assert_eq!(ack.id, Some(3));

        let ack = UploadAck::from_body(json!({"success": true})).unwrap();
        assert_eq!(ack.id, None);

        assert!(matches!(
            UploadAck::from_body(json!({"success": false, "error": "bad file"})),
            Err(IoError::Rejected(msg)) if msg.contains("bad file")
        ));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let api = HttpDrawingsApi::new("http://table.local/").unwrap();
        assert_eq!(api.base_url(), "http://table.local");
        assert_eq!(
            api.url("/api/download/4"),
            "http://table.local/api/download/4"
        );
    }
}
