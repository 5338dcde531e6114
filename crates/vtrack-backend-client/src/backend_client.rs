//! Face-recognition backend client (§6.2, consumed contract, §4.8).

use regex::Regex;
use std::sync::OnceLock;
use vtrack_models::Event;

use crate::error::{BackendError, BackendResult};

fn desc_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)desc:\s*(?P<desc>.+?)(?:,\s*param:|\n|$)").expect("static regex is valid")
    })
}

/// Pull the backend's human-readable `desc: ...` out of an error body,
/// falling back to the raw message when the pattern doesn't match
/// (§4.8 step 7, §7).
pub fn extract_desc(raw_error: &str) -> String {
    desc_pattern()
        .captures(raw_error)
        .and_then(|c| c.name("desc"))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| raw_error.to_string())
}

/// Submits best events to the face-recognition backend. No retry: a
/// failed submission is logged and the event discarded (§7).
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    jpeg_quality: u8,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, jpeg_quality: u8) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            jpeg_quality,
        }
    }

    /// Submit `event`'s frame and ROI to the backend under `camera_id`
    /// and `token` (§6.2). The caller supplies `camera_id`/`token`
    /// rather than this reading them off `event.frame()`, since the
    /// frame may already have been released by the time the dispatch
    /// worker gets to it only in the overflow path — callers always
    /// submit immediately after dequeue, before any release can race.
    pub async fn add_face_event(
        &self,
        token: &str,
        camera_id: i64,
        event: &Event,
    ) -> BackendResult<()> {
        let frame = event
            .frame()
            .ok_or_else(|| BackendError::Submit("event has no frame to submit".into()))?;
        let jpeg = frame.handle.encode_jpeg(self.jpeg_quality)?;
        let roi = event.bbox.expand(0.2);
        let timestamp_iso = frame.captured_at.to_iso8601_local();

        let form = reqwest::multipart::Form::new()
            .text("camera", camera_id.to_string())
            .text("roi", format!("[{},{},{},{}]", roi.0, roi.1, roi.2, roi.3))
            .text("mf_selector", "all")
            .text("timestamp", timestamp_iso)
            .part(
                "fullframe",
                reqwest::multipart::Part::bytes(jpeg).file_name("frame.jpg"),
            );

        let url = format!("{}/events/", self.base_url);
        let response = self
            .http
            .post(url)
            .header("X-Auth-Token", token)
            .multipart(form)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                Err(BackendError::Submit(format!(
                    "{}",
                    extract_desc(&format!("{status}: {body}"))
                )))
            }
            Err(err) => Err(BackendError::Submit(extract_desc(&err.to_string()))),
        }
    }
}
