//! Camera registry client (§6.3, consumed contract).

use serde::Deserialize;
use vtrack_models::Camera;

use crate::error::RegistryResult;

#[derive(Debug, Deserialize)]
struct CameraGroupsResponse {
    results: Vec<CameraGroup>,
}

#[derive(Debug, Deserialize)]
struct CameraGroup {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CamerasResponse {
    results: Vec<CameraRecord>,
}

#[derive(Debug, Deserialize)]
struct CameraRecord {
    id: i64,
    name: String,
    external_detector_token: String,
    #[serde(default)]
    comment: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

/// Fetches the camera fleet from the external registry, filtered to the
/// configured group prefix and to entries whose `comment` carries an
/// RTSP source (§6.3).
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    group_prefix: String,
}

impl RegistryClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, group_prefix: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            group_prefix: group_prefix.into(),
        }
    }

    /// The full fleet, across every matching camera group.
    pub async fn fetch_cameras(&self) -> RegistryResult<Vec<Camera>> {
        let groups = self.fetch_camera_groups().await?;
        let matching: Vec<_> = groups
            .into_iter()
            .filter(|g| g.name.to_lowercase().starts_with(&self.group_prefix.to_lowercase()))
            .collect();

        let mut cameras = Vec::new();
        for group in matching {
            cameras.extend(self.fetch_group_cameras(group.id).await?);
        }
        Ok(cameras)
    }

    async fn fetch_camera_groups(&self) -> RegistryResult<Vec<CameraGroup>> {
        let url = format!("{}/camera-groups/", self.base_url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body: CameraGroupsResponse = response.json().await?;
        Ok(body.results)
    }

    async fn fetch_group_cameras(&self, group_id: i64) -> RegistryResult<Vec<Camera>> {
        let url = format!("{}/cameras/", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[
                ("camera_groups", group_id.to_string()),
                ("external_detector", "true".to_string()),
                ("ordering", "id".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: CamerasResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .filter(|c| c.comment.starts_with("rtsp://"))
            .filter_map(|c| {
                vtrack_models::CameraId::new(c.id).ok().map(|id| Camera {
                    id,
                    name: c.name,
                    token: c.external_detector_token,
                    rtsp_url: c.comment.trim().to_string(),
                    active: c.active,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_cameras_filters_by_prefix_and_rtsp_comment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/camera-groups/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 1, "name": "TESTE-lobby"},
                    {"id": 2, "name": "production"},
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/cameras/"))
            .and(query_param("camera_groups", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 10, "name": "cam-a", "external_detector_token": "tok-a", "comment": "rtsp://a", "active": true},
                    {"id": 11, "name": "cam-b", "external_detector_token": "tok-b", "comment": "not-rtsp", "active": true},
                ]
            })))
            .mount(&server)
            .await;

        let client = RegistryClient::new(reqwest::Client::new(), server.uri(), "TESTE");
        let cameras = client.fetch_cameras().await.unwrap();

        assert_eq!(cameras.len(), 1);
        assert_eq!(cameras[0].id.value(), 10);
    }

    #[tokio::test]
    async fn fetch_cameras_is_case_insensitive_on_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/camera-groups/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": 1, "name": "teste-entrance"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/cameras/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 5, "name": "cam", "external_detector_token": "t", "comment": "rtsp://x", "active": false},
                ]
            })))
            .mount(&server)
            .await;

        let client = RegistryClient::new(reqwest::Client::new(), server.uri(), "TESTE");
        let cameras = client.fetch_cameras().await.unwrap();
        assert_eq!(cameras.len(), 1);
        assert!(!cameras[0].active);
    }
}
