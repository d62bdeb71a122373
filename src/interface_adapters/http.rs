// Error body shared by the room-provisioning route and the ws upgrade
// rejections, so every HTTP failure reads the same on the wire.

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
