// CLIP v2 API surface (`/clip/v2/resource/...`), authenticated by the
// `hue-application-key` header.

pub mod client;
pub mod types;
