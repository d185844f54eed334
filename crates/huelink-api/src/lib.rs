// huelink-api: Async Rust client for the Hue bridge (v1 pairing + CLIP v2 lights)

pub mod clip;
pub mod error;
pub mod link;
pub mod retry;
pub mod transport;

pub use clip::client::{
    APPLICATION_KEY_HEADER, ClipClient, MAX_ACK_BYTES, validate_update_response,
};
pub use clip::types as clip_types;
pub use error::Error;
pub use link::{GrantedKey, LinkClient, LinkResponse};
pub use retry::RetryPolicy;
pub use transport::{TlsMode, TransportConfig};
