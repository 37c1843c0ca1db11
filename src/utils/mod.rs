pub mod base64;
pub mod cache;
pub mod github;
pub mod http;
pub mod node_manip;
pub mod url;

// Re-export common utilities
pub use self::url::{url_decode, url_encode};
pub use cache::{Clock, SystemClock, TtlCache};
