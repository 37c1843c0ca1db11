pub mod proxy_to_clash;

pub use proxy_to_clash::{convert_proxy_groups, proxy_to_clash};
