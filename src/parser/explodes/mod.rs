pub mod common;
pub mod ss;
pub mod trojan;
pub mod vless;
pub mod vmess;

pub use common::{explode, explode_batch, explode_sub};
