pub mod audio;
pub mod meta;

pub use audio::get_audio_url;
pub use meta::{health_check, root};
