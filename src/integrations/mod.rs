pub mod decoder;
pub mod host;
pub mod vlc_http;
pub mod vlc_process;
