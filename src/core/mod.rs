pub mod audio;
pub mod manifest;
pub mod source;
pub mod timerange;
pub mod video;
