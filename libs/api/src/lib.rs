pub mod event;
pub mod now_playing;
