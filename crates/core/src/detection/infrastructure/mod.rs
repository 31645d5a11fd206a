pub mod channel_frame_source;
pub mod jsonl_frame_source;
pub mod scripted_frame_source;
