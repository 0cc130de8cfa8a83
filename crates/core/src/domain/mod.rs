pub mod event;
pub mod translation;
