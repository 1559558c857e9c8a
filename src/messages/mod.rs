//! The message and bundle model shared by the codecs and the transform pass.

pub mod digest;
pub mod message;

pub use digest::message_id;
pub use message::{
    make_message_index, Bundle, Content, Message, MessageIndex, Placeholder, ProgramMessage,
};
