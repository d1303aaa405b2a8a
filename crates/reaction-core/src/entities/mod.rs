//! Domain entities - core business objects

mod message;
mod reaction;

pub use message::MessageSummary;
pub use reaction::{Reaction, EMOJI_NAME_MAX_LEN, ID_MAX_LEN};
