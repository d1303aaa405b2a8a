//! Message summary model -> entity mapper

use reaction_core::MessageSummary;

use crate::models::MessageSummaryModel;

impl From<MessageSummaryModel> for MessageSummary {
    fn from(model: MessageSummaryModel) -> Self {
        MessageSummary {
            id: model.id,
            has_reactions: model.has_reactions,
            updated_at: model.updated_at,
        }
    }
}
