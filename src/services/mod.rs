pub mod ai;
pub mod conversation;
pub mod nlu;
pub mod recognizers;
