pub mod formatting;
pub mod submission;
pub mod template;
