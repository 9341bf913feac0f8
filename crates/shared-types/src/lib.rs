pub mod types;

pub use types::{
    AnalysisDimension, DocumentSnapshot, Mark, MarkSet, SnippetField, SnippetFields,
};
