use std::fmt;

/// Immutable capture of the editable post fields used as scoring input
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentSnapshot {
    pub title: String,
    pub body_text: String,
    pub excerpt: String,
    pub focus_term: String,
    pub url_path: String,
    pub meta_description: String,
}

/// The three fields rendered by the search result preview
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetFields {
    pub title: String,
    pub url_path: String,
    #[serde(rename = "metaDesc")]
    pub meta_description: String,
}

/// Which preview field a user edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnippetField {
    Title,
    UrlPath,
    MetaDesc,
}

impl SnippetField {
    /// Parse the field names used by the preview widget
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(SnippetField::Title),
            "urlPath" | "url" | "slug" => Some(SnippetField::UrlPath),
            "metaDesc" | "description" => Some(SnippetField::MetaDesc),
            _ => None,
        }
    }
}

/// One of the two independent analysis kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDimension {
    Keyword,
    Content,
}

impl AnalysisDimension {
    pub const ALL: [AnalysisDimension; 2] = [AnalysisDimension::Keyword, AnalysisDimension::Content];

    /// Key used by the status bar and save panel slots
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDimension::Keyword => "keyword",
            AnalysisDimension::Content => "content",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "keyword" => Some(AnalysisDimension::Keyword),
            "content" => Some(AnalysisDimension::Content),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marked range in a snapshot's body text
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Mark {
    pub start: usize, // Byte offset into body_text
    pub end: usize,   // Exclusive end offset
    #[serde(default)]
    pub kind: String, // Assessment that produced the mark
}

impl Mark {
    pub fn new(start: usize, end: usize, kind: &str) -> Self {
        Self {
            start,
            end,
            kind: kind.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Ordered marks produced for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<Mark>", into = "Vec<Mark>")]
pub struct MarkSet {
    marks: Vec<Mark>,
}

impl MarkSet {
    pub fn new(mut marks: Vec<Mark>) -> Self {
        marks.sort_by_key(|m| (m.start, m.end));
        Self { marks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.marks.iter()
    }
}

impl From<Vec<Mark>> for MarkSet {
    fn from(marks: Vec<Mark>) -> Self {
        Self::new(marks)
    }
}

impl From<MarkSet> for Vec<Mark> {
    fn from(set: MarkSet) -> Self {
        set.marks
    }
}

impl<'a> IntoIterator for &'a MarkSet {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.iter()
    }
}
