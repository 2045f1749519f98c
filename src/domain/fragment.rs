use serde::Serialize;

/// Classification of a rendered fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    #[default]
    None,
    /// Right-only content.
    Added,
    /// Left-only content.
    Removed,
}

impl HighlightKind {
    /// CSS class used by the HTML report; empty for unhighlighted text.
    pub fn css_class(&self) -> &'static str {
        match self {
            HighlightKind::None => "",
            HighlightKind::Added => "diff-add",
            HighlightKind::Removed => "diff-del",
        }
    }
}

/// A piece of cell text ready for display. `text` is already escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFragment {
    pub text: String,
    pub is_highlighted: bool,
    pub highlight_kind: HighlightKind,
}

impl DisplayFragment {
    pub fn plain(text: String) -> Self {
        Self {
            text,
            is_highlighted: false,
            highlight_kind: HighlightKind::None,
        }
    }

    pub fn highlighted(text: String, kind: HighlightKind) -> Self {
        Self {
            is_highlighted: kind != HighlightKind::None,
            text,
            highlight_kind: kind,
        }
    }
}

/// Rendering of one column of a changed row, left and right side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDiff {
    pub left: Vec<DisplayFragment>,
    pub right: Vec<DisplayFragment>,
}

impl CellDiff {
    pub fn has_highlight(&self) -> bool {
        self.left.iter().chain(&self.right).any(|f| f.is_highlighted)
    }
}
