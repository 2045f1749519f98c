use serde_json::Value;

use crate::application::escape::{display_string, escape, escape_str, NULL_TEXT};
use crate::domain::fragment::{CellDiff, DisplayFragment, HighlightKind};
use crate::domain::row::Cell;

/// Common-prefix / common-suffix split of two strings.
///
/// Invariants: `prefix + left_middle + suffix == left` and
/// `prefix + right_middle + suffix == right`. The suffix never overlaps the
/// prefix on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub prefix: &'a str,
    pub left_middle: &'a str,
    pub right_middle: &'a str,
    pub suffix: &'a str,
}

/// Split `left` and `right` around their longest common prefix and suffix.
///
/// Compares Unicode scalar values, so a multi-byte character is never cut in
/// half. This is not a sequence alignment: only the two ends are matched.
pub fn split_common<'a>(left: &'a str, right: &'a str) -> Split<'a> {
    // Equal chars have equal UTF-8 lengths, so the byte offset is shared.
    let prefix_len: usize = left
        .chars()
        .zip(right.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();

    let left_rest = &left[prefix_len..];
    let right_rest = &right[prefix_len..];

    let suffix_len: usize = left_rest
        .chars()
        .rev()
        .zip(right_rest.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();

    let left_cut = left_rest.len() - suffix_len;
    let right_cut = right_rest.len() - suffix_len;

    Split {
        prefix: &left[..prefix_len],
        left_middle: &left_rest[..left_cut],
        right_middle: &right_rest[..right_cut],
        suffix: &left_rest[left_cut..],
    }
}

/// Render the left and right value of one column with inline highlights.
///
/// - equal values: plain text on both sides
/// - one side null or absent: the other side is highlighted as a whole
/// - neither side a string: both sides highlighted as a whole
/// - otherwise: only the part between the common prefix and suffix is
///   highlighted (`removed` on the left, `added` on the right)
pub fn diff(left: Cell<'_>, right: Cell<'_>) -> CellDiff {
    if left.same_value(&right) {
        return CellDiff {
            left: vec![DisplayFragment::plain(escape(left))],
            right: vec![DisplayFragment::plain(escape(right))],
        };
    }

    match (left.value(), right.value()) {
        (Some(l), Some(r)) if !l.is_null() && !r.is_null() => {
            if l.is_string() || r.is_string() {
                partial(&display_string(l), &display_string(r))
            } else {
                CellDiff {
                    left: vec![whole(l, HighlightKind::Removed)],
                    right: vec![whole(r, HighlightKind::Added)],
                }
            }
        }
        _ => match (left.is_nullish(), right.is_nullish()) {
            (true, false) => CellDiff {
                left: vec![null_fragment()],
                right: vec![whole_cell(right, HighlightKind::Added)],
            },
            (false, true) => CellDiff {
                left: vec![whole_cell(left, HighlightKind::Removed)],
                right: vec![null_fragment()],
            },
            // Absent on one side, null on the other.
            _ => CellDiff {
                left: vec![null_fragment()],
                right: vec![null_fragment()],
            },
        },
    }
}

fn partial(left: &str, right: &str) -> CellDiff {
    let split = split_common(left, right);
    CellDiff {
        left: segments(&split, split.left_middle, HighlightKind::Removed),
        right: segments(&split, split.right_middle, HighlightKind::Added),
    }
}

fn segments(split: &Split<'_>, middle: &str, kind: HighlightKind) -> Vec<DisplayFragment> {
    let mut out = Vec::with_capacity(3);
    if !split.prefix.is_empty() {
        out.push(DisplayFragment::plain(escape_str(split.prefix)));
    }
    if !middle.is_empty() {
        out.push(DisplayFragment::highlighted(escape_str(middle), kind));
    }
    if !split.suffix.is_empty() {
        out.push(DisplayFragment::plain(escape_str(split.suffix)));
    }
    out
}

fn whole(value: &Value, kind: HighlightKind) -> DisplayFragment {
    DisplayFragment::highlighted(escape_str(&display_string(value)), kind)
}

fn whole_cell(cell: Cell<'_>, kind: HighlightKind) -> DisplayFragment {
    DisplayFragment::highlighted(escape(cell), kind)
}

fn null_fragment() -> DisplayFragment {
    DisplayFragment::plain(NULL_TEXT.to_string())
}
