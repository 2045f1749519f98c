use crate::domain::diff_result::TableDiffOutcome;
use crate::domain::error::ViewError;
use crate::domain::value_objects::KeyColumn;

/// First candidate that is non-empty after trimming, in priority order.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|c| !c.is_empty())
}

/// Key candidates for an outcome: its own key, then its result's, then the
/// caller's fallback.
fn candidates<'a>(
    outcome: &'a TableDiffOutcome,
    fallback: Option<&'a str>,
) -> [Option<&'a str>; 3] {
    [
        outcome.key_column.as_deref(),
        outcome.result.as_ref().map(|r| r.key_column.as_str()),
        fallback,
    ]
}

/// Key column shown for an outcome in the batch list, if any resolves.
pub fn display_key<'a>(outcome: &'a TableDiffOutcome, fallback: Option<&'a str>) -> Option<&'a str> {
    first_non_empty(candidates(outcome, fallback))
}

/// Key column used to open the detail view of an outcome.
///
/// Fails with [`ViewError::NoKeyAvailable`] when no candidate qualifies.
pub fn resolve_detail_key(
    outcome: &TableDiffOutcome,
    fallback: Option<&str>,
) -> Result<KeyColumn, ViewError> {
    display_key(outcome, fallback)
        .map(|k| KeyColumn(k.to_string()))
        .ok_or_else(|| ViewError::NoKeyAvailable {
            table: outcome.table.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diff_result::DiffResult;

    fn outcome(own: Option<&str>, result_key: Option<&str>) -> TableDiffOutcome {
        TableDiffOutcome {
            table: "ACCOUNTS".to_string(),
            key_column: own.map(str::to_string),
            result: result_key.map(|k| DiffResult {
                table: "ACCOUNTS".to_string(),
                key_column: k.to_string(),
                ..Default::default()
            }),
            error: None,
        }
    }

    #[test]
    fn own_key_wins() {
        let o = outcome(Some("ACC_ID"), Some("ID"));
        assert_eq!(resolve_detail_key(&o, Some("X")).unwrap().as_str(), "ACC_ID");
    }

    #[test]
    fn falls_back_to_result_key() {
        let o = outcome(None, Some("ID"));
        assert_eq!(resolve_detail_key(&o, Some("X")).unwrap().as_str(), "ID");
    }

    #[test]
    fn blank_candidates_are_skipped() {
        let o = outcome(Some("  "), Some(""));
        assert_eq!(resolve_detail_key(&o, Some(" CODE ")).unwrap().as_str(), "CODE");
    }

    #[test]
    fn no_candidate_is_a_named_failure() {
        let o = outcome(None, None);
        assert_eq!(
            resolve_detail_key(&o, None),
            Err(ViewError::NoKeyAvailable {
                table: "ACCOUNTS".to_string()
            })
        );
        assert_eq!(display_key(&o, Some("")), None);
    }
}
