//! Pure `when` predicate evaluation.
//!
//! A `when` predicate gates a compiled task on the trigger context. The
//! task stays in the graph either way; the compiler only flips its `skip`
//! flag based on the verdict here.

use regex::Regex;
use snafu::ResultExt;

use crate::config::When;
use crate::config::WhenCondition;
use crate::config::WhenConditionKind;
use crate::config::WhenConditions;
use crate::error::InvalidPatternSnafu;
use crate::error::Result;

/// Evaluate a `when` predicate against the trigger context.
///
/// An absent predicate is always active. Otherwise every condition that is
/// present must match: a condition whose context value is absent does not
/// match, so a branch-only trigger can never satisfy a tag rule.
///
/// # Example
///
/// ```
/// use larch_ci_core::config::{When, WhenCondition, WhenConditions};
/// use larch_ci_core::verified::match_when;
///
/// let when = When {
///     branch: Some(WhenConditions {
///         include: vec![WhenCondition { pattern: "master".to_string(), ..Default::default() }],
///         exclude: vec![],
///     }),
///     ..Default::default()
/// };
///
/// assert!(match_when(Some(&when), Some("master"), None, None).unwrap());
/// assert!(!match_when(Some(&when), Some("develop"), None, None).unwrap());
/// assert!(!match_when(Some(&when), None, Some("v1.0"), None).unwrap());
/// assert!(match_when(None, None, None, None).unwrap());
/// ```
pub fn match_when(
    when: Option<&When>,
    branch: Option<&str>,
    tag: Option<&str>,
    ref_name: Option<&str>,
) -> Result<bool> {
    let Some(when) = when else {
        return Ok(true);
    };

    let checks = [
        (when.branch.as_ref(), branch),
        (when.tag.as_ref(), tag),
        (when.ref_name.as_ref(), ref_name),
    ];

    for (conditions, value) in checks {
        let Some(conditions) = conditions else {
            continue;
        };
        let Some(value) = value else {
            return Ok(false);
        };
        if !match_conditions(conditions, value)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Evaluate an include/exclude pair against one context value.
///
/// The pair matches when the include list is empty or at least one include
/// entry matches, and no exclude entry matches.
pub fn match_conditions(conditions: &WhenConditions, value: &str) -> Result<bool> {
    let mut included = conditions.include.is_empty();
    for condition in &conditions.include {
        if match_condition(condition, value)? {
            included = true;
            break;
        }
    }
    if !included {
        return Ok(false);
    }

    for condition in &conditions.exclude {
        if match_condition(condition, value)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Evaluate a single condition entry against a context value.
///
/// Literal patterns compare by exact string equality; regexp patterns are
/// anchored so the whole value must match.
pub fn match_condition(condition: &WhenCondition, value: &str) -> Result<bool> {
    match condition.kind {
        WhenConditionKind::Literal => Ok(condition.pattern == value),
        WhenConditionKind::Regexp => {
            let re = Regex::new(&format!("^(?:{})$", condition.pattern))
                .context(InvalidPatternSnafu { pattern: condition.pattern.clone() })?;
            Ok(re.is_match(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn literal(pattern: &str) -> WhenCondition {
        WhenCondition { pattern: pattern.to_string(), kind: WhenConditionKind::Literal }
    }

    fn regexp(pattern: &str) -> WhenCondition {
        WhenCondition { pattern: pattern.to_string(), kind: WhenConditionKind::Regexp }
    }

    fn include(entries: Vec<WhenCondition>) -> WhenConditions {
        WhenConditions { include: entries, exclude: vec![] }
    }

    // ========================================================================
    // match_condition tests
    // ========================================================================

    #[test]
    fn test_literal_equality() {
        assert!(match_condition(&literal("master"), "master").unwrap());
        assert!(!match_condition(&literal("master"), "master2").unwrap());
    }

    #[test]
    fn test_regexp_is_anchored() {
        assert!(match_condition(&regexp("v1\\..*"), "v1.2").unwrap());
        // An unanchored engine would accept the embedded match.
        assert!(!match_condition(&regexp("v1\\..*x"), "av1.2x").unwrap());
        assert!(!match_condition(&regexp("branch"), "branch01").unwrap());
    }

    #[test]
    fn test_invalid_regexp_is_an_error() {
        let err = match_condition(&regexp("("), "anything").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPattern { .. }));
    }

    // ========================================================================
    // match_conditions tests
    // ========================================================================

    #[test]
    fn test_empty_include_matches() {
        let conditions = WhenConditions::default();
        assert!(match_conditions(&conditions, "anything").unwrap());
    }

    #[test]
    fn test_any_include_suffices() {
        let conditions = include(vec![literal("v1.x"), literal("v2.x")]);
        assert!(match_conditions(&conditions, "v2.x").unwrap());
        assert!(!match_conditions(&conditions, "v3.x").unwrap());
    }

    #[test]
    fn test_exclude_overrides_include() {
        let conditions = WhenConditions {
            include: vec![regexp("branch.*")],
            exclude: vec![regexp("branch01"), literal("branch02")],
        };
        assert!(match_conditions(&conditions, "branch03").unwrap());
        assert!(!match_conditions(&conditions, "branch01").unwrap());
        assert!(!match_conditions(&conditions, "branch02").unwrap());
    }

    // ========================================================================
    // match_when tests
    // ========================================================================

    #[test]
    fn test_absent_when_is_active() {
        assert!(match_when(None, Some("master"), None, None).unwrap());
    }

    #[test]
    fn test_every_present_condition_must_match() {
        // Branch matches but the tag condition has no tag in context.
        let when = When {
            branch: Some(include(vec![literal("master")])),
            tag: Some(include(vec![literal("v1.x")])),
            ..Default::default()
        };
        assert!(!match_when(Some(&when), Some("master"), None, None).unwrap());
        assert!(match_when(Some(&when), Some("master"), Some("v1.x"), None).unwrap());
    }

    #[test]
    fn test_absent_context_value_fails_its_condition() {
        let when = When { tag: Some(include(vec![literal("v1.x")])), ..Default::default() };
        assert!(!match_when(Some(&when), Some("master"), None, None).unwrap());
    }

    #[test]
    fn test_ref_condition() {
        let when = When {
            ref_name: Some(WhenConditions {
                include: vec![regexp("refs/heads/.*")],
                exclude: vec![literal("refs/heads/wip")],
            }),
            ..Default::default()
        };
        assert!(match_when(Some(&when), None, None, Some("refs/heads/main")).unwrap());
        assert!(!match_when(Some(&when), None, None, Some("refs/heads/wip")).unwrap());
        assert!(!match_when(Some(&when), None, None, Some("refs/tags/v1.0")).unwrap());
    }
}
