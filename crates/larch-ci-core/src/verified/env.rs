//! Pure environment-value resolution.
//!
//! Resolution is order-independent: each entry is resolved on its own
//! against the variables table. Cross-scope merging is a separate concern
//! applied by the compiler via [`merge_env`].

use std::collections::HashMap;

use crate::config::EnvVar;

/// Resolve an environment mapping to plain strings.
///
/// Literal values are used verbatim; `from-variable` values are looked up
/// in `variables` by name. A missing variable resolves to the empty string
/// rather than an error, so downstream steps decide its significance.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use larch_ci_core::config::EnvVar;
/// use larch_ci_core::verified::resolve_env;
///
/// let env = HashMap::from([
///     ("A".to_string(), EnvVar::Literal("X".to_string())),
///     ("B".to_string(), EnvVar::FromVariable("v".to_string())),
///     ("C".to_string(), EnvVar::FromVariable("missing".to_string())),
/// ]);
/// let variables = HashMap::from([("v".to_string(), "Y".to_string())]);
///
/// let resolved = resolve_env(&env, &variables);
/// assert_eq!(resolved["A"], "X");
/// assert_eq!(resolved["B"], "Y");
/// assert_eq!(resolved["C"], "");
/// ```
pub fn resolve_env(
    env: &HashMap<String, EnvVar>,
    variables: &HashMap<String, String>,
) -> HashMap<String, String> {
    env.iter()
        .map(|(name, value)| {
            let resolved = match value {
                EnvVar::Literal(value) => value.clone(),
                EnvVar::FromVariable(variable) => {
                    variables.get(variable).cloned().unwrap_or_default()
                }
            };
            (name.clone(), resolved)
        })
        .collect()
}

/// Merge two resolved environments, the overlay winning on key collision.
///
/// Used by the compiler to layer the container scope over the runtime
/// scope.
pub fn merge_env(
    base: &HashMap<String, String>,
    overlay: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
