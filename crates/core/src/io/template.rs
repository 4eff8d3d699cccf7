//! Path template expansion.
//!
//! Templates use `{name}` placeholders (`{tb}/Master_TB_{period}.xlsx`).
//! `{{` and `}}` produce literal braces. Every placeholder must resolve.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors raised while expanding a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Placeholder has no value.
    #[error("unknown placeholder '{{{name}}}' in template '{template}'")]
    UnknownPlaceholder {
        /// Placeholder name.
        name: String,
        /// Full template.
        template: String,
    },

    /// A `{` was never closed or a lone `}` appeared.
    #[error("unbalanced braces in template '{0}'")]
    Unbalanced(String),
}

/// Expands `{name}` placeholders in `template` from `vars`.
pub fn expand(template: &str, vars: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(TemplateError::Unbalanced(template.to_string()));
                }
                let value = vars
                    .get(name.trim())
                    .ok_or_else(|| TemplateError::UnknownPlaceholder {
                        name: name.clone(),
                        template: template.to_string(),
                    })?;
                out.push_str(value);
            }
            '}' => return Err(TemplateError::Unbalanced(template.to_string())),
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_expand_basic() {
        let v = vars(&[("root", "base"), ("name", "file")]);
        assert_eq!(expand("{root}/data/{name}.txt", &v).unwrap(), "base/data/file.txt");
    }

    #[test]
    fn test_expand_without_placeholders() {
        assert_eq!(expand("plain.csv", &BTreeMap::new()).unwrap(), "plain.csv");
    }

    #[test]
    fn test_escaped_braces() {
        let v = vars(&[("period", "202501")]);
        assert_eq!(expand("{{x}}_{period}", &v).unwrap(), "{x}_202501");
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = expand("{tb}/x", &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                name: "tb".to_string(),
                template: "{tb}/x".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown placeholder '{tb}' in template '{tb}/x'");
    }

    #[test]
    fn test_unbalanced() {
        assert!(matches!(
            expand("{tb/x", &BTreeMap::new()),
            Err(TemplateError::Unbalanced(_))
        ));
        assert!(matches!(
            expand("tb}/x", &BTreeMap::new()),
            Err(TemplateError::Unbalanced(_))
        ));
    }
}
