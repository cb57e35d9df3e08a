// Type arguments given on the command line

use crate::error::{CliError, CliResult};
use traceable_parser::{parse_type_expr, TypeExpr};

/// An interface to wrap: `Name` or `import/path.Name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTarget {
    pub package: Option<String>,
    pub name: String,
}

impl TypeTarget {
    /// Type names never contain a dot, so the last one separates the import
    /// path from the name (`gopkg.in/yaml.v3.Node`).
    pub fn parse(token: &str) -> CliResult<Self> {
        let token = token.trim();
        let invalid = || CliError::InvalidType {
            token: token.to_string(),
        };

        let (package, name) = match token.rsplit_once('.') {
            Some((path, name)) if !path.is_empty() => (Some(path.to_string()), name),
            Some(_) => return Err(invalid()),
            None => (None, token),
        };

        match parse_type_expr(name) {
            Ok(TypeExpr::Name {
                package: None,
                type_args,
                ..
            }) if type_args.is_empty() => Ok(Self {
                package,
                name: name.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

/// Parse every non-empty token
pub fn parse_targets(tokens: &[String]) -> CliResult<Vec<TypeTarget>> {
    let targets = tokens
        .iter()
        .filter(|token| !token.trim().is_empty())
        .map(|token| TypeTarget::parse(token))
        .collect::<CliResult<Vec<_>>>()?;

    if targets.is_empty() {
        return Err(CliError::NoTypes);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target(package: Option<&str>, name: &str) -> TypeTarget {
        TypeTarget {
            package: package.map(str::to_string),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_bare_and_qualified_names() {
        assert_eq!(TypeTarget::parse("Shape").unwrap(), target(None, "Shape"));
        assert_eq!(
            TypeTarget::parse("example.com/geo.Shape").unwrap(),
            target(Some("example.com/geo"), "Shape")
        );
        assert_eq!(
            TypeTarget::parse("gopkg.in/yaml.v3.Node").unwrap(),
            target(Some("gopkg.in/yaml.v3"), "Node")
        );
        assert_eq!(TypeTarget::parse(" io.Reader ").unwrap(), target(Some("io"), "Reader"));
    }

    #[test]
    fn test_invalid_tokens() {
        for token in ["example.com/geo", ".Shape", "geo.", "Box[int]", "*Shape"] {
            assert!(
                matches!(TypeTarget::parse(token), Err(CliError::InvalidType { .. })),
                "{token}"
            );
        }
    }

    #[test]
    fn test_empty_tokens_are_skipped() {
        let tokens = vec!["A".to_string(), " ".to_string(), "io.B".to_string()];
        assert_eq!(
            parse_targets(&tokens).unwrap(),
            vec![target(None, "A"), target(Some("io"), "B")]
        );
        assert!(matches!(parse_targets(&[]), Err(CliError::NoTypes)));
    }
}
