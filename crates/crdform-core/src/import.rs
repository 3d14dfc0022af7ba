//! Import Resolver: `namespace/name` identifiers

use crate::error::{CoreError, Result};

/// Expected import ID format, shown in error messages
pub const IMPORT_ID_FORMAT: &str = "namespace/name";

/// Split an import ID into `(namespace, name)`
///
/// The ID must contain exactly two non-empty segments separated by `/`.
pub fn parse_import_id(id: &str) -> Result<(String, String)> {
    let invalid = || CoreError::InvalidImportId { id: id.to_string() };

    let mut parts = id.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(name), None) if !namespace.is_empty() && !name.is_empty() => {
            Ok((namespace.to_string(), name.to_string()))
        }
        _ => Err(invalid()),
    }
}

/// Identifier stored in state for a namespaced object
pub fn resource_id(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            parse_import_id("ns/name").unwrap(),
            ("ns".to_string(), "name".to_string())
        );
    }

    #[test]
    fn test_parse_single_segment() {
        let err = parse_import_id("badid").unwrap_err();
        assert!(err.to_string().contains(IMPORT_ID_FORMAT));
    }

    #[test]
    fn test_parse_too_many_segments() {
        assert!(parse_import_id("a/b/c").is_err());
    }

    #[test]
    fn test_parse_empty_segments() {
        assert!(parse_import_id("/name").is_err());
        assert!(parse_import_id("ns/").is_err());
        assert!(parse_import_id("/").is_err());
        assert!(parse_import_id("").is_err());
    }

    #[test]
    fn test_resource_id_round_trip() {
        let id = resource_id("ns1", "cfg1");
        assert_eq!(id, "ns1/cfg1");
        let (namespace, name) = parse_import_id(&id).unwrap();
        assert_eq!((namespace.as_str(), name.as_str()), ("ns1", "cfg1"));
    }
}
