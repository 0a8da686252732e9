//! The static type registry (§4.2): one entry per [`TypeTag`] giving its
//! schema and display name. Mirrors a GPU-resource factory/manager pair —
//! instead of tracking live handles (the store does that, see
//! `vistle-shm`), this registry only needs to answer "what does this tag
//! look like", which the archive loader and construction-time validation
//! both consult.

use crate::schema::{schema_for, Schema};
use crate::types::TypeTag;

/// One registry entry: everything needed to validate or describe an
/// instance of a type tag without having one in hand.
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo {
    pub tag: TypeTag,
    pub schema: Schema,
    pub name: &'static str,
}

/// Looks up the registry entry for `tag`. Total over [`TypeTag`]; every
/// variant has an entry.
pub fn type_info(tag: TypeTag) -> TypeInfo {
    TypeInfo { tag, schema: schema_for(tag), name: tag.name() }
}

/// All registry entries, in [`TypeTag::ALL`] order.
pub fn all() -> impl Iterator<Item = TypeInfo> {
    TypeTag::ALL.iter().map(|&tag| type_info(tag))
}

/// Validates that `provided` referenced-array names match `tag`'s schema in
/// count. Returns the schema's required role count on success, for callers
/// that want a sanity count beyond pass/fail (e.g. a loader reserving
/// capacity). This is the check backing the `SchemaMismatch` protocol error
/// (§4.3); it is intentionally shallow (count-only) — ordering and name
/// identity are the archive loader's responsibility.
pub fn validate_role_count(tag: TypeTag, provided: usize) -> Result<usize, SchemaMismatch> {
    let info = type_info(tag);
    let required = crate::schema::required_role_count(&info.schema);
    let max = info.schema.roles.len();
    if provided < required || provided > max {
        return Err(SchemaMismatch { tag, expected_min: required, expected_max: max, found: provided });
    }
    Ok(required)
}

/// The referenced-array count for `tag` did not fall within its schema's
/// required/optional bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaMismatch {
    pub tag: TypeTag,
    pub expected_min: usize,
    pub expected_max: usize,
    pub found: usize,
}

impl std::fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "schema mismatch for {}: expected {}..={} referenced arrays, found {}",
            self.tag.name(),
            self.expected_min,
            self.expected_max,
            self.found
        )
    }
}

impl std::error::Error for SchemaMismatch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_tag() {
        assert_eq!(all().count(), TypeTag::ALL.len());
    }

    #[test]
    fn validate_role_count_rejects_too_few() {
        assert!(validate_role_count(TypeTag::Unstructured, 2).is_err());
        assert!(validate_role_count(TypeTag::Unstructured, 6).is_ok());
    }

    #[test]
    fn validate_role_count_allows_optional_slack() {
        // Vec3 has 2 required + 2 optional roles.
        assert!(validate_role_count(TypeTag::Vec3, 2).is_ok());
        assert!(validate_role_count(TypeTag::Vec3, 4).is_ok());
        assert!(validate_role_count(TypeTag::Vec3, 5).is_err());
    }
}
