//! Import identifier parsing
//!
//! `terraform import` takes human-readable IDs such as
//! `{project_id}-{cluster_name}` rather than encoded state IDs. These
//! helpers split them into their parts.

use crate::domain::{ProviderError, Result};

/// Length of an Atlas object id (24 hex characters)
const OBJECT_ID_LEN: usize = 24;

/// Returns true if `value` looks like an Atlas object id
pub fn is_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Splits `{first}-{rest}` on the first `-`
///
/// Used for `{project_id}-{cluster_name}`, `{project_id}-{entry}` and
/// similar formats where the second part may itself contain dashes.
///
/// # Errors
///
/// Returns [`ProviderError::ImportFormat`] with `format_hint` in the message
/// when either part is missing.
pub fn split_two<'a>(id: &'a str, format_hint: &str) -> Result<(&'a str, &'a str)> {
    match id.split_once('-') {
        Some((first, rest)) if !first.is_empty() && !rest.is_empty() => Ok((first, rest)),
        _ => Err(import_format_error(format_hint)),
    }
}

/// Splits `{project_id}-{name}-{object_id}`
///
/// Both ids must be 24 hex characters; the name in the middle may contain
/// dashes.
pub fn split_project_name_object<'a>(
    id: &'a str,
    format_hint: &str,
) -> Result<(&'a str, &'a str, &'a str)> {
    let min_len = OBJECT_ID_LEN * 2 + 3;
    if id.len() < min_len || !id.is_char_boundary(OBJECT_ID_LEN) {
        return Err(import_format_error(format_hint));
    }

    let tail_start = id.len() - OBJECT_ID_LEN;
    if !id.is_char_boundary(tail_start) {
        return Err(import_format_error(format_hint));
    }

    let project_id = &id[..OBJECT_ID_LEN];
    let object_id = &id[tail_start..];
    let middle = &id[OBJECT_ID_LEN..tail_start];

    let name = middle
        .strip_prefix('-')
        .and_then(|m| m.strip_suffix('-'))
        .filter(|name| !name.is_empty());

    match name {
        Some(name) if is_object_id(project_id) && is_object_id(object_id) => {
            Ok((project_id, name, object_id))
        }
        _ => Err(import_format_error(format_hint)),
    }
}

fn import_format_error(format_hint: &str) -> ProviderError {
    ProviderError::ImportFormat(format!("use the format {format_hint}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PROJECT: &str = "5d0f1f73cf09a29120e173cf";
    const SNAPSHOT: &str = "5d1285acd5ec13b6c2d1726a";

    #[test]
    fn test_split_two_keeps_dashes_in_second_part() {
        let id = format!("{PROJECT}-my-cluster");
        let (project, name) = split_two(&id, "{project_id}-{cluster_name}").unwrap();
        assert_eq!(project, PROJECT);
        assert_eq!(name, "my-cluster");
    }

    #[test_case("" ; "empty")]
    #[test_case("no_separator" ; "no separator")]
    #[test_case("-name" ; "missing first")]
    #[test_case("project-" ; "missing second")]
    fn test_split_two_rejects(id: &str) {
        let err = split_two(id, "{project_id}-{entry}").unwrap_err();
        assert!(err.to_string().contains("{project_id}-{entry}"));
    }

    #[test]
    fn test_split_project_name_object() {
        let id = format!("{PROJECT}-cluster-with-dashes-{SNAPSHOT}");
        let (project, cluster, snapshot) =
            split_project_name_object(&id, "{project_id}-{cluster_name}-{snapshot_id}").unwrap();
        assert_eq!(project, PROJECT);
        assert_eq!(cluster, "cluster-with-dashes");
        assert_eq!(snapshot, SNAPSHOT);
    }

    #[test_case("5d0f1f73cf09a29120e173cf-5d1285acd5ec13b6c2d1726a" ; "missing name")]
    #[test_case("5d0f1f73cf09a29120e173cf--5d1285acd5ec13b6c2d1726a" ; "empty name")]
    #[test_case("zzzzzzzzzzzzzzzzzzzzzzzz-name-5d1285acd5ec13b6c2d1726a" ; "project not hex")]
    #[test_case("5d0f1f73cf09a29120e173cf-name-1234" ; "short snapshot id")]
    fn test_split_project_name_object_rejects(id: &str) {
        assert!(matches!(
            split_project_name_object(id, "{project_id}-{cluster_name}-{snapshot_id}"),
            Err(ProviderError::ImportFormat(_))
        ));
    }

    #[test]
    fn test_is_object_id() {
        assert!(is_object_id(PROJECT));
        assert!(!is_object_id("abc"));
    }
}
