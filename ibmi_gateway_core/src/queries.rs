//! Db2 for i catalog query builders.
//!
//! Read-only `SELECT` statements against the QSYS2 services, used by the
//! library/member browsing tools. Interpolated identifiers go through the
//! same object-name rule as the compile builders, and every rendered
//! query is still gated by [`crate::validate::validate`].

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Error, Result};
use crate::names::object_name;

/// Object type filters look like `*ALL`, `*PGM`, `*FILE`.
fn type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\*[A-Z0-9]{1,9}$").expect("hardcoded pattern"))
}

fn object_type(value: &str) -> Result<String> {
    let normalized = value.trim().to_uppercase();
    if type_pattern().is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(Error::InvalidObjectType {
            value: value.to_string(),
        })
    }
}

/// Objects in a library, newest-style `OBJECT_STATISTICS` view.
/// `*ALL` disables the type filter.
///
/// # Errors
/// When the library or type filter is not a valid identifier.
pub fn library_objects(library: &str, obj_type: &str) -> Result<String> {
    let library = object_name("library", library)?;
    let obj_type = object_type(obj_type)?;

    let type_filter = if obj_type == "*ALL" {
        String::new()
    } else {
        format!(" AND OBJTYPE = '{}'", obj_type.trim_start_matches('*'))
    };

    Ok(format!(
        "SELECT OBJNAME, OBJTYPE, OBJTEXT, \
         VARCHAR_FORMAT(OBJCREATED, 'YYYY-MM-DD HH24:MI:SS') AS CREATED \
         FROM TABLE(QSYS2.OBJECT_STATISTICS('{library}', '*ALL')) \
         WHERE OBJTYPE IS NOT NULL{type_filter} \
         ORDER BY OBJNAME \
         FETCH FIRST 100 ROWS ONLY"
    ))
}

/// Members of a source physical file, most recently changed first.
///
/// # Errors
/// When the library or file name is not a valid identifier.
pub fn source_members(library: &str, source_file: &str) -> Result<String> {
    let library = object_name("library", library)?;
    let source_file = object_name("source_file", source_file)?;

    Ok(format!(
        "SELECT SYSTEM_TABLE_MEMBER AS MEMBER, SOURCE_TYPE, PARTITION_TEXT AS TEXT, \
         VARCHAR_FORMAT(LAST_CHANGE_TIMESTAMP, 'YYYY-MM-DD HH24:MI:SS') AS LAST_CHANGED \
         FROM QSYS2.SYSPARTITIONSTAT \
         WHERE SYSTEM_TABLE_SCHEMA = '{library}' AND SYSTEM_TABLE_NAME = '{source_file}' \
         ORDER BY LAST_CHANGE_TIMESTAMP DESC \
         FETCH FIRST 100 ROWS ONLY"
    ))
}

/// Full contents of one source member, in sequence order.
///
/// # Errors
/// When any identifier is invalid.
pub fn member_source(library: &str, source_file: &str, member: &str) -> Result<String> {
    let library = object_name("library", library)?;
    let source_file = object_name("source_file", source_file)?;
    let member = object_name("member", member)?;

    Ok(format!(
        "SELECT SRCSEQ, SRCDTA \
         FROM TABLE(QSYS2.SOURCE_FILE_CONTENTS(\
         SOURCE_FILE => '{source_file}', \
         SOURCE_LIBRARY => '{library}', \
         SOURCE_MEMBER => '{member}')) \
         ORDER BY SRCSEQ"
    ))
}

#[cfg(test)]
mod tests {
    use super::{library_objects, member_source, source_members};
    use crate::errors::Error;
    use crate::validate::{validate, Verdict};
    use rstest::rstest;

    #[test]
    fn library_objects_all_has_no_type_filter() {
        let query = library_objects("DEVLIB", "*ALL").unwrap();
        assert!(query.contains("OBJECT_STATISTICS('DEVLIB', '*ALL')"));
        assert!(!query.contains("AND OBJTYPE ="));
    }

    #[test]
    fn library_objects_type_filter_drops_star() {
        let query = library_objects("devlib", "*pgm").unwrap();
        assert!(query.contains("AND OBJTYPE = 'PGM'"));
    }

    #[test]
    fn source_members_filters_by_schema_and_file() {
        let query = source_members("DEVLIB", "QRPGLESRC").unwrap();
        assert!(query.contains("SYSTEM_TABLE_SCHEMA = 'DEVLIB'"));
        assert!(query.contains("SYSTEM_TABLE_NAME = 'QRPGLESRC'"));
        assert!(query.contains("ORDER BY LAST_CHANGE_TIMESTAMP DESC"));
    }

    #[test]
    fn member_source_orders_by_sequence() {
        let query = member_source("DEVLIB", "QCLSRC", "TESTPGM").unwrap();
        assert!(query.contains("SOURCE_MEMBER => 'TESTPGM'"));
        assert!(query.ends_with("ORDER BY SRCSEQ"));
    }

    // Every rendered query must survive the validation gate unchanged.
    #[rstest]
    #[case(library_objects("DEVLIB", "*ALL").unwrap())]
    #[case(library_objects("DEVLIB", "*FILE").unwrap())]
    #[case(source_members("DEVLIB", "QCBLLESRC").unwrap())]
    #[case(member_source("DEVLIB", "PRUCBL", "LECTURASQL").unwrap())]
    fn rendered_queries_pass_validation(#[case] query: String) {
        assert_eq!(validate(&query), Verdict::Allowed, "query: {query}");
        assert!(!query.contains(';'));
        assert!(!query.contains('|'));
    }

    #[rstest]
    #[case("DEVLIB'--", "*ALL")]
    #[case("DEVLIB", "PGM")] // missing the leading star
    #[case("DEVLIB", "*P GM")]
    fn hostile_identifiers_are_refused(#[case] library: &str, #[case] obj_type: &str) {
        let err = library_objects(library, obj_type).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidObjectName { .. } | Error::InvalidObjectType { .. }
        ));
    }
}
