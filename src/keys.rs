//! Grouping-key extraction from hierarchical test names
//!
//! A full test name is dot-separated (`package.segments.ClassName.method`)
//! with an optional bracketed parameter tag. The extractors here truncate
//! trailing segments to derive coarser keys; they are total functions and
//! degrade to the input when there are too few segments to truncate.

/// Extract the class key: everything except the final method segment.
///
/// `com.questdb.acl.AccessControlTest.testMethod[WITH_WAL]` →
/// `com.questdb.acl.AccessControlTest`. A single-segment name is returned
/// unchanged.
pub fn class_key(test_name: &str) -> String {
    let name = strip_parameter_tag(test_name);
    match name.rfind('.') {
        Some(idx) => name[..idx].to_string(),
        None => name.to_string(),
    }
}

/// Extract the package key: everything except the class and method segments.
///
/// `com.questdb.acl.AccessControlTest.testMethod[WITH_WAL]` →
/// `com.questdb.acl`. Names with fewer than three segments are returned
/// unchanged, so a two-segment name acts as its own package. Callers must
/// tolerate such class-shaped package keys; the degradation is deliberate.
pub fn package_key(test_name: &str) -> String {
    let name = strip_parameter_tag(test_name);
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() >= 3 {
        parts[..parts.len() - 2].join(".")
    } else {
        name.to_string()
    }
}

/// Drop a trailing `[...]` parameter tag before hierarchical decomposition.
/// The tag stays part of the display name but never of a grouping key.
fn strip_parameter_tag(test_name: &str) -> &str {
    match test_name.find('[') {
        Some(idx) => &test_name[..idx],
        None => test_name,
    }
}
