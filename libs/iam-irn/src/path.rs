//! Resource path helpers.

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

/// Split a slash-delimited resource path into its segments.
///
/// Empty segments are dropped, so `""`, `"/"` and `"//"` all denote the root
/// and yield an empty vector.
///
/// ```
/// assert_eq!(iam_irn::split_path("/a/b/"), vec!["a", "b"]);
/// assert!(iam_irn::split_path("/").is_empty());
/// ```
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Join segments back into a rooted path: `"/"` for the root, `"/a/b"` otherwise.
#[must_use]
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return PATH_SEPARATOR.to_string();
    }

    segments.iter().fold(String::new(), |mut acc, segment| {
        acc.push(PATH_SEPARATOR);
        acc.push_str(segment.as_ref());
        acc
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn split_empty_and_root_yield_no_segments() {
        assert!(split_path("").is_empty());
        assert!(split_path("/").is_empty());
        assert!(split_path("///").is_empty());
    }

    #[test]
    fn split_drops_leading_and_trailing_separators() {
        assert_eq!(split_path("/a/b/"), vec!["a", "b"]);
        assert_eq!(split_path("a/b"), vec!["a", "b"]);
    }

    #[test]
    fn split_preserves_order_and_collapses_inner_empties() {
        assert_eq!(split_path("/z//y/x"), vec!["z", "y", "x"]);
    }

    #[test]
    fn join_root_and_nested() {
        assert_eq!(join_path::<String>(&[]), "/");
        assert_eq!(join_path(&["a", "b"]), "/a/b");
    }

    #[test]
    fn join_inverts_split() {
        let segments = split_path("/fleet/eu/");
        assert_eq!(split_path(&join_path(&segments)), segments);
    }
}
