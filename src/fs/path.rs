//! Path tokenization and ref-name encoding.
//!
//! Paths are absolute POSIX paths. After tokenization, the component index
//! determines meaning: owner, repository, ref token, then tree entry names.
//! Ref names may contain `/`, which cannot appear in a filename, so the
//! ref token at depth 2 encodes `/` as a space character.

/// Join the configured mount prefix with an incoming absolute path.
pub(crate) fn join_prefix(prefix: &str, path: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if path == "/" {
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        format!("{trimmed}{path}")
    }
}

/// Split an absolute path into components.
///
/// The leading empty component produced by the leading slash is discarded
/// and `"/"` yields the empty sequence. `.` components are dropped and
/// `..` pops the previous component; trailing empty components (from a
/// trailing slash) are preserved and will fail resolution downstream.
pub(crate) fn split_path(path: &str) -> Vec<String> {
    let mut comp: Vec<String> = Vec::new();
    for (i, part) in path.split('/').enumerate() {
        if i == 0 {
            continue;
        }
        match part {
            "." => {}
            ".." => {
                comp.pop();
            }
            _ => comp.push(part.to_string()),
        }
    }
    if comp.len() == 1 && comp[0].is_empty() {
        comp.clear();
    }
    comp
}

/// Join a directory path and a child name.
pub(crate) fn join_child(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Join a symlink target against the parent directory of `base`, resolving
/// `.` and `..` lexically. Used when chasing a trailing-component symlink:
/// the target is relative to the directory containing the link, so the
/// link component itself is popped before the target is applied.
pub(crate) fn resolve_join(base: &str, target: &str) -> String {
    let mut comp: Vec<&str> = Vec::new();
    for part in base.split('/').chain(std::iter::once("..")).chain(target.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                comp.pop();
            }
            _ => comp.push(part),
        }
    }
    format!("/{}", comp.join("/"))
}

/// Decode a depth-2 filename token into a ref name candidate.
pub(crate) fn decode_ref_token(token: &str) -> String {
    token.replace(' ', "/")
}

/// Encode a full ref name as a filename token: strip the `refs/heads/`
/// (else `refs/tags/`) namespace, then encode `/` as a space.
pub(crate) fn encode_ref_name(name: &str) -> String {
    let short = name
        .strip_prefix("refs/heads/")
        .or_else(|| name.strip_prefix("refs/tags/"))
        .unwrap_or(name);
    short.replace('/', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_root() {
        assert!(split_path("/").is_empty());
    }

    #[test]
    fn test_split_components() {
        assert_eq!(split_path("/a/b/c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_preserves_trailing_empty() {
        assert_eq!(split_path("/a/"), vec!["a", ""]);
    }

    #[test]
    fn test_split_drops_dot_components() {
        assert_eq!(split_path("/a/b/."), vec!["a", "b"]);
        assert_eq!(split_path("/a/./b"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_resolves_dotdot() {
        assert_eq!(split_path("/a/b/../c"), vec!["a", "c"]);
        assert_eq!(split_path("/../a"), vec!["a"]);
    }

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("/", "/a/b"), "/a/b");
        assert_eq!(join_prefix("/", "/"), "/");
        assert_eq!(join_prefix("/gh", "/a/b"), "/gh/a/b");
        assert_eq!(join_prefix("/gh", "/"), "/gh");
        assert_eq!(join_prefix("/gh/", "/a"), "/gh/a");
    }

    #[test]
    fn test_join_child() {
        assert_eq!(join_child("/", "a"), "/a");
        assert_eq!(join_child("/a/b", "c"), "/a/b/c");
    }

    #[test]
    fn test_resolve_join() {
        assert_eq!(resolve_join("/a/b/link", "target"), "/a/b/target");
        assert_eq!(resolve_join("/a/b/link", "../target"), "/a/target");
        assert_eq!(resolve_join("/a/b/link/.", "target"), "/a/b/target");
        assert_eq!(resolve_join("/link", "../../t"), "/t");
    }

    #[test]
    fn test_decode_ref_token() {
        assert_eq!(decode_ref_token("feature x"), "feature/x");
        assert_eq!(decode_ref_token("main"), "main");
    }

    #[test]
    fn test_encode_ref_name() {
        assert_eq!(encode_ref_name("refs/heads/main"), "main");
        assert_eq!(encode_ref_name("refs/heads/feature/x"), "feature x");
        assert_eq!(encode_ref_name("refs/tags/v1.0"), "v1.0");
        assert_eq!(encode_ref_name("cafebabe"), "cafebabe");
    }

    #[test]
    fn test_codec_roundtrip() {
        // A filename with no slash decodes and re-encodes to itself.
        assert_eq!(encode_ref_name(&decode_ref_token("main")), "main");
        // A heads ref whose short name has no space survives the roundtrip.
        let name = "refs/heads/feature/x";
        assert_eq!(
            format!("refs/heads/{}", decode_ref_token(&encode_ref_name(name))),
            name
        );
    }
}
