//! Path-to-module/directory derivation shared by the Architecture Analyzer
//! and Signal Fusion (§4.5).

/// Immediate containing directory of a relative path (`""` for a
/// root-level file).
pub fn directory_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Module key for `path` at the configured `depth` (number of leading path
/// components that form the module boundary). Root-level files (fewer
/// components than `depth`) form a synthetic `"."` module.
pub fn module_key(path: &str, depth: usize) -> String {
    let components: Vec<&str> = path.split('/').collect();
    // Drop the filename itself; only directory components form the module.
    let dir_components = &components[..components.len().saturating_sub(1)];
    if dir_components.is_empty() {
        return ".".to_string();
    }
    let take = depth.min(dir_components.len());
    dir_components[..take].join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_file_has_no_directory() {
        assert_eq!(directory_of("main.py"), "");
    }

    #[test]
    fn nested_file_directory_is_parent() {
        assert_eq!(directory_of("src/util/helpers.py"), "src/util");
    }

    #[test]
    fn root_level_file_gets_synthetic_module() {
        assert_eq!(module_key("main.py", 1), ".");
    }

    #[test]
    fn module_key_respects_depth() {
        assert_eq!(module_key("src/api/routes/users.py", 1), "src");
        assert_eq!(module_key("src/api/routes/users.py", 2), "src/api");
    }

    #[test]
    fn module_key_clamps_to_available_depth() {
        assert_eq!(module_key("src/main.py", 5), "src");
    }
}
