//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! that nothing in the engine reads process-wide environment variables while handling user
//! actions.

use crate::conditions::TemplateStore;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    drafts_dir: PathBuf,
    template_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `template_file` is expected to have been checked with [`resolve_template_file`];
    /// `None` selects the built-in ECC template set.
    pub fn new(drafts_dir: PathBuf, template_file: Option<PathBuf>) -> CoreResult<Self> {
        if drafts_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput(
                "drafts_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            drafts_dir,
            template_file,
        })
    }

    pub fn drafts_dir(&self) -> &Path {
        &self.drafts_dir
    }

    pub fn template_file(&self) -> Option<&Path> {
        self.template_file.as_deref()
    }

    /// Build the template store this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::FileRead` if the template file cannot be read, or
    /// `CoreError::Template` if its definition is invalid.
    pub fn load_templates(&self) -> CoreResult<TemplateStore> {
        match &self.template_file {
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(CoreError::FileRead)?;
                tracing::info!("loading condition templates from {}", path.display());
                Ok(TemplateStore::from_yaml(&yaml)?)
            }
            None => Ok(TemplateStore::ecc_default()?),
        }
    }
}

/// Validate an optional template file override.
///
/// `None` (or an empty path) means "use the built-in ECC template set". An override must be an
/// existing regular file with a `.yaml` or `.yml` extension.
pub fn resolve_template_file(override_file: Option<PathBuf>) -> CoreResult<Option<PathBuf>> {
    let Some(path) = override_file.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if !is_yaml {
        return Err(CoreError::InvalidInput(format!(
            "template file must be a .yaml or .yml file: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(CoreError::InvalidInput(format!(
            "template file does not exist: {}",
            path.display()
        )));
    }

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_rejects_empty_drafts_dir() {
        let err = CoreConfig::new(PathBuf::new(), None).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("drafts_dir")));
    }

    #[test]
    fn test_resolve_template_file_none_uses_builtin() {
        assert!(resolve_template_file(None).unwrap().is_none());
        assert!(resolve_template_file(Some(PathBuf::new())).unwrap().is_none());
    }

    #[test]
    fn test_resolve_template_file_rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conditions.json");
        std::fs::write(&path, "{}").unwrap();

        let err = resolve_template_file(Some(path)).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains(".yaml")));
    }

    #[test]
    fn test_resolve_template_file_rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = resolve_template_file(Some(dir.path().join("missing.yml")))
            .expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("does not exist")));
    }

    #[test]
    fn test_load_templates_from_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conditions.yaml");
        std::fs::write(
            &path,
            r#"
conditions:
  - id: "A"
    title: "Only condition"
    descriptions:
      complied_text: "yes"
      partially_complied_text: "partly"
      not_complied_text: "no"
"#,
        )
        .unwrap();

        let resolved = resolve_template_file(Some(path)).unwrap();
        let cfg = CoreConfig::new(dir.path().join("drafts"), resolved).unwrap();
        let templates = cfg.load_templates().unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates.iter().next().unwrap().id.as_str(), "A");
    }

    #[test]
    fn test_load_templates_defaults_to_ecc_set() {
        let cfg = CoreConfig::new(PathBuf::from("drafts"), None).unwrap();
        let templates = cfg.load_templates().unwrap();
        assert!(templates.get("7a").is_some());
    }
}
