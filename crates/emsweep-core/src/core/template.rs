use super::energy::EnergyPoint;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Token replaced by the energy value when no other placeholder is configured.
pub const DEFAULT_PLACEHOLDER: &str = "@ENERGY@";

/// Built-in TestEm1 macro: muons through a 1 mm copper slab.
///
/// The placeholder appears twice, once for the gun energy and once as the
/// upper bound of the energy-deposit histogram.
pub const TESTEM1_MUON_COPPER: &str = "\
# TestEm1: mu- in a 1 mm copper absorber
/control/verbose 1
/run/verbose 1
/tracking/verbose 0
#
/testem/det/setMat G4_Cu
/testem/det/setSize 1 mm
#
/testem/phys/addPhysics emstandard_opt4
#
/run/initialize
#
/gun/particle mu-
/gun/energy @ENERGY@ MeV
#
/analysis/setFileName testem1
/analysis/h1/set 1 100 0 @ENERGY@ MeV
#
/run/printProgress 10000
/run/beamOn 10000
";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read macro template '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("Macro template does not contain the placeholder '{placeholder}'")]
    MissingPlaceholder { placeholder: String },

    #[error("Placeholder token must not be empty")]
    EmptyPlaceholder,

    #[error("Failed to write rendered macro: {0}")]
    Write(#[from] io::Error),
}

/// A macro document with a single substitutable energy token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTemplate {
    text: String,
    placeholder: String,
}

impl MacroTemplate {
    /// Creates a template, rejecting documents that never mention the placeholder.
    pub fn new(text: impl Into<String>, placeholder: impl Into<String>) -> Result<Self, TemplateError> {
        let text = text.into();
        let placeholder = placeholder.into();
        if placeholder.is_empty() {
            return Err(TemplateError::EmptyPlaceholder);
        }
        if !text.contains(&placeholder) {
            return Err(TemplateError::MissingPlaceholder { placeholder });
        }
        Ok(Self { text, placeholder })
    }

    pub fn builtin() -> Self {
        Self {
            text: TESTEM1_MUON_COPPER.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn load(path: &Path, placeholder: &str) -> Result<Self, TemplateError> {
        debug!("Loading macro template from {:?}", path);
        let text = fs::read_to_string(path).map_err(|e| TemplateError::Read {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::new(text, placeholder)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Number of sites the energy value will be written to.
    pub fn placeholder_sites(&self) -> usize {
        self.text.matches(&self.placeholder).count()
    }

    /// Replaces every placeholder occurrence with the energy's decimal form.
    pub fn render(&self, energy: EnergyPoint) -> String {
        self.text.replace(&self.placeholder, &energy.to_string())
    }

    /// Renders the macro into a fresh temporary file owned by the returned
    /// value. The file is removed when the [`RenderedMacro`] is dropped.
    pub fn write_scoped(&self, energy: EnergyPoint) -> Result<RenderedMacro, TemplateError> {
        let contents = self.render(energy);
        let mut file = tempfile::Builder::new()
            .prefix("emsweep-")
            .suffix(".mac")
            .tempfile()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        debug!(energy = %energy, path = ?file.path(), "Rendered macro to temporary file.");
        Ok(RenderedMacro {
            energy,
            contents,
            file,
        })
    }
}

impl Default for MacroTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A rendered macro living in a scoped temporary file.
#[derive(Debug)]
pub struct RenderedMacro {
    energy: EnergyPoint,
    contents: String,
    file: NamedTempFile,
}

impl RenderedMacro {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Keeps a copy of the rendered macro as `run_<index>_<energy>MeV.mac` in `dir`.
    pub fn keep_copy(&self, dir: &Path, index: usize) -> Result<PathBuf, TemplateError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("run_{:03}_{}MeV.mac", index + 1, self.energy));
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn render_replaces_every_placeholder_occurrence() {
        let template = MacroTemplate::builtin();
        let rendered = template.render(EnergyPoint::from_mev(500.0));

        assert!(rendered.contains("/gun/energy 500 MeV"));
        assert!(rendered.contains("/analysis/h1/set 1 100 0 500 MeV"));
        assert!(!rendered.contains(DEFAULT_PLACEHOLDER));
    }

    #[test]
    fn builtin_template_has_two_placeholder_sites() {
        assert_eq!(MacroTemplate::builtin().placeholder_sites(), 2);
    }

    #[test]
    fn rendering_is_idempotent() {
        let template = MacroTemplate::builtin();
        let energy = EnergyPoint::from_mev(0.1);
        assert_eq!(template.render(energy), template.render(energy));
    }

    #[test]
    fn render_leaves_the_rest_of_the_document_untouched() {
        let template = MacroTemplate::new("a {E} b {E} c", "{E}").unwrap();
        assert_eq!(template.render(EnergyPoint::from_mev(2.5)), "a 2.5 b 2.5 c");
    }

    #[test]
    fn new_rejects_template_without_placeholder() {
        let result = MacroTemplate::new("/gun/energy 1 MeV", DEFAULT_PLACEHOLDER);
        assert!(matches!(
            result,
            Err(TemplateError::MissingPlaceholder { .. })
        ));
    }

    #[test]
    fn new_rejects_empty_placeholder() {
        let result = MacroTemplate::new("/gun/energy 1 MeV", "");
        assert!(matches!(result, Err(TemplateError::EmptyPlaceholder)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = MacroTemplate::load(&dir.path().join("absent.mac"), DEFAULT_PLACEHOLDER);
        assert!(matches!(result, Err(TemplateError::Read { .. })));
    }

    #[test]
    fn load_reads_custom_template_and_placeholder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.mac");
        fs::write(&path, "/gun/energy XXX MeV\n").unwrap();

        let template = MacroTemplate::load(&path, "XXX").unwrap();
        assert_eq!(template.placeholder(), "XXX");
        assert_eq!(
            template.render(EnergyPoint::from_mev(10.0)),
            "/gun/energy 10 MeV\n"
        );
    }

    #[test]
    fn write_scoped_creates_file_and_removes_it_on_drop() {
        let template = MacroTemplate::builtin();
        let rendered = template.write_scoped(EnergyPoint::from_mev(42.0)).unwrap();
        let path = rendered.path().to_path_buf();

        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, rendered.contents());
        assert!(on_disk.contains("/gun/energy 42 MeV"));

        drop(rendered);
        assert!(!path.exists());
    }

    #[test]
    fn consecutive_renders_use_distinct_files() {
        let template = MacroTemplate::builtin();
        let first = template.write_scoped(EnergyPoint::from_mev(1.0)).unwrap();
        let second = template.write_scoped(EnergyPoint::from_mev(1.0)).unwrap();
        assert_ne!(first.path(), second.path());
        assert_eq!(first.contents(), second.contents());
    }

    #[test]
    fn keep_copy_writes_named_file_into_directory() {
        let dir = tempdir().unwrap();
        let template = MacroTemplate::builtin();
        let rendered = template.write_scoped(EnergyPoint::from_mev(0.5)).unwrap();

        let kept = rendered.keep_copy(&dir.path().join("macros"), 2).unwrap();

        assert_eq!(kept.file_name().unwrap(), "run_003_0.5MeV.mac");
        assert_eq!(fs::read_to_string(kept).unwrap(), rendered.contents());
    }
}
