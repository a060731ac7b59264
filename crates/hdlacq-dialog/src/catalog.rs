//! [`CalibrationCatalog`] – the list of selectable calibration files.
//!
//! Row 0 is always the live-corrections sentinel, followed by the factory
//! built-ins, followed by files the operator added.  Only operator-added rows
//! can be removed, and only those rows are ever persisted.

use std::path::{Path, PathBuf};

use hdlacq_types::CalibrationEntry;
use tracing::debug;

/// Factory calibration files shipped in the install's resource directory.
pub const BUILT_IN_CALIBRATION_FILES: [&str; 5] = [
    "HDL-32.xml",
    "VLP-16.xml",
    "VLP-32c.xml",
    "Puck Hi-Res.xml",
    "Puck LITE.xml",
];

/// Resource directory relative to the running executable.
///
/// `<exe_dir>/../share` on Windows, `<exe_dir>/../Resources` on macOS and
/// `<exe_dir>/../../share` elsewhere.  `None` if the executable path cannot
/// be determined.
pub fn default_resource_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe_dir = exe.parent()?;
    Some(resource_dir_for(exe_dir))
}

pub(crate) fn resource_dir_for(exe_dir: &Path) -> PathBuf {
    if cfg!(target_os = "windows") {
        exe_dir.join("..").join("share")
    } else if cfg!(target_os = "macos") {
        exe_dir.join("..").join("Resources")
    } else {
        exe_dir.join("..").join("..").join("share")
    }
}

/// Full paths of the built-in calibration files under `resource_dir`.
pub fn built_in_calibration_paths(resource_dir: &Path) -> Vec<String> {
    BUILT_IN_CALIBRATION_FILES
        .iter()
        .map(|name| resource_dir.join(name).to_string_lossy().into_owned())
        .collect()
}

/// Ordered list of calibration entries.
///
/// # Example
///
/// ```
/// use hdlacq_dialog::catalog::CalibrationCatalog;
///
/// let mut cat = CalibrationCatalog::new(
///     ["/share/HDL-32.xml", "/share/VLP-16.xml"],
///     Vec::<String>::new(),
/// );
/// assert_eq!(cat.len(), 3);
/// assert!(!cat.remove_selected(2));
///
/// let row = cat.add_user_file("/tmp/foo.xml").unwrap();
/// assert_eq!(cat.selected_path(row), Some("/tmp/foo.xml"));
/// assert!(cat.remove_selected(row));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCatalog {
    entries: Vec<CalibrationEntry>,
}

impl Default for CalibrationCatalog {
    fn default() -> Self {
        Self {
            entries: vec![CalibrationEntry::Live],
        }
    }
}

impl CalibrationCatalog {
    /// Build a catalog from built-in paths and previously persisted user paths.
    pub fn new<B, U>(built_in_paths: B, user_paths: U) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        let mut catalog = Self::default();
        catalog.initialize(built_in_paths, user_paths);
        catalog
    }

    /// Rebuild the catalog: sentinel, then built-ins, then user files.
    pub fn initialize<B, U>(&mut self, built_in_paths: B, user_paths: U)
    where
        B: IntoIterator,
        B::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        self.entries.clear();
        self.entries.push(CalibrationEntry::Live);
        self.entries.extend(
            built_in_paths
                .into_iter()
                .map(|p| CalibrationEntry::BuiltIn(p.into())),
        );
        self.entries.extend(
            user_paths
                .into_iter()
                .map(Into::<String>::into)
                .filter(|p| !p.is_empty())
                .map(CalibrationEntry::User),
        );
        debug!(
            built_in = self.built_in_count(),
            user = self.entries.len() - self.protected_count(),
            "Calibration catalog initialized"
        );
    }

    /// Append an operator-selected file.  Returns the new row, or `None` when
    /// `path` is empty (cancelled selection).
    pub fn add_user_file(&mut self, path: &str) -> Option<usize> {
        if path.is_empty() {
            return None;
        }
        self.entries.push(CalibrationEntry::User(path.to_string()));
        Some(self.entries.len() - 1)
    }

    /// Remove the row at `index` if it is an operator-added file.
    ///
    /// Returns `false` (and leaves the catalog untouched) for the sentinel,
    /// built-ins and out-of-range rows.
    pub fn remove_selected(&mut self, index: usize) -> bool {
        if !self.is_removable(index) {
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Path of `index`; `Some("")` for the live-corrections sentinel.
    pub fn selected_path(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(CalibrationEntry::path)
    }

    pub fn is_removable(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(CalibrationEntry::is_removable)
    }

    /// Paths of the operator-added entries, in catalog order.
    pub fn user_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                CalibrationEntry::User(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn entries(&self) -> &[CalibrationEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CalibrationEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the sentinel row cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of factory built-ins (excluding the sentinel).
    pub fn built_in_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, CalibrationEntry::BuiltIn(_)))
            .count()
    }

    /// Number of non-removable leading rows (sentinel + built-ins).
    pub fn protected_count(&self) -> usize {
        self.entries.iter().take_while(|e| !e.is_removable()).count()
    }
}
