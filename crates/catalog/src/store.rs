use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use formats::{Table, parse_table};
use tracing::debug;

use crate::error::CatalogError;
use crate::sort::{SortOrder, natural_cmp, sort_table};

/// Per-MPA risk report tables.
pub const MPA_REPORT: &str = "mpa_report";
/// Per-vessel deep-dive tables.
pub const VESSEL_DETAILS: &str = "vessel_details";

const TABLE_EXTENSION: &str = ".csv";

/// File-backed store of delimited tables, grouped by logical dataset.
///
/// Each dataset key maps to one directory under the store root. Callers name
/// a file inside that directory; the name is validated before it is ever
/// joined to a path.
#[derive(Debug, Clone)]
pub struct TabularStore {
    root: PathBuf,
    datasets: BTreeMap<String, PathBuf>,
}

impl TabularStore {
    /// Store rooted at `root` with the standard `mpa_report` and
    /// `vessel_details` datasets.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::empty(root)
            .with_dataset(MPA_REPORT, MPA_REPORT)
            .with_dataset(VESSEL_DETAILS, VESSEL_DETAILS)
    }

    pub fn empty(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            datasets: BTreeMap::new(),
        }
    }

    pub fn with_dataset(mut self, key: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        self.datasets.insert(key.into(), dir.as_ref().to_path_buf());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_keys(&self) -> Vec<&str> {
        self.datasets.keys().map(String::as_str).collect()
    }

    fn dataset_dir(&self, dataset: &str) -> Result<PathBuf, CatalogError> {
        self.datasets
            .get(dataset)
            .map(|dir| self.root.join(dir))
            .ok_or_else(|| CatalogError::UnknownDataset(dataset.to_string()))
    }

    /// Resolve `file` inside `dataset`'s directory.
    pub fn resolve(&self, dataset: &str, file: &str) -> Result<PathBuf, CatalogError> {
        let name = validate_file_name(file)?;
        Ok(self.dataset_dir(dataset)?.join(name))
    }

    pub async fn load(&self, dataset: &str, file: &str) -> Result<Table, CatalogError> {
        let path = self.resolve(dataset, file)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    dataset: dataset.to_string(),
                    file: file.to_string(),
                });
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    dataset: dataset.to_string(),
                    file: file.to_string(),
                    source,
                });
            }
        };

        let table = parse_table(&text).map_err(|source| CatalogError::Corrupt {
            dataset: dataset.to_string(),
            file: file.to_string(),
            source,
        })?;
        debug!(dataset, file, records = table.len(), "loaded table");
        Ok(table)
    }

    pub async fn load_sorted(
        &self,
        dataset: &str,
        file: &str,
        sort_by: Option<&str>,
        order: SortOrder,
    ) -> Result<Table, CatalogError> {
        let table = self.load(dataset, file).await?;
        Ok(sort_table(table, sort_by, order))
    }

    /// Table file names in `dataset`, in natural order.
    pub async fn list(&self, dataset: &str) -> Result<Vec<String>, CatalogError> {
        let dir = self.dataset_dir(dataset)?;
        let io_err = |source| CatalogError::Io {
            dataset: dataset.to_string(),
            file: String::new(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    dataset: dataset.to_string(),
                    file: String::new(),
                });
            }
            Err(e) => return Err(io_err(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let is_file = entry.file_type().await.map(|ft| ft.is_file()).unwrap_or(false);
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_file && has_table_extension(&name) {
                names.push(name);
            }
        }
        names.sort_by(|a, b| natural_cmp(a, b));
        Ok(names)
    }
}

fn has_table_extension(name: &str) -> bool {
    name.len() > TABLE_EXTENSION.len()
        && name.to_ascii_lowercase().ends_with(TABLE_EXTENSION)
}

/// Accept only a bare `*.csv` file name: no separators, no `.`/`..`, no
/// drive or root prefix.
pub fn validate_file_name(name: &str) -> Result<&str, CatalogError> {
    let invalid = |reason| CatalogError::InvalidInput {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("file name is empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(invalid("path traversal is not allowed"));
    }
    if name.contains(['\0', ':']) {
        return Err(invalid("file name contains reserved characters"));
    }
    if !has_table_extension(name) {
        return Err(invalid("expected a .csv file"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::{MPA_REPORT, TabularStore, validate_file_name};
    use crate::error::CatalogError;
    use crate::sort::SortOrder;
    use std::fs;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, TabularStore) {
        let dir = tempfile::tempdir().unwrap();
        let report_dir = dir.path().join(MPA_REPORT);
        fs::create_dir_all(&report_dir).unwrap();
        for (name, body) in files {
            fs::write(report_dir.join(name), body).unwrap();
        }
        let store = TabularStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn rejects_traversal_and_wrong_extension() {
        let bad_names = [
            "../secret.csv",
            "a/b.csv",
            "..\\x.csv",
            "..",
            "",
            "report.txt",
            ".csv",
            "c:x.csv",
        ];
        for bad in bad_names {
            assert!(
                matches!(validate_file_name(bad), Err(CatalogError::InvalidInput { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(validate_file_name("Report.CSV").unwrap(), "Report.CSV");
    }

    #[tokio::test]
    async fn loads_and_sorts() {
        let (_dir, store) = store_with(&[("r.csv", "name,score\na,10\nb,9\n")]);
        let t = store
            .load_sorted(MPA_REPORT, "r.csv", Some("score"), SortOrder::Asc)
            .await
            .unwrap();
        assert_eq!(t.records[0]["name"], "b");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, store) = store_with(&[]);
        let err = store.load(MPA_REPORT, "nope.csv").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_dataset_is_rejected() {
        let (_dir, store) = store_with(&[]);
        let err = store.load("elsewhere", "r.csv").await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownDataset(_)));
    }

    #[tokio::test]
    async fn lists_only_table_files_in_natural_order() {
        let (_dir, store) = store_with(&[
            ("r10.csv", "a\n"),
            ("r9.csv", "a\n"),
            ("notes.txt", "x"),
            ("R1.CSV", "a\n"),
        ]);
        let names = store.list(MPA_REPORT).await.unwrap();
        assert_eq!(names, vec!["R1.CSV", "r9.csv", "r10.csv"]);
    }
}
