use serde::Serialize;
use std::path::Path;

/// File that turns a directory into a package.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Extension of importable source files.
pub const SOURCE_EXTENSION: &str = "py";

/// One imported name, normalized from a single import statement.
///
/// `import a.b.c as x` becomes `module = Some("a.b")`, `name = "c"`,
/// `asname = Some("x")`, `level = 0`. A statement importing several names
/// yields one record per name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RawImport {
    /// Dotted module the name is imported from. `None` for `import x` and
    /// for pure-relative `from . import x`.
    pub module: Option<String>,
    /// Imported identifier, `*` for wildcard imports
    pub name: String,
    pub asname: Option<String>,
    /// Leading dot count: 0 is absolute, 1 is the importer's own package
    pub level: usize,
    /// Line of the import statement (1-indexed)
    pub line: usize,
}

impl RawImport {
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }

    /// The import as it would be written after `from`/`import`, e.g. `..pkg.mod`.
    pub fn display_path(&self) -> String {
        let dots = ".".repeat(self.level);
        match &self.module {
            Some(module) => format!("{dots}{module}.{}", self.name),
            None if self.level > 0 => format!("{dots}{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Check if a path names a package marker file.
pub fn is_package_marker(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == PACKAGE_MARKER)
}

/// Check if a path names an importable source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == SOURCE_EXTENSION)
}
