//! Module loader: re-entrant parsing of imported files.
//!
//! Relative paths resolve against the directory of the importing file, not
//! the process working directory. Canonicalized paths populate the
//! imported-modules set, which doubles as the circular-import guard. The
//! lexer state is swapped out for the duration of the import and restored
//! unchanged afterwards.

use std::fs::File;
use std::path::{Path, PathBuf};

use fermat_core::lexer::{Source, Token};

use crate::driver::Driver;

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn resolve(importing_file: &Path, import: &str) -> PathBuf {
    let import_path = Path::new(import);
    if import_path.is_absolute() {
        return canonical(import_path);
    }
    let base_dir = importing_file.parent().unwrap_or_else(|| Path::new("."));
    canonical(&base_dir.join(import_path))
}

impl<'ctx> Driver<'ctx> {
    /// Loads an imported module. Only definitions, externs, statics, struct
    /// defs, exports, and nested imports are processed; top-level
    /// expressions in imported files are skipped without evaluation.
    pub fn load_module(&mut self, name: &str) -> bool {
        let full_path = resolve(self.parser.source_path(), name);
        if !self.imported.insert(full_path.clone()) {
            return true;
        }

        let file = match File::open(&full_path) {
            Ok(file) => file,
            Err(_) => {
                eprintln!("Error: Cannot open module '{}'", full_path.display());
                return false;
            }
        };

        let saved = self.parser.begin_import(Source::from_file(file, full_path));
        loop {
            match self.parser.current() {
                Token::Eof => break,
                Token::Char(b';') => {
                    self.parser.advance();
                }
                Token::Export => self.handle_export(),
                Token::Def => self.handle_definition(),
                Token::Import => self.handle_import(),
                Token::Extern => self.handle_extern(),
                Token::Static => self.handle_static(),
                Token::Type | Token::Struct | Token::Abstract => self.handle_struct_def(),
                _ => {
                    self.parser.advance();
                }
            }
        }
        self.parser.end_import(saved);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;

    fn write_module(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("module file writes");
        path
    }

    fn driver_for<'ctx>(context: &'ctx Context, source: Source) -> Driver<'ctx> {
        Driver::new(context, source, false, false).expect("driver builds")
    }

    #[test]
    fn test_import_resolves_against_importing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_module(dir.path(), "lib.fm", "def triple(x) x * 3");

        let main = "import \"lib.fm\"; triple(5);";
        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str(main, dir.path().join("main.fm")),
        );
        driver.run();
        assert_eq!(driver.results(), &[15.0]);
    }

    #[test]
    fn test_imported_expressions_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_module(
            dir.path(),
            "noisy.fm",
            "def ten() 10\n1 + 1;\n2 + 2;",
        );

        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str("import \"noisy.fm\"; ten();", dir.path().join("main.fm")),
        );
        driver.run();
        // Only our own top-level expression evaluated.
        assert_eq!(driver.results(), &[10.0]);
    }

    #[test]
    fn test_nested_imports() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_module(dir.path(), "inner.fm", "def one() 1");
        write_module(dir.path(), "outer.fm", "import \"inner.fm\"\ndef two() one() + 1");

        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str("import \"outer.fm\"; two();", dir.path().join("main.fm")),
        );
        driver.run();
        assert_eq!(driver.results(), &[2.0]);
    }

    #[test]
    fn test_circular_imports_terminate() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_module(dir.path(), "a.fm", "import \"b.fm\"\ndef from_a() 1");
        write_module(dir.path(), "b.fm", "import \"a.fm\"\ndef from_b() 2");

        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str(
                "import \"a.fm\"; from_a() + from_b();",
                dir.path().join("main.fm"),
            ),
        );
        driver.run();
        assert_eq!(driver.results(), &[3.0]);
    }

    #[test]
    fn test_reimport_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lib = write_module(dir.path(), "lib.fm", "def four() 4");

        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str("", dir.path().join("main.fm")),
        );
        assert!(driver.load_module("lib.fm"));
        // Deleting the file proves a second load never reopens it.
        std::fs::remove_file(lib).expect("file removes");
        assert!(driver.load_module("lib.fm"));
    }

    #[test]
    fn test_export_prefix_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_module(
            dir.path(),
            "lib.fm",
            "export def five() 5\nexport type Pair struct a: float b: float end",
        );

        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str(
                "import \"lib.fm\"; let p = Pair{a: five(), b: 1.0}; p.a + p.b;",
                dir.path().join("main.fm"),
            ),
        );
        driver.run();
        assert_eq!(driver.results(), &[6.0]);
    }

    #[test]
    fn test_missing_module_reports_and_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let context = Context::create();
        let mut driver = driver_for(
            &context,
            Source::from_str("import \"absent.fm\"; 3;", dir.path().join("main.fm")),
        );
        driver.run();
        assert_eq!(driver.results(), &[3.0]);
    }
}
