//! # Rendering
//!
//! Pure functions from assembled [`Suites`] to artifact text. Both formats
//! read the same resolved fields; neither recomputes inheritance.
//!
//! | Format | File | Shape |
//! |--------|------|-------|
//! | [`Format::CompiledSuite`] | `suite.gen.go` | testify suite with nested child suites |
//! | [`Format::Script`] | `suite.gen.sh` | flattened bash with `setup`/`cleanup` |

mod compiled;
mod script;
mod select;

use std::path::PathBuf;

use crate::domain::{Suite, SuiteId, Suites, Test};

pub use compiled::PackageError;
pub use select::{SelectError, Selected, Selection};

/// Output representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    CompiledSuite,
    Script,
}

impl Format {
    /// File name of the artifact inside the suite's location
    pub fn file_name(self) -> &'static str {
        match self {
            Format::CompiledSuite => "suite.gen.go",
            Format::Script => "suite.gen.sh",
        }
    }
}

/// Returns where the artifact of a suite is written
pub fn artifact_path(suite: &Suite, format: Format) -> PathBuf {
    suite.location.join(format.file_name())
}

/// Fails when the suites can't be emitted in `format`
///
/// Scripts carry no packages, so only the compiled format has anything to check.
pub fn check(suites: &Suites, format: Format) -> Result<(), PackageError> {
    match format {
        Format::CompiledSuite => compiled::check(suites),
        Format::Script => Ok(()),
    }
}

/// Renders a suite with all of its tests
pub fn render(suites: &Suites, id: SuiteId, format: Format) -> String {
    let tests: Vec<usize> = suites
        .get(id)
        .map(|s| (0..s.tests.len()).collect())
        .unwrap_or_default();
    render_selected(suites, &Selected { suite: id, tests }, format)
}

/// Renders a suite restricted to the selected tests
///
/// The compiled format always carries every test because the runner filters
/// at run time; only the script format honors the test subset.
pub fn render_selected(suites: &Suites, selected: &Selected, format: Format) -> String {
    let Some(suite) = suites.get(selected.suite) else {
        return String::new();
    };

    match format {
        Format::CompiledSuite => compiled::render(suites, suite),
        Format::Script => {
            let tests: Vec<&Test> = selected
                .tests
                .iter()
                .filter_map(|i| suite.tests.get(*i))
                .collect();
            script::render(suites, selected.suite, &tests)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssembleOptions, Assembler, Block, Example, Linker};
    use std::path::Path;

    fn chain_suites() -> Suites {
        let examples = vec![
            Example::new("docs/spire").with_block(Block::Run("install spire".into())),
            Example::new("docs/root")
                .with_block(Block::Dependency("docs/spire".into()))
                .with_block(Block::Run("root setup".into()))
                .with_block(Block::Cleanup("root cleanup".into())),
            Example::new("docs/root/mid")
                .with_block(Block::Run("mid setup".into()))
                .with_block(Block::Cleanup("mid cleanup".into())),
            Example::new("docs/root/mid/leaf")
                .with_block(Block::Dependency("docs/spire".into()))
                .with_block(Block::Run("C".into())),
        ];
        let linked = Linker::new("docs").link(examples).unwrap();
        let options =
            AssembleOptions::new("docs", "out", "example.com/tests").with_absolute_dir("/work/docs");
        Assembler::new(options).assemble(&linked).unwrap()
    }

    #[test]
    fn artifact_paths_mirror_source_dirs() {
        let suites = chain_suites();
        let leaf = suites.get(suites.find(Path::new("docs/root/mid/leaf")).unwrap()).unwrap();

        assert_eq!(
            artifact_path(leaf, Format::CompiledSuite),
            PathBuf::from("out/root/mid/leaf/suite.gen.go")
        );
        assert_eq!(
            artifact_path(leaf, Format::Script),
            PathBuf::from("out/root/mid/leaf/suite.gen.sh")
        );
    }

    #[test]
    fn formats_agree_on_fixture_and_ordering() {
        let suites = chain_suites();
        let leaf = suites.find(Path::new("docs/root/mid/leaf")).unwrap();
        let root = suites.find(Path::new("docs/root")).unwrap();

        // Compiled: only the root initializes the fixture
        let compiled_root = render(&suites, root, Format::CompiledSuite);
        let compiled_leaf = render(&suites, leaf, Format::CompiledSuite);
        assert!(compiled_root.contains("suite.Run(s.T(), &s.spireSuite)"));
        assert!(compiled_leaf.contains("spireSuite spire.Suite"));
        assert!(!compiled_leaf.contains("suite.Run(s.T(), &s.spireSuite)"));

        // Script: the same order, flattened
        let script = render(&suites, leaf, Format::Script);
        let setup = script
            .split("function setup() {\n")
            .nth(1)
            .and_then(|rest| rest.split("\n}\n").next())
            .unwrap();
        assert_eq!(
            setup.lines().collect::<Vec<_>>(),
            vec![
                "cd /work/docs/spire",
                "install spire",
                "cd /work/docs/root",
                "root setup",
                "cd /work/docs/root/mid",
                "mid setup",
                "cd /work/docs/root/mid/leaf",
                "C",
            ]
        );
        assert_eq!(script.matches("install spire").count(), 1);
    }

    #[test]
    fn rendering_is_byte_stable() {
        let first = chain_suites();
        let second = chain_suites();

        for (id, _) in first.iter() {
            for format in [Format::CompiledSuite, Format::Script] {
                assert_eq!(render(&first, id, format), render(&second, id, format));
            }
        }
    }

    #[test]
    fn package_checks_only_apply_to_compiled_suites() {
        let linked = Linker::new("docs")
            .link(vec![Example::new("docs"), Example::new("docs/base")])
            .unwrap();
        let options = AssembleOptions::new("docs", "out", "example.com/tests");
        let suites = Assembler::new(options).assemble(&linked).unwrap();

        assert!(check(&suites, Format::CompiledSuite).is_err());
        assert_eq!(check(&suites, Format::Script), Ok(()));
        assert_eq!(check(&chain_suites(), Format::CompiledSuite), Ok(()));
    }

    #[test]
    fn unknown_suite_renders_nothing() {
        let suites = chain_suites();
        assert_eq!(render(&suites, 99, Format::Script), "");
    }
}
