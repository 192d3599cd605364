//! Compiled-suite renderer
//!
//! Emits one testify suite per directory. Fixtures become struct fields,
//! child suites run as named sub-tests from `RunIncludedSuites`, and cleanup
//! commands are registered with `s.T().Cleanup` so they run whatever the
//! outcome.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::naming::{last_segment, package_name, squeeze_blank_lines, title};
use crate::domain::{Body, Dependencies, Dependency, Suite, Suites, Test};

const HEADER: &str = "// Code generated by mdsuite DO NOT EDIT.";
const SUITE_IMPORT: &str = "github.com/stretchr/testify/suite";

/// Package layouts that can't compile
#[derive(Debug, Error, PartialEq)]
pub enum PackageError {
    #[error("Suite {} would be generated into the runtime package {import}", .suite.display())]
    RuntimePackage { suite: PathBuf, import: String },

    #[error("Suite {} imports two packages as {alias}: {first} and {second}", .suite.display())]
    AliasClash {
        suite: PathBuf,
        alias: String,
        first: String,
        second: String,
    },
}

/// Everything a suite's file imports, minus the runtime package
struct Imports<'a> {
    children: Vec<&'a Suite>,
    declared: Dependencies,
    uses_suite_pkg: bool,
}

impl<'a> Imports<'a> {
    fn of(suites: &'a Suites, suite: &Suite) -> Self {
        let children: Vec<&Suite> = suite
            .children
            .iter()
            .filter_map(|id| suites.get(*id))
            .collect();

        let mut declared = suite.deps.clone();
        for child in &children {
            declared.insert(Dependency::suite(child.name.clone(), child.import.clone()));
        }

        Self {
            uses_suite_pkg: !suite.deps_to_setup.is_empty() || !children.is_empty(),
            children,
            declared,
        }
    }
}

fn runtime_alias(runtime: &str) -> String {
    package_name(runtime.rsplit('/').next().unwrap_or(runtime))
}

/// Rejects suites whose file would import two packages under one name or
/// land inside the runtime package
pub(super) fn check(suites: &Suites) -> Result<(), PackageError> {
    let runtime = suites.runtime_import();
    let runtime_alias = runtime_alias(runtime);

    for (_, suite) in suites.iter() {
        if suite.import == runtime {
            return Err(PackageError::RuntimePackage {
                suite: suite.dir.clone(),
                import: runtime.to_string(),
            });
        }

        let imports = Imports::of(suites, suite);
        let mut taken: HashMap<&str, &str> = HashMap::new();
        taken.insert(&runtime_alias, runtime);
        if imports.uses_suite_pkg {
            taken.insert("suite", SUITE_IMPORT);
        }

        let wanted = suite
            .deps
            .iter()
            .map(|d| (d.name.as_str(), d.import.as_str()))
            .chain(imports.children.iter().map(|c| (c.name.as_str(), c.import.as_str())));

        for (alias, import) in wanted {
            match taken.get(alias) {
                Some(first) if *first != import => {
                    return Err(PackageError::AliasClash {
                        suite: suite.dir.clone(),
                        alias: alias.to_string(),
                        first: first.to_string(),
                        second: import.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    taken.insert(alias, import);
                }
            }
        }
    }

    Ok(())
}

pub(super) fn render(suites: &Suites, suite: &Suite) -> String {
    let Imports {
        children,
        declared,
        uses_suite_pkg,
    } = Imports::of(suites, suite);

    let runtime = suites.runtime_import();
    let runtime_alias = runtime_alias(runtime);

    let mut out = String::new();
    out.push_str(&format!("{HEADER}\n"));
    out.push_str(&format!("package {}\n\n", suite.name));

    out.push_str("import (\n");
    if uses_suite_pkg {
        out.push_str(&format!("\t\"{SUITE_IMPORT}\"\n"));
    }
    out.push_str(&format!("\t{runtime_alias} \"{runtime}\"\n"));
    out.push_str(&indent(&declared.imports_string(), 1));
    out.push_str(")\n\n");

    out.push_str("type Suite struct {\n");
    out.push_str(&format!("\t{runtime_alias}.Suite\n"));
    out.push_str(&indent(&declared.fields_string(), 1));
    out.push_str("}\n\n");

    out.push_str("func (s *Suite) SetupSuite() {\n");
    out.push_str(&indent(&suite.deps_to_setup.setup_string(), 1));
    out.push_str(&runner_block(&suite.dir.to_string_lossy(), &suite.run, &suite.cleanup));
    if !children.is_empty() {
        out.push_str("\ts.RunIncludedSuites()\n");
    }
    out.push_str("}\n\n");

    if !children.is_empty() {
        out.push_str("func (s *Suite) RunIncludedSuites() {\n");
        for child in &children {
            out.push_str(&format!(
                "\ts.Run(\"{}\", func() {{\n",
                title(&last_segment(&child.dir))
            ));
            out.push_str(&format!("\t\tsuite.Run(s.T(), &s.{}Suite)\n", child.name));
            out.push_str("\t})\n");
        }
        out.push_str("}\n\n");
    }

    for test in &suite.tests {
        out.push_str(&render_test(test));
        out.push('\n');
    }

    squeeze_blank_lines(&out)
}

fn render_test(test: &Test) -> String {
    if test.run.is_empty() && test.cleanup.is_empty() {
        return format!("func (s *Suite) Test{}() {{}}\n", test.name);
    }

    let mut out = format!("func (s *Suite) Test{}() {{\n", test.name);
    out.push_str(&runner_block(&test.dir.to_string_lossy(), &test.run, &test.cleanup));
    out.push_str("}\n");
    out
}

/// Runner construction, deferred cleanup registration, then the run commands
fn runner_block(dir: &str, run: &Body, cleanup: &Body) -> String {
    if run.is_empty() && cleanup.is_empty() {
        return String::new();
    }

    let mut out = format!("\tr := s.Runner({})\n", go_string(dir));
    if !cleanup.is_empty() {
        out.push_str("\ts.T().Cleanup(func() {\n");
        out.push_str(&indent(&run_calls(cleanup), 2));
        out.push_str("\t})\n");
    }
    out.push_str(&indent(&run_calls(run), 1));
    out
}

/// One `r.Run(...)` call per command, multi-line commands joined with `"\n"`
fn run_calls(body: &Body) -> String {
    body.iter()
        .map(|command| {
            let joined = command
                .split('\n')
                .map(raw_string)
                .collect::<Vec<_>>()
                .join("+\"\\n\"+");
            format!("r.Run({joined})")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quotes a line as a raw string literal, splicing in any backticks
fn raw_string(line: &str) -> String {
    let parts: Vec<String> = line.split('`').map(|p| format!("`{p}`")).collect();
    parts.join("+\"`\"+")
}

/// Quotes text as an interpreted string literal
fn go_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn indent(text: &str, depth: usize) -> String {
    let tabs = "\t".repeat(depth);
    let mut out = String::new();
    for line in text.lines() {
        out.push_str(&tabs);
        out.push_str(line);
        out.push('\n');
    }
    out
}
