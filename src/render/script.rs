//! Shell-script renderer
//!
//! Flattens the ancestor chain instead of relying on nested suites: `setup`
//! replays every ancestor from the root down, `cleanup` unwinds from this
//! suite back up to the root. Commands are written unindented so heredocs
//! keep working.

use crate::domain::naming::{shell_word, squeeze_blank_lines};
use crate::domain::{Suite, SuiteId, Suites, Test};

const HEADER: &str = "#!/usr/bin/env bash\n# Code generated by mdsuite DO NOT EDIT.";

pub(super) fn render(suites: &Suites, id: SuiteId, tests: &[&Test]) -> String {
    let chain = suites.chain(id);
    let tests: Vec<&Test> = tests.iter().copied().filter(|t| !t.is_placeholder()).collect();

    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");

    out.push_str(&function("setup", &setup_lines(&chain)));
    out.push_str(&function("cleanup", &cleanup_lines(&chain)));

    for test in &tests {
        out.push_str(&function(&format!("test{}", test.name), &test_lines(test)));
    }

    out.push_str("setup\n");
    for test in &tests {
        out.push_str(&format!("test{}\n", test.name));
    }
    out.push_str("cleanup\n");

    squeeze_blank_lines(&out)
}

/// Fixture inits, a directory change and the run commands of every suite, root first
fn setup_lines(chain: &[&Suite]) -> Vec<String> {
    let mut lines = Vec::new();
    for suite in chain {
        for dep in suite.deps_to_setup.iter() {
            lines.extend(dep.script.iter().cloned());
        }
        lines.push(cd(suite));
        lines.extend(suite.run.iter().map(str::to_string));
    }
    lines
}

/// Cleanup commands and fixture teardowns of every suite, this suite first
fn cleanup_lines(chain: &[&Suite]) -> Vec<String> {
    let mut lines = Vec::new();
    for suite in chain.iter().rev() {
        lines.extend(suite.cleanup.iter().map(str::to_string));
        for dep in suite.deps_to_setup.iter().rev() {
            lines.extend(dep.teardown.iter().cloned());
        }
    }
    lines
}

fn test_lines(test: &Test) -> Vec<String> {
    let mut lines = vec![format!("cd {}", shell_word(&test.abs_dir.to_string_lossy()))];
    lines.extend(test.run.iter().map(str::to_string));
    lines.extend(test.cleanup.iter().map(str::to_string));
    lines
}

fn cd(suite: &Suite) -> String {
    format!("cd {}", shell_word(&suite.abs_dir.to_string_lossy()))
}

/// A bash function; empty bodies get `:` since bash rejects `{ }`
fn function(name: &str, lines: &[String]) -> String {
    let mut out = format!("function {name}() {{\n");
    if lines.is_empty() {
        out.push_str(":\n");
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("}\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssembleOptions, Assembler, Block, Example, Linker, Scenario};
    use std::path::Path;

    fn build(examples: Vec<Example>) -> Suites {
        let linked = Linker::new("docs").link(examples).unwrap();
        let options =
            AssembleOptions::new("docs", "out", "example.com/tests").with_absolute_dir("/work/docs");
        Assembler::new(options).assemble(&linked).unwrap()
    }

    fn render_all(suites: &Suites, dir: &str) -> String {
        let id = suites.find(Path::new(dir)).unwrap();
        let suite = suites.get(id).unwrap();
        let tests: Vec<&Test> = suite.tests.iter().collect();
        render(suites, id, &tests)
    }

    #[test]
    fn single_suite_script() {
        let mut ping = Scenario::new("Ping");
        ping.run.push("ping -c 1 nse".into());
        ping.cleanup.push("rm -f ping.log".into());

        let suites = build(vec![Example::new("docs")
            .with_block(Block::Run("kubectl apply -k .".into()))
            .with_block(Block::Cleanup("kubectl delete ns a".into()))
            .with_scenario(ping)]);

        assert_eq!(
            render_all(&suites, "docs"),
            "#!/usr/bin/env bash\n\
             # Code generated by mdsuite DO NOT EDIT.\n\
             function setup() {\n\
             cd /work/docs\n\
             kubectl apply -k .\n\
             }\n\
             function cleanup() {\n\
             kubectl delete ns a\n\
             }\n\
             function testPing() {\n\
             cd /work/docs\n\
             ping -c 1 nse\n\
             rm -f ping.log\n\
             }\n\
             setup\n\
             testPing\n\
             cleanup\n"
        );
    }

    #[test]
    fn cleanup_unwinds_from_leaf_to_root() {
        let suites = build(vec![
            Example::new("docs/fixture")
                .with_block(Block::Run("start fixture".into()))
                .with_block(Block::Cleanup("stop fixture".into())),
            Example::new("docs/root")
                .with_block(Block::Dependency("docs/fixture".into()))
                .with_block(Block::Cleanup("root cleanup".into())),
            Example::new("docs/root/leaf").with_block(Block::Cleanup("leaf cleanup".into())),
        ]);
        let text = render_all(&suites, "docs/root/leaf");

        assert!(text.contains(
            "function cleanup() {\n\
             leaf cleanup\n\
             root cleanup\n\
             stop fixture\n\
             }\n"
        ), "{text}");
    }

    #[test]
    fn empty_procedures_use_noop() {
        let suites = build(vec![Example::new("docs")]);
        let text = render_all(&suites, "docs");

        assert!(text.contains("function cleanup() {\n:\n}\n"));
        assert!(!text.contains("function test"));
        assert!(text.ends_with("setup\ncleanup\n"));
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        let linked = Linker::new("docs").link([Example::new("docs/my dir")]).unwrap();
        let options = AssembleOptions::new("docs", "out", "m").with_absolute_dir("/work/docs");
        let suites = Assembler::new(options).assemble(&linked).unwrap();

        assert!(render_all(&suites, "docs/my dir").contains("cd '/work/docs/my dir'\n"));
    }

    #[test]
    fn only_given_tests_are_rendered() {
        let suites = build(vec![Example::new("docs")
            .with_scenario(Scenario::new("T1"))
            .with_scenario(Scenario::new("T2"))]);
        let id = suites.find(Path::new("docs")).unwrap();
        let suite = suites.get(id).unwrap();

        let text = render(&suites, id, &[&suite.tests[1]]);
        assert!(text.contains("function testT2()"));
        assert!(!text.contains("testT1"));
    }
}
