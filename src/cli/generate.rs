//! The generate pipeline
//!
//! walk → parse → link → assemble → select → render → write

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::domain::{AssembleOptions, Assembler, Linker};
use crate::render::{self, Format, Selection};
use crate::storage::{document_dirs, write_artifact, Config, DocumentParser, Overrides, WriteOutcome};

/// Inputs of one generation run, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub module: Option<String>,
    pub runtime_import: Option<String>,
    pub document: Option<String>,
    pub script: bool,
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
struct Artifact {
    suite: String,
    path: String,
    tests: usize,
    status: WriteOutcome,
}

/// Generates artifacts for every example under `args.input`
pub fn run(args: GenerateArgs, output: &Output) -> Result<()> {
    let format = if args.script {
        Format::Script
    } else {
        Format::CompiledSuite
    };

    // A bad pattern should fail before anything is read
    let selection = match args.pattern.as_deref() {
        Some(pattern) => Selection::new(pattern)?,
        None => Selection::all(),
    };

    let config = Config::load(&args.input)?;
    let settings = config.settings(Overrides {
        output_dir: args.output,
        module: args.module,
        runtime_import: args.runtime_import,
        document: args.document,
    })?;
    if format == Format::CompiledSuite {
        settings.require_module()?;
    }
    output.verbose_ctx(
        "config",
        &format!(
            "input={} output={} module={:?} document={}",
            settings.input_dir.display(),
            settings.output_dir.display(),
            settings.module,
            settings.document
        ),
    );

    let dirs = document_dirs(&settings.input_dir, &settings.document, &settings.ignore)?;
    output.verbose_ctx("walk", &format!("Found {} document(s)", dirs.len()));

    let parser = DocumentParser::new(settings.document.clone());
    let mut examples = Vec::with_capacity(dirs.len());
    for dir in &dirs {
        if let Some(example) = parser.parse_dir(dir)? {
            output.verbose_ctx(
                "parse",
                &format!(
                    "{}: {} block(s), {} scenario(s)",
                    dir.display(),
                    example.blocks.len(),
                    example.scenarios.len()
                ),
            );
            examples.push(example);
        }
    }

    let linked = Linker::new(&settings.input_dir)
        .link(examples)
        .context("Cannot build examples")?;
    output.verbose_ctx(
        "link",
        &format!("{} example(s), {} root(s)", linked.len(), linked.roots().len()),
    );

    let absolute_dir = fs::canonicalize(&settings.input_dir).with_context(|| {
        format!("Failed to resolve input directory: {}", settings.input_dir.display())
    })?;

    let mut options = AssembleOptions::new(
        settings.input_dir.clone(),
        settings.output_dir.clone(),
        settings.module.clone(),
    )
    .with_absolute_dir(absolute_dir);
    if let Some(runtime_import) = &settings.runtime_import {
        options = options.with_runtime_import(runtime_import.clone());
    }

    let suites = Assembler::new(options)
        .assemble(&linked)
        .context("Cannot build suites")?;
    render::check(&suites, format).context("Cannot build suites")?;
    output.verbose_ctx("assemble", &format!("{} suite(s)", suites.len()));

    let selected = selection.select(&suites)?;

    let mut artifacts = Vec::with_capacity(selected.len());
    for pick in &selected {
        let Some(suite) = suites.get(pick.suite) else {
            continue;
        };

        let path = render::artifact_path(suite, format);
        let content = render::render_selected(&suites, pick, format);
        let status = write_artifact(&suite.name, &path, &content, format == Format::Script)?;
        output.verbose_ctx("write", &format!("{:?} {}", status, path.display()));

        artifacts.push(Artifact {
            suite: suite.name.clone(),
            path: path.display().to_string(),
            tests: pick
                .tests
                .iter()
                .filter_map(|i| suite.tests.get(*i))
                .filter(|t| !t.is_placeholder())
                .count(),
            status,
        });
    }

    report(output, format, &artifacts);
    Ok(())
}

fn report(output: &Output, format: Format, artifacts: &[Artifact]) {
    if output.is_json() {
        let kind = match format {
            Format::CompiledSuite => "compiled",
            Format::Script => "script",
        };
        output.data(&serde_json::json!({
            "format": kind,
            "artifacts": artifacts,
        }));
        return;
    }

    if artifacts.is_empty() {
        output.success("No examples found.");
        return;
    }

    for artifact in artifacts {
        let status = match artifact.status {
            WriteOutcome::Written => "written",
            WriteOutcome::Unchanged => "unchanged",
        };
        println!("{:<10} {}", status, artifact.path);
    }

    let unchanged = artifacts
        .iter()
        .filter(|a| a.status == WriteOutcome::Unchanged)
        .count();
    output.success(&format!(
        "Generated {} suite(s), {} unchanged",
        artifacts.len(),
        unchanged
    ));
}
