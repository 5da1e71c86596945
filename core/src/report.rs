use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_REPORT_TEMPLATE: &str = r"# Experiment Notebook

<!-- SECTION:overview start -->
<!-- Summarize which propagation question this experiment probes. -->
<!-- SECTION:overview end -->

## Hypotheses

<!-- SECTION:hypotheses start -->
<!-- Capture what each scenario's printed trace is expected to show. -->
<!-- SECTION:hypotheses end -->

## Configuration

<!-- SECTION:configuration start -->
<!-- Populated automatically with the settings of the latest run. -->
<!-- SECTION:configuration end -->

## Metrics

<!-- SECTION:metrics start -->
<!-- Populated automatically with per-scenario trace shapes. -->
<!-- SECTION:metrics end -->

## Traces

<!-- SECTION:traces start -->
<!-- Populated automatically with the printed block of every scenario. -->
<!-- SECTION:traces end -->

> Add or rename sections as needed. Keep the `<!-- SECTION:name start/end -->` markers around any region that should be
> programmatically updated.
";

#[derive(Clone, Debug)]
pub struct ReportSection {
    id: String,
    content: String,
}

impl ReportSection {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    fn start_marker(&self) -> String {
        format!("<!-- SECTION:{} start -->", self.id)
    }

    fn end_marker(&self) -> String {
        format!("<!-- SECTION:{} end -->", self.id)
    }
}

pub fn ensure_report_file(path: &Path, template: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    if !path.exists() {
        fs::write(path, template)
            .with_context(|| format!("failed to write report template to {}", path.display()))?;
    }

    Ok(())
}

pub fn update_sections(path: &Path, sections: &[ReportSection]) -> Result<()> {
    let mut content = fs::read_to_string(path)
        .with_context(|| format!("failed to read report at {}", path.display()))?;

    for section in sections {
        content = replace_section(&content, section)?;
    }

    fs::write(path, content)
        .with_context(|| format!("failed to write updated report to {}", path.display()))?;
    Ok(())
}

fn replace_section(content: &str, section: &ReportSection) -> Result<String> {
    let start_marker = section.start_marker();
    let end_marker = section.end_marker();

    let start_idx = content
        .find(&start_marker)
        .ok_or_else(|| anyhow!("missing start marker: {}", start_marker))?;
    let after_start = start_idx + start_marker.len();
    let end_relative = content[after_start..]
        .find(&end_marker)
        .ok_or_else(|| anyhow!("missing end marker: {}", end_marker))?;
    let end_idx = after_start + end_relative;

    let mut updated = String::with_capacity(content.len() + section.content.len());
    updated.push_str(&content[..start_idx]);
    updated.push_str(&start_marker);

    let trimmed = section.content.trim_matches('\n');
    updated.push('\n');
    if !trimmed.is_empty() {
        updated.push_str(trimmed);
        updated.push('\n');
    }

    updated.push_str(&content[end_idx..]);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.md");

        ensure_report_file(&path, DEFAULT_REPORT_TEMPLATE).unwrap();
        fs::write(&path, "kept").unwrap();
        ensure_report_file(&path, DEFAULT_REPORT_TEMPLATE).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
    }

    #[test]
    fn sections_are_replaced_between_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        ensure_report_file(&path, DEFAULT_REPORT_TEMPLATE).unwrap();

        update_sections(&path, &[ReportSection::new("metrics", "\n| a | b |\n")]).unwrap();
        update_sections(&path, &[ReportSection::new("metrics", "| c | d |")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(
            "<!-- SECTION:metrics start -->\n| c | d |\n<!-- SECTION:metrics end -->"
        ));
        assert!(!content.contains("| a | b |"));
        assert!(content.contains("<!-- SECTION:traces start -->"));
    }

    #[test]
    fn missing_marker_is_an_error() {
        let err = replace_section("no markers here", &ReportSection::new("traces", "x")).unwrap_err();
        assert!(err.to_string().contains("missing start marker"));
    }
}
