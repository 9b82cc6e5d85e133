//! Pull request comment report.

use std::fmt;

/// Line separating two transcripts in a comment.
const RULE: &str = "----------------------------------------";

/// Transcripts gathered during one run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    sections: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: impl fmt::Display) {
        self.sections.push(section.to_string());
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Comment body: all sections inside one code fence, separated by three
    /// dashed lines.
    pub fn render(&self) -> String {
        let delimiter = format!("\n{RULE}\n{RULE}\n{RULE}\n");
        format!("```\n{}```\n", self.sections.join(&delimiter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_sections() {
        let mut report = Report::new();
        report.push("out:\nA\nerr:\n");
        report.push("out:\nB\nerr:\n");

        let dashes = "-".repeat(40);
        assert_eq!(
            report.render(),
            format!("```\nout:\nA\nerr:\n\n{dashes}\n{dashes}\n{dashes}\nout:\nB\nerr:\n```\n")
        );
    }

    #[test]
    fn test_render_single_section() {
        let mut report = Report::new();
        report.push("out:\nonly\nerr:\n");
        assert_eq!(report.render(), "```\nout:\nonly\nerr:\n```\n");
    }

    #[test]
    fn test_render_empty() {
        assert!(Report::new().is_empty());
        assert_eq!(Report::new().render(), "```\n```\n");
    }
}
