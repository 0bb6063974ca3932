//! Formatting reports for different output formats

use crate::report::AnalysisReport;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
    /// Compact single-line-per-finding format
    Compact,
}

/// How a finding is labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Error,
    Warning,
    Pass,
    Fail,
}

impl Label {
    fn as_str(self) -> &'static str {
        match self {
            Label::Error => "error",
            Label::Warning => "warning",
            Label::Pass => "pass",
            Label::Fail => "fail",
        }
    }
}

/// Formatter for analysis reports
pub struct ReportFormatter {
    format: Format,
    show_checks: bool,
    show_symbols: bool,
    pretty: bool,
    #[cfg(feature = "terminal")]
    use_color: bool,
}

impl ReportFormatter {
    /// Create a new formatter
    pub fn new(format: Format) -> Self {
        Self {
            format,
            show_checks: true,
            show_symbols: true,
            pretty: true,
            #[cfg(feature = "terminal")]
            use_color: true,
        }
    }

    /// Set whether to list every check, not only failing ones
    pub fn with_checks(mut self, show: bool) -> Self {
        self.show_checks = show;
        self
    }

    /// Set whether to print the symbol table (text format)
    pub fn with_symbols(mut self, show: bool) -> Self {
        self.show_symbols = show;
        self
    }

    /// Set whether JSON output is indented
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether to use color (terminal feature only)
    #[cfg(feature = "terminal")]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Format a report
    pub fn format(&self, report: &AnalysisReport) -> String {
        match self.format {
            Format::Text => self.format_text(report),
            Format::Json => self.format_json(report),
            Format::Compact => self.format_compact(report),
        }
    }

    fn label(&self, label: Label) -> String {
        #[cfg(feature = "terminal")]
        if self.use_color {
            use colored::Colorize;
            let text = label.as_str();
            return match label {
                Label::Error | Label::Fail => text.red().bold().to_string(),
                Label::Warning => text.yellow().bold().to_string(),
                Label::Pass => text.green().to_string(),
            };
        }

        label.as_str().to_string()
    }

    fn format_text(&self, report: &AnalysisReport) -> String {
        let mut result = String::new();

        let stats = report
            .lexical
            .stats
            .iter()
            .map(|(kind, count)| format!("{kind} {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        result.push_str(&format!(
            "lexical: {} tokens ({stats})\n",
            report.lexical.tokens.len()
        ));

        result.push_str(&format!(
            "syntax: {}\n",
            if report.syntax.valid { "valid" } else { "invalid" }
        ));
        for error in &report.syntax.errors {
            result.push_str(&format!("  {}: {error}\n", self.label(Label::Error)));
        }

        result.push_str(&format!(
            "semantic: {}\n",
            if report.semantic.valid { "valid" } else { "invalid" }
        ));
        for check in &report.semantic.checks {
            if !self.show_checks && check.passed {
                continue;
            }
            let label = if check.passed { Label::Pass } else { Label::Fail };
            result.push_str(&format!("  [{}] {}", self.label(label), check.description));
            if let Some(line) = check.line {
                result.push_str(&format!(" (line {line})"));
            }
            result.push('\n');
        }
        for warning in &report.semantic.warnings {
            result.push_str(&format!("  {}: {warning}\n", self.label(Label::Warning)));
        }
        for error in &report.semantic.errors {
            result.push_str(&format!("  {}: {error}\n", self.label(Label::Error)));
        }

        if self.show_symbols && !report.semantic.symbol_table.is_empty() {
            result.push_str("symbols:\n");
            for symbol in &report.semantic.symbol_table {
                result.push_str(&format!(
                    "  {:<16} {:<10} {:<24} line {}\n",
                    symbol.name, symbol.kind, symbol.scope, symbol.line
                ));
            }
        }

        result.push_str(&report.message);
        result
    }

    fn format_json(&self, report: &AnalysisReport) -> String {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        json.unwrap_or_else(|_| format!("{report:?}"))
    }

    fn format_compact(&self, report: &AnalysisReport) -> String {
        let mut lines = Vec::new();
        for error in &report.syntax.errors {
            lines.push(format!("{}[syntax]: {error}", self.label(Label::Error)));
        }
        for check in report.semantic.checks.iter().filter(|check| !check.passed) {
            lines.push(format!("{}[check]: {}", self.label(Label::Fail), check.description));
        }
        for warning in &report.semantic.warnings {
            lines.push(format!("{}[semantic]: {warning}", self.label(Label::Warning)));
        }
        for error in &report.semantic.errors {
            lines.push(format!("{}[semantic]: {error}", self.label(Label::Error)));
        }
        lines.push(report.message.clone());
        lines.join("\n")
    }
}
