use console::style;

/// Styled terminal output; stdout for results, stderr for failures
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// `  Label: value` with a dimmed label
    pub fn field(&self, label: &str, value: &str) {
        println!("  {} {}", style(format!("{}:", label)).dim(), value);
    }

    /// Function name followed by its summary
    pub fn function(&self, name: &str, lines: (usize, usize), summary: &str) {
        println!(
            "  {} {} {}",
            style(name).cyan().bold(),
            style(format!("(lines {}-{})", lines.0, lines.1)).dim(),
            summary
        );
    }

    /// Pre-formatted source block, dimmed
    pub fn code(&self, block: &str) {
        for line in block.lines() {
            println!("    {}", style(line).dim());
        }
    }

    /// Tagged assistant failure, e.g. `HTTP_ERROR: ...`
    pub fn failure(&self, subject: &str, tagged: &str) {
        eprintln!("  {} {}: {}", style("✗").red(), subject, style(tagged).red());
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
