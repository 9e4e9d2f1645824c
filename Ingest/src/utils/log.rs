// src/utils/log.rs

//! Run-structure log helpers.
//!
//! Thin formatting layer over the `log` facade so pipeline runs print a
//! consistent header, numbered steps and a closing summary block.

/// Width of header rules.
const RULE_WIDTH: usize = 60;

/// Format a numbered step line.
pub fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}

/// Format the lines of a summary block.
pub fn format_summary(title: &str, items: &[(&str, String)]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(format!("[SUMMARY] {}", title));
    lines.extend(items.iter().map(|(key, value)| format!("    {}: {}", key, value)));
    lines
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    for line in format_summary(title, items) {
        log::info!("{}", line);
    }
}
