// file: src/utils/logging.rs
// description: Tracing subscriber initialization and console formatting helpers

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const BANNER_WIDTH: usize = 60;
const SECTION_WIDTH: usize = 50;

pub fn init_logger(colored_output: bool, verbose: bool) {
    colored::control::set_override(colored_output);

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_step(step: usize, total: usize, msg: &str) -> String {
    format!("{} {}", format!("[{}/{}]", step, total).cyan().bold(), msg)
}

pub fn format_banner(lines: &[&str]) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let mut output = format!("\n{}\n", rule);
    for line in lines {
        output.push_str(&format!("{}\n", line.bold()));
    }
    output.push_str(&rule);
    output
}

pub fn format_section(title: &str) -> String {
    let rule = "=".repeat(SECTION_WIDTH);
    format!("\n{}\n{}\n{}", rule, title.cyan().bold(), rule)
}

pub fn divider() -> String {
    "-".repeat(SECTION_WIDTH)
}
