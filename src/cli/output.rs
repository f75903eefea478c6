//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::AuditEntry;
use crate::vault::FieldMap;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of services with their field counts.
pub fn print_services_table(services: &[(String, usize)]) {
    if services.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `secvault set <SERVICE> <FIELD>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Service", "Fields"]);

    for (name, count) in services {
        table.add_row(vec![name.clone(), count.to_string()]);
    }

    println!("{table}");
}

/// Print the fields of one service; values are masked unless `reveal`.
pub fn print_fields_table(fields: &FieldMap, reveal: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    for (name, value) in fields {
        let shown = match value.as_str() {
            None => style("null").dim().to_string(),
            Some(v) if reveal => v.to_string(),
            Some(_) => "********".to_string(),
        };
        table.add_row(vec![name.clone(), shown]);
    }

    println!("{table}");
}

/// Print operation-log entries, newest first.
pub fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Service", "Field", "Details"]);

    for entry in entries {
        let op = match entry.operation.as_str() {
            "set" => style(&entry.operation).blue(),
            "delete" => style(&entry.operation).red(),
            "backup" => style(&entry.operation).green(),
            "import" | "export" => style(&entry.operation).cyan(),
            _ => style(&entry.operation),
        };
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            op.to_string(),
            or_dash(&entry.service),
            or_dash(&entry.field),
            or_dash(&entry.details),
        ]);
    }

    println!("{}", style(format!("{} operation(s):", entries.len())).bold());
    println!("{table}");
}
