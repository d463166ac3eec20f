//! Output formatting for human-readable and JSON modes.
//!
//! Human mode uses colored terminal output.
//! JSON mode outputs pure JSON with no ANSI escapes.

use colored::Colorize;

/// Prints a success message.
pub fn print_success(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "status": "ok", "message": msg });
        println!("{obj}");
    } else {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

/// Prints key-value pairs, as one JSON object in JSON mode.
pub fn print_fields(fields: &[(&str, String)], json_mode: bool) {
    if json_mode {
        let obj: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::String(v.clone())))
            .collect();
        println!("{}", serde_json::Value::Object(obj));
    } else {
        for (key, value) in fields {
            println!("{}: {}", key.bold(), value);
        }
    }
}

/// Prints a warning to stderr. Suppressed in JSON mode.
pub fn print_warning(msg: &str, json_mode: bool) {
    if !json_mode {
        eprintln!("{} {}", "warning:".yellow().bold(), msg);
    }
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{obj}");
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}
