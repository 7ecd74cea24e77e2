use nim_inventory::nim::CollectionWarning;
use serde::Serialize;

pub fn render<T: Serialize>(data: &T, format: &str) -> anyhow::Result<String> {
    let rendered = match format {
        "yaml" => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    };
    Ok(rendered)
}

pub fn output_data<T: Serialize>(data: &T, format: &str) -> anyhow::Result<()> {
    println!("{}", render(data, format)?);
    Ok(())
}

pub fn print_success(message: &str) {
    eprintln!("✅ {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("\x1b[31m❌ Error: {}\x1b[0m", message);
}

pub fn print_warning(message: &str) {
    eprintln!("\x1b[33m⚠️  Warning: {}\x1b[0m", message);
}

/// Summarize degraded hosts and resources after the document was written.
pub fn print_warnings(warnings: &[CollectionWarning]) {
    for warning in warnings {
        print_warning(&warning.to_string());
    }
}
