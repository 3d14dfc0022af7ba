//! Display formatting for CLI output

use console::style;

use crate::error::Result;
use crdform_core::{ResourceDescriptor, SchemaProjector, TypedConfig};

/// Print a state, keyed by configuration-facing names, as YAML or JSON
pub fn print_state(descriptor: &ResourceDescriptor, state: &TypedConfig, json: bool) -> Result<()> {
    let value = SchemaProjector::new(descriptor).config_to_value(state)?;
    if json {
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| crate::error::CliError::internal(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", serde_yaml::to_string(&value)?);
    }
    Ok(())
}

/// Status line on stderr, so stdout stays machine-readable
pub fn success(action: &str, subject: &str) {
    eprintln!(
        "{} {} {}",
        style("✓").green().bold(),
        action,
        style(subject).cyan()
    );
}

pub fn progress(action: &str, subject: &str) {
    eprintln!(
        "{} {} {}",
        style("→").blue().bold(),
        action,
        style(subject).cyan()
    );
}
