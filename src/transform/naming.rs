use crate::models::{Action, OutputFormat};

/// Build the output name: original stem, action suffix, target extension.
///
/// Only the final extension is stripped, and only when it is non-empty and
/// does not cross a `/`.
pub fn generate_name(original_name: &str, format: OutputFormat, action: Action) -> String {
    format!(
        "{}{}.{}",
        strip_extension(original_name),
        action.suffix(),
        format.extension()
    )
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => {
            let ext = &name[idx + 1..];
            if ext.is_empty() || ext.contains('/') {
                name
            } else {
                &name[..idx]
            }
        }
        None => name,
    }
}
