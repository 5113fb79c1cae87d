const TEMPLATE: &str = include_str!("../templates/grl.sh");
const PLACEHOLDER: &str = "{{base_url}}";

/// Renders the `grl` client script with `base_url` baked in.
///
/// The script reads stdin (or a file), POSTs it to the service and copies the
/// answer to the clipboard. It refuses empty input before contacting the
/// service. `base_url` ends up inside single quotes, so any single quote it
/// contains is escaped.
pub fn render_install_script(base_url: &str) -> String {
    TEMPLATE.replace(PLACEHOLDER, &escape_single_quoted(base_url))
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('\'', r"'\''")
}
