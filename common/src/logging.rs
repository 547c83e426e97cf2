use tracing_subscriber::EnvFilter;

/// Crates whose events are let through by [`filter_directive`]
pub const WORKSPACE_CRATES: &[&str] = &[
    "vmeet_common",
    "vmeet_configuration",
    "vmeet_cryptography",
    "vmeet_directory",
    "vmeet_id",
    "vmeet_cli",
];

pub fn filter_directive(level: &str) -> EnvFilter {
    let filter = WORKSPACE_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::builder().parse_lossy(filter)
}
