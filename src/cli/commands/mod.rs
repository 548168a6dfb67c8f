//! CLI command implementations

pub mod init;
pub mod process;
pub mod resolve;
pub mod validate;

use crate::domain::DeidError;
use std::path::Path;

/// Exit code for a failed request: 2 for bad input or configuration,
/// 5 for everything else
pub fn exit_code(error: &DeidError) -> i32 {
    match error {
        DeidError::InvalidInput(_)
        | DeidError::Configuration(_)
        | DeidError::Pattern(_)
        | DeidError::Keywords(_) => 2,
        _ => 5,
    }
}

/// Text from `--text`, `--input` or stdin, in that order
pub(crate) async fn read_text(text: Option<&str>, input: Option<&Path>) -> anyhow::Result<String> {
    use anyhow::Context;
    use tokio::io::AsyncReadExt;

    if let Some(text) = text {
        return Ok(text.to_string());
    }

    if let Some(path) = input {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }

    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .context("Failed to read text from stdin")?;
    Ok(buffer)
}
