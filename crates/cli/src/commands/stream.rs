//! `rustedrag stream`: single answer, printed as it streams in.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use rustedrag_agent::RagSolver;
use rustedrag_providers::sse;

pub async fn run(config_path: Option<&Path>, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let mut solver = RagSolver::new(&config)?;

    let failed = print_stream(&mut solver, message, "").await?;
    if let Some(e) = failed {
        return Err(e.into());
    }
    Ok(())
}

/// Stream one answer to stdout, prefixing each printed line with `prefix`.
///
/// Returns the in-band error message if the stream ended with one.
pub async fn print_stream(
    solver: &mut RagSolver,
    message: &str,
    prefix: &str,
) -> std::io::Result<Option<String>> {
    let mut stdout = std::io::stdout();
    let mut stream = solver.stream_answer(message).await;
    let mut failed = None;

    print!("{prefix}");
    while let Some(line) = stream.next().await {
        if let Some(delta) = sse::content_delta(&line) {
            print!("{}", delta.replace('\n', &format!("\n{prefix}")));
            stdout.flush()?;
        } else if let Some(e) = sse::error_message(&line) {
            failed = Some(e);
        }
    }
    println!();

    Ok(failed)
}
