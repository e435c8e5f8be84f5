//! `rustedrag ask`: single blocking answer.

use std::path::Path;

use rustedrag_agent::RagSolver;

pub async fn run(config_path: Option<&Path>, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let mut solver = RagSolver::new(&config)?;

    eprint!("  Thinking...");
    let answer = solver.answer(message).await;
    eprint!("\r              \r");

    println!("{}", answer?);
    Ok(())
}
