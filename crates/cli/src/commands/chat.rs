//! `rustedrag chat`: interactive multi-turn chat.
//!
//! Each answer is streamed; the solver's memory carries the last few turns
//! into the next prompt.

use std::io::Write;
use std::path::Path;

use rustedrag_agent::RagSolver;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::stream::print_stream;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let mut solver = RagSolver::new(&config)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        RustedRAG Chat — Interactive Mode      ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Endpoint:  {}", config.base_url());
    println!("  Store:     {}", config.vector_store_id);
    println!(
        "  Model:     {}",
        config.llm_model.as_deref().unwrap_or("(server default)")
    );
    if config.enable_memory {
        println!("  Memory:    last {} turns", config.memory_size);
    } else {
        println!("  Memory:    off");
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/clear' to forget the conversation, 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(input) = lines.next_line().await? else {
            break;
        };
        let input = input.trim();

        match input {
            "" => continue,
            "exit" | "quit" => break,
            "/clear" => {
                solver.memory_mut().clear();
                println!("  (memory cleared)");
                println!();
                continue;
            }
            _ => {}
        }

        println!();
        if let Some(e) = print_stream(&mut solver, input, "  Assistant > ").await? {
            eprintln!("  [Error] {e}");
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
