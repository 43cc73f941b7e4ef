//! Interactive REPL for tableqa
//!
//! Reads questions from stdin in a loop; a literal `exit` terminates.
//! The user only ever sees a final answer or the explicit
//! failure-to-answer message.

use std::io::{self, BufRead, Write};

use crate::agent::Agent;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Result, RunOutcome};

/// Printed when a run exhausts its attempt budget
const NO_ANSWER_MESSAGE: &str =
    "I could not produce an answer for that question. Try rephrasing it.";

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
}

impl Repl {
    /// Create a REPL around a prepared agent
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("Question: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            match handle_command(input.trim(), &self.agent)? {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::None => {}
                CommandResult::Continue(question) => {
                    let report = self.agent.execute(&question).await;
                    match report.outcome {
                        RunOutcome::Answer(answer) => {
                            println!("\nAnswer:\n{}\n", answer);
                        }
                        RunOutcome::Exhausted => {
                            println!("\n{}\n", NO_ANSWER_MESSAGE);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();
        println!("tableqa - ask questions about your tables");
        println!("Model:    {}", config.model.chat_model);
        println!("Endpoint: {}", config.model.endpoint);
        println!();
        println!("Commands: help, status, tools, tables, exit");
        println!("─────────────────────────────────────────────────");
    }
}
