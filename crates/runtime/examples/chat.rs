//! Chat example — interactive REPL against a local Ollama server.
//!
//! Streams coalesced commits to the terminal, annotates the finished
//! answer with throughput, and keeps history so follow-up questions
//! carry context.
//!
//! Requires Ollama on localhost:11434. Run with:
//! ```sh
//! cargo run -p narwhal-runtime --example chat -- [model]
//! ```

use futures_util::StreamExt;
use narwhal_runtime::{ChatClient, EngineConfig, InMemoryStore, Outcome};
use provider::ProviderConfig;
use std::io::{BufRead, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let model = std::env::args().nth(1).unwrap_or_else(|| "llama3".into());
    let client = ChatClient::new(
        ProviderConfig::ollama(),
        EngineConfig::default(),
        InMemoryStore::new(),
    )?;

    let models = client.models().await?;
    println!("Models on {}: {models:?}", client.provider_config().kind());
    println!("Chatting with {model} (type 'exit' to quit)");
    println!("---");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "exit" {
            break;
        }

        let mut generation = client.generate("repl", prompt, None, &model).await?;
        let mut commits = generation.commits().expect("commits not yet taken");
        let mut shown = 0;
        while let Some(commit) = commits.next().await {
            print!("{}", &commit.text[shown..]);
            std::io::stdout().flush()?;
            shown = commit.text.len();
        }
        println!();

        match generation.finish().await? {
            Outcome::Completed(done) => {
                println!("[{:.1} fragments/sec, {} fragments]", done.throughput, done.fragments);
                client
                    .save_turn("repl", prompt, &done.answer, None, &model)
                    .await?;
            }
            Outcome::Cancelled => println!("[cancelled]"),
        }
    }

    Ok(())
}
