//! Chat command implementation
//!
//! Resolves the selected site, loads its index into the retrieval adapter,
//! and runs a line-oriented REPL where every input line is one chat turn.

use crate::auth::require_signed_in;
use crate::chat::{ChatSession, OpenAiChatClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::SiteRegistry;
use crate::retrieval::RetrievalAdapter;
use crate::storage::FileStore;
use std::io::{self, BufRead, Write};

/// Start an interactive chat about a registered site.
pub async fn cmd_chat(
    config: &Config,
    files: &FileStore,
    registry: &SiteRegistry,
    site_reference: &str,
) -> Result<()> {
    let site = registry
        .find(site_reference)
        .ok_or_else(|| Error::SiteNotFound(site_reference.to_string()))?
        .clone();

    let credentials = require_signed_in(config)?;
    let client = OpenAiChatClient::new(&config.chat, credentials.api_key)?;
    let retrieval = RetrievalAdapter::new(files.clone(), config.search.top_k);
    let mut session = ChatSession::new(client, retrieval);

    if !session.select_site(&site) {
        eprintln!(
            "Warning: could not load the search index for {}; answers will not be grounded.",
            site.hostname
        );
    }

    println!("Chatting about {} ({}). Type 'exit' to quit.", site.name, site.hostname);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nyou> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        print!("assistant> ");
        stdout.flush()?;

        let mut streamed = false;
        session
            .send(line, &mut |chunk| {
                streamed = true;
                print!("{}", chunk);
                let _ = io::stdout().flush();
            })
            .await;

        if streamed {
            println!();
        } else if let Some(last) = session.messages().last() {
            println!("{}", last.content);
        }
    }

    Ok(())
}
