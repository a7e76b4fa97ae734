use anyhow::Result;
use pdf_rag_client::{
    render_answer, render_context, render_error, AskClient, AskResponse, DEFAULT_BASE_URL, SHOW_CONTEXT_COMMAND,
};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let base_url = std::env::var("RAG_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = AskClient::new(&base_url, Duration::from_secs(120))?;
    log::info!("Using service at {}", client.base_url());

    println!("PDF Question Answering Client");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_response: Option<AskResponse> = None;

    loop {
        print!("\nEnter your question: ");
        std::io::stdout().flush()?;

        let Some(question) = lines.next_line().await? else {
            break;
        };

        if question.trim() == SHOW_CONTEXT_COMMAND {
            match &last_response {
                Some(response) => println!("\n{}", render_context(response)),
                None => println!("\nAsk a question first."),
            }
            continue;
        }

        match client.ask(&question).await {
            Ok(response) => {
                println!("\n{}", render_answer(&response));
                last_response = Some(response);
            }
            Err(e) => {
                log::debug!("Ask failed: {:?}", e);
                println!("\n{}", render_error(&e));
            }
        }
    }

    Ok(())
}
