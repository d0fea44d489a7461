use std::io::{self, BufRead, Write};
use std::sync::Arc;
use trading_pal::{
    Dispatcher, DispatcherConfig, GeminiGenerator, MessageRole, Outcome, SessionState,
    TextGenerator,
};
use tracing::info;

fn prompt_line(prompt: &str) -> Result<String, io::Error> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("TradingPal dispatcher starting");

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiGenerator::new(api_key));
    let dispatcher = Dispatcher::new(DispatcherConfig::shared(generator));

    let user_input = prompt_line("What can TradingPal help you with today? ")?;
    let thread_id = "paldemo";

    let mut outcome = dispatcher
        .start(SessionState::new(user_input), thread_id)
        .await?;

    let final_state = loop {
        match outcome {
            Outcome::Completed(state) => break state,
            Outcome::Suspended { question, .. } => {
                println!("\n{}", question);
                let clarification = prompt_line("> ")?;
                outcome = dispatcher.resume(thread_id, &clarification).await?;
            }
        }
    };

    println!("\n=== TRADINGPAL RESPONSE ===");
    for message in final_state.messages() {
        let role = match message.role {
            MessageRole::User => "You",
            MessageRole::Assistant => "TradingPal",
            MessageRole::System => "System",
        };
        println!("\n[{}]\n{}", role, message.content);
    }

    Ok(())
}
