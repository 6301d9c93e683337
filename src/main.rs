mod api;
mod generator;
mod models;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use generator::CaptionGenerator;
use services::{AiBackend, Database, OpenAiClient};

/// Shipping this literal as the key is the documented way to run without AI.
const API_KEY_PLACEHOLDER: &str = "your-openai-api-key-here";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Restaurant Social backend...");

    // Initialize PostgreSQL database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Arc::new(Database::new(&database_url).await?);
    log::info!("✅ PostgreSQL database initialized");

    // AI mode is decided once here and fixed for the process lifetime
    let backend: Option<Arc<dyn AiBackend>> = match env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() && key != API_KEY_PLACEHOLDER => {
            let vision_model = env::var("OPENAI_VISION_MODEL")
                .unwrap_or_else(|_| "gpt-4-vision-preview".to_string());
            let text_model =
                env::var("OPENAI_TEXT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

            log::info!(
                "✅ OpenAI client initialized (vision: {}, text: {})",
                vision_model,
                text_model
            );
            Some(Arc::new(OpenAiClient::new(key, vision_model, text_model)))
        }
        _ => {
            log::warn!("⚠️ OPENAI_API_KEY not provided, using fallback captions");
            None
        }
    };

    let generator = Arc::new(CaptionGenerator::new(backend));

    // Start the mobile API server
    #[cfg(feature = "mobile-api")]
    {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let app = api::server::create_mobile_router(db.clone(), generator.clone());

        log::info!("🌐 Mobile API server starting on {}", bind_addr);

        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .expect("Failed to bind mobile API server");
            axum::serve(listener, app)
                .await
                .expect("Failed to start mobile API server");
        });

        log::info!("✅ Mobile API server started");
    }

    log::info!("🎉 Backend is ready!");

    println!("\n📱 Restaurant Social is running!");
    println!("🌐 Mobile API: http://localhost:8080/api/mobile");
    if generator.ai_enabled() {
        println!("🤖 AI caption generation: enabled");
    } else {
        println!("🤖 AI caption generation: fallback-only (set OPENAI_API_KEY to enable)");
    }
    println!("\n🛑 Press Ctrl+C to stop\n");

    // Keep running
    tokio::signal::ctrl_c().await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}
