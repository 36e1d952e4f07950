use anyhow::{Context, Result};
use async_trait::async_trait;

/// How the interactive authorization step reaches the user
///
/// The client never decides how to present the authorization URL or collect
/// the redirected code; the embedder supplies that through this trait. A GUI
/// can render a webview, a CLI can open the browser, a test can answer
/// immediately.
#[async_trait]
pub trait AuthPrompt: Send + Sync {
    /// Presents the authorization URL and waits for the redirected code
    ///
    /// The future stays pending for as long as the user takes; the caller
    /// applies its own timeout or cancellation if it wants one.
    async fn display_url_and_await_code(&self, url: &str) -> Result<String>;
}

/// Prompt that opens the system browser and reads the code from stdin
///
/// Suitable for command-line embedders. The user completes the consent page,
/// then pastes the `code` query parameter from the redirect URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserPrompt;

impl BrowserPrompt {
    /// Creates a new browser prompt
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthPrompt for BrowserPrompt {
    async fn display_url_and_await_code(&self, url: &str) -> Result<String> {
        if let Err(e) = open::that(url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
        println!("Authorize this application in your browser:");
        println!("  {}", url);
        println!("Then paste the \"code\" parameter from the redirect URL here:");

        // Blocking stdin read, kept off the async runtime
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read authorization code")?;
            Ok::<_, anyhow::Error>(line)
        })
        .await
        .context("Stdin reader task failed")??;

        let code = line.trim().to_string();
        if code.is_empty() {
            anyhow::bail!("No authorization code entered");
        }
        Ok(code)
    }
}
