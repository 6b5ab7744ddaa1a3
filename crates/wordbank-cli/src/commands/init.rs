//! The `wordbank init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("wordbank.toml").exists() {
        println!("wordbank.toml already exists, skipping.");
    } else {
        std::fs::write("wordbank.toml", SAMPLE_CONFIG)?;
        println!("Created wordbank.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set ANTHROPIC_API_KEY and/or OPENROUTER_API_KEY, or edit wordbank.toml");
    println!("  2. Run: wordbank add implement --pos verb --zh 實施 --lookup");
    println!("  3. Run: wordbank practice <id> --sentence \"...\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordbank configuration

default_model = "haiku"
assistant_model = "qwen"
# data_dir = "~/.local/share/wordbank"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openrouter]
type = "openai"
api_key = "${OPENROUTER_API_KEY}"
base_url = "https://openrouter.ai/api"
referer = "http://localhost:5173"
title = "Vocab Manager"

[models.haiku]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"

[models.sonnet]
provider = "anthropic"
model = "claude-sonnet-4-20250514"

[models.qwen]
provider = "openrouter"
model = "qwen/qwen-2.5-72b-instruct:free"

[practice]
score_window = 3
max_error_patterns = 5
add_example_threshold = 70
"#;
