//! The `wordbank list-models` command.

use anyhow::Result;

use super::Globals;

pub fn execute(globals: &Globals) -> Result<()> {
    let config = globals.load_config()?;

    let mut aliases: Vec<_> = config.models.iter().collect();
    aliases.sort_by(|a, b| a.0.cmp(b.0));

    let mut found_any = false;
    for (alias, target) in aliases {
        if !config.providers.contains_key(&target.provider) {
            continue;
        }
        found_any = true;
        let mut roles = Vec::new();
        if *alias == config.default_model {
            roles.push("grading default");
        }
        if *alias == config.assistant_model {
            roles.push("assistant");
        }
        let roles = if roles.is_empty() {
            String::new()
        } else {
            format!(" [{}]", roles.join(", "))
        };
        println!("  {alias} — {}/{}{roles}", target.provider, target.model);
    }

    if !found_any {
        println!("No providers configured. Run `wordbank init` to create a config file.");
    }

    Ok(())
}
