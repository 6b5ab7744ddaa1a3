//! The `wordbank delete` command.

use anyhow::Result;

use super::Globals;

pub async fn execute(globals: &Globals, id: String) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;
    repository.delete(&id).await?;
    println!("Deleted {id}");
    Ok(())
}
