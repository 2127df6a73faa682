//! Link command handlers
//!
//! One-shot commands run against a freshly loaded controller. The deleted
//! slot lives only as long as the process, so undo is offered by the TUI only.

use anyhow::{bail, Result};
use uuid::Uuid;

use linkbook_core::{KeyValueSlot, LinkListController, StorageError};

use crate::output::Output;
use crate::prompt::confirm;

/// Add a new link
pub fn add<S: KeyValueSlot>(
    links: &mut LinkListController<S>,
    name: String,
    url: String,
    output: &Output,
) -> Result<()> {
    links.try_add(name, url).map_err(save_failed)?;

    if let Some(link) = links.links().last() {
        output.success(&format!("Added link: {}", link.id));
        output.print_link(link);
    }
    Ok(())
}

/// List all links, sorted by name
pub fn list<S: KeyValueSlot>(links: &LinkListController<S>, output: &Output) -> Result<()> {
    output.print_links(&links.sorted_view());
    Ok(())
}

/// Delete a link
pub fn delete<S: KeyValueSlot>(
    links: &mut LinkListController<S>,
    id: String,
    skip_confirm: bool,
    output: &Output,
) -> Result<()> {
    let uuid = parse_link_id(&id, links)?;

    if output.should_prompt() && !skip_confirm {
        if let Some(link) = links.get(uuid) {
            println!("Delete link: {} - {}", link.short_id(), link.name);
        }
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    links.try_delete(uuid).map_err(save_failed)?;

    output.success(&format!("Deleted link: {}", uuid));
    Ok(())
}

/// Attach the recovery hint, if any, to a failed write
fn save_failed(e: StorageError) -> anyhow::Error {
    let context = match e.recovery_suggestion() {
        Some(hint) => format!("Failed to save links. {}", hint),
        None => "Failed to save links".to_string(),
    };
    anyhow::Error::new(e).context(context)
}

/// Parse a link ID (supports full UUID or unique prefix)
fn parse_link_id<S: KeyValueSlot>(id: &str, links: &LinkListController<S>) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        if links.get(uuid).is_some() {
            return Ok(uuid);
        }
        bail!("No link found matching: {}", id);
    }

    let matches: Vec<_> = links
        .links()
        .iter()
        .filter(|l| l.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No link found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple links match '{}':", id);
            for link in &matches {
                eprintln!("  {} - {}", link.id, link.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
