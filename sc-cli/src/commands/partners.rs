//! Trust partner commands.

use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use console::style;
use uuid::Uuid;

use sc_core::error::{ScError, ScResult};
use sc_models::{Database, TrustPartner};
use sc_services::event_bus::EventBus;
use sc_services::partner::{ContactPicker, PartnerService};
use sc_services::service::Service;

use crate::providers::PromptContactPicker;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum PartnersAction {
    /// List all trust partners.
    List,
    /// Add a trust partner (prompts interactively when arguments are omitted).
    Add {
        /// Partner display name.
        name: Option<String>,
        /// Partner phone number (e.g., 0721234567 or +27721234567).
        phone: Option<String>,
    },
    /// Remove a trust partner.
    Remove {
        /// Partner selector: list position, id prefix, or exact name.
        partner: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Remove all trust partners.
    RemoveAll {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Designate a partner as the primary "Get Help" recipient.
    SetPrimary {
        /// Partner selector: list position, id prefix, or exact name.
        partner: String,
    },
}

pub async fn run(
    database: Database,
    event_bus: EventBus,
    action: PartnersAction,
    format: OutputFormat,
) -> ScResult<()> {
    let mut svc = PartnerService::new(database, event_bus);
    svc.init()?;

    match action {
        PartnersAction::List => {
            list_partners(&svc, format);
        }
        PartnersAction::Add { name, phone } => {
            let (name, phone) = match (name, phone) {
                (Some(n), Some(p)) => (n, p),
                _ => match PromptContactPicker.pick()? {
                    Some(contact) => (contact.name, contact.phone_number),
                    None => {
                        println!("Cancelled.");
                        return Ok(());
                    }
                },
            };

            match svc.add(&name, &phone) {
                Ok(partner) => {
                    let primary_note = if partner.is_primary { " (primary)" } else { "" };
                    println!(
                        "{} Added {} ({}){}",
                        style("OK").green().bold(),
                        partner.name,
                        partner.phone_number,
                        primary_note
                    );
                }
                Err(ScError::AddPartner(e)) => {
                    println!("{} {}", style("ERROR").red().bold(), e);
                }
                Err(e) => return Err(e),
            }
        }
        PartnersAction::Remove { partner, yes } => {
            let Some(id) = resolve_partner(svc.partners(), &partner) else {
                println!("{} No partner matches '{partner}'.", style("ERROR").red().bold());
                return Ok(());
            };
            let name = partner_name(&svc, id);

            if !yes && !confirm(&format!("Are you sure you want to remove {name}?"))? {
                println!("Cancelled.");
                return Ok(());
            }

            svc.remove(id)?;
            println!("{} Removed {name}", style("OK").green().bold());
            if let Some(primary) = svc.primary_partner() {
                println!("  Primary partner is now {}", primary.name);
            }
        }
        PartnersAction::RemoveAll { yes } => {
            if svc.partners().is_empty() {
                println!("No trust partners to remove.");
                return Ok(());
            }
            if !yes && !confirm("Are you sure you want to remove all Trust Partners?")? {
                println!("Cancelled.");
                return Ok(());
            }

            svc.remove_all()?;
            println!("{} Removed all trust partners", style("OK").green().bold());
        }
        PartnersAction::SetPrimary { partner } => {
            let Some(id) = resolve_partner(svc.partners(), &partner) else {
                println!("{} No partner matches '{partner}'.", style("ERROR").red().bold());
                return Ok(());
            };

            svc.set_primary(id)?;
            println!(
                "{} {} is now the primary partner",
                style("OK").green().bold(),
                partner_name(&svc, id)
            );
        }
    }

    Ok(())
}

fn list_partners(svc: &PartnerService, format: OutputFormat) {
    let partners = svc.partners();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(partners).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            if partners.is_empty() {
                println!("No trust partners yet. Add your first with `safecircle partners add`.");
                return;
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["#", "Name", "Phone", "Primary", "Id"]);
            for (index, partner) in partners.iter().enumerate() {
                table.add_row(vec![
                    (index + 1).to_string(),
                    partner.name.clone(),
                    partner.phone_number.clone(),
                    if partner.is_primary { "yes" } else { "" }.to_string(),
                    partner.id.to_string(),
                ]);
            }
            println!("{table}");
        }
    }
}

/// Resolve a partner selector: 1-based list position, id prefix (at least
/// 4 characters), or exact name (case-insensitive).
fn resolve_partner(partners: &[TrustPartner], selector: &str) -> Option<Uuid> {
    if let Ok(position) = selector.parse::<usize>() {
        if (1..=partners.len()).contains(&position) {
            return Some(partners[position - 1].id);
        }
    }

    let lowered = selector.to_lowercase();
    if lowered.len() >= 4 {
        if let Some(partner) = partners
            .iter()
            .find(|p| p.id.to_string().starts_with(&lowered))
        {
            return Some(partner.id);
        }
    }

    partners
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(selector))
        .map(|p| p.id)
}

fn partner_name(svc: &PartnerService, id: Uuid) -> String {
    svc.partners()
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn confirm(prompt: &str) -> ScResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ScError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TrustPartner> {
        vec![
            TrustPartner::new("Jane", "0721234567"),
            TrustPartner::new("John", "0831234567"),
        ]
    }

    #[test]
    fn test_resolve_by_position() {
        let partners = sample();
        assert_eq!(resolve_partner(&partners, "1"), Some(partners[0].id));
        assert_eq!(resolve_partner(&partners, "2"), Some(partners[1].id));
        assert_eq!(resolve_partner(&partners, "3"), None);
        assert_eq!(resolve_partner(&partners, "0"), None);
    }

    #[test]
    fn test_resolve_by_name() {
        let partners = sample();
        assert_eq!(resolve_partner(&partners, "jane"), Some(partners[0].id));
        assert_eq!(resolve_partner(&partners, "JOHN"), Some(partners[1].id));
        assert_eq!(resolve_partner(&partners, "nobody"), None);
    }

    #[test]
    fn test_resolve_by_id_prefix() {
        let partners = sample();
        let prefix = partners[1].id.to_string()[..8].to_string();
        assert_eq!(resolve_partner(&partners, &prefix), Some(partners[1].id));
    }

    #[test]
    fn test_resolve_short_prefix_ignored() {
        let partners = sample();
        let prefix = partners[0].id.to_string()[..3].to_string();
        // Too short to count as an id prefix, and not a name
        assert_eq!(resolve_partner(&partners, &prefix), None);
    }
}
