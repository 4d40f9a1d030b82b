//! Category CLI commands
//!
//! Expenses reference categories by name. Renaming a category leaves those
//! expenses on the old name, and a category still in use cannot be deleted.

use clap::Subcommand;

use super::{signed_in, write_failed};
use crate::aggregate::{can_delete_category, category_usage};
use crate::display::{format_category_details, format_category_table};
use crate::error::{CifraError, CifraResult};
use crate::models::category::{DEFAULT_COLOR, DEFAULT_ICON, KNOWN_ICONS};
use crate::models::{Category, CategoryUpdate};
use crate::services::{CategoryService, ExpenseService};
use crate::state::{AppContext, CategoryList};

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories in display order
    List,

    /// Show a category
    Show {
        /// Category name or ID
        category: String,
    },

    /// Add a category at the end of the list
    Add {
        /// Category name
        name: String,
        /// Icon name (e.g. Home, Car, Heart)
        #[arg(short, long)]
        icon: Option<String>,
        /// Hex color (e.g. "#3b82f6")
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a category no expense uses
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(ctx: &AppContext, cmd: CategoryCommands) -> CifraResult<()> {
    let (_session, identity) = signed_in(ctx)?;
    let mut list = CategoryList::open(&ctx.storage, identity.id);
    let service = CategoryService::new(&ctx.storage);
    let expenses = ExpenseService::new(&ctx.storage).list_all(identity.id)?;

    match cmd {
        CategoryCommands::List => {
            print!("{}", format_category_table(list.categories(), &expenses));
        }

        CategoryCommands::Show { category } => {
            let category = service.resolve(identity.id, &category)?;
            let usage = category_usage(&expenses, &category.name);
            print!("{}", format_category_details(&category, usage));
        }

        CategoryCommands::Add { name, icon, color } => {
            let candidate = Category::with_style(
                identity.id,
                name.trim(),
                icon.as_deref().unwrap_or(DEFAULT_ICON),
                color.as_deref().unwrap_or(DEFAULT_COLOR),
                0,
            );
            candidate
                .validate()
                .map_err(|e| CifraError::Validation(e.to_string()))?;
            if list.find_by_name(&name).is_some() {
                return Err(CifraError::Duplicate {
                    entity_type: "Category",
                    identifier: name.trim().to_string(),
                });
            }
            warn_unknown_icon(icon.as_deref());

            if !list.add(&name, icon.as_deref(), color.as_deref()) {
                return Err(write_failed("save the category"));
            }
            println!("Created category: {}", name.trim());
        }

        CategoryCommands::Edit {
            category,
            name,
            icon,
            color,
        } => {
            let existing = service.resolve(identity.id, &category)?;
            let update = CategoryUpdate { name, icon, color };
            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let mut preview = existing.clone();
            if let Some(name) = &update.name {
                preview.name = name.trim().to_string();
            }
            if let Some(color) = &update.color {
                preview.color = color.trim().to_string();
            }
            preview
                .validate()
                .map_err(|e| CifraError::Validation(e.to_string()))?;
            if let Some(other) = list.find_by_name(&preview.name) {
                if other.id != existing.id {
                    return Err(CifraError::Duplicate {
                        entity_type: "Category",
                        identifier: preview.name.clone(),
                    });
                }
            }
            warn_unknown_icon(update.icon.as_deref());

            if !list.update(existing.id, &update) {
                return Err(write_failed("update the category"));
            }
            println!("Updated category: {}", preview.name);

            let usage = category_usage(&expenses, &existing.name);
            if preview.name != existing.name && usage > 0 {
                println!(
                    "Warning: {} expense(s) still use the old name '{}'.",
                    usage, existing.name
                );
            }
        }

        CategoryCommands::Delete { category } => {
            let existing = service.resolve(identity.id, &category)?;
            if !can_delete_category(&expenses, &existing.name) {
                return Err(CifraError::InUse {
                    entity_type: "Category",
                    name: existing.name.clone(),
                    count: category_usage(&expenses, &existing.name),
                });
            }

            if !list.delete(existing.id) {
                return Err(write_failed("delete the category"));
            }
            println!("Deleted category: {}", existing.name);
        }
    }

    Ok(())
}

fn warn_unknown_icon(icon: Option<&str>) {
    if let Some(icon) = icon {
        if !KNOWN_ICONS.contains(&icon) {
            println!(
                "Note: icon '{}' is not known and will be shown as {}.",
                icon, DEFAULT_ICON
            );
        }
    }
}
