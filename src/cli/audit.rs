//! `cifra audit`: recent changes to your data

use clap::Args;

use super::signed_in;
use crate::error::CifraResult;
use crate::state::AppContext;

/// Options for `cifra audit`
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Number of entries to show
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
}

/// Handle `cifra audit`
pub fn handle_audit_command(ctx: &AppContext, args: AuditArgs) -> CifraResult<()> {
    let (_session, identity) = signed_in(ctx)?;
    let user = identity.id.to_string();

    let entries = ctx.storage.audit().read_recent(args.limit, Some(&user))?;
    if entries.is_empty() {
        println!("No changes recorded yet.");
        return Ok(());
    }

    for entry in entries.iter().rev() {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
