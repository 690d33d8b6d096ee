//! Report and audit CLI commands

use crate::display::report::format_totals_report;
use crate::error::SaverResult;
use crate::session::Session;

/// Print the totals report
pub fn handle_report_command(session: &mut Session) -> SaverResult<()> {
    let totals = session.totals()?;
    print!("{}", format_totals_report(totals));
    Ok(())
}

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(session: &Session, limit: usize) -> SaverResult<()> {
    let Some(audit) = session.audit() else {
        println!("No audit log for this session.");
        return Ok(());
    };

    let entries = audit.read_recent(limit)?;
    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
