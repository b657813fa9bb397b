//! `session` commands: show, sign in and sign out.

use console::style;

use crate::identity::IdentityProvider;

use super::open_session;

pub fn cmd_show() -> anyhow::Result<()> {
    let session = open_session()?;
    match session.identity_tag() {
        Some(tag) => println!("{} Signed in as {}", style("✓").green(), style(tag).bold()),
        None => println!("{} Not signed in (analyses are anonymous)", style("!").yellow()),
    }
    Ok(())
}

pub fn cmd_login(identity: &str) -> anyhow::Result<()> {
    let session = open_session()?;
    session.login(identity)?;
    match session.identity_tag() {
        Some(tag) => println!("{} Signed in as {}", style("✓").green(), style(tag).bold()),
        None => println!("{} Empty identity; signed out", style("!").yellow()),
    }
    Ok(())
}

pub fn cmd_logout() -> anyhow::Result<()> {
    let session = open_session()?;
    session.logout()?;
    println!("{} Signed out", style("✓").green());
    Ok(())
}
