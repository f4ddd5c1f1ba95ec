//! `farm user` -- manage accounts without going through the API.
//!
//! Useful for creating the first admin and for recovering a lost password.

use anyhow::{Context, Result};

use farm_core::user::{User, UserView};
use farm_storage::records::users::{
    NewUser, change_password, create_user, delete_user, list_users, set_active,
};

use crate::cli::{PasswdArgs, UserAddArgs, UserArgs, UserCommands, UserRefArgs};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

pub fn run(ctx: &RuntimeContext, args: &UserArgs) -> Result<()> {
    match &args.command {
        UserCommands::Add(a) => add(ctx, a),
        UserCommands::List => list(ctx),
        UserCommands::Remove(a) => remove(ctx, a),
        UserCommands::Passwd(a) => passwd(ctx, a),
        UserCommands::Enable(a) => set(ctx, a, true),
        UserCommands::Disable(a) => set(ctx, a, false),
    }
}

fn add(ctx: &RuntimeContext, args: &UserAddArgs) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let new = NewUser {
        username: args.username.clone(),
        email: args.email.clone(),
        full_name: args.full_name.clone().unwrap_or_default(),
        role: args.role.clone(),
        password: args.password.clone(),
    };
    let user = create_user(&store, new, &ctx.actor)
        .with_context(|| format!("failed to create user {}", args.username))?;
    report(ctx, &user, "Created")
}

fn list(ctx: &RuntimeContext) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let users: Vec<UserView> = list_users(&store)?.iter().map(User::view).collect();

    if ctx.json {
        return output_json(&users);
    }
    if users.is_empty() {
        if !ctx.quiet {
            println!("No users.");
        }
        return Ok(());
    }
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.username.clone(),
                u.role.to_string(),
                u.email.clone(),
                if u.active { "yes" } else { "no" }.to_owned(),
                u.last_login
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    output_table(&["USERNAME", "ROLE", "EMAIL", "ACTIVE", "LAST LOGIN"], &rows);
    Ok(())
}

fn remove(ctx: &RuntimeContext, args: &UserRefArgs) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let user = delete_user(&store, &args.user, &ctx.actor)?;
    report(ctx, &user, "Removed")
}

fn passwd(ctx: &RuntimeContext, args: &PasswdArgs) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let user = change_password(&store, &args.user, &args.password, &ctx.actor)?;
    report(ctx, &user, "Password changed for")
}

fn set(ctx: &RuntimeContext, args: &UserRefArgs, active: bool) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let user = set_active(&store, &args.user, active, &ctx.actor)?;
    report(ctx, &user, if active { "Enabled" } else { "Disabled" })
}

fn report(ctx: &RuntimeContext, user: &User, verb: &str) -> Result<()> {
    if ctx.json {
        output_json(&user.view())?;
    } else if !ctx.quiet {
        println!("{verb} {} ({})", user.username, user.role);
    }
    Ok(())
}
