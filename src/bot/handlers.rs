//! Command handlers and reply text

use super::command::{Command, Invocation};
use super::host::{runtime_version, HostInfo};
use super::{BotContext, Update};
use crate::access::{AccessError, UserId};
use crate::ingest::{ingest, ArchiveKind};
use crate::store::Dataset;
use std::fmt::Write;
use tracing::{info, warn};

type Handler = fn(&BotContext, &Update, &[&str]) -> String;

const ADMIN_ONLY: &str = "❌ Admin-only command.";
const SETADMIN_DENIED: &str = "❌ Only an admin can appoint another admin.";
const ADD_USAGE: &str = "Please attach the database file to the /add command.";
const UNSUPPORTED_UPLOAD: &str = "❌ Only .csv, .txt, .zip and .rar files are supported";
const SEARCH_USAGE: &str = "🔍 Usage: /search Smith";
const NOTHING_FOUND: &str = "Nothing found.";
const NO_DATASETS: &str = "No databases loaded.";
const SETADMIN_USAGE: &str = "🛠 Usage: /setadmin <user_id>";
const INVALID_ID: &str = "❌ Invalid ID format. Use an integer.";
const UNKNOWN_COMMAND: &str = "Unknown command. Send /info for help.";

fn handler_for(command: Command) -> Handler {
    match command {
        Command::Info => info,
        Command::Support => support,
        Command::Add => add,
        Command::Search => search,
        Command::DbInfo => db_info,
        Command::Adm => adm,
        Command::SetAdmin => set_admin,
        Command::Unknown => unknown,
    }
}

fn denial(command: Command) -> &'static str {
    match command {
        Command::SetAdmin => SETADMIN_DENIED,
        _ => ADMIN_ONLY,
    }
}

/// Check permissions and run the handler for `invocation`
pub(super) fn dispatch(ctx: &BotContext, update: &Update, invocation: &Invocation<'_>) -> String {
    let command = invocation.command;
    if command.requires_admin() && !ctx.is_admin(update.sender.id) {
        warn!(user = %update.sender.id, ?command, "privileged command denied");
        return denial(command).to_string();
    }

    handler_for(command)(ctx, update, &invocation.args)
}

fn info(ctx: &BotContext, update: &Update, _args: &[&str]) -> String {
    let mut text = format!(
        "📁 *Database search bot*\n\n\
         🔍 /search <query> - search the databases\n\
         ➕ /add - add a database\n\
         🆘 /support - support: {}\n\
         ℹ️ /info - this message\n",
        ctx.config().support_contact
    );

    if ctx.is_admin(update.sender.id) {
        text.push_str(
            "\n👑 Admin commands:\n\
             /bdinfo - database info\n\
             /adm - bot status\n\
             /setadmin <user_id> - add an admin",
        );
    }

    text
}

fn support(ctx: &BotContext, _update: &Update, _args: &[&str]) -> String {
    format!("🆘 Support: {}", ctx.config().support_contact)
}

fn add(ctx: &BotContext, update: &Update, _args: &[&str]) -> String {
    let Some(attachment) = &update.attachment else {
        return ADD_USAGE.to_string();
    };

    if ArchiveKind::from_file_name(&attachment.file_name).is_none() {
        return UNSUPPORTED_UPLOAD.to_string();
    }

    match ingest(&attachment.bytes, &attachment.file_name) {
        Ok(dataset) => {
            info!(
                user = %update.sender.id,
                upload = %attachment.file_name,
                dataset = dataset.name(),
                lines = dataset.lines_count(),
                size = dataset.size(),
                "dataset added"
            );
            let reply = format!(
                "✅ Database '{}' loaded.\nLines: {}\nSize: {} bytes",
                dataset.name(),
                dataset.lines_count(),
                dataset.size()
            );
            ctx.add_dataset(dataset);
            reply
        }
        Err(e) => {
            warn!(user = %update.sender.id, upload = %attachment.file_name, error = %e, "ingestion failed");
            format!("❌ {}", e)
        }
    }
}

fn search(ctx: &BotContext, _update: &Update, args: &[&str]) -> String {
    if args.is_empty() {
        return SEARCH_USAGE.to_string();
    }

    let results = ctx.search(&args.join(" "));
    if results.is_empty() {
        NOTHING_FOUND.to_string()
    } else {
        results.join("\n")
    }
}

fn dataset_line(bullet: &str, dataset: &Dataset) -> String {
    format!(
        "{} {} - {} bytes - {} lines",
        bullet,
        dataset.name(),
        dataset.size(),
        dataset.lines_count()
    )
}

fn db_info(ctx: &BotContext, _update: &Update, _args: &[&str]) -> String {
    ctx.with_state(|state| {
        if state.store.is_empty() {
            return NO_DATASETS.to_string();
        }

        let mut lines: Vec<String> = state
            .store
            .all()
            .iter()
            .map(|ds| dataset_line("📄", ds))
            .collect();

        let summary = state.store.summary();
        lines.push(format!(
            "\n📊 Total size: {} bytes\n📈 Total lines: {}",
            summary.total_size, summary.total_lines
        ));
        lines.join("\n")
    })
}

fn adm(ctx: &BotContext, _update: &Update, _args: &[&str]) -> String {
    let mut text = ctx.with_state(|state| {
        let mut text = format!("👥 Users: {}\n👤 User list:", state.roster.len());
        for (id, name) in state.roster.iter() {
            let _ = write!(text, "\n{} - {}", id, name);
        }

        let _ = write!(text, "\n📦 Databases: {}", state.store.len());
        for dataset in state.store.all() {
            text.push('\n');
            text.push_str(&dataset_line("•", dataset));
        }
        text
    });

    let status = ctx.status();
    let host = HostInfo::detect();
    let _ = write!(
        text,
        "\n\n💻 Server: {} {}\n🦀 {}\n⏱ Uptime: {}s\n🔎 Searches served: {}",
        host.system,
        host.release,
        runtime_version(),
        status.uptime_secs,
        status.searches_served
    );

    text
}

fn set_admin(ctx: &BotContext, update: &Update, args: &[&str]) -> String {
    let Some(raw) = args.first() else {
        return SETADMIN_USAGE.to_string();
    };

    let target: UserId = match raw.parse() {
        Ok(id) => id,
        Err(_) => return INVALID_ID.to_string(),
    };

    match ctx.grant_admin(update.sender.id, target) {
        Ok(()) => {
            info!(by = %update.sender.id, target = %target, "admin granted");
            format!("✅ User {} is now an administrator.", target)
        }
        Err(AccessError::Denied) => SETADMIN_DENIED.to_string(),
        Err(AccessError::InvalidIdentity(_)) => INVALID_ID.to_string(),
    }
}

fn unknown(_ctx: &BotContext, _update: &Update, _args: &[&str]) -> String {
    UNKNOWN_COMMAND.to_string()
}
