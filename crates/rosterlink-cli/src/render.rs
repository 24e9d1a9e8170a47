//! Reply rendering
//!
//! Long lists are split into pages of [`PAGE_SIZE`] lines. Offender lists that
//! need more than one page, and search results above
//! [`FIND_ATTACHMENT_THRESHOLD`] matches, are also sent in full as a text
//! attachment.

use chrono::{DateTime, Utc};
use rosterlink_core::{Record, RecordId, RecordSummary, RegistryError, RequesterId};
use rosterlink_registry::{
    AbuseRecord, AddOutcome, LookupAccess, LookupOutcome, OwnershipReport, RegistryStats,
    MISSING_NAME,
};

/// Lines per paged message
pub const PAGE_SIZE: usize = 20;

/// Search results above this count are also attached as a file
pub const FIND_ATTACHMENT_THRESHOLD: usize = 50;

/// Offender attachment file name
pub const OFFENDERS_FILE: &str = "offenders_list.txt";

/// Search attachment file name
pub const SEARCH_FILE: &str = "search_results.txt";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// One outbound reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message
    Text(String),
    /// File attachment with caption
    File {
        /// Attachment name
        filename: String,
        /// Caption shown with the file
        caption: String,
        /// UTF-8 contents
        bytes: Vec<u8>,
    },
}

impl Reply {
    /// Text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn file(filename: &str, caption: &str, lines: &[String]) -> Self {
        Self::File {
            filename: filename.to_string(),
            caption: caption.to_string(),
            bytes: lines.join("\n").into_bytes(),
        }
    }
}

/// Greeting for `/start`
pub fn welcome() -> Reply {
    Reply::text(
        "👋 Welcome to the results desk 📚\n\n\
         🔹 To get your result:\n \
         ➤ send your record id directly\n \
         ➤ or use /result <record id>\n\n\
         🔐 The first id you send is linked to your account.",
    )
}

/// Replies for a lookup outcome
pub fn lookup(outcome: &LookupOutcome) -> Reply {
    match outcome {
        LookupOutcome::NoInput => {
            Reply::text("❌ Please send /result <record id>, or just send the record id.")
        }
        LookupOutcome::Found { record: found, access } => {
            let mut text = record(found);
            if *access != LookupAccess::Privileged {
                text.push_str("\n\n🔒 This record id is linked to your account.");
            }
            Reply::Text(text)
        }
        LookupOutcome::Missing {
            record_id,
            privileged: true,
        } => Reply::text(format!("❌ No results found for ID: {record_id}")),
        LookupOutcome::Missing { .. } => {
            Reply::text("❌ Sorry, your result is not available right now.")
        }
        LookupOutcome::Conflict { .. } => Reply::text(
            "❌ This record id is linked to a different account, or your account \
             is linked to a different record.\n📞 Contact an administrator if \
             this is your record.",
        ),
    }
}

/// Result card for one record
pub fn record(record: &Record) -> String {
    let mut text = format!(
        "🎓 Result\n{RULE}\n👤 Name : {}\n🆔 ID : `{}`\n\n📚 Subject grades:\n{RULE}\n",
        record.name, record.id
    );
    for grade in &record.subjects {
        text.push_str(&format!("🔹 {} : {}\n", grade.subject, grade.score));
    }
    text.push_str(&format!(
        "🔹 Total : {}\n🔹 Percentage : {:.2}%\n{RULE}",
        record.total, record.percentage
    ));
    text
}

/// `/status` reply
pub fn status(bound: Option<&RecordId>) -> Reply {
    match bound {
        Some(record) => Reply::text(format!("🔗 Your account is linked to record `{record}`.")),
        None => Reply::text(
            "ℹ️ Your account is not linked to any record yet. Send your record id to link it.",
        ),
    }
}

/// `/admin` reply
pub fn admin_added(target: RequesterId, outcome: AddOutcome) -> Reply {
    match outcome {
        AddOutcome::Added => Reply::text(format!("✅ User `{target}` has been added as an admin.")),
        AddOutcome::AlreadyPresent => Reply::text("ℹ️ This user is already an admin."),
    }
}

/// `/remove` reply
pub fn admin_removed(target: RequesterId) -> Reply {
    Reply::text(format!("✅ User `{target}` has been removed from the admin list."))
}

/// `/adminlist` reply
pub fn admin_list(admins: &[RequesterId]) -> Reply {
    if admins.is_empty() {
        return Reply::text("🚫 No admins are registered.");
    }
    let mut text = String::from("👮 Current admins:\n");
    for admin in admins {
        text.push_str(&format!("\n• ID: `{admin}`"));
    }
    Reply::Text(text)
}

/// `/unlink` and `/unlinktg` reply
pub fn unlinked(record: &RecordId, owner: RequesterId) -> Reply {
    Reply::text(format!(
        "✅ Unlinked:\n🎓 Record ID: `{record}`\n👤 Account ID: `{owner}`"
    ))
}

/// `/who` reply
pub fn ownership(report: &OwnershipReport) -> Reply {
    let name = report.name.as_deref().unwrap_or(MISSING_NAME);
    let available = if report.name.is_some() {
        "✅"
    } else {
        "❌ not available"
    };
    Reply::text(format!(
        "📌 Record:\n\n🆔 Record ID: `{}`\n👤 Name: {name}\n📚 Result available: {available}\n\n{RULE}\n\n\
         👤 Linked account:\n\n🆔 Account ID: `{}`\n📥 Lookups: {}\n🕒 Last lookup: {}",
        report.record_id,
        report.owner,
        report.access_count,
        timestamp(report.last_access),
    ))
}

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "unknown".to_string(),
        |at| at.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// `/stats` summary
pub fn stats(stats: &RegistryStats) -> Reply {
    let mut text = format!(
        "📊 Registry stats:\n\n👥 Linked accounts: `{}`\n📥 Total lookups: `{}`\n\n🏆 Most looked-up records:\n",
        stats.total_bound_identities, stats.total_successful_lookups
    );
    for top in &stats.top {
        text.push_str(&format!(
            "🔹 {} (ID: `{}`) ➤ {}\n",
            top.name, top.record_id, top.count
        ));
    }
    Reply::Text(text.trim_end().to_string())
}

/// Offender pages, plus an attachment when they span several pages.
///
/// Empty input renders nothing.
pub fn offenders(ranked: &[AbuseRecord]) -> Vec<Reply> {
    let lines: Vec<String> = ranked
        .iter()
        .map(|o| format!("🔸 `{}` ➤ {} attempts", o.requester, o.total_attempts))
        .collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let mut replies = pages(
        &lines,
        |index| (index == 0).then_some("🚨 Accounts that tried to reach other people's records:"),
    );
    if lines.len() > PAGE_SIZE {
        replies.push(Reply::file(OFFENDERS_FILE, "📄 Every offender, in full", &lines));
    }
    replies
}

/// Search result pages, plus an attachment above the threshold
pub fn search_results(matches: &[RecordSummary]) -> Vec<Reply> {
    if matches.is_empty() {
        return vec![Reply::text("❌ No records match this search.")];
    }
    let lines: Vec<String> = matches
        .iter()
        .map(|m| format!("👤 {} | 🆔 `{}`", m.name, m.id))
        .collect();

    let mut replies = pages(&lines, |_| Some("🔍 Search results:"));
    if lines.len() > FIND_ATTACHMENT_THRESHOLD {
        replies.push(Reply::file(SEARCH_FILE, "📄 Every search result, in full", &lines));
    }
    replies
}

/// `/reset` reply
pub fn reset_done() -> Reply {
    Reply::text("✅ Bindings and usage were reset. Admins were kept.")
}

/// Reply for a failed operation
pub fn error(err: &RegistryError) -> Reply {
    match err {
        RegistryError::NotPrivileged { message } => Reply::text(format!("❌ Not allowed: {message}.")),
        RegistryError::InvalidArgument { message } => Reply::text(format!("❌ {message}.")),
        RegistryError::Conflict { message } => Reply::text(format!("❌ {message}.")),
        RegistryError::NotFound { message } => Reply::text(format!("❌ Not found: {message}.")),
        RegistryError::SelfRemoval => Reply::text("⚠️ You cannot remove yourself."),
        RegistryError::PersistenceFailure { .. } | RegistryError::UpstreamUnavailable { .. } => {
            Reply::text("⚠️ Something went wrong on our side. Please try again later.")
        }
    }
}

/// Reply for an unrecognized command
pub fn unknown(name: &str) -> Reply {
    Reply::text(format!("❓ Unknown command /{name}."))
}

fn pages<'a>(lines: &[String], header: impl Fn(usize) -> Option<&'a str>) -> Vec<Reply> {
    let total = lines.len();
    lines
        .chunks(PAGE_SIZE)
        .enumerate()
        .map(|(index, chunk)| {
            let start = index * PAGE_SIZE;
            let mut text = String::new();
            if let Some(header) = header(index) {
                text.push_str(header);
                text.push_str("\n\n");
            }
            text.push_str(&chunk.join("\n"));
            text.push_str(&format!(
                "\n\n📄 {} - {} of {total}",
                start + 1,
                start + chunk.len()
            ));
            Reply::Text(text)
        })
        .collect()
}
