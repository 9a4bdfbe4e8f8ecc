use clap::{ArgGroup, Parser};

use crate::domain::ThreadId;
use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about = "Tail and send messages in a chat thread")]
#[command(group(ArgGroup::new("thread").required(true).multiple(false)))]
pub struct Cli {
    /// Room id to tail
    #[arg(long, group = "thread", value_name = "ID")]
    pub room: Option<i64>,

    /// Conversation id to tail
    #[arg(long, group = "thread", value_name = "ID")]
    pub conversation: Option<i64>,

    /// Backend REST base URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Messages per page (overrides config)
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Numeric id of the viewing user, for room membership checks
    #[arg(long, value_name = "ID")]
    pub viewer_id: Option<i64>,
}

impl Cli {
    /// The thread selected on the command line. Exactly one selector is
    /// present; clap enforces the group.
    pub fn thread_id(&self) -> ThreadId {
        match (self.room, self.conversation) {
            (Some(id), _) => ThreadId::Room(id),
            (None, Some(id)) => ThreadId::Conversation(id),
            (None, None) => unreachable!("clap requires one thread selector"),
        }
    }
}
