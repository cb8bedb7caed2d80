//! Command-line surface.

use clap::{Command, Parser, Subcommand};
use tsuru_core::auth::CommandInfo;
use tsuru_core::config::TARGET_ENV;

#[derive(Debug, Parser)]
#[command(name = "tsuru", version, about = "Command-line client for the tsuru platform")]
pub struct Cli {
    /// tsuru server URL (defaults to the contents of ~/.tsuru_target)
    #[arg(long, global = true, env = TARGET_ENV)]
    pub target: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Creates a user.
    UserCreate { email: String },

    /// Removes your user from the tsuru server.
    UserRemove,

    /// Log in with your credentials.
    ///
    /// Whether an email is required depends on the server's authentication scheme.
    Login { email: Option<String> },

    /// Clear local authentication credentials.
    Logout,

    /// Creates a new team.
    TeamCreate { team: String },

    /// Removes a team from the tsuru server.
    TeamRemove {
        team: String,
        /// Don't ask for confirmation
        #[arg(short = 'y', long)]
        assume_yes: bool,
    },

    /// Adds a user to a team.
    TeamUserAdd { team: String, user: String },

    /// Removes a user from a team.
    TeamUserRemove { team: String, user: String },

    /// List members of a team.
    TeamUserList { team: String },

    /// List all teams that you are a member of.
    TeamList,

    /// Change your password.
    ChangePassword,

    /// Resets the user password.
    ///
    /// This process is composed of two steps:
    ///
    /// 1. Generate a new token
    /// 2. Reset the password using the token
    ///
    /// In order to generate the token, run this command without the --token flag.
    /// The token will be mailed to you.
    ///
    /// With the token in hand, reset the password using the --token flag.
    /// The new password will also be mailed to you.
    ResetPassword {
        email: String,
        /// Token to reset the password
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Show your API key. If you do not have one, it is generated.
    TokenShow,

    /// Generate a new API key, replacing the current one.
    TokenRegenerate,
}

/// Apply scheme-dependent usage text to the login subcommand
pub fn with_login_info(command: Command, info: CommandInfo) -> Command {
    command.mut_subcommand("login", |sub| {
        sub.override_usage(format!("tsuru {}", info.usage)).about(info.desc)
    })
}

/// Whether the invocation runs the login command or asks for its help.
///
/// Only the subcommand position counts, so a team or user named `login`
/// does not trigger scheme discovery.
pub fn mentions_login(args: &[String]) -> bool {
    let mut positionals = Vec::with_capacity(2);
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--target" {
            iter.next();
        } else if !arg.starts_with('-') {
            positionals.push(arg.as_str());
            if positionals.len() == 2 {
                break;
            }
        }
    }
    matches!(positionals.as_slice(), ["login", ..] | ["help", "login"])
}

/// `--target` as given on the raw command line, or from the environment.
///
/// Used before clap runs, when login usage has to be known up front.
pub fn target_hint(args: &[String]) -> Option<String> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--target=") {
            return Some(value.to_string());
        }
        if arg == "--target" {
            return iter.next().cloned();
        }
    }
    std::env::var(TARGET_ENV).ok()
}
