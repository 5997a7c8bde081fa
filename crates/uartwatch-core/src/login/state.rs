use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress through the login script
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum LoginState {
    /// Nothing recognized yet
    #[default]
    None,
    /// Login banner answered with the user name
    SawLogin,
    /// Password prompt answered
    SawPassword,
    /// First shell prompt answered with the IP query
    SawIpQuery,
    /// Second shell prompt answered with the configured command
    SawCommand,
}

impl LoginState {
    /// The state one step further along the script, if any
    pub fn next(self) -> Option<LoginState> {
        match self {
            LoginState::None => Some(LoginState::SawLogin),
            LoginState::SawLogin => Some(LoginState::SawPassword),
            LoginState::SawPassword => Some(LoginState::SawIpQuery),
            LoginState::SawIpQuery => Some(LoginState::SawCommand),
            LoginState::SawCommand => None,
        }
    }

    /// Whether the script has run to completion
    pub fn is_terminal(self) -> bool {
        self == LoginState::SawCommand
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginState::None => "none",
            LoginState::SawLogin => "login",
            LoginState::SawPassword => "password",
            LoginState::SawIpQuery => "ip-query",
            LoginState::SawCommand => "command",
        };
        f.write_str(name)
    }
}
