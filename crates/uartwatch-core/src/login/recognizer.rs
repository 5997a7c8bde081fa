//! Prompt recognizer
//!
//! Matches console text against the prompts of the configured profiles
//! and decides what to answer. Rules are checked in a fixed order and
//! only the first match fires for a given piece of text:
//!
//! 1. `<host> login:` of any profile, in any state: answer the user name
//!    and select that profile.
//! 2. `Password:` after a login banner: answer the selected password.
//! 3. `<user>@<host>:~$` of the selected profile after the password:
//!    send the IP query.
//! 4. The same shell prompt after the IP query: send the command and
//!    clear the selection.
//! 5. `[sudo] password for <user>:` of any profile, in any state: answer
//!    that profile's password without changing state.

use tracing::debug;

use super::LoginState;
use crate::config::{LineEnding, Profile};

/// Literal password request shown by `login`
pub const PASSWORD_PROMPT: &str = "Password:";

/// Which rule produced a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRule {
    /// `<host> login:`
    LoginBanner,
    /// `Password:` after a login banner
    Password,
    /// First shell prompt after logging in
    IpQuery,
    /// Shell prompt after the IP query
    Command,
    /// `[sudo] password for <user>:`
    SudoPassword,
}

/// Result of a rule firing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Rule that matched
    pub rule: PromptRule,
    /// State before the rule fired
    pub from: LoginState,
    /// State after the rule fired
    pub to: LoginState,
    /// Index of the profile the answer came from
    pub profile: usize,
    /// Text to transmit, terminator included
    pub command: String,
}

impl Transition {
    /// Whether the answer contains a secret that must not be logged
    pub fn is_secret(&self) -> bool {
        matches!(self.rule, PromptRule::Password | PromptRule::SudoPassword)
    }
}

/// Login script state machine
pub struct PromptRecognizer {
    profiles: Vec<Profile>,
    /// Cached prompt strings, one triple per profile
    prompts: Vec<ProfilePrompts>,
    line_ending: LineEnding,
    state: LoginState,
    /// Profile whose login banner was seen last
    selected: Option<usize>,
}

struct ProfilePrompts {
    login: String,
    shell: String,
    sudo: String,
}

impl PromptRecognizer {
    /// Recognizer in the initial state with no profile selected
    pub fn new(profiles: Vec<Profile>, line_ending: LineEnding) -> Self {
        let prompts = profiles
            .iter()
            .map(|p| ProfilePrompts {
                login: p.login_prompt(),
                shell: p.shell_prompt(),
                sudo: p.sudo_prompt(),
            })
            .collect();

        Self {
            profiles,
            prompts,
            line_ending,
            state: LoginState::None,
            selected: None,
        }
    }

    /// Current login state
    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Profile selected by the last login banner
    pub fn selected(&self) -> Option<&Profile> {
        self.selected.map(|i| &self.profiles[i])
    }

    /// Return to the start of the script
    pub fn reset(&mut self) {
        self.state = LoginState::None;
        self.selected = None;
    }

    /// Check `text` against the rules and apply the first that matches
    pub fn observe(&mut self, text: &str) -> Option<Transition> {
        let (rule, profile, to) = self.match_rule(text)?;
        let from = self.state;
        let answer = {
            let p = &self.profiles[profile];
            match rule {
                PromptRule::LoginBanner => &p.user,
                PromptRule::Password | PromptRule::SudoPassword => &p.password,
                PromptRule::IpQuery => &p.ip_query,
                PromptRule::Command => &p.command,
            }
        };
        let command = format!("{}{}", answer, self.line_ending.as_str());

        self.state = to;
        match rule {
            PromptRule::LoginBanner => self.selected = Some(profile),
            PromptRule::Command => self.selected = None,
            _ => {}
        }

        debug!(?rule, %from, %to, profile, "prompt recognized");

        Some(Transition {
            rule,
            from,
            to,
            profile,
            command,
        })
    }

    fn match_rule(&self, text: &str) -> Option<(PromptRule, usize, LoginState)> {
        if let Some(i) = self.prompts.iter().position(|p| text.contains(&p.login)) {
            return Some((PromptRule::LoginBanner, i, LoginState::SawLogin));
        }

        if let Some(i) = self.selected {
            if self.state == LoginState::SawLogin && text.contains(PASSWORD_PROMPT) {
                return Some((PromptRule::Password, i, LoginState::SawPassword));
            }
            if text.contains(&self.prompts[i].shell) {
                match self.state {
                    LoginState::SawPassword => {
                        return Some((PromptRule::IpQuery, i, LoginState::SawIpQuery))
                    }
                    LoginState::SawIpQuery => {
                        return Some((PromptRule::Command, i, LoginState::SawCommand))
                    }
                    _ => {}
                }
            }
        }

        self.prompts
            .iter()
            .position(|p| text.contains(&p.sudo))
            .map(|i| (PromptRule::SudoPassword, i, self.state))
    }
}
