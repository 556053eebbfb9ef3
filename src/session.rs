//! The developer token flow.
//!
//! ```text
//! Init --login--> LoggedIn --navigate--> TokenPage --create--> TokenResult
//!                                            ^                     |
//!                                            +------revoke---------+
//! ```
//!
//! Every step rebuilds its payload from the response it just received: the
//! service rotates its anti-forgery values on each page and accepts each one
//! only once.

use crate::config::{Config, Credentials, MissPolicy};
use crate::extract::{Fields, Page};
use crate::form::{CreateForm, LoginForm, Request, RevokeForm, TokenFormState};
use crate::transport::Transport;
use anyhow::{bail, Context, Error};
use log::*;
use std::fmt;

const LOGIN_SCRIPT: &str = "html > body > div > div > div > script";
const LOGIN_INPUTS: &str =
    "html > body > div > div > div > div > div > div > div > div > form > div > input";
const TOKEN_FORM_INPUTS: &str = "html > body > div > div > div > form > input";
const TOKEN_FORM_DIV_INPUTS: &str = "html > body > div > div > div > form > div > input";
const TOKEN_RESULT_INPUT: &str = "html > body > div > div > div > form > div > div > div > input";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Waiting for the login page.
    Init,
    /// Waiting for the response to the login submission.
    LoggedIn,
    /// Waiting for the developer token page.
    TokenPage { revokes: u32 },
    /// Waiting for the response to a create submission.
    TokenResult { revokes: u32 },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Init => write!(f, "login page"),
            Step::LoggedIn => write!(f, "login result"),
            Step::TokenPage { .. } => write!(f, "token page"),
            Step::TokenResult { .. } => write!(f, "token result"),
        }
    }
}

/// A freshly issued developer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(len={})", self.0.len())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    Send(Request),
    Done(Token),
}

/// Advances the flow by one response.
pub fn transition(
    step: Step,
    body: &str,
    creds: &Credentials,
    cfg: &Config,
) -> Result<(Step, Transition), Error> {
    let policy = cfg.on_missing_field;

    match step {
        Step::Init => {
            let page = Page::parse(body);
            let vars = page.script_vars(LOGIN_SCRIPT, &["hpts", "hptsh"])?;
            let inputs = page.input_values(LOGIN_INPUTS, &["_sourcePage", "__fp"])?;
            let fields = vars.merge(inputs);

            let mut form = LoginForm::new(&creds.username, &creds.password);
            form.hpts = take(&fields, "hpts", step, policy)?;
            form.hptsh = take(&fields, "hptsh", step, policy)?;
            form.source_page = take(&fields, "_sourcePage", step, policy)?;
            form.fp = take(&fields, "__fp", step, policy)?;
            Ok((Step::LoggedIn, Transition::Send(Request::Login(form))))
        }
        Step::LoggedIn => Ok((
            Step::TokenPage { revokes: 0 },
            Transition::Send(Request::TokenPage),
        )),
        Step::TokenPage { revokes } => {
            let page = Page::parse(body);
            let state = token_form_state(&page, step, policy)?;
            Ok((
                Step::TokenResult { revokes },
                Transition::Send(Request::Create(CreateForm::new(state))),
            ))
        }
        Step::TokenResult { revokes } => {
            let page = Page::parse(body);
            let value = page
                .first_input_value(TOKEN_RESULT_INPUT)?
                .unwrap_or_default();
            if value.is_empty() {
                bail!("no token found in response");
            }
            if value != cfg.note_store_url {
                return Ok((step, Transition::Done(Token(value))));
            }

            if revokes >= cfg.max_revokes {
                bail!(
                    "developer token still present after {} revocations",
                    revokes
                );
            }
            info!("a developer token already exists; revoking it");
            let state = token_form_state(&page, step, policy)?;
            Ok((
                Step::TokenPage {
                    revokes: revokes + 1,
                },
                Transition::Send(Request::Revoke(RevokeForm::new(
                    state,
                    &cfg.note_store_url,
                ))),
            ))
        }
    }
}

fn token_form_state(page: &Page, step: Step, policy: MissPolicy) -> Result<TokenFormState, Error> {
    let fields = page
        .input_values(TOKEN_FORM_INPUTS, &["secret", "csrfBusterToken"])?
        .merge(page.input_values(TOKEN_FORM_DIV_INPUTS, &["_sourcePage", "__fp"])?);
    Ok(TokenFormState {
        secret: take(&fields, "secret", step, policy)?,
        csrf_buster_token: take(&fields, "csrfBusterToken", step, policy)?,
        source_page: take(&fields, "_sourcePage", step, policy)?,
        fp: take(&fields, "__fp", step, policy)?,
    })
}

fn take(fields: &Fields, name: &str, step: Step, policy: MissPolicy) -> Result<String, Error> {
    match fields.get(name) {
        Some(v) => Ok(v.to_string()),
        None => match policy {
            MissPolicy::Default => {
                warn!("field {} not found on {}; sending it empty", name, step);
                Ok(String::new())
            }
            MissPolicy::Fail => bail!("field {} not found on {}", name, step),
        },
    }
}

/// Drives the flow over a transport, one request at a time.
pub struct Session<'a, T> {
    step: Step,
    transport: T,
    creds: &'a Credentials,
    cfg: &'a Config,
}

impl<'a, T: Transport> Session<'a, T> {
    pub fn new(transport: T, creds: &'a Credentials, cfg: &'a Config) -> Session<'a, T> {
        Session {
            step: Step::Init,
            transport,
            creds,
            cfg,
        }
    }

    pub async fn run(mut self) -> Result<Token, Error> {
        let mut req = Request::Landing;
        loop {
            debug!("sending {} request", req.kind());
            let body = self
                .transport
                .send(&req)
                .await
                .with_context(|| format!("{} request", req.kind()))?;

            let (next, t) = transition(self.step, &body, self.creds, self.cfg)
                .with_context(|| format!("handle {}", self.step))?;
            self.step = next;
            match t {
                Transition::Send(r) => req = r,
                Transition::Done(tok) => return Ok(tok),
            }
        }
    }
}
