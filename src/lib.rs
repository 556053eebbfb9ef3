//! Obtain a Yinxiang (Evernote China) developer token by walking the
//! service's web pages, and store it in an editor settings file.

pub mod config;
pub mod extract;
pub mod form;
pub mod session;
pub mod settings;
pub mod transport;

use anyhow::{Context, Error};
use config::{Config, Credentials};
use session::{Session, Token};
use settings::TokenSink;
use transport::Transport;

/// Runs the whole flow and hands the new token to `sink`.
///
/// The sink is called exactly once, after a token has been issued. A sink
/// failure leaves the remote token in place.
pub async fn refresh<T, S>(
    transport: T,
    creds: &Credentials,
    cfg: &Config,
    sink: &S,
) -> Result<Token, Error>
where
    T: Transport,
    S: TokenSink + ?Sized,
{
    let tok = Session::new(transport, creds, cfg).run().await?;
    sink.persist(tok.as_str()).context("save token")?;
    Ok(tok)
}
