use crate::config::{Config, USER_AGENT};
use crate::form::{Endpoint, Request};
use anyhow::{bail, Context, Error};
use async_trait::async_trait;
use log::*;
use reqwest::Client;

/// Sends one request of the flow and returns the response body.
///
/// Implementations own the session: cookies set by one response must be sent
/// with every later request.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, req: &Request) -> Result<String, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &mut T {
    async fn send(&mut self, req: &Request) -> Result<String, Error> {
        (**self).send(req).await
    }
}

/// A cookie-storing reqwest client bound to one site.
pub struct HttpTransport {
    c: Client,
    login_url: String,
    developer_token_url: String,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> Result<HttpTransport, Error> {
        let c = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(cfg.timeout)
            .build()
            .context("build http client")?;
        Ok(HttpTransport {
            c,
            login_url: cfg.login_url(),
            developer_token_url: cfg.developer_token_url(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Login => &self.login_url,
            Endpoint::DeveloperToken => &self.developer_token_url,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&mut self, req: &Request) -> Result<String, Error> {
        let url = self.url(req.endpoint());
        let builder = match req {
            Request::Landing => self.c.get(url),
            Request::TokenPage => self.c.post(url),
            Request::Login(form) => self.c.post(url).form(form),
            Request::Create(form) => self.c.post(url).form(form),
            Request::Revoke(form) => self.c.post(url).form(form),
        };
        let req = builder.build().context("build request")?;
        debug!("{} {}", req.method(), req.url());

        let rsp = self.c.execute(req).await.context("execute request")?;
        if !rsp.status().is_success() {
            bail!("bad response status: {}", rsp.status());
        }
        rsp.text().await.context("read response body")
    }
}
