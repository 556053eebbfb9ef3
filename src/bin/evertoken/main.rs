use anyhow::{anyhow, Error};
use evertoken::config::{self, Config, Credentials, MissPolicy, DEFAULT_SETTINGS_KEY};
use evertoken::settings::SettingsFile;
use evertoken::transport::HttpTransport;
use getopts::Options;
use log::*;
use logosaurus::{self, Logger, L_LEVEL, L_TIME};
use std::env;
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    let args = env::args().collect::<Vec<String>>();
    let opts = options();
    let m = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            print_help(&args[0], &opts);
            process::exit(2);
        }
    };

    let level = if m.opt_present("v") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let logger = Logger::builder(std::io::stderr())
        .set_prefix("evertoken: ")
        .set_flags(L_LEVEL | L_TIME)
        .set_level(level)
        .build();
    logosaurus::init(logger).unwrap();

    let (username, password) = match (m.opt_str("u"), m.opt_str("p")) {
        (Some(u), Some(p)) if !m.opt_present("h") && !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            print_help(&args[0], &opts);
            return;
        }
    };

    if let Err(e) = run(Credentials::new(username, password), &m).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(creds: Credentials, m: &getopts::Matches) -> Result<(), Error> {
    let settings_path = match m.opt_str("s") {
        Some(p) => PathBuf::from(p),
        None => {
            let p = config::default_settings_path()
                .ok_or_else(|| anyhow!("no home directory; pass --settings"))?;
            info!("using default settings path {}", p.display());
            p
        }
    };
    let key = m
        .opt_str("k")
        .unwrap_or_else(|| DEFAULT_SETTINGS_KEY.to_string());

    let mut cfg = Config::default();
    if m.opt_present("strict") {
        cfg.on_missing_field = MissPolicy::Fail;
    }

    let sink = SettingsFile::new(settings_path, key);
    let transport = HttpTransport::new(&cfg)?;
    let tok = evertoken::refresh(transport, &creds, &cfg, &sink).await?;
    println!("{}", tok);
    info!("wrote token to {}", sink.path().display());
    Ok(())
}

fn options() -> Options {
    let mut opts = Options::new();
    opts.optopt("u", "username", "evernote username", "NAME");
    opts.optopt("p", "password", "evernote password", "PASSWORD");
    opts.optopt(
        "s",
        "settings",
        &format!(
            "settings file path, default ~/{}",
            config::DEFAULT_SETTINGS_PATH
        ),
        "PATH",
    );
    opts.optopt(
        "k",
        "key",
        &format!("settings key to update, default {}", DEFAULT_SETTINGS_KEY),
        "KEY",
    );
    opts.optflag("", "strict", "fail when an expected form field is missing");
    opts.optflag("v", "verbose", "debug logging");
    opts.optflag("h", "help", "print this help");
    opts
}

fn print_help(prog: &str, opts: &Options) {
    let brief = format!("usage: {} -u <USERNAME> -p <PASSWORD> [options]", prog);
    eprint!("{}", opts.usage(&brief));
}
