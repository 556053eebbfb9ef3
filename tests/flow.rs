use evertoken::config::{Config, Credentials};
use evertoken::settings::SettingsFile;
use evertoken::transport::HttpTransport;
use std::fs;
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SENTINEL: &str = "https://app.yinxiang.com/shard/s12/notestore";
const TOKEN_PATH: &str = "/api/DeveloperToken.action";

const LOGIN_PAGE: &str = r#"<html><body><div><div><div>
<script>
  "hpts","abc"
  "hptsh","xyz"
</script>
<div><div><div><div><div><form method="post" action="/Login.action"><div>
  <input type="hidden" name="_sourcePage" value="login-src">
  <input type="hidden" name="__fp" value="login-fp">
</div></form></div></div></div></div></div>
</div></div></div></body></html>"#;

fn token_page(secret: &str) -> String {
    format!(
        r#"<html><body><div><div><div><form method="post">
<input type="hidden" name="secret" value="{secret}">
<input type="hidden" name="csrfBusterToken" value="csrf-{secret}">
<div>
  <input type="hidden" name="_sourcePage" value="src-{secret}">
  <input type="hidden" name="__fp" value="fp-{secret}">
</div>
</form></div></div></div></body></html>"#
    )
}

fn result_page(value: &str, secret: &str) -> String {
    format!(
        r#"<html><body><div><div><div><form method="post">
<input type="hidden" name="secret" value="{secret}">
<input type="hidden" name="csrfBusterToken" value="csrf-{secret}">
<div>
  <div><div><input type="text" value="{value}"></div></div>
  <input type="hidden" name="_sourcePage" value="src-{secret}">
  <input type="hidden" name="__fp" value="fp-{secret}">
</div>
</form></div></div></div></body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(html(LOGIN_PAGE.to_string()).insert_header("set-cookie", "JSESSIONID=j1; Path=/"))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Login.action"))
        .and(header("cookie", "JSESSIONID=j1"))
        .and(body_string_contains("hpts=abc"))
        .and(body_string_contains("hptsh=xyz"))
        .and(body_string_contains("_sourcePage=login-src"))
        .respond_with(html("<html><body>home</body></html>".to_string()))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string(""))
        .respond_with(html(token_page("s1")))
        .expect(1)
        .mount(server)
        .await;
}

fn settings_file() -> tempfile::NamedTempFile {
    let f = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        f.path(),
        "{\n    \"evermonkey.token\": \"old\",\n    \"evermonkey.noteStoreUrl\": \"x\",\n}\n",
    )
    .unwrap();
    f
}

#[tokio::test]
async fn revokes_existing_token_then_creates() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("create=Create"))
        .and(body_string_contains("secret=s1"))
        .and(body_string_contains("csrfBusterToken=csrf-s1"))
        .respond_with(html(result_page(SENTINEL, "s2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("remove=Revoke"))
        .and(body_string_contains("secret=s2"))
        .respond_with(html(token_page("s3")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("create=Create"))
        .and(body_string_contains("secret=s3"))
        .respond_with(html(result_page("S=s12:U=1:A=en-devtoken:H=new", "s4")))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = Config {
        base_url: server.uri(),
        ..Config::default()
    };
    let f = settings_file();
    let sink = SettingsFile::new(f.path(), "evermonkey.token");
    let transport = HttpTransport::new(&cfg).unwrap();
    let tok = evertoken::refresh(transport, &Credentials::new("alice", "pw"), &cfg, &sink)
        .await
        .unwrap();

    assert_eq!(tok.as_str(), "S=s12:U=1:A=en-devtoken:H=new");
    let saved = fs::read_to_string(f.path()).unwrap();
    assert!(saved.contains(r#""evermonkey.token": "S=s12:U=1:A=en-devtoken:H=new","#));
    assert!(saved.contains(r#""evermonkey.noteStoreUrl": "x","#));
}

#[tokio::test]
async fn server_error_leaves_settings_alone() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("create=Create"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let cfg = Config {
        base_url: server.uri(),
        ..Config::default()
    };
    let f = settings_file();
    let before = fs::read_to_string(f.path()).unwrap();
    let sink = SettingsFile::new(f.path(), "evermonkey.token");
    let transport = HttpTransport::new(&cfg).unwrap();
    let err = evertoken::refresh(transport, &Credentials::new("alice", "pw"), &cfg, &sink)
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("403"), "{:#}", err);
    assert_eq!(fs::read_to_string(f.path()).unwrap(), before);
}
