use serde::Serialize;

/// Body of the login submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "rememberMe")]
    pub remember_me: &'static str,
    pub login: &'static str,
    pub hpts: String,
    pub hptsh: String,
    #[serde(rename = "analyticsLoginOrigin")]
    pub analytics_login_origin: &'static str,
    #[serde(rename = "clipperFlow")]
    pub clipper_flow: &'static str,
    #[serde(rename = "showSwitchService")]
    pub show_switch_service: &'static str,
    #[serde(rename = "usernameImmutable")]
    pub username_immutable: &'static str,
    #[serde(rename = "targetUrl")]
    pub target_url: &'static str,
    #[serde(rename = "_sourcePage")]
    pub source_page: String,
    #[serde(rename = "__fp")]
    pub fp: String,
}

impl LoginForm {
    pub fn new(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            remember_me: "true",
            login: "登录",
            hpts: String::new(),
            hptsh: String::new(),
            analytics_login_origin: "login_action",
            clipper_flow: "false",
            show_switch_service: "true",
            username_immutable: "false",
            target_url: crate::config::DEVELOPER_TOKEN_PATH,
            source_page: String::new(),
            fp: String::new(),
        }
    }
}

/// Hidden fields of the developer token form, echoed back on create and
/// revoke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenFormState {
    pub secret: String,
    #[serde(rename = "csrfBusterToken")]
    pub csrf_buster_token: String,
    #[serde(rename = "_sourcePage")]
    pub source_page: String,
    #[serde(rename = "__fp")]
    pub fp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateForm {
    #[serde(flatten)]
    pub state: TokenFormState,
    pub create: &'static str,
}

impl CreateForm {
    pub fn new(state: TokenFormState) -> CreateForm {
        CreateForm {
            state,
            create: "Create a developer token",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeForm {
    #[serde(flatten)]
    pub state: TokenFormState,
    #[serde(rename = "noteStoreUrl")]
    pub note_store_url: String,
    pub remove: &'static str,
}

impl RevokeForm {
    pub fn new(state: TokenFormState, note_store_url: &str) -> RevokeForm {
        RevokeForm {
            state,
            note_store_url: note_store_url.to_string(),
            remove: "Revoke your developer token",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    DeveloperToken,
}

/// One outgoing request of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// GET of the developer token page; unauthenticated sessions land on the
    /// login page.
    Landing,
    Login(LoginForm),
    /// Bodyless POST to the developer token page.
    TokenPage,
    Create(CreateForm),
    Revoke(RevokeForm),
}

impl Request {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Request::Login(_) => Endpoint::Login,
            _ => Endpoint::DeveloperToken,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::Landing => "landing",
            Request::Login(_) => "login",
            Request::TokenPage => "token page",
            Request::Create(_) => "create",
            Request::Revoke(_) => "revoke",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn keys(v: &Value) -> Vec<String> {
        let mut k = v.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        k.sort();
        k
    }

    #[test]
    fn login_template_is_complete() {
        let v = serde_json::to_value(LoginForm::new("u", "p")).unwrap();
        let mut want = vec![
            "username",
            "password",
            "rememberMe",
            "login",
            "hpts",
            "hptsh",
            "analyticsLoginOrigin",
            "clipperFlow",
            "showSwitchService",
            "usernameImmutable",
            "targetUrl",
            "_sourcePage",
            "__fp",
        ];
        want.sort();
        assert_eq!(keys(&v), want);
        assert_eq!(v["hpts"], json!(""));
        assert_eq!(v["_sourcePage"], json!(""));
        assert_eq!(v["targetUrl"], json!("/api/DeveloperToken.action"));
    }

    #[test]
    fn create_and_revoke_templates() {
        let create = serde_json::to_value(CreateForm::new(TokenFormState::default())).unwrap();
        assert_eq!(
            keys(&create),
            vec!["__fp", "_sourcePage", "create", "csrfBusterToken", "secret"]
        );

        let revoke =
            serde_json::to_value(RevokeForm::new(TokenFormState::default(), "https://x/notestore"))
                .unwrap();
        assert_eq!(
            keys(&revoke),
            vec![
                "__fp",
                "_sourcePage",
                "csrfBusterToken",
                "noteStoreUrl",
                "remove",
                "secret"
            ]
        );
        assert!(revoke.get("create").is_none());
        assert_eq!(revoke["noteStoreUrl"], json!("https://x/notestore"));
    }

    #[test]
    fn only_login_goes_to_login_endpoint() {
        assert_eq!(Request::Login(LoginForm::new("u", "p")).endpoint(), Endpoint::Login);
        assert_eq!(Request::Landing.endpoint(), Endpoint::DeveloperToken);
        assert_eq!(Request::TokenPage.endpoint(), Endpoint::DeveloperToken);
    }
}
