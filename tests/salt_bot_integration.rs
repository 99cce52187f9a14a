//! End-to-end coverage: chat messages through the bot loop against a fake
//! salt-api served by wiremock.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::Mutex;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use saltbot::bot::{Bot, FAILURE_REPLY};
use saltbot::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use saltbot::commands::SaltCommands;
use saltbot::config::SaltApiConfig;
use saltbot::error::ChannelError;
use saltbot::router::Router;
use saltbot::salt::{HttpConnector, SessionHandle};

/// Replays scripted messages and records replies.
struct ScriptedChannel {
    script: Vec<IncomingMessage>,
    replies: Mutex<Vec<String>>,
}

impl ScriptedChannel {
    fn new(lines: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            script: lines
                .iter()
                .map(|line| IncomingMessage::new("script", "operator", *line))
                .collect(),
            replies: Mutex::new(Vec::new()),
        })
    }

    async fn replies(&self) -> Vec<String> {
        self.replies.lock().await.clone()
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        "script"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        Ok(Box::pin(futures::stream::iter(self.script.clone())))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.replies.lock().await.push(response.content);
        Ok(())
    }
}

fn salt_config(url: String) -> SaltApiConfig {
    SaltApiConfig {
        url,
        username: "saltapi".to_string(),
        password: SecretString::from("saltapi".to_string()),
        eauth: "pam".to_string(),
    }
}

async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"token": "tok-abc", "eauth": "pam", "user": "saltapi"}]
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn run_bot(server: &MockServer, lines: &[&str]) -> Vec<String> {
    let channel = ScriptedChannel::new(lines);
    let session = SessionHandle::new(salt_config(server.uri()), Arc::new(HttpConnector::new()));
    let bot = Bot::new(channel.clone(), Router::new(), SaltCommands::new(session));
    bot.run().await.unwrap();
    channel.replies().await
}

#[tokio::test]
async fn test_minions_glob_and_grain_share_one_login() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/minions"))
        .and(header("X-Auth-Token", "tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"docker01.local": {"os": "CentOS"}, "web01": {"os": "Debian"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Auth-Token", "tok-abc"))
        .and(body_json(json!([{
            "client": "local",
            "tgt": "docker01.*",
            "fun": "cmd.run",
            "arg": ["ls -a"],
            "tgt_type": "glob"
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"docker01.local": "anaconda-ks.cfg\n.bashrc"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!([{
            "client": "local",
            "tgt": "virtual_subtype:Docker",
            "fun": "cmd.run",
            "arg": ["ls"],
            "tgt_type": "grain"
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"docker01.local": "anaconda-ks.cfg"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut replies = run_bot(
        &server,
        &[
            "!minions",
            r#"!glob "docker01.*" "ls -a""#,
            "!grain virtual_subtype:Docker ls",
        ],
    )
    .await;
    replies.sort();

    assert_eq!(replies.len(), 3);
    assert!(replies[0].starts_with("$ ls"));
    assert!(replies.iter().any(|r| r.starts_with("2 minion(s) available:")));
    assert!(replies.iter().any(|r| r.contains("glob docker01.* matched 1 minion(s)")));
    assert!(
        replies
            .iter()
            .any(|r| r.contains("grain virtual_subtype:Docker matched 1 minion(s)"))
    );
    assert!(
        replies
            .iter()
            .filter(|r| r.contains("anaconda-ks.cfg"))
            .count()
            == 2
    );
}

#[tokio::test]
async fn test_wrong_argument_count_never_logs_in() {
    let server = MockServer::start().await;
    mount_login(&server, 0).await;

    let replies = run_bot(&server, &["!glob web* ls -la", "!grain os:Debian"]).await;

    assert_eq!(replies, vec![FAILURE_REPLY, FAILURE_REPLY]);
}

#[tokio::test]
async fn test_rejected_login_yields_failure_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let replies = run_bot(&server, &["!minions"]).await;

    assert_eq!(replies, vec![FAILURE_REPLY]);
}

#[tokio::test]
async fn test_unexpected_response_shape_yields_failure_reply() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/minions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"return": [{}]})))
        .mount(&server)
        .await;

    let replies = run_bot(&server, &["!minions"]).await;

    assert_eq!(replies, vec![FAILURE_REPLY]);
}
