//! Send emails to user for important updates.
//!
//! Mail delivery itself is an external collaborator: this manager only
//! publishes cloudevents onto a queue. Without a `mail` entry in the
//! configuration it degrades to a logged no-op.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::Utc;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use serde::Serialize;

use crate::config::Mail;
use crate::error::{Result, ServerError};

const DEFAULT_AMPQ_VHOST: &str = "%2f";

const CONTENT_ENCODING: &str = "utf8";
const CONTENT_TYPE: &str = "application/cloudevents+json";
const DATA_CONTENT_TYPE: &str = "application/json";
const CLOUDEVENT_VERSION: &str = "1.0";
const ID_LENGTH: usize = 12;

/// Maily templates list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// Numeric code to confirm an email address.
    VerifyEmail,
    /// Link to choose a new password.
    ResetPassword,
}

/// One outgoing mail event.
#[derive(Debug)]
pub struct Event<'a> {
    pub template: Template,
    pub to: &'a str,
    pub username: &'a str,
    /// Verification code, for [`Template::VerifyEmail`].
    pub code: Option<&'a str>,
    /// Password-reset link, for [`Template::ResetPassword`].
    pub link: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Cloudevent<'a> {
    specversion: &'static str,
    r#type: &'static str,
    source: &'static str,
    id: String,
    time: String,
    datacontenttype: &'static str,
    data: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    to: Cow<'a, str>,
    template: Template,
    username: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<Cow<'a, str>>,
}

/// Maily instance manager.
#[derive(Clone, Default)]
pub struct MailManager {
    queue: String,
    conn: Option<Arc<Connection>>,
}

impl MailManager {
    /// Create a new [`MailManager`].
    pub async fn new(config: &Mail) -> Result<Self> {
        let vhost = config.vhost.as_deref().unwrap_or(DEFAULT_AMPQ_VHOST);
        let addr = format!(
            "amqp://{}:{}@{}/{}",
            config.username, config.password, config.address, vhost
        );

        let conn_config = ConnectionProperties::default()
            .with_connection_name("lynq_maily_client".into());
        let conn = Connection::connect(&addr, conn_config)
            .await
            .map_err(|err| ServerError::internal("rabbitmq unreachable", err))?;

        tracing::info!(address = %config.address, "rabbitmq connected");

        Ok(Self {
            queue: config.queue.clone(),
            conn: Some(Arc::new(conn)),
        })
    }

    async fn create_channel(
        conn: Arc<Connection>,
        queue: &str,
    ) -> Result<Channel> {
        let channel = conn
            .create_channel()
            .await
            .map_err(|err| ServerError::internal("rabbitmq channel", err))?;
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|err| ServerError::internal("rabbitmq queue", err))?;
        Ok(channel)
    }

    fn create_event(data: Content) -> Cloudevent {
        let id = Alphanumeric.sample_string(&mut OsRng, ID_LENGTH);
        Cloudevent {
            specversion: CLOUDEVENT_VERSION,
            r#type: "com.lynq.email",
            source: "com.lynq.api",
            id,
            time: Utc::now().to_rfc3339(),
            datacontenttype: DATA_CONTENT_TYPE,
            data,
        }
    }

    /// Publish event for a specific user.
    pub async fn publish_event(&self, event: Event<'_>) -> Result<()> {
        let Some(conn) = &self.conn else {
            tracing::debug!(template = ?event.template, "mail event skipped, no queue configured");
            return Ok(());
        };
        let channel =
            Self::create_channel(Arc::clone(conn), &self.queue).await?;

        tracing::trace!(template = ?event.template, "event sent");

        let content = Content {
            to: Cow::from(event.to),
            username: Cow::from(event.username),
            template: event.template,
            code: event.code.map(Cow::from),
            link: event.link.map(Cow::from),
        };
        let payload = Self::create_event(content);
        let payload = serde_json::to_string(&payload)?;

        channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                payload.as_bytes(),
                BasicProperties::default()
                    .with_content_encoding(CONTENT_ENCODING.into())
                    .with_content_type(CONTENT_TYPE.into()),
            )
            .await
            .map_err(|err| ServerError::internal("rabbitmq publish", err))?;

        Ok(())
    }
}
