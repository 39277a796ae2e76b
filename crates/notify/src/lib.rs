//! Notification delivery: recipient lookup, alert gating, and SMTP
//! email transport.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::Dispatcher;
pub use mailer::{EmailConfig, MailError, Mailer, NullMailer, SmtpMailer};
