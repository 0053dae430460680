//! Domain models shared across providers

mod account;
mod label;
mod message;
mod rule;

pub use account::{Account, Provider};
pub use label::{EmailLabel, LabelKind, system_labels};
pub use message::{EmailAddress, EmailAttachment, EmailMessage, MessageBuilder};
pub use rule::{EmailRule, RuleActions, RuleConditions};
