//! Resend transactional email adapter.
//!
//! Implements the `Mailer` port against Resend's JSON API, plus the two
//! fixed delivery email templates.

mod mock_mailer;
mod resend_mailer;
mod templates;

pub use mock_mailer::MockMailer;
pub use resend_mailer::{ResendConfig, ResendMailer};
pub use templates::{render_delivery_email, RenderedEmail};
