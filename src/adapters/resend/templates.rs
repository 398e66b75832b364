//! Delivery email templates.
//!
//! Two fixed templates, selected by product kind: a dedicated layout for
//! guided-protocol products and a generic one for plain PDF downloads.
//! Plain string assembly, no template engine. Product names come from our
//! own catalog, so no HTML escaping is applied.

use crate::domain::order::EmailTemplate;

/// A fully rendered email, ready to hand to the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Renders the delivery email for a purchased product.
///
/// `download_url` is included as a button when present; otherwise the copy
/// points the reader at replying to this email.
pub fn render_delivery_email(
    template: EmailTemplate,
    product_name: &str,
    download_url: Option<&str>,
) -> RenderedEmail {
    match template {
        EmailTemplate::Protocol => protocol_email(product_name, download_url),
        EmailTemplate::Pdf => pdf_email(product_name, download_url),
    }
}

fn protocol_email(product_name: &str, download_url: Option<&str>) -> RenderedEmail {
    let subject = format!("Your {product_name} is ready");
    let html = format!(
        "<div style=\"font-family: Georgia, serif; max-width: 560px; margin: 0 auto; \
         color: #3a3a3a; line-height: 1.6;\">\
         <h1 style=\"font-size: 22px; font-weight: normal;\">Your {product_name} is ready</h1>\
         <p>Thank you for your purchase.</p>\
         <p>This protocol works best when you give it unhurried time. Find a quiet \
         space, read it through once, and then begin with the first practice.</p>\
         {download_block}\
         <p>If anything is unclear as you work through it, just reply to this \
         email.</p>\
         <p style=\"margin-top: 32px;\">Warmly,<br/>Stillpoint</p>\
         </div>",
        download_block = download_block(download_url, "Open your protocol"),
    );
    RenderedEmail { subject, html }
}

fn pdf_email(product_name: &str, download_url: Option<&str>) -> RenderedEmail {
    let subject = format!("Your {product_name} download");
    let html = format!(
        "<div style=\"font-family: Georgia, serif; max-width: 560px; margin: 0 auto; \
         color: #3a3a3a; line-height: 1.6;\">\
         <h1 style=\"font-size: 22px; font-weight: normal;\">Thank you for your purchase</h1>\
         <p>Your copy of <strong>{product_name}</strong> is ready.</p>\
         {download_block}\
         <p>If you have any trouble with the download, just reply to this email \
         and we will sort it out.</p>\
         <p style=\"margin-top: 32px;\">Warmly,<br/>Stillpoint</p>\
         </div>",
        download_block = download_block(download_url, "Download your PDF"),
    );
    RenderedEmail { subject, html }
}

fn download_block(download_url: Option<&str>, label: &str) -> String {
    match download_url {
        Some(url) => format!(
            "<p style=\"margin: 28px 0;\">\
             <a href=\"{url}\" style=\"background: #5a7d6a; color: #ffffff; \
             padding: 12px 24px; text-decoration: none; border-radius: 4px;\">\
             {label}</a></p>"
        ),
        None => String::new(),
    }
}
