//! Product-branded email rendering: subject, HTML body and plain-text
//! fallback for each link kind, plus the welcome email.

use crate::config::Environment;

use super::EmailSender;

#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

fn greeting(user_name: Option<&str>) -> String {
    match user_name {
        Some(name) if !name.is_empty() => format!("Hello {name},"),
        _ => "Hello,".to_string(),
    }
}

/// Banner shown in test-environment emails so they are never mistaken for
/// production traffic.
fn environment_banner(environment: Environment) -> &'static str {
    match environment {
        Environment::Test => {
            "<p style=\"background:#fff3cd;padding:8px;border-radius:4px\">\
             This email was sent from the <strong>Test Environment</strong>.</p>"
        }
        Environment::Prod => "",
    }
}

fn footer(product_name: &str, environment: Environment) -> String {
    let label = match environment {
        Environment::Test => "Test Environment",
        Environment::Prod => "Production",
    };
    format!("This email was sent from {product_name} ({label})")
}

pub fn password_reset_email(
    product_name: &str,
    reset_link: &str,
    environment: Environment,
    user_name: Option<&str>,
) -> RenderedEmail {
    let greeting = greeting(user_name);
    let footer = footer(product_name, environment);

    let html_body = format!(
        "<html><body>\
         {banner}\
         <h2>Password Reset Request</h2>\
         <p>{greeting}</p>\
         <p>We received a request to reset your {product_name} password. \
         Click the button below to choose a new one:</p>\
         <p><a href=\"{reset_link}\" style=\"background:#1a73e8;color:#fff;\
         padding:10px 20px;border-radius:4px;text-decoration:none\">Reset Password</a></p>\
         <p>If you didn't request this, you can safely ignore this email. \
         The link expires in 24 hours.</p>\
         <p style=\"color:#666;font-size:12px\">{footer}</p>\
         </body></html>",
        banner = environment_banner(environment),
    );

    let text_body = format!(
        "Password Reset Request\n\n\
         {greeting}\n\n\
         We received a request to reset your {product_name} password. \
         Open this link to choose a new one:\n\n{reset_link}\n\n\
         If you didn't request this, you can safely ignore this email. \
         The link expires in 24 hours.\n\n{footer}",
    );

    RenderedEmail {
        subject: format!("Reset Your Password - {product_name}"),
        html_body,
        text_body,
    }
}

pub fn verification_email(
    product_name: &str,
    verification_link: &str,
    environment: Environment,
    user_name: Option<&str>,
) -> RenderedEmail {
    let greeting = greeting(user_name);
    let footer = footer(product_name, environment);

    let html_body = format!(
        "<html><body>\
         {banner}\
         <h2>Verify Your Email Address</h2>\
         <p>{greeting}</p>\
         <p>Thank you for signing up with {product_name}! Please verify your \
         email address to complete your registration:</p>\
         <p><a href=\"{verification_link}\" style=\"background:#1a73e8;color:#fff;\
         padding:10px 20px;border-radius:4px;text-decoration:none\">Verify Email</a></p>\
         <p>This verification link expires in 48 hours. If you didn't create \
         an account with {product_name}, please ignore this email.</p>\
         <p style=\"color:#666;font-size:12px\">{footer}</p>\
         </body></html>",
        banner = environment_banner(environment),
    );

    let text_body = format!(
        "Verify Your Email Address\n\n\
         {greeting}\n\n\
         Thank you for signing up with {product_name}! Open this link to \
         verify your email address:\n\n{verification_link}\n\n\
         This verification link expires in 48 hours. If you didn't create an \
         account with {product_name}, please ignore this email.\n\n{footer}",
    );

    RenderedEmail {
        subject: format!("Verify Your Email - {product_name}"),
        html_body,
        text_body,
    }
}

pub fn welcome_email(
    product_name: &str,
    dashboard_link: &str,
    environment: Environment,
    user_name: Option<&str>,
) -> RenderedEmail {
    let greeting = greeting(user_name);
    let footer = footer(product_name, environment);

    let html_body = format!(
        "<html><body>\
         {banner}\
         <h2>Welcome to {product_name}!</h2>\
         <p>{greeting}</p>\
         <p>Your account is ready. Head to your dashboard to get started:</p>\
         <p><a href=\"{dashboard_link}\" style=\"background:#1a73e8;color:#fff;\
         padding:10px 20px;border-radius:4px;text-decoration:none\">Open Dashboard</a></p>\
         <p style=\"color:#666;font-size:12px\">{footer}</p>\
         </body></html>",
        banner = environment_banner(environment),
    );

    let text_body = format!(
        "Welcome to {product_name}!\n\n\
         {greeting}\n\n\
         Your account is ready. Open your dashboard to get started:\n\n\
         {dashboard_link}\n\n{footer}",
    );

    RenderedEmail {
        subject: format!("Welcome to {product_name}!"),
        html_body,
        text_body,
    }
}

/// Per-product sender override for welcome emails; `None` means the
/// transport's default sender applies.
pub fn welcome_sender(product_name: &str) -> Option<EmailSender> {
    match product_name {
        "Beta Health" | "beta_health" => Some(EmailSender {
            email: "reagan@oneclickmed.ng".to_string(),
            name: "Reagan Rowland - OneClick-Med".to_string(),
        }),
        _ => None,
    }
}
