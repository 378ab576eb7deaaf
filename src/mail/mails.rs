use super::sendmail::Mailer;

pub async fn send_verification_email(
    mailer: &Mailer,
    to_email: &str,
    first_name: &str,
    app_url: &str,
    token: &str,
) -> Result<(), String> {
    let link = format!("{}/api/auth/verify?token={}", app_url, token);
    let body = format!(
        "<h2>Welcome to Srvana, {}!</h2>\
         <p>Please confirm your email address to activate your account.</p>\
         <p><a href=\"{}\">Verify my email</a></p>\
         <p>The link expires in 24 hours.</p>",
        first_name, link
    );

    mailer.send_email(to_email, "Verify your email", &body).await
}

pub async fn send_welcome_email(
    mailer: &Mailer,
    to_email: &str,
    first_name: &str,
) -> Result<(), String> {
    let body = format!(
        "<h2>You're all set, {}!</h2>\
         <p>Your email is verified. You can now book services or start taking jobs.</p>",
        first_name
    );

    mailer.send_email(to_email, "Welcome to Srvana", &body).await
}

pub async fn send_forgot_password_email(
    mailer: &Mailer,
    to_email: &str,
    first_name: &str,
    reset_link: &str,
) -> Result<(), String> {
    let body = format!(
        "<h2>Password reset</h2>\
         <p>Hi {}, a password reset was requested for your account.</p>\
         <p><a href=\"{}\">Reset my password</a></p>\
         <p>If this wasn't you, you can ignore this email.</p>",
        first_name, reset_link
    );

    mailer.send_email(to_email, "Reset your password", &body).await
}

pub async fn send_notification_email(
    mailer: &Mailer,
    to_email: &str,
    title: &str,
    message: &str,
) -> Result<(), String> {
    let body = format!("<h2>{}</h2><p>{}</p>", title, message);
    mailer.send_email(to_email, title, &body).await
}
