//! Transactional e-mail templates

/// Password-reset e-mail. The link embeds a single-use token valid for
/// one hour.
#[must_use]
pub fn password_reset_email(reset_link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 480px; margin: 0 auto;">
  <h2 style="color: #1a2b4b;">Reset your Aegis password</h2>
  <p>We received a request to reset the password for your account.
     Click the button below to choose a new one. The link is valid for one hour.</p>
  <p style="margin: 24px 0;">
    <a href="{reset_link}"
       style="background: #2563eb; color: #ffffff; padding: 12px 20px; border-radius: 6px; text-decoration: none;">
      Reset password
    </a>
  </p>
  <p style="color: #6b7280; font-size: 13px;">
    If you didn't request this, you can safely ignore this e-mail -
    your password will not change.
  </p>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_email_embeds_link() {
        let html = password_reset_email("https://aegis.health/auth/reset-password?token=abc");
        assert!(html.contains("https://aegis.health/auth/reset-password?token=abc"));
        assert!(html.contains("valid for one hour"));
    }
}
