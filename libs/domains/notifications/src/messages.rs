//! Message builders for account-related emails.

/// Subject line for account verification emails.
pub const VERIFY_SUBJECT: &str = "Verify Your Account";

/// Build the verification email body.
///
/// `base_url` is the externally reachable address of the accounts API; the
/// link lands on `GET /verify/{token}`.
pub fn verification_email(base_url: &str, name: &str, token: &str) -> String {
    let greeting = if name.is_empty() {
        "Hello,".to_string()
    } else {
        format!("Hello {},", name)
    };

    format!(
        "{greeting}\n\n\
         Thanks for registering. Click the link below to verify your account:\n\n\
         {base}/verify/{token}\n\n\
         If you did not create this account, you can ignore this email.\n",
        greeting = greeting,
        base = base_url.trim_end_matches('/'),
        token = token,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_contains_link() {
        let body = verification_email("http://localhost:8080", "Alice", "abc-123");
        assert!(body.contains("http://localhost:8080/verify/abc-123"));
        assert!(body.contains("Hello Alice,"));
    }

    #[test]
    fn test_verification_email_trims_trailing_slash() {
        let body = verification_email("http://localhost:8080/", "", "tok");
        assert!(body.contains("http://localhost:8080/verify/tok"));
        assert!(body.starts_with("Hello,"));
    }
}
