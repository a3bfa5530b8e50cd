use detailops_core::{DomainError, DomainResult};

/// Validate an email address shape.
///
/// Deliberately shallow: one `@`, non-empty local part, and a dotted domain.
/// Deliverability is not this layer's problem.
pub fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("email must contain '@'"));
    };

    if local.is_empty() {
        return Err(DomainError::validation("email local part is empty"));
    }

    if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err(DomainError::validation("email domain is malformed"));
    }

    if email.contains(char::is_whitespace) || domain.contains('@') {
        return Err(DomainError::validation("email contains invalid characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("jo@example.com").is_ok());
        assert!(validate_email("first.last@mail.example.co").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@example.com", "a@", "a@nodot", "a @b.com", "a@b@c.com", "a@.com"] {
            assert!(validate_email(bad).is_err(), "expected rejection: {bad:?}");
        }
    }
}
