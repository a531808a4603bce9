/// Part of an address after its last `@`.
///
/// Follows plain string splitting: an address without `@` is its own
/// domain, so an empty address gives an empty domain.
pub fn domain_of(address: &str) -> &str {
    address.rsplit('@').next().unwrap_or(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_after_last_at() {
        assert_eq!(domain_of("bob@example.org"), "example.org");
        assert_eq!(domain_of("\"a@b\"@mail.example.org"), "mail.example.org");
        assert_eq!(domain_of("bob@"), "");
        assert_eq!(domain_of(""), "");
    }
}
