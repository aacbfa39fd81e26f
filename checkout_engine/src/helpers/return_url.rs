use log::*;
use url::Url;

use crate::checkout_types::SessionId;

const SESSION_ID_PARAM: &str = "session_id";

/// Extracts the payment session id from the URL the provider sends the shopper back to, e.g.
/// `https://shop.example/order-success?session_id=cs_test_123`. Relative URLs are accepted.
///
/// Returns `None` if the parameter is missing or empty, in which case there is nothing to reconcile.
pub fn session_id_from_return_url(return_url: &str) -> Option<SessionId> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = match base.join(return_url.trim()) {
        Ok(url) => url,
        Err(e) => {
            debug!("🔁️ '{return_url}' is not a valid return URL. {e}");
            return None;
        },
    };
    url.query_pairs()
        .find(|(k, _)| k == SESSION_ID_PARAM)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SessionId::from)
}

/// Accepts either a full return URL or a bare session id.
pub fn session_id_or_return_url(input: &str) -> Option<SessionId> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.contains('?') || input.contains("://") || input.starts_with('/') {
        session_id_from_return_url(input)
    } else {
        Some(SessionId::from(input))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extract_from_return_url() {
        let id = session_id_from_return_url("http://localhost:3000/order-success?session_id=cs_test_a1B2");
        assert_eq!(id, Some(SessionId::from("cs_test_a1B2")));
        let id = session_id_from_return_url("/order-success?foo=1&session_id=cs%5F2");
        assert_eq!(id, Some(SessionId::from("cs_2")));
    }

    #[test]
    fn missing_or_empty_session_id() {
        assert_eq!(session_id_from_return_url("http://localhost:3000/order-success"), None);
        assert_eq!(session_id_from_return_url("/order-success?session_id="), None);
        assert_eq!(session_id_from_return_url("/order-success?session=cs_1"), None);
    }

    #[test]
    fn bare_ids_are_accepted() {
        assert_eq!(session_id_or_return_url(" cs_live_9 "), Some(SessionId::from("cs_live_9")));
        assert_eq!(session_id_or_return_url("/order-success?session_id=cs_1"), Some(SessionId::from("cs_1")));
        assert_eq!(session_id_or_return_url(""), None);
    }
}
