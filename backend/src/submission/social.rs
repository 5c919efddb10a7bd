use common::model::submission::FieldResult;
use url::{ParseError, Url};

const MSG_PROTOCOL: &str = "URL debe comenzar con https:// o http://";
const MSG_INVALID: &str = "URL proporcionada no es válida.";
const MSG_PATH: &str = "URL no contiene path (https://www.hostname.com/path)";
const MSG_DUPLICATE: &str = "Máximo un link por tipo de red social.";

/// Result of checking one social network link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheck {
    pub result: FieldResult,
    /// Resolved network name, set only when the link is valid.
    pub network: Option<String>,
}

/// Maps a hostname to the network it belongs to.
///
/// The first allowed network whose name appears inside the hostname wins; the
/// catch-all entry itself never takes part in that match. A hostname matching
/// nothing still resolves to `catch_all` when it is at least 4 characters long
/// and has a dot somewhere between its first and last character. Otherwise the
/// result is empty.
pub fn resolve_hostname(hostname: Option<&str>, allowed: &[String], catch_all: &str) -> String {
    let Some(hostname) = hostname.filter(|h| !h.is_empty()) else {
        return String::new();
    };

    if let Some(network) = allowed
        .iter()
        .filter(|n| n.as_str() != catch_all)
        .find(|n| hostname.contains(n.as_str()))
    {
        return network.clone();
    }

    let has_inner_dot = hostname
        .get(1..hostname.len() - 1)
        .is_some_and(|inner| inner.contains('.'));
    if has_inner_dot && hostname.len() >= 4 {
        catch_all.to_string()
    } else {
        String::new()
    }
}

/// Hostname of a parsed link. A link with no `//` authority after its scheme
/// (`http:twitter.com/x`) has none, even though the URL parser fills one in
/// for special schemes.
fn link_hostname<'u>(link: &str, url: &'u Url) -> Option<&'u str> {
    let after_scheme = link.trim_start().get(url.scheme().len()..)?;
    if after_scheme.starts_with("://") {
        url.host_str()
    } else {
        None
    }
}

/// Network of an already validated link, as stored by the committer.
pub fn network_of(link: &str, allowed: &[String], catch_all: &str) -> String {
    let url = Url::parse(link).ok();
    let hostname = url.as_ref().and_then(|url| link_hostname(link, url));
    resolve_hostname(hostname, allowed, catch_all)
}

/// Checks one social network link.
///
/// `considered` holds the networks of links accepted earlier in the same
/// submission; a link resolving to one of them is rejected.
pub fn check_social_network_link(
    link: &str,
    considered: &[String],
    allowed: &[String],
    catch_all: &str,
) -> LinkCheck {
    let invalid = |message: &str| LinkCheck {
        result: FieldResult::invalid(message),
        network: None,
    };

    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => return invalid(MSG_PROTOCOL),
        Err(_) => return invalid(MSG_INVALID),
    };

    let network = resolve_hostname(link_hostname(link, &url), allowed, catch_all);
    let path = url.path();

    if !matches!(url.scheme(), "http" | "https") {
        invalid(MSG_PROTOCOL)
    } else if network.is_empty() || !allowed.contains(&network) {
        invalid(MSG_INVALID)
    } else if path.is_empty() || path == "/" || path.len() < 2 {
        invalid(MSG_PATH)
    } else if considered.contains(&network) {
        invalid(MSG_DUPLICATE)
    } else {
        LinkCheck {
            result: FieldResult::ok(),
            network: Some(network),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        ["twitter", "instagram", "facebook", "tiktok", "otra"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn check(link: &str, considered: &[&str]) -> LinkCheck {
        let considered: Vec<String> = considered.iter().map(|s| s.to_string()).collect();
        check_social_network_link(link, &considered, &allowed(), "otra")
    }

    #[test]
    fn resolves_by_substring_then_catch_all() {
        let allowed = allowed();
        assert_eq!(resolve_hostname(Some("www.instagram.com"), &allowed, "otra"), "instagram");
        assert_eq!(resolve_hostname(Some("m.facebook.com"), &allowed, "otra"), "facebook");
        assert_eq!(resolve_hostname(Some("g.co"), &allowed, "otra"), "otra");
        assert_eq!(resolve_hostname(Some("otra.cl"), &allowed, "otra"), "otra");
        assert_eq!(resolve_hostname(Some(".co"), &allowed, "otra"), "");
        assert_eq!(resolve_hostname(Some("localhost"), &allowed, "otra"), "");
        assert_eq!(resolve_hostname(Some("a."), &allowed, "otra"), "");
        assert_eq!(resolve_hostname(None, &allowed, "otra"), "");
    }

    #[test]
    fn accepts_link_with_user_path() {
        let checked = check("https://twitter.com/feriavaldivia", &[]);
        assert!(checked.result.valid);
        assert_eq!(checked.network.as_deref(), Some("twitter"));
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        assert_eq!(check("instagram.com/feria", &[]).result.message, MSG_PROTOCOL);
        assert_eq!(check("ftp://instagram.com/feria", &[]).result.message, MSG_PROTOCOL);
    }

    #[test]
    fn rejects_unresolvable_host() {
        assert_eq!(check("https://localhost/feria", &[]).result.message, MSG_INVALID);
        assert_eq!(check("https://[::1", &[]).result.message, MSG_INVALID);
    }

    #[test]
    fn rejects_link_without_authority() {
        assert_eq!(check("http:twitter.com/feria", &[]).result.message, MSG_INVALID);
        assert_eq!(check("https:/instagram.com/feria", &[]).result.message, MSG_INVALID);
        assert_eq!(network_of("http:twitter.com/feria", &allowed(), "otra"), "");
        assert!(check("HTTPS://twitter.com/feria", &[]).result.valid);
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert_eq!(check("https://instagram.com:99999/feria", &[]).result.message, MSG_INVALID);
        assert!(check("https://instagram.com:8443/feria", &[]).result.valid);
    }

    #[test]
    fn rejects_bare_host() {
        assert_eq!(check("https://www.tiktok.com", &[]).result.message, MSG_PATH);
        assert_eq!(check("https://www.tiktok.com/", &[]).result.message, MSG_PATH);
    }

    #[test]
    fn rejects_network_already_linked() {
        let checked = check("https://facebook.com/otra-pagina", &["facebook"]);
        assert_eq!(checked.result.message, MSG_DUPLICATE);
        assert_eq!(checked.network, None);
    }

    #[test]
    fn network_of_matches_validation() {
        assert_eq!(network_of("https://blog.feria.cl/x", &allowed(), "otra"), "otra");
        assert_eq!(network_of("not a url", &allowed(), "otra"), "");
    }
}
