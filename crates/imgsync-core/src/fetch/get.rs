//! One HTTP GET through a libcurl easy handle, body collected in memory.

use super::FetchProfile;
use crate::retry::FetchError;

const USER_AGENT: &str = concat!("imgsync/", env!("CARGO_PKG_VERSION"));

/// Performs a single GET with the given profile. Follows redirects.
/// Non-2xx responses are returned as `FetchError::Http`.
pub(super) fn get_once(url: &str, profile: &FetchProfile) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(USER_AGENT)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(profile.connect_timeout)?;
    easy.timeout(profile.timeout)?;
    easy.ssl_verify_peer(profile.verify_tls)?;
    easy.ssl_verify_host(profile.verify_tls)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(body)
}
