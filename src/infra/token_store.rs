//! Cookie-backed storage for the moderator credential and one-shot notices.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::application::notice::{Notice, NoticeKind};
use crate::config::SessionSettings;
use crate::domain::credential::Credential;

const FLASH_COOKIE: &str = "bamboo_flash";
const FLASH_TTL: Duration = Duration::minutes(1);

/// The credential cookie plus the flash cookie that carries a notice across
/// a redirect. Consumes and returns itself like [`CookieJar`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    jar: CookieJar,
    cookie_name: String,
    secure: bool,
}

impl TokenStore {
    pub fn new(jar: CookieJar, settings: &SessionSettings) -> Self {
        Self {
            jar,
            cookie_name: settings.cookie_name.clone(),
            secure: settings.cookie_secure,
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.jar
            .get(&self.cookie_name)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
    }

    /// The stored credential, if it decodes and has not expired at `now`.
    pub fn credential_at(&self, now: OffsetDateTime) -> Option<Credential> {
        let token = self.get()?;
        match Credential::decode(token) {
            Ok(credential) if !credential.is_expired_at(now) => Some(credential),
            Ok(_) => {
                debug!(target = "bamboo_admin::gate", "stored credential expired");
                None
            }
            Err(err) => {
                debug!(target = "bamboo_admin::gate", error = %err, "stored credential unreadable");
                None
            }
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential_at(OffsetDateTime::now_utc())
    }

    /// Persist `token` until `expires_at`.
    pub fn set(mut self, token: &str, expires_at: OffsetDateTime) -> Self {
        let cookie = Cookie::build((self.cookie_name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .expires(expires_at);
        self.jar = self.jar.add(cookie);
        self
    }

    pub fn remove(mut self) -> Self {
        self.jar = self
            .jar
            .remove(Cookie::build(self.cookie_name.clone()).path("/"));
        self
    }

    /// Leave `notice` for the next page view.
    pub fn with_flash(mut self, notice: &Notice) -> Self {
        let value = URL_SAFE_NO_PAD.encode(format!("{}:{}", notice.kind.as_str(), notice.text));
        let cookie = Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(FLASH_TTL);
        self.jar = self.jar.add(cookie);
        self
    }

    /// Read and clear the pending notice, if any.
    pub fn take_flash(mut self) -> (Self, Option<Notice>) {
        let notice = self
            .jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| decode_flash(cookie.value()));
        if self.jar.get(FLASH_COOKIE).is_some() {
            self.jar = self.jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        }
        (self, notice)
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

fn decode_flash(value: &str) -> Option<Notice> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (kind, text) = decoded.split_once(':')?;
    Some(Notice {
        kind: NoticeKind::parse(kind)?,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::tests::encode_token;

    fn settings() -> SessionSettings {
        SessionSettings {
            cookie_name: "token".to_string(),
            cookie_secure: false,
        }
    }

    fn store_with(token: &str) -> TokenStore {
        let jar = CookieJar::new().add(Cookie::new("token", token.to_string()));
        TokenStore::new(jar, &settings())
    }

    #[test]
    fn set_writes_a_path_scoped_http_only_cookie() {
        let expires_at = OffsetDateTime::from_unix_timestamp(1_900_000_000).expect("timestamp");
        let jar = TokenStore::new(CookieJar::new(), &settings())
            .set("a.b.c", expires_at)
            .into_jar();

        let cookie = jar.get("token").expect("cookie set");
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.expires_datetime().map(OffsetDateTime::unix_timestamp),
            Some(1_900_000_000)
        );
    }

    #[test]
    fn remove_clears_the_credential() {
        let store = store_with("a.b.c").remove();
        assert!(store.get().is_none());
    }

    #[test]
    fn expired_or_garbage_tokens_read_as_absent() {
        let now = OffsetDateTime::now_utc();
        let live = encode_token("admin", now.unix_timestamp() + 600);
        let stale = encode_token("admin", now.unix_timestamp() - 600);

        assert!(store_with(&live).credential_at(now).is_some());
        assert!(store_with(&stale).credential_at(now).is_none());
        assert!(store_with("garbage").credential_at(now).is_none());
    }

    #[test]
    fn flash_notice_survives_one_read() {
        let jar = TokenStore::new(CookieJar::new(), &settings())
            .with_flash(&Notice::error("Your session has expired."))
            .into_jar();
        let value = jar.get(FLASH_COOKIE).expect("flash").value().to_string();

        let incoming = CookieJar::new().add(Cookie::new(FLASH_COOKIE, value));
        let (store, notice) = TokenStore::new(incoming, &settings()).take_flash();
        assert_eq!(notice, Some(Notice::error("Your session has expired.")));

        let (_, again) = store.take_flash();
        assert!(again.is_none());
    }
}
