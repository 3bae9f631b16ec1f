use crate::session::SessionStore;
use reqwest::RequestBuilder;
use std::sync::Arc;

/// A request transform applied to every outbound call before it is sent
pub trait RequestStage: Send + Sync {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Attaches the current session credential as `Authorization: Bearer <token>`.
///
/// The store is read on every request. With no credential the request goes
/// out unauthenticated and the backend decides.
pub struct BearerAuth {
    session: Arc<SessionStore>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

impl RequestStage for BearerAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.get() {
            Some(credential) => request.bearer_auth(credential.expose()),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credential;
    use reqwest::header::AUTHORIZATION;
    use reqwest::Client;

    fn build(stage: &dyn RequestStage) -> reqwest::Request {
        let request = Client::new().get("http://localhost:8000/drivers");
        stage.apply(request).build().unwrap()
    }

    #[test]
    fn test_attaches_bearer_when_present() {
        let session = Arc::new(SessionStore::new());
        session.set(Credential::new("tok-1"));
        let stage = BearerAuth::new(Arc::clone(&session));

        let request = build(&stage);
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer tok-1"
        );
    }

    #[test]
    fn test_no_header_without_session() {
        let stage = BearerAuth::new(Arc::new(SessionStore::new()));
        let request = build(&stage);
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_reads_credential_at_send_time() {
        let session = Arc::new(SessionStore::new());
        let stage = BearerAuth::new(Arc::clone(&session));

        session.set(Credential::new("old"));
        assert_eq!(build(&stage).headers()[AUTHORIZATION], "Bearer old");

        session.set(Credential::new("new"));
        assert_eq!(build(&stage).headers()[AUTHORIZATION], "Bearer new");

        session.expire();
        assert!(build(&stage).headers().get(AUTHORIZATION).is_none());
    }
}
