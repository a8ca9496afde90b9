// The cookie holds a random id; the store is keyed by its SHA-256 and holds
// the AES-GCM sealed payload.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{FromRequestParts, OriginalUri, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, Uri, header};
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::use_cases::auth::me::GetMe;
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::user::User;
use crate::infrastructure::crypto;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flashes {
    #[serde(default)]
    pub success: Vec<String>,
    #[serde(default)]
    pub error: Vec<String>,
}

impl Flashes {
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub flash: Flashes,
    #[serde(default)]
    pub return_to: Option<String>,
    #[serde(default)]
    pub touched_at: i64,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.flash.is_empty() && self.return_to.is_none()
    }
}

#[derive(Debug)]
struct SessionState {
    id: Option<String>,
    data: SessionData,
    dirty: bool,
    regenerate: bool,
}

/// Per-request session handle. Cheap to clone; all clones share state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    fn new(id: Option<String>, data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                id,
                data,
                dirty: false,
                regenerate: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.state().data.user_id
    }

    /// Binds the session to `user_id` under a fresh id.
    pub fn login(&self, user_id: Uuid) {
        let mut s = self.state();
        s.data.user_id = Some(user_id);
        s.dirty = true;
        s.regenerate = true;
    }

    pub fn logout(&self) {
        let mut s = self.state();
        s.data.user_id = None;
        s.dirty = true;
        s.regenerate = true;
    }

    pub fn flash_success(&self, message: impl Into<String>) {
        let mut s = self.state();
        s.data.flash.success.push(message.into());
        s.dirty = true;
    }

    pub fn flash_error(&self, message: impl Into<String>) {
        let mut s = self.state();
        s.data.flash.error.push(message.into());
        s.dirty = true;
    }

    /// Flash notices are shown once: taking them clears them.
    pub fn take_flashes(&self) -> Flashes {
        let mut s = self.state();
        if s.data.flash.is_empty() {
            return Flashes::default();
        }
        s.dirty = true;
        std::mem::take(&mut s.data.flash)
    }

    pub fn set_return_to(&self, url: impl Into<String>) {
        let mut s = self.state();
        s.data.return_to = Some(url.into());
        s.dirty = true;
    }

    pub fn take_return_to(&self) -> Option<String> {
        let mut s = self.state();
        let url = s.data.return_to.take();
        if url.is_some() {
            s.dirty = true;
        }
        url
    }

    fn forget_user(&self) {
        let mut s = self.state();
        if s.data.user_id.take().is_some() {
            s.dirty = true;
        }
    }

    fn apply(&self, effects: SessionEffects) {
        if let Some(message) = effects.flash_error {
            self.flash_error(message);
        }
        if let Some(url) = effects.return_to {
            self.set_return_to(url);
        }
    }
}

/// Session side effects of a response built without session access (error
/// responses). The middleware applies them before persisting.
#[derive(Debug, Clone, Default)]
pub struct SessionEffects {
    pub flash_error: Option<String>,
    pub return_to: Option<String>,
}

/// The authenticated user for this request, if any.
#[derive(Debug, Clone)]
pub struct Principal(pub Option<User>);

pub struct RequestContext {
    pub session: Session,
    pub user: Option<User>,
    pub method: Method,
    pub uri: Uri,
}

impl RequestContext {
    pub fn require_user(&self) -> AppResult<&User> {
        self.user.as_ref().ok_or_else(|| AppError::Unauthenticated {
            return_to: (self.method == Method::GET).then(|| self.uri.to_string()),
        })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session middleware not installed")))?;
        let user = parts
            .extensions
            .get::<Principal>()
            .and_then(|p| p.0.clone());
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|o| o.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        Ok(Self {
            session,
            user,
            method: parts.method.clone(),
            uri,
        })
    }
}

pub async fn session_layer(State(ctx): State<AppContext>, mut req: Request, next: Next) -> Response {
    let cookie_id = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| get_cookie(h, &ctx.cfg.session_cookie_name));

    let loaded = match &cookie_id {
        Some(id) => load(&ctx, id).await,
        None => None,
    };
    let session = match loaded {
        Some(data) => Session::new(cookie_id, data),
        None => Session::new(None, SessionData::default()),
    };

    let principal = match session.user_id() {
        Some(user_id) => {
            let repo = ctx.user_repo();
            match (GetMe { repo: repo.as_ref() }).execute(user_id).await {
                Ok(Some(user)) => Some(user),
                Ok(None) => {
                    tracing::info!(user_id = %user_id, "session_user_missing");
                    session.forget_user();
                    None
                }
                Err(err) => {
                    tracing::error!(error = ?err, user_id = %user_id, "session_user_lookup_failed");
                    None
                }
            }
        }
        None => None,
    };

    req.extensions_mut().insert(session.clone());
    req.extensions_mut().insert(Principal(principal));

    let mut response = next.run(req).await;
    if let Some(effects) = response.extensions_mut().remove::<SessionEffects>() {
        session.apply(effects);
    }
    if let Err(err) = persist(&ctx, &session, &mut response).await {
        tracing::error!(error = ?err, "session_persist_failed");
    }
    response
}

async fn load(ctx: &AppContext, id: &str) -> Option<SessionData> {
    let sealed = match ctx.session_store().load(&crypto::session_key(id)).await {
        Ok(Some(sealed)) => sealed,
        Ok(None) => return None,
        Err(err) => {
            tracing::error!(error = ?err, "session_load_failed");
            return None;
        }
    };
    let data = crypto::open(&ctx.cfg.secret, &sealed)
        .and_then(|json| Ok(serde_json::from_str::<SessionData>(&json)?));
    match data {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::warn!(error = ?err, "session_payload_rejected");
            None
        }
    }
}

async fn persist(ctx: &AppContext, session: &Session, response: &mut Response) -> anyhow::Result<()> {
    let (mut id, mut data, dirty, regenerate) = {
        let s = session.state();
        (s.id.clone(), s.data.clone(), s.dirty, s.regenerate)
    };
    let store = ctx.session_store();
    let now = chrono::Utc::now().timestamp();
    let touch_after = i64::try_from(ctx.cfg.session_touch_after.as_secs()).unwrap_or(i64::MAX);

    if regenerate {
        if let Some(old) = id.take() {
            store.destroy(&crypto::session_key(&old)).await?;
        }
    }
    let stale = id.is_some() && now.saturating_sub(data.touched_at) >= touch_after;
    if !(dirty || regenerate || stale) {
        return Ok(());
    }

    let secure = ctx.cfg.secure_cookies();
    let name = &ctx.cfg.session_cookie_name;
    if data.is_empty() {
        if let Some(old) = id {
            store.destroy(&crypto::session_key(&old)).await?;
            set_cookie(response, &clear_session_cookie(name, secure));
        } else if regenerate {
            set_cookie(response, &clear_session_cookie(name, secure));
        }
        return Ok(());
    }

    let id = id.unwrap_or_else(crypto::new_session_id);
    data.touched_at = now;
    let sealed = crypto::seal(&ctx.cfg.secret, &serde_json::to_string(&data)?)?;
    store
        .save(&crypto::session_key(&id), &sealed, ctx.cfg.session_ttl)
        .await?;
    set_cookie(
        response,
        &build_session_cookie(name, &id, ctx.cfg.session_ttl.as_secs(), secure),
    );
    Ok(())
}

fn set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(v) => {
            response.headers_mut().append(header::SET_COOKIE, v);
        }
        Err(err) => tracing::error!(error = ?err, "invalid_session_cookie"),
    }
}

// --- Cookie helpers ---

pub(crate) fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

pub(crate) fn build_session_cookie(name: &str, id: &str, max_age_secs: u64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!("{name}={id}; HttpOnly{secure_attr}; Path=/; Max-Age={max_age_secs}; SameSite=Lax")
}

pub(crate) fn clear_session_cookie(name: &str, secure: bool) -> String {
    build_session_cookie(name, "", 0, secure)
}
