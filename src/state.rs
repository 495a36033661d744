use crate::auth::SessionStore;
use crate::config::Config;
use crate::db::CertificateStore;
use crate::layout::Branding;
use crate::logo::load_logo;
use crate::service::CertificateService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: CertificateService,
    pub sessions: SessionStore,
    pub branding: Branding,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn CertificateStore>) -> Self {
        let logo = config.logo_path.as_deref().and_then(|path| match load_logo(path) {
            Ok(logo) => Some(logo),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Logo not loaded, printing without it: {}", e);
                None
            }
        });

        Self {
            service: CertificateService::new(store, config.verification_base_url.clone()),
            sessions: SessionStore::new(config.session_ttl_hours),
            branding: Branding {
                logo,
                ..Branding::from_config(&config)
            },
            config,
        }
    }
}
