//! Application bootstrap: root component, shared request defaults and mount point.
//!
//! ```rust
//! use scheduler_client::app::{initialize, AppContext, Component};
//! use scheduler_client::document::{Document, Element, Host};
//! use scheduler_client::AppConfig;
//!
//! struct Hello;
//!
//! impl Component for Hello {
//!     fn render(&self, ctx: &AppContext) -> String {
//!         format!("<p>talking to {}</p>", ctx.http().base_url())
//!     }
//! }
//!
//! let mut document = Document::new();
//! document.append(Element::new("div").with_id("app"));
//!
//! let app = initialize(Hello, &mut document, "#app", AppConfig::default()).unwrap();
//! assert_eq!(
//!     Some("<p>talking to http://localhost:8080</p>"),
//!     document.inner_html(app.mount_point())
//! );
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::{
    document::{ElementId, Host},
    AppConfig, Fetch, FetchError,
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no element matches mount selector {0:?}")]
    MountTargetNotFound(String),
    #[error("unable to configure http client: {0}")]
    Client(#[from] FetchError),
}

/// What every component can reach: the shared client and the defaults it was built from.
#[derive(Debug, Clone)]
pub struct AppContext {
    http: Arc<Fetch>,
    config: Arc<AppConfig>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self, BootstrapError> {
        let http = Fetch::from_app_config(&config)?;
        Ok(Self {
            http: Arc::new(http),
            config: Arc::new(config),
        })
    }

    /// The configured client. Cloning the `Arc` shares the cookie jar and defaults.
    pub fn http(&self) -> Arc<Fetch> {
        self.http.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

pub trait Component {
    /// Markup placed under the mount point.
    fn render(&self, ctx: &AppContext) -> String;
}

/// An application that has not been attached to a document yet.
#[derive(Debug)]
pub struct App<C> {
    root: C,
    context: AppContext,
}

impl<C: Component> App<C> {
    pub fn new(root: C, config: AppConfig) -> Result<Self, BootstrapError> {
        Ok(Self {
            root,
            context: AppContext::new(config)?,
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Renders the root into the first element matching `selector`.
    pub fn mount<H: Host>(self, host: &mut H, selector: &str) -> Result<MountedApp<C>, BootstrapError> {
        let mount_point = host
            .query_selector(selector)
            .ok_or_else(|| BootstrapError::MountTargetNotFound(selector.to_string()))?;

        host.set_inner_html(mount_point, self.root.render(&self.context));
        log::debug!(
            "mounted on {selector} against {}",
            self.context.config().base_url
        );

        Ok(MountedApp {
            root: self.root,
            context: self.context,
            mount_point,
        })
    }
}

#[derive(Debug)]
pub struct MountedApp<C> {
    root: C,
    context: AppContext,
    mount_point: ElementId,
}

impl<C: Component> MountedApp<C> {
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn http(&self) -> Arc<Fetch> {
        self.context.http()
    }

    pub fn mount_point(&self) -> ElementId {
        self.mount_point
    }

    pub fn root(&self) -> &C {
        &self.root
    }

    /// Renders the root again, e.g. after it fetched new data.
    pub fn refresh<H: Host>(&self, host: &mut H) {
        host.set_inner_html(self.mount_point, self.root.render(&self.context));
    }

    /// Clears the mount point and hands the root component back.
    pub fn unmount<H: Host>(self, host: &mut H) -> C {
        host.set_inner_html(self.mount_point, String::new());
        self.root
    }
}

/// Builds the application from `root`, configures the shared client from `config` and
/// mounts it on the element matched by `mount_selector`.
pub fn initialize<C, H>(
    root: C,
    host: &mut H,
    mount_selector: &str,
    config: AppConfig,
) -> Result<MountedApp<C>, BootstrapError>
where
    C: Component,
    H: Host,
{
    App::new(root, config)?.mount(host, mount_selector)
}
