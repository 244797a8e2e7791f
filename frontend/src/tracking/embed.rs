use std::cell::RefCell;
use std::rc::Rc;

use crate::consent::bus::Subscription;
use crate::consent::record::ConsentRecord;
use crate::consent::storage::ConsentStorage;
use crate::consent::store::ConsentStore;

pub const CHAT_WIDGET_SCRIPT: &str = "https://unpkg.com/@elevenlabs/convai-widget-embed";

/// The page's `<head>`, as far as script tags are concerned.
pub trait ScriptHost {
    fn has_script(&self, src: &str) -> bool;
    fn append_script(&mut self, src: &str);
    fn remove_script(&mut self, src: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Rendered as a "requires functional cookies" notice.
    RequiresConsent,
    Loaded,
}

/// Third-party chat widget that only exists while functional consent is granted.
pub struct EmbedLoader<H: ScriptHost> {
    host: H,
    src: String,
    state: WidgetState,
}

impl<H: ScriptHost> EmbedLoader<H> {
    pub fn new(host: H, src: impl Into<String>) -> Self {
        Self {
            host,
            src: src.into(),
            state: WidgetState::RequiresConsent,
        }
    }

    pub fn chat_widget(host: H) -> Self {
        Self::new(host, CHAT_WIDGET_SCRIPT)
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn on_consent_changed(&mut self, record: Option<&ConsentRecord>) -> WidgetState {
        let functional = record.is_some_and(|r| r.functional);
        match (functional, self.state) {
            (true, WidgetState::RequiresConsent) => {
                // Another view of the page may already have attached it.
                if !self.host.has_script(&self.src) {
                    self.host.append_script(&self.src);
                }
                self.state = WidgetState::Loaded;
            }
            (false, WidgetState::Loaded) => {
                self.host.remove_script(&self.src);
                self.state = WidgetState::RequiresConsent;
            }
            _ => {}
        }
        self.state
    }
}

/// Applies the current decision and keeps the loader in step with every later change.
pub fn connect_embed<H, S>(
    loader: &Rc<RefCell<EmbedLoader<H>>>,
    store: &ConsentStore<S>,
) -> Subscription
where
    H: ScriptHost + 'static,
    S: ConsentStorage,
{
    loader.borrow_mut().on_consent_changed(store.load().as_ref());
    let weak = Rc::downgrade(loader);
    store.bus().subscribe(move |record| {
        if let Some(loader) = weak.upgrade() {
            loader.borrow_mut().on_consent_changed(record);
        }
    })
}

#[cfg(target_arch = "wasm32")]
pub use web::DocumentHead;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::ScriptHost;

    /// `document.head`.
    #[derive(Clone, Copy, Default)]
    pub struct DocumentHead;

    impl DocumentHead {
        fn document(&self) -> Option<web_sys::Document> {
            web_sys::window().and_then(|window| window.document())
        }

        fn find(&self, src: &str) -> Option<web_sys::Element> {
            self.document()?
                .query_selector(&format!("script[src=\"{}\"]", src))
                .ok()
                .flatten()
        }
    }

    impl ScriptHost for DocumentHead {
        fn has_script(&self, src: &str) -> bool {
            self.find(src).is_some()
        }

        fn append_script(&mut self, src: &str) {
            let Some(document) = self.document() else {
                log::error!("No document to load {} into", src);
                return;
            };
            let Some(head) = document.head() else {
                log::error!("No <head> to load {} into", src);
                return;
            };
            let script = match document.create_element("script") {
                Ok(script) => script,
                Err(e) => {
                    log::error!("Failed to create script element: {:?}", e);
                    return;
                }
            };
            let attrs = [("src", src), ("async", ""), ("type", "text/javascript")];
            for (name, value) in attrs {
                if let Err(e) = script.set_attribute(name, value) {
                    log::error!("Failed to set {} on script: {:?}", name, e);
                    return;
                }
            }
            if let Err(e) = head.append_child(&script) {
                log::error!("Failed to load {}: {:?}", src, e);
            }
        }

        fn remove_script(&mut self, src: &str) {
            if let Some(script) = self.find(src) {
                script.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::bus::ConsentBus;
    use crate::consent::record::{ConsentRecord, ConsentUpdate};
    use crate::consent::storage::MemoryStorage;

    #[derive(Default)]
    struct FakeHead {
        scripts: Vec<String>,
        appends: usize,
    }

    impl ScriptHost for FakeHead {
        fn has_script(&self, src: &str) -> bool {
            self.scripts.iter().any(|s| s == src)
        }

        fn append_script(&mut self, src: &str) {
            self.appends += 1;
            self.scripts.push(src.to_string());
        }

        fn remove_script(&mut self, src: &str) {
            self.scripts.retain(|s| s != src);
        }
    }

    fn record(functional: bool) -> ConsentRecord {
        ConsentRecord::from_update(
            &ConsentUpdate {
                functional: Some(functional),
                ..Default::default()
            },
            0,
        )
    }

    #[test]
    fn stays_blocked_without_functional_consent() {
        let mut loader = EmbedLoader::chat_widget(FakeHead::default());
        assert_eq!(loader.on_consent_changed(None), WidgetState::RequiresConsent);
        assert_eq!(
            loader.on_consent_changed(Some(&record(false))),
            WidgetState::RequiresConsent
        );
        assert!(loader.host().scripts.is_empty());
    }

    #[test]
    fn loads_once_and_unloads_on_revoke() {
        let mut loader = EmbedLoader::chat_widget(FakeHead::default());
        assert_eq!(loader.on_consent_changed(Some(&record(true))), WidgetState::Loaded);
        loader.on_consent_changed(Some(&record(true)));
        assert_eq!(loader.host().appends, 1);
        assert!(loader.host().has_script(CHAT_WIDGET_SCRIPT));

        assert_eq!(loader.on_consent_changed(None), WidgetState::RequiresConsent);
        assert!(loader.host().scripts.is_empty());
    }

    #[test]
    fn reuses_an_existing_script_tag() {
        let mut head = FakeHead::default();
        head.scripts.push(CHAT_WIDGET_SCRIPT.to_string());
        let mut loader = EmbedLoader::chat_widget(head);
        loader.on_consent_changed(Some(&record(true)));
        assert_eq!(loader.host().appends, 0);
        assert_eq!(loader.state(), WidgetState::Loaded);
    }

    #[test]
    fn follows_consent_changes_through_the_bus() {
        let store = ConsentStore::new(MemoryStorage::new(), ConsentBus::new());
        let loader = Rc::new(RefCell::new(EmbedLoader::chat_widget(FakeHead::default())));
        let _sub = connect_embed(&loader, &store);
        assert_eq!(loader.borrow().state(), WidgetState::RequiresConsent);

        store.accept_all().unwrap();
        assert_eq!(loader.borrow().state(), WidgetState::Loaded);
        assert!(loader.borrow().host().has_script(CHAT_WIDGET_SCRIPT));

        store.clear().unwrap();
        assert_eq!(loader.borrow().state(), WidgetState::RequiresConsent);
        assert!(loader.borrow().host().scripts.is_empty());
        assert_eq!(loader.borrow().host().appends, 1);
    }

    #[test]
    fn existing_functional_consent_loads_on_connect() {
        let store = ConsentStore::new(MemoryStorage::new(), ConsentBus::new());
        store
            .save(&ConsentUpdate {
                functional: Some(true),
                ..Default::default()
            })
            .unwrap();
        let loader = Rc::new(RefCell::new(EmbedLoader::chat_widget(FakeHead::default())));
        let _sub = connect_embed(&loader, &store);
        assert_eq!(loader.borrow().state(), WidgetState::Loaded);

        store.accept_necessary_only().unwrap();
        assert_eq!(loader.borrow().state(), WidgetState::RequiresConsent);
    }
}
