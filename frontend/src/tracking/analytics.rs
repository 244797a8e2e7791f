use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::consent::bus::Subscription;
use crate::consent::record::ConsentRecord;
use crate::consent::storage::ConsentStorage;
use crate::consent::store::ConsentStore;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    PageView { page_path: String, page_title: String },
    ButtonClick { button_name: String, location: String },
    FormSubmit { form_name: String, success: bool },
    LanguageChange { from_language: String, to_language: String },
    Custom { name: String, params: Value },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &str {
        match self {
            AnalyticsEvent::PageView { .. } => "page_view",
            AnalyticsEvent::ButtonClick { .. } => "button_click",
            AnalyticsEvent::FormSubmit { .. } => "form_submit",
            AnalyticsEvent::LanguageChange { .. } => "language_change",
            AnalyticsEvent::Custom { name, .. } => name.as_str(),
        }
    }

    pub fn params(&self) -> Value {
        match self {
            AnalyticsEvent::PageView { page_path, page_title } => {
                json!({ "page_path": page_path, "page_title": page_title })
            }
            AnalyticsEvent::ButtonClick { button_name, location } => {
                json!({ "button_name": button_name, "location": location })
            }
            AnalyticsEvent::FormSubmit { form_name, success } => {
                json!({ "form_name": form_name, "success": success })
            }
            AnalyticsEvent::LanguageChange { from_language, to_language } => {
                json!({ "from_language": from_language, "to_language": to_language })
            }
            AnalyticsEvent::Custom { params, .. } => params.clone(),
        }
    }
}

/// The tracking SDK behind the consent gate.
pub trait AnalyticsBackend {
    fn initialize(&mut self);
    fn log_event(&mut self, name: &str, params: &Value);
}

/// Starts the backend the first time statistics consent shows up and drops every
/// event while that consent is missing. Once started it stays started.
pub struct AnalyticsTracker<B: AnalyticsBackend> {
    backend: B,
    initialized: bool,
    statistics_granted: bool,
}

impl<B: AnalyticsBackend> AnalyticsTracker<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            initialized: false,
            statistics_granted: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn on_consent_changed(&mut self, record: Option<&ConsentRecord>) {
        self.statistics_granted = record.is_some_and(|r| r.statistics);
        if self.statistics_granted && !self.initialized {
            self.backend.initialize();
            self.initialized = true;
            log::info!("Analytics initialized after statistics consent");
        }
    }

    /// Returns whether the event was handed to the backend.
    pub fn track(&mut self, event: AnalyticsEvent) -> bool {
        if !self.initialized || !self.statistics_granted {
            return false;
        }
        self.backend.log_event(event.name(), &event.params());
        true
    }

    pub fn track_event(&mut self, name: &str, params: Value) -> bool {
        self.track(AnalyticsEvent::Custom {
            name: name.to_string(),
            params,
        })
    }

    pub fn track_page_view(&mut self, page_path: &str, page_title: &str) -> bool {
        self.track(AnalyticsEvent::PageView {
            page_path: page_path.to_string(),
            page_title: page_title.to_string(),
        })
    }

    pub fn track_button_click(&mut self, button_name: &str, location: &str) -> bool {
        self.track(AnalyticsEvent::ButtonClick {
            button_name: button_name.to_string(),
            location: location.to_string(),
        })
    }

    pub fn track_form_submit(&mut self, form_name: &str, success: bool) -> bool {
        self.track(AnalyticsEvent::FormSubmit {
            form_name: form_name.to_string(),
            success,
        })
    }

    pub fn track_language_change(&mut self, from_language: &str, to_language: &str) -> bool {
        self.track(AnalyticsEvent::LanguageChange {
            from_language: from_language.to_string(),
            to_language: to_language.to_string(),
        })
    }
}

/// Feeds the tracker the current decision and every later change.
pub fn connect_tracker<B, S>(
    tracker: &Rc<RefCell<AnalyticsTracker<B>>>,
    store: &ConsentStore<S>,
) -> Subscription
where
    B: AnalyticsBackend + 'static,
    S: ConsentStorage,
{
    tracker.borrow_mut().on_consent_changed(store.load().as_ref());
    let weak = Rc::downgrade(tracker);
    store.bus().subscribe(move |record| {
        if let Some(tracker) = weak.upgrade() {
            tracker.borrow_mut().on_consent_changed(record);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::bus::ConsentBus;
    use crate::consent::record::ConsentUpdate;
    use crate::consent::storage::MemoryStorage;

    #[derive(Default)]
    struct FakeBackend {
        init_calls: usize,
        events: Vec<(String, Value)>,
    }

    impl AnalyticsBackend for FakeBackend {
        fn initialize(&mut self) {
            self.init_calls += 1;
        }

        fn log_event(&mut self, name: &str, params: &Value) {
            self.events.push((name.to_string(), params.clone()));
        }
    }

    fn setup() -> (ConsentStore<MemoryStorage>, Rc<RefCell<AnalyticsTracker<FakeBackend>>>) {
        let store = ConsentStore::new(MemoryStorage::new(), ConsentBus::new());
        let tracker = Rc::new(RefCell::new(AnalyticsTracker::new(FakeBackend::default())));
        (store, tracker)
    }

    #[test]
    fn nothing_is_tracked_before_a_decision() {
        let (store, tracker) = setup();
        let _sub = connect_tracker(&tracker, &store);
        assert!(!tracker.borrow_mut().track_page_view("/de", "Start"));
        assert!(!tracker.borrow().is_initialized());
        assert_eq!(tracker.borrow().backend().init_calls, 0);
    }

    #[test]
    fn granting_statistics_initializes_exactly_once() {
        let (store, tracker) = setup();
        let _sub = connect_tracker(&tracker, &store);

        store.accept_necessary_only().unwrap();
        assert!(!tracker.borrow().is_initialized());

        store.accept_all().unwrap();
        assert!(tracker.borrow().is_initialized());
        store
            .save(&ConsentUpdate {
                statistics: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(tracker.borrow().backend().init_calls, 1);

        assert!(tracker.borrow_mut().track_form_submit("contact", true));
        let tracker = tracker.borrow();
        let events = &tracker.backend().events;
        assert_eq!(events[0].0, "form_submit");
        assert_eq!(events[0].1, json!({"form_name": "contact", "success": true}));
    }

    #[test]
    fn revoking_statistics_gates_events_but_keeps_initialization() {
        let (store, tracker) = setup();
        let _sub = connect_tracker(&tracker, &store);
        store.accept_all().unwrap();
        store.accept_necessary_only().unwrap();

        assert!(tracker.borrow().is_initialized());
        assert!(!tracker.borrow_mut().track_language_change("de", "en"));

        store.clear().unwrap();
        assert!(!tracker.borrow_mut().track_button_click("cta", "hero"));

        store.accept_all().unwrap();
        assert!(tracker.borrow_mut().track_button_click("cta", "hero"));
        assert_eq!(tracker.borrow().backend().init_calls, 1);
        assert_eq!(tracker.borrow().backend().events.len(), 1);
    }

    #[test]
    fn existing_consent_initializes_on_connect() {
        let (store, tracker) = setup();
        store.accept_all().unwrap();
        let _sub = connect_tracker(&tracker, &store);
        assert!(tracker.borrow().is_initialized());
        assert!(tracker.borrow_mut().track_event("scroll", json!({"depth": 50})));
        assert_eq!(tracker.borrow().backend().events[0].0, "scroll");
    }
}
