use std::cell::RefCell;
use std::rc::Rc;

use crate::consent::bus::Subscription;
use crate::consent::record::{now_millis, ConsentCategory, ConsentRecord, ConsentUpdate};
use crate::consent::storage::{ConsentStorage, StorageError};
use crate::consent::store::ConsentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentState {
    Undecided,
    Decided,
}

struct ViewState {
    consent: Option<ConsentRecord>,
    show_banner: bool,
    show_settings: bool,
    /// Toggle positions in the settings dialog; only persisted on save.
    draft: ConsentRecord,
}

impl ViewState {
    fn effective(&self) -> ConsentRecord {
        self.consent
            .clone()
            .unwrap_or_else(|| ConsentRecord::defaults(now_millis()))
    }

    fn apply(&mut self, record: Option<&ConsentRecord>) {
        self.consent = record.cloned();
        self.show_banner = record.is_none();
        if !self.show_settings {
            self.draft = self.effective();
        }
    }
}

/// Consent state for one open view: banner, settings dialog and the current decision.
/// Stays in sync with every other view sharing the same store through its bus.
pub struct ConsentManager<S: ConsentStorage> {
    store: ConsentStore<S>,
    view: Rc<RefCell<ViewState>>,
    _subscription: Subscription,
}

impl<S: ConsentStorage> ConsentManager<S> {
    pub fn new(store: ConsentStore<S>) -> Self {
        let consent = store.load();
        let view = Rc::new(RefCell::new(ViewState {
            show_banner: consent.is_none(),
            show_settings: false,
            draft: consent
                .clone()
                .unwrap_or_else(|| ConsentRecord::defaults(now_millis())),
            consent,
        }));

        let weak_view = Rc::downgrade(&view);
        let subscription = store.bus().subscribe(move |record| {
            if let Some(view) = weak_view.upgrade() {
                view.borrow_mut().apply(record);
            }
        });

        Self {
            store,
            view,
            _subscription: subscription,
        }
    }

    pub fn state(&self) -> ConsentState {
        if self.view.borrow().consent.is_some() {
            ConsentState::Decided
        } else {
            ConsentState::Undecided
        }
    }

    pub fn has_user_made_choice(&self) -> bool {
        self.state() == ConsentState::Decided
    }

    /// The stored decision, or the all-denied defaults while undecided.
    pub fn consent(&self) -> ConsentRecord {
        self.view.borrow().effective()
    }

    pub fn current(&self) -> Option<ConsentRecord> {
        self.view.borrow().consent.clone()
    }

    /// "No record yet" reads the same as "denied".
    pub fn has_consent_for(&self, category: ConsentCategory) -> bool {
        if !category.is_optional() {
            return true;
        }
        self.view
            .borrow()
            .consent
            .as_ref()
            .is_some_and(|record| record.allows(category))
    }

    pub fn show_banner(&self) -> bool {
        self.view.borrow().show_banner
    }

    pub fn show_settings(&self) -> bool {
        self.view.borrow().show_settings
    }

    pub fn draft(&self) -> ConsentRecord {
        self.view.borrow().draft.clone()
    }

    pub fn accept_all(&self) {
        self.persist(&ConsentUpdate::all());
    }

    pub fn accept_necessary_only(&self) {
        self.persist(&ConsentUpdate::necessary_only());
    }

    /// Saves an arbitrary partial selection over the defaults.
    pub fn update_consent(&self, update: &ConsentUpdate) {
        self.persist(update);
    }

    pub fn open_settings(&self) {
        let mut view = self.view.borrow_mut();
        view.draft = view.effective();
        view.show_settings = true;
    }

    /// Flips one optional category in the settings draft. `Necessary` cannot be toggled.
    pub fn toggle(&self, category: ConsentCategory, value: bool) {
        if !category.is_optional() {
            return;
        }
        self.view.borrow_mut().draft.set(category, value);
    }

    pub fn save_settings(&self) {
        let update = ConsentUpdate::from_record(&self.view.borrow().draft);
        self.persist(&update);
    }

    /// Closes the dialog and throws the pending toggles away.
    pub fn cancel_settings(&self) {
        let mut view = self.view.borrow_mut();
        view.draft = view.effective();
        view.show_settings = false;
    }

    /// Hides the banner for this view without recording anything.
    pub fn close_banner(&self) {
        self.view.borrow_mut().show_banner = false;
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            log::error!("Error clearing cookie consent: {}", e);
        }
    }

    fn persist(&self, update: &ConsentUpdate) {
        // The bus delivers the saved record to this view too; no borrow may be held here.
        let result: Result<ConsentRecord, StorageError> = self.store.save(update);
        let mut view = self.view.borrow_mut();
        match result {
            Ok(record) => {
                view.show_settings = false;
                view.apply(Some(&record));
            }
            Err(e) => {
                log::error!("Error saving cookie consent: {}", e);
                view.show_settings = false;
                view.show_banner = false;
            }
        }
    }
}
