//! The `ValidatedForm` class exported to JavaScript

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use validated_form_core::{
    Binding, FeedbackPresenter, Field, FieldDescriptor, FormConfig, FormController, FormValues,
    LiveValidator, Locale, LocaleSource, SubmitEvent,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlElement, HtmlFormElement, HtmlSelectElement};

use crate::dom::{report, BrowserScheduler, DomField, DomSubmitEvent, DomSurface, SelectLocale};

/// Locale used while no locale `<select>` has a value
const DEFAULT_LOCALE: &str = "en";

type Handler = Closure<dyn FnMut(Event)>;

struct Listener {
    target: HtmlElement,
    event: &'static str,
    handler: Handler,
}

type ValidHook = Rc<RefCell<Option<js_sys::Function>>>;

struct FormState {
    form: HtmlFormElement,
    controller: RefCell<FormController>,
    presenter: Rc<RefCell<FeedbackPresenter<DomSurface>>>,
    scheduler: BrowserScheduler,
    listeners: RefCell<Vec<Listener>>,
}

/// A `<form>` with locale-aware constraints and transient error feedback
#[wasm_bindgen]
pub struct ValidatedForm {
    state: Rc<FormState>,
    on_valid: ValidHook,
}

#[wasm_bindgen]
impl ValidatedForm {
    /// Wrap the form with id `form_id`.
    ///
    /// `config` has the shape of `validated-form.toml`; `undefined` uses the
    /// defaults. The locale is read from the `<select>` with id
    /// `locale_select_id` each time a field is validated.
    #[wasm_bindgen(constructor)]
    pub fn new(
        form_id: &str,
        config: JsValue,
        locale_select_id: Option<String>,
    ) -> Result<ValidatedForm, JsValue> {
        let document = document()?;
        let form = document
            .get_element_by_id(form_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", form_id)))?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| JsValue::from_str(&format!("'{}' is not a form", form_id)))?;

        let config: FormConfig = if config.is_undefined() || config.is_null() {
            FormConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        form.class_list().add_1(&config.form.class_name)?;

        let select = locale_select_id.as_deref().and_then(|id| {
            let select = document
                .get_element_by_id(id)
                .and_then(|element| element.dyn_into::<HtmlSelectElement>().ok());
            if select.is_none() {
                tracing::warn!(id, "locale select not found, using {}", DEFAULT_LOCALE);
            }
            select
        });
        let locale: Rc<dyn LocaleSource> =
            Rc::new(SelectLocale::new(select, Locale::new(DEFAULT_LOCALE)));

        let on_valid = ValidHook::default();
        let hook = Rc::clone(&on_valid);
        let controller =
            FormController::from_config(config, locale).on_valid(move |values| emit(&hook, values));

        let presenter = Rc::new(RefCell::new(FeedbackPresenter::new(DomSurface::new(document))));
        let scheduler = BrowserScheduler::new(Rc::downgrade(&presenter));

        Ok(ValidatedForm {
            state: Rc::new(FormState {
                form,
                controller: RefCell::new(controller),
                presenter,
                scheduler,
                listeners: RefCell::new(Vec::new()),
            }),
            on_valid,
        })
    }

    /// Attach handlers to the form's current children.
    ///
    /// Call again after adding or removing fields. Returns the number of
    /// fields that got a handler.
    pub fn mount(&self) -> Result<usize, JsValue> {
        self.state.mount()
    }

    /// Receive the values of each fully valid submission. Without a callback
    /// they are logged to the console.
    #[wasm_bindgen(js_name = onValid)]
    pub fn on_valid(&self, callback: js_sys::Function) {
        *self.on_valid.borrow_mut() = Some(callback);
    }

    /// Validate every field now, as a submit click would. Returns whether the form is valid.
    pub fn submit(&self) -> Result<bool, JsValue> {
        self.state.submit(None)
    }
}

impl FormState {
    fn mount(self: &Rc<Self>) -> Result<usize, JsValue> {
        self.detach();

        let fields = self.fields();
        self.sync_surface(&fields)?;
        let descriptors: Vec<FieldDescriptor> =
            fields.iter().map(|field| field.descriptor().clone()).collect();

        let mut listeners = Vec::new();
        let mut failed = None;
        let attached = self.controller.try_borrow().map_err(|_| busy())?.mount(
            &descriptors,
            |index, _, binding| {
                let field = &fields[index];
                let handlers = match binding {
                    // selects and checkboxes may only fire `change`
                    Binding::Input(validator) => vec![
                        ("input", input_handler(field.clone(), validator.clone())),
                        ("change", input_handler(field.clone(), validator)),
                    ],
                    Binding::Submit => vec![("click", self.submit_handler())],
                };

                for (event, handler) in handlers {
                    let target = field.element().clone();
                    if let Err(err) =
                        target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
                    {
                        failed.get_or_insert(err);
                    }
                    listeners.push(Listener {
                        target,
                        event,
                        handler,
                    });
                }
            },
        );

        *self.listeners.borrow_mut() = listeners;
        match failed {
            Some(err) => Err(err),
            None => Ok(attached),
        }
    }

    fn submit(&self, event: Option<Event>) -> Result<bool, JsValue> {
        let mut event = DomSubmitEvent::new(event);
        let mut fields = self.fields();

        let (Ok(mut controller), Ok(mut presenter)) =
            (self.controller.try_borrow_mut(), self.presenter.try_borrow_mut())
        else {
            event.prevent_default();
            return Err(busy());
        };

        sync(&mut presenter, &fields);
        let result = controller.submit(&mut event, &mut fields, &mut *presenter, &self.scheduler);
        Ok(result.is_valid())
    }

    fn submit_handler(self: &Rc<Self>) -> Handler {
        let state = Rc::downgrade(self);
        Closure::wrap(Box::new(move |event: Event| {
            let Some(state) = state.upgrade() else {
                return;
            };
            if let Err(err) = state.submit(Some(event)) {
                report("submission failed", &err);
            }
        }) as Box<dyn FnMut(Event)>)
    }

    /// Form controls in document order
    fn fields(&self) -> Vec<DomField> {
        let elements = self.form.elements();
        (0..elements.length())
            .filter_map(|index| elements.item(index))
            .filter_map(DomField::from_element)
            .collect()
    }

    fn sync_surface(&self, fields: &[DomField]) -> Result<(), JsValue> {
        let mut presenter = self.presenter.try_borrow_mut().map_err(|_| busy())?;
        sync(&mut presenter, fields);
        Ok(())
    }

    fn detach(&self) {
        for listener in self.listeners.borrow_mut().drain(..) {
            if let Err(err) = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.handler.as_ref().unchecked_ref())
            {
                report("could not detach handler", &err);
            }
        }
    }
}

impl Drop for FormState {
    fn drop(&mut self) {
        self.detach();
    }
}

fn sync(presenter: &mut FeedbackPresenter<DomSurface>, fields: &[DomField]) {
    presenter.surface_mut().sync_fields(
        fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.descriptor().identity(index), field.element())),
    );
}

fn input_handler(mut field: DomField, validator: LiveValidator) -> Handler {
    Closure::wrap(Box::new(move |_event: Event| {
        validator.on_input(&mut field);
    }) as Box<dyn FnMut(Event)>)
}

fn emit(hook: &RefCell<Option<js_sys::Function>>, values: &FormValues) {
    let payload = match values.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
        Ok(payload) => payload,
        Err(err) => {
            report("could not convert form values", &err.into());
            return;
        }
    };

    match hook.borrow().as_ref() {
        Some(callback) => {
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                report("onValid callback threw", &err);
            }
        }
        None => web_sys::console::log_2(&JsValue::from_str("Form is valid"), &payload),
    }
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

fn busy() -> JsValue {
    JsValue::from_str("form is busy with another validation pass")
}
