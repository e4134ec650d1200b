// File: src/dom.rs
// Purpose: DOM implementations of the core host traits

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;
use std::time::Duration;

use validated_form_core::{
    FeedbackNode, FeedbackPresenter, FeedbackSurface, Field, FieldDescriptor, FieldGeometry,
    Locale, LocaleSource, NodeId, Scheduler, SubmitEvent, TimerTask, ValidityReport,
    FEEDBACK_CLASS,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, ValidityState,
};

use crate::ValidityFlags;

/// Class set on a field while it has a failure
const ERROR_CLASS: &str = "error";

/// Class that makes a feedback node visible
const VISIBLE_CLASS: &str = "visible";

/// Log a DOM failure that has nowhere to propagate
pub(crate) fn report(context: &str, err: &JsValue) {
    tracing::warn!(?err, "{}", context);
    web_sys::console::warn_2(&JsValue::from_str(context), err);
}

impl From<&ValidityState> for ValidityFlags {
    fn from(state: &ValidityState) -> Self {
        Self {
            value_missing: state.value_missing(),
            type_mismatch: state.type_mismatch(),
            pattern_mismatch: state.pattern_mismatch(),
            too_long: state.too_long(),
            too_short: state.too_short(),
            range_underflow: state.range_underflow(),
            range_overflow: state.range_overflow(),
            step_mismatch: state.step_mismatch(),
            bad_input: state.bad_input(),
            custom_error: state.custom_error(),
        }
    }
}

/// Elements that take part in constraint validation
#[derive(Debug, Clone)]
enum Control {
    Input(HtmlInputElement),
    Select(HtmlSelectElement),
    TextArea(HtmlTextAreaElement),
    Button(HtmlButtonElement),
}

impl Control {
    fn from_element(element: &Element) -> Option<Self> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Some(Control::Input(input.clone()))
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            Some(Control::Select(select.clone()))
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            Some(Control::TextArea(area.clone()))
        } else {
            element
                .dyn_ref::<HtmlButtonElement>()
                .map(|button| Control::Button(button.clone()))
        }
    }

    fn value(&self) -> String {
        match self {
            Control::Input(el) => el.value(),
            Control::Select(el) => el.value(),
            Control::TextArea(el) => el.value(),
            Control::Button(el) => el.value(),
        }
    }

    fn validity(&self) -> ValidityState {
        match self {
            Control::Input(el) => el.validity(),
            Control::Select(el) => el.validity(),
            Control::TextArea(el) => el.validity(),
            Control::Button(el) => el.validity(),
        }
    }

    fn set_custom_validity(&self, message: &str) {
        match self {
            Control::Input(el) => el.set_custom_validity(message),
            Control::Select(el) => el.set_custom_validity(message),
            Control::TextArea(el) => el.set_custom_validity(message),
            Control::Button(el) => el.set_custom_validity(message),
        }
    }
}

/// A form control element seen as a [`Field`]
#[derive(Debug, Clone)]
pub struct DomField {
    element: HtmlElement,
    control: Control,
    descriptor: FieldDescriptor,
}

impl DomField {
    /// `None` for elements that are not form controls (fieldset, output, ...)
    pub fn from_element(element: Element) -> Option<Self> {
        let control = Control::from_element(&element)?;
        let descriptor = FieldDescriptor {
            name: element.get_attribute("name"),
            id: Some(element.id()).filter(|id| !id.is_empty()),
            tag: element.tag_name().to_lowercase(),
            input_type: element.get_attribute("type"),
            required: element.has_attribute("required"),
        };
        let element = element.dyn_into::<HtmlElement>().ok()?;

        Some(Self {
            element,
            control,
            descriptor,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Field for DomField {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn value(&self) -> String {
        self.control.value()
    }

    fn validity(&self) -> ValidityReport {
        ValidityFlags::from(&self.control.validity()).report()
    }

    fn set_custom_validity(&mut self, message: &str) {
        self.control.set_custom_validity(message);
    }

    fn set_error_state(&mut self, errored: bool) {
        let classes = self.element.class_list();
        let result = if errored {
            classes.add_1(ERROR_CLASS)
        } else {
            classes.remove_1(ERROR_CLASS)
        };
        if let Err(err) = result {
            report("could not toggle the error class", &err);
        }
    }

    fn geometry(&self) -> FieldGeometry {
        let width = self
            .element
            .style()
            .get_property_value("width")
            .ok()
            .filter(|width| !width.is_empty());

        FieldGeometry {
            width,
            offset_left: f64::from(self.element.offset_left()),
        }
    }
}

/// Feedback nodes as `<div class="error-msg">` siblings of their fields
pub struct DomSurface {
    document: Document,
    fields: HashMap<String, HtmlElement>,
    nodes: HashMap<NodeId, Element>,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            fields: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Replace the known fields with the form's current children
    pub fn sync_fields<'a>(&mut self, fields: impl IntoIterator<Item = (String, &'a HtmlElement)>) {
        self.fields = fields
            .into_iter()
            .map(|(identity, element)| (identity, element.clone()))
            .collect();
    }

    fn create_node(&self, node: &FeedbackNode) -> Result<Element, JsValue> {
        let element = self.document.create_element("div")?;
        element.set_class_name(&node.class_name);
        element.set_text_content(Some(&node.text));

        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let style = html.style();
            if let Some(width) = &node.width {
                style.set_property("width", width)?;
            }
            style.set_property("left", &format!("{}px", node.offset_left))?;
        }
        Ok(element)
    }

    fn try_insert(&mut self, node: &FeedbackNode) -> Result<(), JsValue> {
        let field = self
            .fields
            .get(&node.field)
            .ok_or_else(|| JsValue::from_str(&format!("no field '{}' on this form", node.field)))?;

        // stray feedback rendered by someone else
        if let Some(next) = field.next_element_sibling() {
            if next.class_list().contains(FEEDBACK_CLASS) {
                next.remove();
            }
        }

        let parent = field
            .parent_node()
            .ok_or_else(|| JsValue::from_str(&format!("field '{}' is detached", node.field)))?;
        let element = self.create_node(node)?;
        parent.insert_before(&element, field.next_sibling().as_ref())?;

        self.nodes.insert(node.id, element);
        Ok(())
    }
}

impl FeedbackSurface for DomSurface {
    fn insert_after_field(&mut self, node: &FeedbackNode) {
        if let Err(err) = self.try_insert(node) {
            report("could not insert feedback", &err);
        }
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(element) = self.nodes.remove(&node) {
            element.remove();
        }
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        let Some(element) = self.nodes.get(&node) else {
            return;
        };
        let classes = element.class_list();
        let result = if visible {
            classes.add_1(VISIBLE_CLASS)
        } else {
            classes.remove_1(VISIBLE_CLASS)
        };
        if let Err(err) = result {
            report("could not toggle feedback visibility", &err);
        }
    }
}

/// `setTimeout`-backed scheduler.
///
/// Holds the presenter weakly; timers outliving the form do nothing.
pub struct BrowserScheduler {
    presenter: Weak<RefCell<FeedbackPresenter<DomSurface>>>,
}

impl BrowserScheduler {
    pub fn new(presenter: Weak<RefCell<FeedbackPresenter<DomSurface>>>) -> Self {
        Self { presenter }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        let presenter = self.presenter.clone();
        let callback = Closure::once_into_js(move || {
            let Some(presenter) = presenter.upgrade() else {
                return;
            };
            if let Ok(mut presenter) = presenter.try_borrow_mut() {
                presenter.fire(task);
            } else {
                tracing::warn!(?task, "presenter busy, dropping timer");
            };
        });

        let Some(window) = web_sys::window() else {
            tracing::warn!("no window, timer dropped");
            return;
        };
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            report("could not schedule feedback timer", &err);
        }
    }
}

/// The click that triggered a submission, if any
pub struct DomSubmitEvent(Option<Event>);

impl DomSubmitEvent {
    pub fn new(event: Option<Event>) -> Self {
        Self(event)
    }
}

impl SubmitEvent for DomSubmitEvent {
    fn prevent_default(&mut self) {
        if let Some(event) = &self.0 {
            event.prevent_default();
        }
    }
}

/// Reads the locale from a `<select>` at the moment of asking
pub struct SelectLocale {
    select: Option<HtmlSelectElement>,
    fallback: Locale,
}

impl SelectLocale {
    pub fn new(select: Option<HtmlSelectElement>, fallback: Locale) -> Self {
        Self { select, fallback }
    }
}

impl LocaleSource for SelectLocale {
    fn current_locale(&self) -> Locale {
        self.select
            .as_ref()
            .map(HtmlSelectElement::value)
            .filter(|value| !value.is_empty())
            .map(Locale::new)
            .unwrap_or_else(|| self.fallback.clone())
    }
}
